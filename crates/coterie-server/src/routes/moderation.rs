use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::forms;
use crate::routes::account::inactive_account_input;
use crate::state::AppState;
use coterie_core::CoterieError;
use coterie_core::traits::*;
use coterie_core::types::{AbuseReport, Account, ModerationLogEntry, RegistrationMethod};

const LOG_PAGE_SIZE: usize = 100;

fn log_entry(moderator: &Account, target_id: &str, action: &str, comment: &str) -> ModerationLogEntry {
    ModerationLogEntry {
        id: uuid::Uuid::new_v4().to_string(),
        moderator_id: moderator.id.clone(),
        target_id: target_id.to_string(),
        action: action.to_string(),
        comment: comment.to_string(),
        logged_at: chrono::Utc::now(),
    }
}

async fn send_activation_email<A, P, B>(state: &AppState<A, P, B>, to: &str, token: &str)
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    if let Some(ref notifier) = state.notifier {
        if let Err(e) = notifier.send_activation_email(to, token).await {
            tracing::warn!(recipient = %to, "failed to send activation email: {e}");
        }
    } else {
        tracing::warn!("SMTP not configured; skipping activation email");
    }
}

// ---------------------------------------------------------------------------
// 1. listModerators
// ---------------------------------------------------------------------------

pub async fn list_moderators<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    state.current_moderator(&user).await?;

    let moderators = state.account_store.list_moderators().await?;
    Ok(Json(json!({
        "moderators": moderators.iter().map(|m| json!({
            "accountId": m.id,
            "email": m.email,
            "firstName": m.first_name,
            "lastName": m.last_name,
        })).collect::<Vec<_>>(),
    })))
}

// ---------------------------------------------------------------------------
// 2. inviteMember
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteMemberRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

pub async fn invite_member<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
    Json(body): Json<InviteMemberRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let moderator = state.current_moderator(&user).await?;

    let errors =
        forms::validate_request_invitation(&body.email, &body.first_name, &body.last_name);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let input = inactive_account_input(
        body.email.trim(),
        body.first_name.trim(),
        body.last_name.trim(),
        RegistrationMethod::Invited,
        "",
    );
    let account = state.account_store.create_account(&input).await?;

    send_activation_email(&state, &account.email, &account.activation_token).await;

    state
        .moderation_store
        .log_action(&log_entry(&moderator, &account.id, "invited-member", ""))
        .await?;

    Ok(Json(json!({ "accountId": account.id })))
}

// ---------------------------------------------------------------------------
// 3. reviewApplications
// ---------------------------------------------------------------------------

pub async fn review_applications<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    state.current_moderator(&user).await?;

    let pending = state.account_store.list_pending_applications().await?;
    Ok(Json(json!({
        "applications": pending.iter().map(|a| json!({
            "accountId": a.id,
            "email": a.email,
            "firstName": a.first_name,
            "lastName": a.last_name,
            "comments": a.application_comments,
            "appliedAt": a.applied_at.map(|t| t.to_rfc3339()),
        })).collect::<Vec<_>>(),
    })))
}

// ---------------------------------------------------------------------------
// 4. decideApplication
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DecideApplicationRequest {
    /// "approve" or "reject".
    pub action: String,
    #[serde(default)]
    pub comment: String,
}

pub async fn decide_application<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
    Path(account_id): Path<String>,
    Json(body): Json<DecideApplicationRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let moderator = state.current_moderator(&user).await?;

    let applicant = state
        .account_store
        .get_account_by_id(&account_id)
        .await?
        .ok_or_else(|| CoterieError::NotFound("no such application".to_string()))?;

    let pending = applicant.registration_method == RegistrationMethod::Requested
        && !applicant.is_active
        && !applicant.is_closed
        && !applicant.token_used;
    if !pending {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "InvalidRequest",
            "this application is no longer pending",
        ));
    }

    match body.action.as_str() {
        "approve" => {
            send_activation_email(&state, &applicant.email, &applicant.activation_token).await;
            state
                .moderation_store
                .log_action(&log_entry(
                    &moderator,
                    &applicant.id,
                    "application-approved",
                    &body.comment,
                ))
                .await?;
        }
        "reject" => {
            state.account_store.close_account(&applicant.id).await?;
            state
                .moderation_store
                .log_action(&log_entry(
                    &moderator,
                    &applicant.id,
                    "application-rejected",
                    &body.comment,
                ))
                .await?;
        }
        _ => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                "action must be 'approve' or 'reject'",
            ));
        }
    }

    Ok(Json(json!({})))
}

// ---------------------------------------------------------------------------
// 5. reportAbuse
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAbuseRequest {
    pub subject_id: String,
    pub comments: String,
}

pub async fn report_abuse<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
    Json(body): Json<ReportAbuseRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    // Any active member may file a report.
    let reporter = state.current_account(&user).await?;

    let subject = state
        .account_store
        .get_account_by_id(&body.subject_id)
        .await?
        .ok_or_else(|| CoterieError::NotFound("no such member".to_string()))?;

    let report = AbuseReport {
        id: uuid::Uuid::new_v4().to_string(),
        reporter_id: reporter.id.clone(),
        subject_id: subject.id.clone(),
        comments: body.comments,
        logged_at: chrono::Utc::now(),
        resolution: None,
        resolved_by: None,
        resolved_at: None,
    };
    state.moderation_store.create_abuse_report(&report).await?;

    Ok(Json(json!({ "reportId": report.id })))
}

// ---------------------------------------------------------------------------
// 6. reviewAbuse
// ---------------------------------------------------------------------------

pub async fn review_abuse<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    state.current_moderator(&user).await?;

    let reports = state.moderation_store.list_open_abuse_reports().await?;
    Ok(Json(json!({
        "reports": reports.iter().map(|r| json!({
            "reportId": r.id,
            "reporterId": r.reporter_id,
            "subjectId": r.subject_id,
            "comments": r.comments,
            "loggedAt": r.logged_at.to_rfc3339(),
        })).collect::<Vec<_>>(),
    })))
}

// ---------------------------------------------------------------------------
// 7. decideAbuseReport
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DecideAbuseRequest {
    /// "dismiss" or "ban".
    pub action: String,
    #[serde(default)]
    pub comment: String,
}

pub async fn decide_abuse_report<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
    Path(report_id): Path<String>,
    Json(body): Json<DecideAbuseRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let moderator = state.current_moderator(&user).await?;

    let report = state
        .moderation_store
        .get_abuse_report(&report_id)
        .await?
        .ok_or_else(|| CoterieError::NotFound("no such abuse report".to_string()))?;
    if report.resolution.is_some() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "InvalidRequest",
            "this report has already been resolved",
        ));
    }

    match body.action.as_str() {
        "dismiss" => {
            state
                .moderation_store
                .resolve_abuse_report(&report.id, "dismissed", &moderator.id)
                .await?;
            state
                .moderation_store
                .log_action(&log_entry(
                    &moderator,
                    &report.subject_id,
                    "abuse-report-dismissed",
                    &body.comment,
                ))
                .await?;
        }
        "ban" => {
            state
                .moderation_store
                .resolve_abuse_report(&report.id, "banned", &moderator.id)
                .await?;
            state
                .account_store
                .close_account(&report.subject_id)
                .await?;
            state
                .account_store
                .delete_sessions_for_account(&report.subject_id)
                .await?;
            state
                .moderation_store
                .log_action(&log_entry(
                    &moderator,
                    &report.subject_id,
                    "member-banned",
                    &body.comment,
                ))
                .await?;
        }
        _ => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                "InvalidRequest",
                "action must be 'dismiss' or 'ban'",
            ));
        }
    }

    Ok(Json(json!({})))
}

// ---------------------------------------------------------------------------
// 8. moderationLogs
// ---------------------------------------------------------------------------

pub async fn moderation_logs<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    state.current_moderator(&user).await?;

    let entries = state.moderation_store.list_log(LOG_PAGE_SIZE).await?;
    Ok(Json(json!({
        "entries": entries.iter().map(|e| json!({
            "moderatorId": e.moderator_id,
            "targetId": e.target_id,
            "action": e.action,
            "comment": e.comment,
            "loggedAt": e.logged_at.to_rfc3339(),
        })).collect::<Vec<_>>(),
    })))
}
