use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::forms::{self, LinkRow, SkillRow};
use crate::state::AppState;
use coterie_core::traits::*;
use coterie_core::types::{LinkAssignment, ProfileUpdate, SkillAssignment};

// ---------------------------------------------------------------------------
// 1. getProfile
// ---------------------------------------------------------------------------

pub async fn get_profile<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let account = state.current_account(&user).await?;
    let skills = state.profile_store.list_skills(&account.id).await?;
    let links = state.profile_store.list_links(&account.id).await?;

    Ok(Json(json!({
        "firstName": account.first_name,
        "lastName": account.last_name,
        "bio": account.bio,
        "roles": account.roles,
        "skills": skills.iter().map(|s| json!({
            "skill": s.skill,
            "proficiency": s.proficiency,
        })).collect::<Vec<_>>(),
        "links": links.iter().map(|l| json!({
            "anchor": l.anchor,
            "url": l.url,
            "brand": l.brand_domain,
        })).collect::<Vec<_>>(),
    })))
}

// ---------------------------------------------------------------------------
// 2. saveProfile
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub skills: Vec<SkillRow>,
    #[serde(default)]
    pub links: Vec<LinkRow>,
}

pub async fn save_profile<A, P, B>(
    State(state): State<AppState<A, P, B>>,
    user: AuthenticatedUser,
    Json(body): Json<SaveProfileRequest>,
) -> Result<Json<Value>, ApiError>
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    let account = state.current_account(&user).await?;

    // The whole submission stands or falls together: base fields and
    // every row must pass before anything is written.
    let mut errors = forms::FieldErrors::new();
    if body.first_name.trim().is_empty() {
        errors.insert("first_name".to_string(), "This field is required.".to_string());
    }
    if body.last_name.trim().is_empty() {
        errors.insert("last_name".to_string(), "This field is required.".to_string());
    }
    let skill_pairs = forms::validate_skill_rows(&body.skills, &mut errors);
    let link_pairs = forms::validate_link_rows(&body.links, &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::validation(errors));
    }

    let update = ProfileUpdate {
        first_name: body.first_name.trim().to_string(),
        last_name: body.last_name.trim().to_string(),
        bio: body.bio.trim().to_string(),
        roles: body.roles,
    };
    state.account_store.update_profile(&account.id, &update).await?;

    // Full replace for both record types: old rows out, submitted set in.
    let skill_records: Vec<SkillAssignment> = skill_pairs
        .into_iter()
        .map(|(skill, proficiency)| SkillAssignment {
            account_id: account.id.clone(),
            skill,
            proficiency,
        })
        .collect();
    PairedRecordStore::<SkillAssignment>::replace_all_for_owner(
        state.profile_store.as_ref(),
        &account.id,
        &skill_records,
    )
    .await?;

    let link_records: Vec<LinkAssignment> = link_pairs
        .into_iter()
        .map(|(anchor, url)| LinkAssignment {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: account.id.clone(),
            anchor,
            url,
            brand_domain: None,
        })
        .collect();
    PairedRecordStore::<LinkAssignment>::replace_all_for_owner(
        state.profile_store.as_ref(),
        &account.id,
        &link_records,
    )
    .await?;

    // Best-effort enrichment over the freshly written links.
    match_links_to_brands(&state, &link_records).await;

    Ok(Json(json!({})))
}

/// Extract the network-location component of a URL: host, plus the port
/// when one is spelled out. Scheme and path are ignored.
pub(crate) fn link_netloc(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let host = parsed.host_str()?;
    match parsed.port() {
        Some(port) => Some(format!("{host}:{port}")),
        None => Some(host.to_string()),
    }
}

/// Annotate links whose netloc exactly matches a brand catalog entry.
///
/// Every failure mode here — unparseable URL, no catalog hit, a lookup or
/// write error — is isolated to its item. The caller's save has already
/// committed and must not be disturbed.
pub(crate) async fn match_links_to_brands<'a, A, P, B>(
    state: &AppState<A, P, B>,
    links: &'a [LinkAssignment],
) -> &'a [LinkAssignment]
where
    A: AccountStore,
    P: ProfileStore,
    B: BrandStore,
{
    for link in links {
        let Some(netloc) = link_netloc(&link.url) else {
            tracing::debug!(url = %link.url, "brand match skipped: no host in URL");
            continue;
        };

        match state.brand_store.get_brand_by_domain(&netloc).await {
            Ok(Some(brand)) => {
                if let Err(e) = state
                    .profile_store
                    .set_link_brand(&link.id, &brand.domain)
                    .await
                {
                    tracing::warn!(link = %link.id, "failed to persist brand annotation: {e}");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(netloc = %netloc, "brand lookup failed: {e}");
            }
        }
    }

    links
}
