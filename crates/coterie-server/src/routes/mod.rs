pub mod account;
pub mod health;
pub mod moderation;
pub mod profile;
pub mod session;
pub mod settings;

use axum::Extension;

use crate::auth::{JwtRefreshSecret, JwtSecret};
use crate::state::AppState;
use coterie_core::traits::*;

pub fn build_router<A, P, B>(state: AppState<A, P, B>) -> axum::Router
where
    A: AccountStore + Clone,
    P: ProfileStore + Clone,
    B: BrandStore + Clone,
{
    let jwt_secret = JwtSecret(state.config.jwt.access_secret.clone());
    let jwt_refresh_secret = JwtRefreshSecret(state.config.jwt.refresh_secret.clone());

    axum::Router::new()
        // Health
        .route("/health", axum::routing::get(health::health_check))
        // Public account lifecycle
        .route(
            "/api/account/request-invitation",
            axum::routing::post(account::request_invitation::<A, P, B>),
        )
        .route(
            "/api/account/activate/{token}",
            axum::routing::get(account::activation_preview::<A, P, B>)
                .post(account::activate_account::<A, P, B>),
        )
        // Sessions
        .route(
            "/api/session",
            axum::routing::post(session::create_session::<A, P, B>)
                .get(session::get_session::<A, P, B>),
        )
        .route(
            "/api/session/refresh",
            axum::routing::post(session::refresh_session::<A, P, B>),
        )
        .route(
            "/api/session/logout",
            axum::routing::post(session::delete_session::<A, P, B>),
        )
        // Profile settings
        .route(
            "/api/profile",
            axum::routing::get(profile::get_profile::<A, P, B>)
                .put(profile::save_profile::<A, P, B>),
        )
        // Account settings
        .route(
            "/api/account/settings",
            axum::routing::get(settings::get_settings::<A, P, B>)
                .post(settings::update_settings::<A, P, B>),
        )
        .route(
            "/api/account/close",
            axum::routing::post(settings::close_account::<A, P, B>),
        )
        // Moderation surface
        .route(
            "/api/moderation/moderators",
            axum::routing::get(moderation::list_moderators::<A, P, B>),
        )
        .route(
            "/api/moderation/invite-member",
            axum::routing::post(moderation::invite_member::<A, P, B>),
        )
        .route(
            "/api/moderation/review-applications",
            axum::routing::get(moderation::review_applications::<A, P, B>),
        )
        .route(
            "/api/moderation/review-applications/{id}",
            axum::routing::post(moderation::decide_application::<A, P, B>),
        )
        .route(
            "/api/moderation/report-abuse",
            axum::routing::post(moderation::report_abuse::<A, P, B>),
        )
        .route(
            "/api/moderation/review-abuse",
            axum::routing::get(moderation::review_abuse::<A, P, B>),
        )
        .route(
            "/api/moderation/review-abuse/{id}",
            axum::routing::post(moderation::decide_abuse_report::<A, P, B>),
        )
        .route(
            "/api/moderation/logs",
            axum::routing::get(moderation::moderation_logs::<A, P, B>),
        )
        .layer(Extension(jwt_secret))
        .layer(Extension(jwt_refresh_secret))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Request body size limit: 1 MiB is plenty for form submissions.
        .layer(tower_http::limit::RequestBodyLimitLayer::new(1024 * 1024))
        .with_state(state)
}
