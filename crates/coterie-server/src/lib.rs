pub mod auth;
pub mod email;
pub mod error;
pub mod forms;
pub mod routes;
pub mod state;

pub use auth::{AuthenticatedUser, JwtRefreshSecret, JwtSecret};
pub use email::{EmailSender, Notifier};
pub use routes::build_router;
pub use state::AppState;
