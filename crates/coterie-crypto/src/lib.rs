pub mod jwt;
pub mod password;
pub mod token;

pub use jwt::{
    AccessTokenClaims, RefreshTokenClaims, create_access_token, create_refresh_token,
    validate_access_token, validate_refresh_token,
};
pub use password::{hash_password, verify_password};
pub use token::generate_activation_token;
