use coterie_core::{CoterieError, CoterieResult};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Claims for an access token (short-lived).
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims for a refresh token (long-lived). `jti` keys the session row so
/// logout and account closure can revoke it.
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Create an access token with a 1-hour expiry.
///
/// Uses HS256 symmetric signing with the provided secret.
pub fn create_access_token(account_id: &str, secret: &str) -> CoterieResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: account_id.to_string(),
        iat: now,
        exp: now + 60 * 60, // 1 hour
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| CoterieError::Auth(e.to_string()))
}

/// Create a refresh token with a 90-day expiry.
pub fn create_refresh_token(account_id: &str, jti: &str, secret: &str) -> CoterieResult<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = RefreshTokenClaims {
        sub: account_id.to_string(),
        jti: jti.to_string(),
        iat: now,
        exp: now + 90 * 24 * 60 * 60, // 90 days
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| CoterieError::Auth(e.to_string()))
}

/// Validate an access token and return its claims.
pub fn validate_access_token(token: &str, secret: &str) -> CoterieResult<AccessTokenClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();
    let token_data = decode::<AccessTokenClaims>(token, &key, &validation)
        .map_err(|e| CoterieError::Auth(e.to_string()))?;
    Ok(token_data.claims)
}

/// Validate a refresh token and return its claims.
pub fn validate_refresh_token(token: &str, secret: &str) -> CoterieResult<RefreshTokenClaims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();
    let token_data = decode::<RefreshTokenClaims>(token, &key, &validation)
        .map_err(|e| CoterieError::Auth(e.to_string()))?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-jwt-tests";
    const OTHER_SECRET: &str = "different-secret-key-for-jwt";
    const ACCOUNT_ID: &str = "9f2c1a7e-account-id";

    #[test]
    fn access_token_roundtrip() {
        let token = create_access_token(ACCOUNT_ID, SECRET).unwrap();
        let claims = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, ACCOUNT_ID);
    }

    #[test]
    fn access_token_wrong_secret_fails() {
        let token = create_access_token(ACCOUNT_ID, SECRET).unwrap();
        assert!(validate_access_token(&token, OTHER_SECRET).is_err());
    }

    #[test]
    fn refresh_token_roundtrip() {
        let token = create_refresh_token(ACCOUNT_ID, "jti-123", SECRET).unwrap();
        let claims = validate_refresh_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, ACCOUNT_ID);
        assert_eq!(claims.jti, "jti-123");
    }

    #[test]
    fn access_token_has_1hr_expiry() {
        let token = create_access_token(ACCOUNT_ID, SECRET).unwrap();
        let claims = validate_access_token(&token, SECRET).unwrap();
        assert_eq!(claims.exp - claims.iat, 60 * 60);
    }

    #[test]
    fn expired_token_validation_fails() {
        // Manually construct a token with exp in the past
        let now = chrono::Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: ACCOUNT_ID.to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let key = EncodingKey::from_secret(SECRET.as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(validate_access_token(&token, SECRET).is_err());
    }
}
