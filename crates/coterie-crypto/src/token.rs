use rand::RngCore;
use rand::rngs::OsRng;

/// Number of random bytes behind an activation token (32 hex chars).
const TOKEN_BYTES: usize = 16;

/// Generate a single-use activation token from OS entropy.
///
/// Tokens are account lookup keys as well as proof of email control, so
/// they must be unpredictable and collision-free in practice.
pub fn generate_activation_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
