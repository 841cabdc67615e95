//! Access token creation and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use scholaris_config::JwtConfig;
use scholaris_core::AppError;

use crate::claims::{Claims, TokenIdentity};

/// Issues an access token for an authenticated user.
///
/// # Errors
///
/// Returns an internal error if encoding fails.
pub fn create_access_token(
    identity: &TokenIdentity,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = (now + jwt_config.access_token_expiry).max(0) as usize;

    let claims = Claims {
        sub: identity.user_id,
        email: identity.email.clone(),
        role: identity.role,
        school_id: identity.school_id,
        is_class_admin: identity.class_admin_of.is_some(),
        class_admin_of: identity.class_admin_of,
        class_ids: identity.class_ids.clone(),
        exp,
        iat: now as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(AppError::internal)
}

/// Verifies signature and expiry and returns the embedded claims.
///
/// # Errors
///
/// Returns an unauthorized error for a bad signature, an expired token or a
/// malformed token.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))
}
