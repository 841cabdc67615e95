use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use scholaris_auth::{Claims, verify_token};
use scholaris_core::AppError;
use scholaris_models::Requester;

use crate::state::AppState;

/// Extractor that validates the JWT and builds the request's [`Requester`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    pub requester: Requester,
}

impl AuthUser {
    pub fn from_claims(claims: Claims) -> Self {
        let requester = claims.requester();
        Self { claims, requester }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser::from_claims(claims))
    }
}

/// Creates an extractor that admits only the listed account roles.
#[macro_export]
macro_rules! require_role {
    ($name:ident, $message:literal, [$($role:path),+ $(,)?]) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::AuthUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = scholaris_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let auth_user =
                    $crate::middleware::auth::AuthUser::from_request_parts(parts, state).await?;

                if !matches!(auth_user.requester.role, $($role)|+) {
                    tracing::warn!(
                        user_id = %auth_user.requester.user_id,
                        role = %auth_user.requester.role,
                        "Role gate rejected request"
                    );
                    return Err(scholaris_core::AppError::permission_denied($message));
                }

                Ok($name(auth_user))
            }
        }
    };
}

require_role!(
    RequireSuperAdmin,
    "Only super admins can perform this action",
    [scholaris_models::Role::SuperAdmin]
);
require_role!(
    RequireAdmin,
    "Only administrators can perform this action",
    [scholaris_models::Role::SuperAdmin, scholaris_models::Role::SchoolAdmin]
);
require_role!(
    RequireStaff,
    "Only staff can perform this action",
    [
        scholaris_models::Role::SuperAdmin,
        scholaris_models::Role::SchoolAdmin,
        scholaris_models::Role::Teacher
    ]
);
