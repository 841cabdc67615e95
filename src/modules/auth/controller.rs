use axum::{Json, extract::State};
use tracing::instrument;

use scholaris_core::AppError;
use scholaris_models::auth::{LoginRequest, LoginResponse, SessionResponse};
use scholaris_policy::{navigation_for, profile};

use crate::middleware::auth::AuthUser;
use crate::modules::auth::service::AuthService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation error")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = AuthService::login_user(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current requester and navigation", body = SessionResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn get_session(auth_user: AuthUser) -> Json<SessionResponse> {
    let requester = auth_user.requester;
    let effective_role = requester.effective_role();

    Json(SessionResponse {
        navigation: navigation_for(&requester),
        tier: profile(effective_role).tier.as_str(),
        effective_role,
        requester,
    })
}
