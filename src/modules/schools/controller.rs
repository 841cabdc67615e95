use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use scholaris_core::{AppError, MessageResponse};
use scholaris_models::ids::SchoolId;
use scholaris_models::schools::{
    CreateSchoolDto, PaginatedSchoolsResponse, School, SchoolFilterParams,
};
use scholaris_policy::{EntityKind, WriteAction, can_manage_schools};

use crate::middleware::auth::AuthUser;
use crate::modules::schools::service::SchoolService;
use crate::state::AppState;
use crate::utils::auth_helpers::enforce;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/schools",
    request_body = CreateSchoolDto,
    responses(
        (status = 201, description = "School created", body = School),
        (status = 403, description = "Only super admins can manage schools"),
        (status = 409, description = "School name already exists"),
        (status = 422, description = "Validation error")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn create_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateSchoolDto>,
) -> Result<(StatusCode, Json<School>), AppError> {
    let requester = &auth_user.requester;
    enforce(
        requester,
        EntityKind::School,
        WriteAction::Create,
        can_manage_schools(requester),
    )?;

    let school = SchoolService::create_school(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(school)))
}

#[utoipa::path(
    get,
    path = "/api/schools",
    params(
        ("name" = Option<String>, Query, description = "Filter by name (partial match)"),
        ("limit" = Option<i64>, Query, description = "Page size (1-100)"),
        ("offset" = Option<i64>, Query, description = "Items to skip"),
        ("page" = Option<i64>, Query, description = "Page number, 1-indexed")
    ),
    responses(
        (status = 200, description = "Schools visible to the requester", body = PaginatedSchoolsResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_schools(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<SchoolFilterParams>,
) -> Result<Json<PaginatedSchoolsResponse>, AppError> {
    let schools = SchoolService::get_schools(&state.db, &auth_user.requester, filters).await?;
    Ok(Json(schools))
}

#[utoipa::path(
    get,
    path = "/api/schools/{id}",
    params(("id" = i64, Path, description = "School ID")),
    responses(
        (status = 200, description = "School details", body = School),
        (status = 404, description = "School not found")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<SchoolId>,
) -> Result<Json<School>, AppError> {
    let school = SchoolService::get_school_by_id(&state.db, &auth_user.requester, id).await?;
    Ok(Json(school))
}

#[utoipa::path(
    delete,
    path = "/api/schools/{id}",
    params(("id" = i64, Path, description = "School ID")),
    responses(
        (status = 200, description = "School deleted"),
        (status = 403, description = "Only super admins can manage schools"),
        (status = 404, description = "School not found"),
        (status = 409, description = "School still owns homework or live classes")
    ),
    tag = "Schools",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_school(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<SchoolId>,
) -> Result<Json<MessageResponse<()>>, AppError> {
    let requester = &auth_user.requester;
    enforce(
        requester,
        EntityKind::School,
        WriteAction::Delete,
        can_manage_schools(requester),
    )?;

    SchoolService::delete_school(&state.db, id).await?;
    Ok(Json(MessageResponse::message("School deleted successfully")))
}
