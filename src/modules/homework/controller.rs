use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use scholaris_core::{AppError, MessageResponse};
use scholaris_models::homework::{
    CreateHomeworkDto, HomeworkFilterParams, HomeworkView, PaginatedHomeworkResponse,
    UpdateHomeworkDto,
};
use scholaris_models::ids::HomeworkId;

use crate::middleware::auth::{AuthUser, RequireStaff};
use crate::modules::homework::service::HomeworkService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/homework",
    request_body = CreateHomeworkDto,
    responses(
        (status = 201, description = "Homework created", body = HomeworkView),
        (status = 400, description = "Super admins must specify school_id"),
        (status = 403, description = "Not allowed to create homework for this school"),
        (status = 422, description = "Class or subject outside the school")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn create_homework(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    ValidatedJson(dto): ValidatedJson<CreateHomeworkDto>,
) -> Result<(StatusCode, Json<HomeworkView>), AppError> {
    let homework = HomeworkService::create_homework(&state.db, &auth_user.requester, dto).await?;
    Ok((StatusCode::CREATED, Json(homework)))
}

#[utoipa::path(
    get,
    path = "/api/homework",
    params(
        ("school_id" = Option<i64>, Query, description = "Filter by school"),
        ("class_id" = Option<i64>, Query, description = "Filter by class"),
        ("subject_id" = Option<i64>, Query, description = "Filter by subject"),
        ("limit" = Option<i64>, Query, description = "Page size (1-100)"),
        ("offset" = Option<i64>, Query, description = "Items to skip"),
        ("page" = Option<i64>, Query, description = "Page number, 1-indexed")
    ),
    responses(
        (status = 200, description = "Homework visible to the requester, with per-row permissions", body = PaginatedHomeworkResponse)
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_homework(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<HomeworkFilterParams>,
) -> Result<Json<PaginatedHomeworkResponse>, AppError> {
    let homework = HomeworkService::get_homework(&state.db, &auth_user.requester, filters).await?;
    Ok(Json(homework))
}

#[utoipa::path(
    get,
    path = "/api/homework/{id}",
    params(("id" = i64, Path, description = "Homework ID")),
    responses(
        (status = 200, description = "Homework details", body = HomeworkView),
        (status = 404, description = "Homework not found")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_homework_by_id(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<HomeworkId>,
) -> Result<Json<HomeworkView>, AppError> {
    let homework = HomeworkService::get_homework_by_id(&state.db, &auth_user.requester, id).await?;
    Ok(Json(homework))
}

#[utoipa::path(
    put,
    path = "/api/homework/{id}",
    params(("id" = i64, Path, description = "Homework ID")),
    request_body = UpdateHomeworkDto,
    responses(
        (status = 200, description = "Homework updated", body = HomeworkView),
        (status = 403, description = "Not allowed to edit this homework"),
        (status = 404, description = "Homework not found")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn update_homework(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<HomeworkId>,
    ValidatedJson(dto): ValidatedJson<UpdateHomeworkDto>,
) -> Result<Json<HomeworkView>, AppError> {
    let homework =
        HomeworkService::update_homework(&state.db, &auth_user.requester, id, dto).await?;
    Ok(Json(homework))
}

#[utoipa::path(
    delete,
    path = "/api/homework/{id}",
    params(("id" = i64, Path, description = "Homework ID")),
    responses(
        (status = 200, description = "Homework deleted"),
        (status = 403, description = "Not allowed to delete this homework"),
        (status = 404, description = "Homework not found")
    ),
    tag = "Homework",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_homework(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<HomeworkId>,
) -> Result<Json<MessageResponse<()>>, AppError> {
    HomeworkService::delete_homework(&state.db, &auth_user.requester, id).await?;
    Ok(Json(MessageResponse::message("Homework deleted successfully")))
}
