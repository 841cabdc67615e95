use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use scholaris_core::{AppError, MessageResponse};
use scholaris_models::ids::LiveClassId;
use scholaris_models::live_classes::{
    BroadcastLiveClassDto, BroadcastResult, CreateLiveClassDto, LiveClassFilterParams,
    LiveClassView, PaginatedLiveClassesResponse, UpdateLiveClassDto,
};

use crate::middleware::auth::{AuthUser, RequireAdmin, RequireStaff};
use crate::modules::live_classes::service::LiveClassService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/live-classes",
    request_body = CreateLiveClassDto,
    responses(
        (status = 201, description = "Live class scheduled", body = LiveClassView),
        (status = 400, description = "Super admins must specify school_id"),
        (status = 403, description = "Not allowed to schedule for this school"),
        (status = 422, description = "Class or subject outside the school")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn create_live_class(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    ValidatedJson(dto): ValidatedJson<CreateLiveClassDto>,
) -> Result<(StatusCode, Json<LiveClassView>), AppError> {
    let live_class =
        LiveClassService::create_live_class(&state.db, &auth_user.requester, dto).await?;
    Ok((StatusCode::CREATED, Json(live_class)))
}

#[utoipa::path(
    post,
    path = "/api/live-classes/broadcast",
    request_body = BroadcastLiveClassDto,
    responses(
        (status = 200, description = "Created per matched school; unmatched schools listed as skipped", body = BroadcastResult),
        (status = 403, description = "Not allowed to schedule for one of the target schools"),
        (status = 422, description = "Source class or subject outside the source school")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn broadcast_live_class(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<BroadcastLiveClassDto>,
) -> Result<Json<MessageResponse<BroadcastResult>>, AppError> {
    let result = LiveClassService::broadcast(&state.db, &auth_user.requester, dto).await?;

    let message = format!(
        "Live class scheduled in {} school(s), {} skipped",
        result.created.len(),
        result.skipped_school_ids.len()
    );
    Ok(Json(MessageResponse::ok(message, result)))
}

#[utoipa::path(
    get,
    path = "/api/live-classes",
    params(
        ("school_id" = Option<i64>, Query, description = "Filter by school"),
        ("class_id" = Option<i64>, Query, description = "Filter by class"),
        ("limit" = Option<i64>, Query, description = "Page size (1-100)"),
        ("offset" = Option<i64>, Query, description = "Items to skip"),
        ("page" = Option<i64>, Query, description = "Page number, 1-indexed")
    ),
    responses(
        (status = 200, description = "Live classes visible to the requester, with per-row permissions", body = PaginatedLiveClassesResponse)
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_live_classes(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<LiveClassFilterParams>,
) -> Result<Json<PaginatedLiveClassesResponse>, AppError> {
    let live_classes =
        LiveClassService::get_live_classes(&state.db, &auth_user.requester, filters).await?;
    Ok(Json(live_classes))
}

#[utoipa::path(
    get,
    path = "/api/live-classes/{id}",
    params(("id" = i64, Path, description = "Live class ID")),
    responses(
        (status = 200, description = "Live class details", body = LiveClassView),
        (status = 404, description = "Live class not found")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_live_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<LiveClassId>,
) -> Result<Json<LiveClassView>, AppError> {
    let live_class =
        LiveClassService::get_live_class_by_id(&state.db, &auth_user.requester, id).await?;
    Ok(Json(live_class))
}

#[utoipa::path(
    put,
    path = "/api/live-classes/{id}",
    params(("id" = i64, Path, description = "Live class ID")),
    request_body = UpdateLiveClassDto,
    responses(
        (status = 200, description = "Live class updated", body = LiveClassView),
        (status = 403, description = "Not allowed to edit this live class"),
        (status = 404, description = "Live class not found")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn update_live_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<LiveClassId>,
    ValidatedJson(dto): ValidatedJson<UpdateLiveClassDto>,
) -> Result<Json<LiveClassView>, AppError> {
    let live_class =
        LiveClassService::update_live_class(&state.db, &auth_user.requester, id, dto).await?;
    Ok(Json(live_class))
}

#[utoipa::path(
    delete,
    path = "/api/live-classes/{id}",
    params(("id" = i64, Path, description = "Live class ID")),
    responses(
        (status = 200, description = "Live class deleted"),
        (status = 403, description = "Not allowed to delete this live class"),
        (status = 404, description = "Live class not found")
    ),
    tag = "Live Classes",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_live_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<LiveClassId>,
) -> Result<Json<MessageResponse<()>>, AppError> {
    LiveClassService::delete_live_class(&state.db, &auth_user.requester, id).await?;
    Ok(Json(MessageResponse::message("Live class deleted successfully")))
}
