use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use scholaris_core::{AppError, MessageResponse};
use scholaris_models::ids::TimetableEntryId;
use scholaris_models::timetable::{CreateTimetableEntryDto, TimetableEntry, TimetableFilterParams};

use crate::middleware::auth::{AuthUser, RequireAdmin};
use crate::modules::timetable::service::TimetableService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/timetable",
    request_body = CreateTimetableEntryDto,
    responses(
        (status = 201, description = "Timetable entry created", body = TimetableEntry),
        (status = 403, description = "Only administrators of the school may manage the timetable"),
        (status = 409, description = "The class already has an entry at that time"),
        (status = 422, description = "Invalid slot, or class and subject outside the school")
    ),
    tag = "Timetable",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn create_entry(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    ValidatedJson(dto): ValidatedJson<CreateTimetableEntryDto>,
) -> Result<(StatusCode, Json<TimetableEntry>), AppError> {
    let entry = TimetableService::create_entry(&state.db, &auth_user.requester, dto).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get,
    path = "/api/timetable",
    params(
        ("school_id" = Option<i64>, Query, description = "Filter by school"),
        ("class_id" = Option<i64>, Query, description = "Filter by class"),
        ("day_of_week" = Option<i16>, Query, description = "ISO weekday, 1 = Monday")
    ),
    responses(
        (status = 200, description = "Timetable entries visible to the requester", body = Vec<TimetableEntry>)
    ),
    tag = "Timetable",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_entries(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<TimetableFilterParams>,
) -> Result<Json<Vec<TimetableEntry>>, AppError> {
    let entries = TimetableService::get_entries(&state.db, &auth_user.requester, filters).await?;
    Ok(Json(entries))
}

#[utoipa::path(
    delete,
    path = "/api/timetable/{id}",
    params(("id" = i64, Path, description = "Timetable entry ID")),
    responses(
        (status = 200, description = "Timetable entry deleted"),
        (status = 403, description = "Only administrators of the school may manage the timetable"),
        (status = 404, description = "Timetable entry not found")
    ),
    tag = "Timetable",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_entry(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<TimetableEntryId>,
) -> Result<Json<MessageResponse<()>>, AppError> {
    TimetableService::delete_entry(&state.db, &auth_user.requester, id).await?;
    Ok(Json(MessageResponse::message("Timetable entry deleted successfully")))
}
