use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use scholaris_core::{AppError, MessageResponse};
use scholaris_models::attendance::{Attendance, AttendanceFilterParams, MarkAttendanceDto};

use crate::middleware::auth::{AuthUser, RequireStaff};
use crate::modules::attendance::service::AttendanceService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    put,
    path = "/api/attendance",
    request_body = MarkAttendanceDto,
    responses(
        (status = 200, description = "Attendance recorded; existing rows for the date overwritten", body = Vec<Attendance>),
        (status = 403, description = "Only administrators and the class admin may record attendance"),
        (status = 404, description = "Class not found"),
        (status = 422, description = "Empty batch, or a student outside the class")
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    ValidatedJson(dto): ValidatedJson<MarkAttendanceDto>,
) -> Result<Json<MessageResponse<Vec<Attendance>>>, AppError> {
    let rows = AttendanceService::mark_attendance(&state.db, &auth_user.requester, dto).await?;
    Ok(Json(MessageResponse::ok(
        "Attendance recorded successfully",
        rows,
    )))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(
        ("class_id" = Option<i64>, Query, description = "Filter by class"),
        ("student_id" = Option<i64>, Query, description = "Filter by student"),
        ("date" = Option<String>, Query, description = "Filter by date (YYYY-MM-DD)")
    ),
    responses(
        (status = 200, description = "Attendance rows visible to the requester", body = Vec<Attendance>)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<AttendanceFilterParams>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    let rows = AttendanceService::get_attendance(&state.db, &auth_user.requester, filters).await?;
    Ok(Json(rows))
}
