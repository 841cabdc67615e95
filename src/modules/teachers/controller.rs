use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use scholaris_core::{AppError, MessageResponse};
use scholaris_models::ids::UserId;
use scholaris_models::subjects::{AssignSubjectsDto, Subject};

use crate::middleware::auth::{RequireAdmin, RequireStaff};
use crate::modules::teachers::service::TeacherSubjectService;
use crate::state::AppState;

#[utoipa::path(
    put,
    path = "/api/teachers/{id}/subjects",
    params(("id" = i64, Path, description = "Teacher user ID")),
    request_body = AssignSubjectsDto,
    responses(
        (status = 200, description = "Subject set replaced", body = Vec<Subject>),
        (status = 403, description = "Not an administrator of the teacher's school"),
        (status = 422, description = "A subject is not an active subject of the teacher's school")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn assign_subjects(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<UserId>,
    Json(dto): Json<AssignSubjectsDto>,
) -> Result<Json<MessageResponse<Vec<Subject>>>, AppError> {
    let subjects = TeacherSubjectService::assign_subjects_to_teacher(
        &state.db,
        &auth_user.requester,
        id,
        dto.subject_ids,
    )
    .await?;

    Ok(Json(MessageResponse::ok(
        "Teacher subjects updated successfully",
        subjects,
    )))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}/subjects",
    params(("id" = i64, Path, description = "Teacher user ID")),
    responses(
        (status = 200, description = "Subjects taught by the teacher", body = Vec<Subject>),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_subjects(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<Subject>>, AppError> {
    let subjects =
        TeacherSubjectService::get_teacher_subjects(&state.db, &auth_user.requester, id).await?;
    Ok(Json(subjects))
}
