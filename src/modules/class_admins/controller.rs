use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;

use scholaris_core::{AppError, MessageResponse};
use scholaris_models::class_admins::{
    AssignClassAdminDto, AssignableClassesQuery, ClassAdminAssignment, ClassAdminView,
};
use scholaris_models::classes::Class;

use crate::middleware::auth::{RequireAdmin, RequireStaff};
use crate::modules::class_admins::service::ClassAdminService;
use crate::state::AppState;

#[utoipa::path(
    put,
    path = "/api/class-admins",
    request_body = AssignClassAdminDto,
    responses(
        (status = 200, description = "Assignment replaced; data is null when only unassigned", body = ClassAdminAssignment),
        (status = 403, description = "Not an administrator of the teacher's school"),
        (status = 409, description = "The class already has a class admin"),
        (status = 422, description = "Not an active teacher, or class outside the teacher's school")
    ),
    tag = "Class Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn assign_class_admin(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Json(dto): Json<AssignClassAdminDto>,
) -> Result<Json<MessageResponse<Option<ClassAdminAssignment>>>, AppError> {
    let assignment = ClassAdminService::assign_class_admin(
        &state.db,
        &auth_user.requester,
        dto.teacher_id,
        dto.class_id,
    )
    .await?;

    let message = if assignment.is_some() {
        "Class admin assigned successfully"
    } else {
        "Class admin unassigned successfully"
    };
    Ok(Json(MessageResponse::ok(message, assignment)))
}

#[utoipa::path(
    get,
    path = "/api/class-admins",
    responses(
        (status = 200, description = "Class admin assignments visible to the requester", body = Vec<ClassAdminView>)
    ),
    tag = "Class Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_class_admins(
    State(state): State<AppState>,
    RequireStaff(auth_user): RequireStaff,
) -> Result<Json<Vec<ClassAdminView>>, AppError> {
    let views = ClassAdminService::get_class_admins(&state.db, &auth_user.requester).await?;
    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/api/class-admins/assignable-classes",
    params(AssignableClassesQuery),
    responses(
        (status = 200, description = "Classes the teacher may be assigned to", body = Vec<Class>),
        (status = 404, description = "Teacher not found")
    ),
    tag = "Class Admins",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_assignable_classes(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Query(query): Query<AssignableClassesQuery>,
) -> Result<Json<Vec<Class>>, AppError> {
    let classes =
        ClassAdminService::assignable_classes(&state.db, &auth_user.requester, query.teacher_id)
            .await?;
    Ok(Json(classes))
}
