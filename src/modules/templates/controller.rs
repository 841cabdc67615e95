use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use scholaris_core::{AppError, MessageResponse};
use scholaris_models::catalog::{CatalogKind, CatalogRows};
use scholaris_models::classes::{AssignTemplateDto, TemplateAssignment};
use scholaris_models::ids::{ClassId, SchoolId, SubjectId};
use scholaris_models::subjects::{SubjectRename, UpdateSubjectDto};

use crate::middleware::auth::{AuthUser, RequireAdmin, RequireSuperAdmin};
use crate::modules::templates::service::TemplateService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/templates/{kind}",
    params(("kind" = CatalogKind, Path, description = "classes or subjects")),
    responses(
        (status = 200, description = "Active template rows", body = CatalogRows),
        (status = 403, description = "Administrators only")
    ),
    tag = "Templates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_templates(
    State(state): State<AppState>,
    RequireAdmin(_auth_user): RequireAdmin,
    Path(kind): Path<CatalogKind>,
) -> Result<Json<CatalogRows>, AppError> {
    let rows = TemplateService::list_templates(&state.db, kind).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/templates/schools/{school_id}/{kind}",
    params(
        ("school_id" = i64, Path, description = "School ID"),
        ("kind" = CatalogKind, Path, description = "classes or subjects")
    ),
    responses(
        (status = 200, description = "Active rows owned by the school", body = CatalogRows)
    ),
    tag = "Templates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn list_school_instances(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((school_id, kind)): Path<(SchoolId, CatalogKind)>,
) -> Result<Json<CatalogRows>, AppError> {
    let rows =
        TemplateService::list_school_instances(&state.db, &auth_user.requester, kind, school_id)
            .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/api/templates/classes/{id}/assign",
    params(("id" = i64, Path, description = "Template class ID")),
    request_body = AssignTemplateDto,
    responses(
        (status = 200, description = "Template copied into the school", body = TemplateAssignment),
        (status = 403, description = "Not an administrator of this school"),
        (status = 404, description = "Template class or school not found"),
        (status = 500, description = "Assignment rolled back")
    ),
    tag = "Templates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn assign_template_to_school(
    State(state): State<AppState>,
    RequireAdmin(auth_user): RequireAdmin,
    Path(id): Path<ClassId>,
    Json(dto): Json<AssignTemplateDto>,
) -> Result<Json<MessageResponse<TemplateAssignment>>, AppError> {
    let assignment = TemplateService::assign_template_to_school(
        &state.db,
        &auth_user.requester,
        id,
        dto.school_id,
    )
    .await?;

    let message = if assignment.class_created || !assignment.subjects_created.is_empty() {
        "Template assigned to school"
    } else {
        "School already has this class and all of its subjects"
    };

    Ok(Json(MessageResponse::ok(message, assignment)))
}

#[utoipa::path(
    put,
    path = "/api/templates/subjects/{id}",
    params(("id" = i64, Path, description = "Template subject ID")),
    request_body = UpdateSubjectDto,
    responses(
        (status = 200, description = "Template renamed; matching school subjects renamed too", body = SubjectRename),
        (status = 403, description = "Super admins only"),
        (status = 404, description = "Template subject not found")
    ),
    tag = "Templates",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn rename_template_subject(
    State(state): State<AppState>,
    RequireSuperAdmin(auth_user): RequireSuperAdmin,
    Path(id): Path<SubjectId>,
    ValidatedJson(dto): ValidatedJson<UpdateSubjectDto>,
) -> Result<Json<MessageResponse<SubjectRename>>, AppError> {
    let rename =
        TemplateService::rename_template_subject(&state.db, &auth_user.requester, id, dto).await?;

    let message = format!(
        "Template subject renamed; {} school subject(s) updated",
        rename.propagated_subject_ids.len()
    );
    Ok(Json(MessageResponse::ok(message, rename)))
}
