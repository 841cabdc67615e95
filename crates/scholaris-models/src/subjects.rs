use scholaris_core::serde::deserialize_optional_id;
use scholaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ClassId, SchoolId, SubjectId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub class_id: Option<ClassId>,
    pub school_id: Option<SchoolId>,
    pub teacher_id: Option<UserId>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Subject {
    pub fn is_template(&self) -> bool {
        self.school_id.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSubjectDto {
    #[validate(length(min = 1, max = 100, message = "Subject name is required"))]
    pub name: String,
    pub class_id: ClassId,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSubjectDto {
    #[validate(length(min = 1, max = 100, message = "Subject name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SubjectFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub class_id: Option<ClassId>,
    pub name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSubjectsResponse {
    pub data: Vec<Subject>,
    pub meta: PaginationMeta,
}

/// Outcome of renaming a template subject.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubjectRename {
    pub template: Subject,
    /// School-instance subjects renamed by name matching.
    pub propagated_subject_ids: Vec<SubjectId>,
}

/// Full replacement of a teacher's subject set. An empty list clears it.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignSubjectsDto {
    pub subject_ids: Vec<SubjectId>,
}

/// A subject together with the name of the class that holds it. Rename
/// propagation matches on both names.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct SubjectPlacement {
    pub id: SubjectId,
    pub name: String,
    pub school_id: Option<SchoolId>,
    pub class_id: Option<ClassId>,
    pub class_name: String,
    pub is_active: bool,
}
