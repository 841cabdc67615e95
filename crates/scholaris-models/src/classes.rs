//! Classes: global templates (`school_id = NULL`) and school instances.

use scholaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::SchoolId;
use crate::subjects::Subject;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    pub id: crate::ids::ClassId,
    pub name: String,
    pub school_id: Option<SchoolId>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Class {
    pub fn is_template(&self) -> bool {
        self.school_id.is_none()
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 100, message = "Class name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 100, message = "Class name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ClassFilterParams {
    pub name: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<Class>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignTemplateDto {
    pub school_id: SchoolId,
}

/// Outcome of copying a template class (and its subjects) into a school.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TemplateAssignment {
    pub class: Class,
    /// False when a same-named active class already existed and was reused.
    pub class_created: bool,
    pub subjects_created: Vec<Subject>,
    pub subjects_skipped: usize,
}
