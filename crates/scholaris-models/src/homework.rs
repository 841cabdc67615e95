//! Homework records. `owner_role` is fixed at creation and never updated.

use chrono::{DateTime, NaiveDate, Utc};
use scholaris_core::serde::deserialize_optional_id;
use scholaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ClassId, HomeworkId, SchoolId, SubjectId, UserId};
use crate::permissions::RecordPermissions;
use crate::roles::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Homework {
    pub id: HomeworkId,
    pub title: String,
    pub description: Option<String>,
    /// Path returned by the external file store.
    pub attachment_path: Option<String>,
    pub school_id: SchoolId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub due_date: Option<NaiveDate>,
    pub owner_role: Role,
    pub created_by: UserId,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateHomeworkDto {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub attachment_path: Option<String>,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub due_date: Option<NaiveDate>,
    /// Only read for super admins; everyone else writes into their own school.
    pub school_id: Option<SchoolId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateHomeworkDto {
    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub attachment_path: Option<String>,
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct HomeworkFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub school_id: Option<SchoolId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub class_id: Option<ClassId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub subject_id: Option<SubjectId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HomeworkView {
    #[serde(flatten)]
    pub homework: Homework,
    pub permissions: RecordPermissions,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedHomeworkResponse {
    pub data: Vec<HomeworkView>,
    pub meta: PaginationMeta,
}
