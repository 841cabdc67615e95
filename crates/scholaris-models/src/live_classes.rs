use chrono::{DateTime, Utc};
use scholaris_core::serde::deserialize_optional_id;
use scholaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ClassId, LiveClassId, SchoolId, SubjectId, UserId};
use crate::permissions::RecordPermissions;
use crate::roles::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LiveClass {
    pub id: LiveClassId,
    pub title: String,
    pub description: Option<String>,
    pub meeting_url: String,
    pub school_id: SchoolId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub starts_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub owner_role: Role,
    pub created_by: UserId,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLiveClassDto {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url(message = "Meeting URL must be a valid URL"))]
    pub meeting_url: String,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub starts_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration_minutes: i32,
    pub school_id: Option<SchoolId>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateLiveClassDto {
    #[validate(length(min = 1, max = 255, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "Meeting URL must be a valid URL"))]
    pub meeting_url: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration_minutes: Option<i32>,
}

/// One live class scheduled in several schools at once. The class and
/// subject are picked in the source school and matched by name elsewhere.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BroadcastLiveClassDto {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(url(message = "Meeting URL must be a valid URL"))]
    pub meeting_url: String,
    pub starts_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration_minutes: i32,
    pub source_school_id: SchoolId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    #[validate(length(min = 1, message = "Select at least one target school"))]
    pub target_school_ids: Vec<SchoolId>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BroadcastResult {
    pub created: Vec<LiveClass>,
    /// Target schools without a same-named class and subject.
    pub skipped_school_ids: Vec<SchoolId>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LiveClassFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub school_id: Option<SchoolId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub class_id: Option<ClassId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LiveClassView {
    #[serde(flatten)]
    pub live_class: LiveClass,
    pub permissions: RecordPermissions,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedLiveClassesResponse {
    pub data: Vec<LiveClassView>,
    pub meta: PaginationMeta,
}
