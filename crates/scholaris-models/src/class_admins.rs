use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::ids::{ClassAdminAssignmentId, ClassId, UserId};

/// A row of `class_admin_profiles`: unique on both `user_id` and `class_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ClassAdminAssignment {
    pub id: ClassAdminAssignmentId,
    #[sqlx(rename = "user_id")]
    pub teacher_id: UserId,
    pub class_id: ClassId,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AssignClassAdminDto {
    pub teacher_id: UserId,
    /// `None` only unassigns the teacher.
    pub class_id: Option<ClassId>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ClassAdminView {
    pub id: ClassAdminAssignmentId,
    pub teacher_id: UserId,
    pub teacher_name: String,
    pub class_id: ClassId,
    pub class_name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct AssignableClassesQuery {
    pub teacher_id: UserId,
}
