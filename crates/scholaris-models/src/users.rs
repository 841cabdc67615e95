//! User accounts and parent/student links.

use scholaris_core::serde::deserialize_optional_id;
use scholaris_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ClassId, SchoolId, UserId};
use crate::roles::Role;

/// A user account. The password hash is never selected into this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[sqlx(rename = "role_id")]
    pub role: Role,
    pub school_id: Option<SchoolId>,
    /// Enrolled class, students only.
    pub class_id: Option<ClassId>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
    /// Required when a super admin creates the account; school admins always
    /// create accounts in their own school.
    pub school_id: Option<SchoolId>,
    /// Enrolled class for students.
    pub class_id: Option<ClassId>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UserFilterParams {
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub school_id: Option<SchoolId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub class_id: Option<ClassId>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<User>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LinkStudentDto {
    pub student_id: UserId,
}

/// Row used by login: the only place the password hash is read.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: UserId,
    pub email: String,
    pub password: String,
    #[sqlx(rename = "role_id")]
    pub role: Role,
    pub school_id: Option<SchoolId>,
    pub class_id: Option<ClassId>,
    pub is_active: bool,
}
