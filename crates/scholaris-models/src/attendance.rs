use chrono::{DateTime, NaiveDate, Utc};
use scholaris_core::serde::deserialize_optional_id;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AttendanceId, ClassId, SchoolId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

/// One row per (student, date); re-marking overwrites the status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Attendance {
    pub id: AttendanceId,
    pub student_id: UserId,
    pub class_id: ClassId,
    pub school_id: SchoolId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub recorded_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    pub student_id: UserId,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MarkAttendanceDto {
    pub class_id: ClassId,
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "At least one attendance record is required"))]
    pub records: Vec<AttendanceEntry>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct AttendanceFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub class_id: Option<ClassId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub student_id: Option<UserId>,
    pub date: Option<NaiveDate>,
}
