use chrono::{DateTime, NaiveTime, Utc};
use scholaris_core::serde::deserialize_optional_id;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{ClassId, SchoolId, SubjectId, TimetableEntryId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimetableEntry {
    pub id: TimetableEntryId,
    pub school_id: SchoolId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    /// ISO weekday, 1 = Monday.
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTimetableEntryDto {
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    #[validate(range(min = 1, max = 7, message = "Day of week must be between 1 and 7"))]
    pub day_of_week: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub school_id: Option<SchoolId>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct TimetableFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub school_id: Option<SchoolId>,
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub class_id: Option<ClassId>,
    pub day_of_week: Option<i16>,
}
