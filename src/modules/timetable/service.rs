use sqlx::PgPool;
use tracing::{info, instrument, warn};

use scholaris_core::AppError;
use scholaris_db::is_unique_violation;
use scholaris_models::Requester;
use scholaris_models::ids::TimetableEntryId;
use scholaris_models::timetable::{CreateTimetableEntryDto, TimetableEntry, TimetableFilterParams};
use scholaris_policy::guard::{check_class_subject_scope, check_timetable_slot};
use scholaris_policy::{EntityKind, ScopeColumns, WriteAction, can_manage_timetable, read_scope};

use crate::modules::subjects::service::SubjectService;
use crate::utils::auth_helpers::{enforce, target_school};
use crate::utils::scope::bind_scope;

const COLUMNS: ScopeColumns = ScopeColumns::school("school_id").with_class("class_id");

const ENTRY_COLUMNS: &str =
    "id, school_id, class_id, subject_id, day_of_week, start_time, end_time, created_at";

pub struct TimetableService;

impl TimetableService {
    #[instrument(skip(db, requester, dto), fields(db.operation = "INSERT", db.table = "timetable_entries"))]
    pub async fn create_entry(
        db: &PgPool,
        requester: &Requester,
        dto: CreateTimetableEntryDto,
    ) -> Result<TimetableEntry, AppError> {
        let school_id = target_school(requester, dto.school_id)?;
        enforce(
            requester,
            EntityKind::Timetable,
            WriteAction::Create,
            can_manage_timetable(requester, school_id),
        )?;
        check_timetable_slot(dto.start_time, dto.end_time)?;

        let (class, subject) =
            SubjectService::find_with_class(db, dto.class_id, dto.subject_id).await?;
        check_class_subject_scope(school_id, &class, &subject)?;

        let entry = sqlx::query_as::<_, TimetableEntry>(&format!(
            "INSERT INTO timetable_entries
                (school_id, class_id, subject_id, day_of_week, start_time, end_time)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(school_id)
        .bind(class.id)
        .bind(subject.id)
        .bind(dto.day_of_week)
        .bind(dto.start_time)
        .bind(dto.end_time)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(class.id = %class.id, day = dto.day_of_week, "Timetable slot already taken");
                return AppError::conflict("This class already has an entry starting at that time");
            }
            AppError::from(e)
        })?;

        info!(entry.id = %entry.id, "Timetable entry created");
        Ok(entry)
    }

    #[instrument(skip(db, requester, filters), fields(db.operation = "SELECT", db.table = "timetable_entries"))]
    pub async fn get_entries(
        db: &PgPool,
        requester: &Requester,
        filters: TimetableFilterParams,
    ) -> Result<Vec<TimetableEntry>, AppError> {
        let predicate = read_scope(requester, EntityKind::Timetable).sql_predicate(&COLUMNS, 1);
        let mut where_clause = format!("WHERE {}", predicate.sql);
        let mut next = predicate.next_param(1);

        if filters.school_id.is_some() {
            where_clause.push_str(&format!(" AND school_id = ${next}"));
            next += 1;
        }
        if filters.class_id.is_some() {
            where_clause.push_str(&format!(" AND class_id = ${next}"));
            next += 1;
        }
        if filters.day_of_week.is_some() {
            where_clause.push_str(&format!(" AND day_of_week = ${next}"));
        }

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM timetable_entries {where_clause}
             ORDER BY day_of_week, start_time, class_id"
        );
        let mut query = bind_scope!(sqlx::query_as::<_, TimetableEntry>(&sql), predicate);
        if let Some(school_id) = filters.school_id {
            query = query.bind(school_id);
        }
        if let Some(class_id) = filters.class_id {
            query = query.bind(class_id);
        }
        if let Some(day) = filters.day_of_week {
            query = query.bind(day);
        }

        Ok(query.fetch_all(db).await?)
    }

    #[instrument(skip(db, requester), fields(db.operation = "DELETE", db.table = "timetable_entries"))]
    pub async fn delete_entry(
        db: &PgPool,
        requester: &Requester,
        entry_id: TimetableEntryId,
    ) -> Result<(), AppError> {
        let scope = read_scope(requester, EntityKind::Timetable);
        let entry = sqlx::query_as::<_, TimetableEntry>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM timetable_entries WHERE id = $1"
        ))
        .bind(entry_id)
        .fetch_optional(db)
        .await?
        .filter(|e| scope.admits(Some(e.school_id), Some(e.class_id), None))
        .ok_or_else(|| AppError::not_found("Timetable entry not found"))?;

        enforce(
            requester,
            EntityKind::Timetable,
            WriteAction::Delete,
            can_manage_timetable(requester, entry.school_id),
        )?;

        sqlx::query("DELETE FROM timetable_entries WHERE id = $1")
            .bind(entry_id)
            .execute(db)
            .await?;

        info!(entry.id = %entry_id, "Timetable entry deleted");
        Ok(())
    }
}
