use std::collections::BTreeMap;

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use scholaris_core::AppError;
use scholaris_models::Requester;
use scholaris_models::Role;
use scholaris_models::attendance::{
    Attendance, AttendanceFilterParams, AttendanceStatus, MarkAttendanceDto,
};
use scholaris_models::classes::Class;
use scholaris_models::ids::UserId;
use scholaris_policy::{EntityKind, ScopeColumns, WriteAction, can_record_attendance, read_scope};

use crate::metrics::track_attendance_upserted;
use crate::modules::classes::service::ClassService;
use crate::utils::auth_helpers::enforce;
use crate::utils::scope::bind_scope;

const COLUMNS: ScopeColumns = ScopeColumns::school("school_id")
    .with_class("class_id")
    .with_student("student_id");

const ATTENDANCE_COLUMNS: &str =
    "id, student_id, class_id, school_id, date, status, recorded_by, created_at, updated_at";

pub struct AttendanceService;

impl AttendanceService {
    /// Records one status per student for a class and date. Re-marking the
    /// same student and date overwrites the earlier status. The whole batch
    /// is written in one transaction.
    #[instrument(skip(db, requester, dto), fields(class.id = %dto.class_id, date = %dto.date, db.operation = "UPSERT", db.table = "attendance"))]
    pub async fn mark_attendance(
        db: &PgPool,
        requester: &Requester,
        dto: MarkAttendanceDto,
    ) -> Result<Vec<Attendance>, AppError> {
        let class = ClassService::find_class(db, dto.class_id)
            .await?
            .filter(|c| c.is_active && !c.is_template())
            .ok_or_else(|| AppError::not_found("Class not found"))?;
        let Some(school_id) = class.school_id else {
            return Err(AppError::not_found("Class not found"));
        };

        enforce(
            requester,
            EntityKind::Attendance,
            WriteAction::Create,
            can_record_attendance(requester, school_id, class.id),
        )?;

        // Last entry wins when a student appears twice in one batch.
        let statuses: BTreeMap<UserId, AttendanceStatus> = dto
            .records
            .iter()
            .map(|entry| (entry.student_id, entry.status))
            .collect();

        let student_ids: Vec<UserId> = statuses.keys().copied().collect();
        let enrolled = sqlx::query_scalar::<_, UserId>(
            "SELECT id FROM users
             WHERE id = ANY($1) AND role_id = $2 AND class_id = $3 AND is_active",
        )
        .bind(&student_ids)
        .bind(Role::Student)
        .bind(class.id)
        .fetch_all(db)
        .await?;

        if let Some(missing) = student_ids.iter().find(|id| !enrolled.contains(id)) {
            return Err(AppError::validation(format!(
                "Student {missing} is not an active student of this class"
            )));
        }

        let mut tx = db.begin().await?;

        let rows = Self::upsert(&mut tx, requester, &class, dto.date, &statuses)
            .await
            .map_err(AppError::in_transaction)?;

        tx.commit().await.map_err(AppError::transaction_failure)?;

        track_attendance_upserted(rows.len());
        info!(rows = rows.len(), "Attendance recorded");

        Ok(rows)
    }

    async fn upsert(
        tx: &mut Transaction<'_, Postgres>,
        requester: &Requester,
        class: &Class,
        date: NaiveDate,
        statuses: &BTreeMap<UserId, AttendanceStatus>,
    ) -> Result<Vec<Attendance>, AppError> {
        let mut rows = Vec::with_capacity(statuses.len());

        for (&student_id, &status) in statuses {
            let row = sqlx::query_as::<_, Attendance>(&format!(
                "INSERT INTO attendance (student_id, class_id, school_id, date, status, recorded_by)
                 VALUES ($1, $2, $3, $4, $5, $6)
                 ON CONFLICT (student_id, date) DO UPDATE SET
                    status = EXCLUDED.status,
                    class_id = EXCLUDED.class_id,
                    school_id = EXCLUDED.school_id,
                    recorded_by = EXCLUDED.recorded_by,
                    updated_at = NOW()
                 RETURNING {ATTENDANCE_COLUMNS}"
            ))
            .bind(student_id)
            .bind(class.id)
            .bind(class.school_id)
            .bind(date)
            .bind(status)
            .bind(requester.user_id)
            .fetch_one(&mut **tx)
            .await?;
            rows.push(row);
        }

        Ok(rows)
    }

    /// Students see their own rows and parents their children's; staff see
    /// their school's.
    #[instrument(skip(db, requester, filters), fields(db.operation = "SELECT", db.table = "attendance"))]
    pub async fn get_attendance(
        db: &PgPool,
        requester: &Requester,
        filters: AttendanceFilterParams,
    ) -> Result<Vec<Attendance>, AppError> {
        let predicate = read_scope(requester, EntityKind::Attendance).sql_predicate(&COLUMNS, 1);
        let mut where_clause = format!("WHERE {}", predicate.sql);
        let mut next = predicate.next_param(1);

        if filters.class_id.is_some() {
            where_clause.push_str(&format!(" AND class_id = ${next}"));
            next += 1;
        }
        if filters.student_id.is_some() {
            where_clause.push_str(&format!(" AND student_id = ${next}"));
            next += 1;
        }
        if filters.date.is_some() {
            where_clause.push_str(&format!(" AND date = ${next}"));
        }

        let sql = format!(
            "SELECT {ATTENDANCE_COLUMNS} FROM attendance {where_clause}
             ORDER BY date DESC, student_id"
        );
        let mut query = bind_scope!(sqlx::query_as::<_, Attendance>(&sql), predicate);
        if let Some(class_id) = filters.class_id {
            query = query.bind(class_id);
        }
        if let Some(student_id) = filters.student_id {
            query = query.bind(student_id);
        }
        if let Some(date) = filters.date {
            query = query.bind(date);
        }

        Ok(query.fetch_all(db).await?)
    }
}
