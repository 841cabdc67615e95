use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument};

use scholaris_core::AppError;
use scholaris_models::Requester;
use scholaris_models::ids::{SchoolId, SubjectId, UserId};
use scholaris_models::subjects::Subject;
use scholaris_policy::guard::check_subject_set;
use scholaris_policy::{EntityKind, WriteAction, can_manage_assignments};

use crate::modules::class_admins::service::active_teacher;
use crate::modules::subjects::service::SUBJECT_COLUMNS;
use crate::utils::auth_helpers::enforce;

pub struct TeacherSubjectService;

impl TeacherSubjectService {
    /// Replaces the teacher's full subject set. Subjects not listed lose the
    /// teacher; an empty list clears every assignment.
    #[instrument(skip(db, requester, subject_ids), fields(requested = subject_ids.len(), db.operation = "UPDATE", db.table = "subjects"))]
    pub async fn assign_subjects_to_teacher(
        db: &PgPool,
        requester: &Requester,
        teacher_id: UserId,
        subject_ids: Vec<SubjectId>,
    ) -> Result<Vec<Subject>, AppError> {
        let teacher = active_teacher(db, requester, teacher_id).await?;
        let school_id = teacher
            .school_id
            .ok_or_else(|| AppError::validation("The teacher is not attached to a school"))?;

        enforce(
            requester,
            EntityKind::Subject,
            WriteAction::Modify,
            can_manage_assignments(requester, school_id),
        )?;

        let mut tx = db.begin().await?;

        let subjects = Self::replace_subjects(&mut tx, teacher_id, school_id, &subject_ids)
            .await
            .map_err(AppError::in_transaction)?;

        tx.commit().await.map_err(AppError::transaction_failure)?;

        info!(teacher.id = %teacher_id, assigned = subjects.len(), "Teacher subjects replaced");
        Ok(subjects)
    }

    async fn replace_subjects(
        tx: &mut Transaction<'_, Postgres>,
        teacher_id: UserId,
        school_id: SchoolId,
        requested: &[SubjectId],
    ) -> Result<Vec<Subject>, AppError> {
        let found = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = ANY($1) FOR UPDATE"
        ))
        .bind(requested)
        .fetch_all(&mut **tx)
        .await?;

        let subject_ids = check_subject_set(school_id, requested, &found)?;

        sqlx::query("UPDATE subjects SET teacher_id = NULL, updated_at = NOW() WHERE teacher_id = $1")
            .bind(teacher_id)
            .execute(&mut **tx)
            .await?;

        let subjects = sqlx::query_as::<_, Subject>(&format!(
            "UPDATE subjects SET teacher_id = $1, updated_at = NOW() WHERE id = ANY($2)
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(teacher_id)
        .bind(&subject_ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(subjects)
    }

    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "subjects"))]
    pub async fn get_teacher_subjects(
        db: &PgPool,
        requester: &Requester,
        teacher_id: UserId,
    ) -> Result<Vec<Subject>, AppError> {
        active_teacher(db, requester, teacher_id).await?;

        let subjects = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE teacher_id = $1 AND is_active
             ORDER BY class_id, name"
        ))
        .bind(teacher_id)
        .fetch_all(db)
        .await?;

        Ok(subjects)
    }
}
