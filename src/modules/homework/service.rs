use sqlx::PgPool;
use tracing::{debug, info, instrument};

use scholaris_core::{AppError, PaginationMeta};
use scholaris_models::Requester;
use scholaris_models::homework::{
    CreateHomeworkDto, Homework, HomeworkFilterParams, HomeworkView, PaginatedHomeworkResponse,
    UpdateHomeworkDto,
};
use scholaris_models::ids::HomeworkId;
use scholaris_policy::guard::check_class_subject_scope;
use scholaris_policy::{
    EntityKind, OwnedRecord, ScopeColumns, WriteAction, can_write, read_scope, record_permissions,
};

use crate::modules::subjects::service::SubjectService;
use crate::utils::auth_helpers::{enforce, target_school};
use crate::utils::scope::bind_scope;

const COLUMNS: ScopeColumns = ScopeColumns::school("school_id").with_class("class_id");

const HOMEWORK_COLUMNS: &str = "id, title, description, attachment_path, school_id, class_id, \
     subject_id, due_date, owner_role, created_by, is_active, deleted_at, created_at, updated_at";

pub struct HomeworkService;

impl HomeworkService {
    fn view(requester: &Requester, homework: Homework) -> HomeworkView {
        let permissions = record_permissions(requester, &OwnedRecord::from(&homework));
        HomeworkView {
            homework,
            permissions,
        }
    }

    /// Creates homework owned by the requester's role. The tag is never
    /// updated afterwards.
    #[instrument(skip(db, requester, dto), fields(db.operation = "INSERT", db.table = "homework"))]
    pub async fn create_homework(
        db: &PgPool,
        requester: &Requester,
        dto: CreateHomeworkDto,
    ) -> Result<HomeworkView, AppError> {
        let school_id = target_school(requester, dto.school_id)?;
        enforce(
            requester,
            EntityKind::Homework,
            WriteAction::Create,
            can_write(
                requester,
                WriteAction::Create,
                &OwnedRecord::authored_by(requester, school_id),
            ),
        )?;

        let (class, subject) = SubjectService::find_with_class(db, dto.class_id, dto.subject_id).await?;
        check_class_subject_scope(school_id, &class, &subject)?;

        let homework = sqlx::query_as::<_, Homework>(&format!(
            "INSERT INTO homework
                (title, description, attachment_path, school_id, class_id, subject_id, due_date, owner_role, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {HOMEWORK_COLUMNS}"
        ))
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.attachment_path)
        .bind(school_id)
        .bind(class.id)
        .bind(subject.id)
        .bind(dto.due_date)
        .bind(requester.role)
        .bind(requester.user_id)
        .fetch_one(db)
        .await?;

        info!(homework.id = %homework.id, owner_role = %homework.owner_role, "Homework created");
        Ok(Self::view(requester, homework))
    }

    #[instrument(skip(db, requester, filters), fields(db.operation = "SELECT", db.table = "homework"))]
    pub async fn get_homework(
        db: &PgPool,
        requester: &Requester,
        filters: HomeworkFilterParams,
    ) -> Result<PaginatedHomeworkResponse, AppError> {
        let predicate = read_scope(requester, EntityKind::Homework).sql_predicate(&COLUMNS, 1);
        let mut where_clause = format!("WHERE is_active AND {}", predicate.sql);
        let mut next = predicate.next_param(1);

        if filters.school_id.is_some() {
            where_clause.push_str(&format!(" AND school_id = ${next}"));
            next += 1;
        }
        if filters.class_id.is_some() {
            where_clause.push_str(&format!(" AND class_id = ${next}"));
            next += 1;
        }
        if filters.subject_id.is_some() {
            where_clause.push_str(&format!(" AND subject_id = ${next}"));
        }

        let count_sql = format!("SELECT COUNT(*) FROM homework {where_clause}");
        let mut count_query = bind_scope!(sqlx::query_scalar::<_, i64>(&count_sql), predicate);
        if let Some(school_id) = filters.school_id {
            count_query = count_query.bind(school_id);
        }
        if let Some(class_id) = filters.class_id {
            count_query = count_query.bind(class_id);
        }
        if let Some(subject_id) = filters.subject_id {
            count_query = count_query.bind(subject_id);
        }
        let total = count_query.fetch_one(db).await?;

        let data_sql = format!(
            "SELECT {HOMEWORK_COLUMNS} FROM homework {where_clause}
             ORDER BY created_at DESC, id DESC LIMIT {} OFFSET {}",
            filters.pagination.limit(),
            filters.pagination.offset()
        );
        let mut data_query = bind_scope!(sqlx::query_as::<_, Homework>(&data_sql), predicate);
        if let Some(school_id) = filters.school_id {
            data_query = data_query.bind(school_id);
        }
        if let Some(class_id) = filters.class_id {
            data_query = data_query.bind(class_id);
        }
        if let Some(subject_id) = filters.subject_id {
            data_query = data_query.bind(subject_id);
        }
        let rows = data_query.fetch_all(db).await?;

        debug!(total, returned = rows.len(), "Fetched homework");

        Ok(PaginatedHomeworkResponse {
            data: rows.into_iter().map(|h| Self::view(requester, h)).collect(),
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    /// Writes load the row regardless of read scope so that a requester
    /// outside the owning school gets a denial rather than a miss.
    async fn find_active(db: &PgPool, homework_id: HomeworkId) -> Result<Homework, AppError> {
        sqlx::query_as::<_, Homework>(&format!(
            "SELECT {HOMEWORK_COLUMNS} FROM homework WHERE id = $1 AND is_active"
        ))
        .bind(homework_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Homework not found"))
    }

    async fn find_visible(
        db: &PgPool,
        requester: &Requester,
        homework_id: HomeworkId,
    ) -> Result<Homework, AppError> {
        let scope = read_scope(requester, EntityKind::Homework);

        let homework = Self::find_active(db, homework_id).await?;
        if !scope.admits(Some(homework.school_id), Some(homework.class_id), None) {
            return Err(AppError::not_found("Homework not found"));
        }
        Ok(homework)
    }

    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "homework"))]
    pub async fn get_homework_by_id(
        db: &PgPool,
        requester: &Requester,
        homework_id: HomeworkId,
    ) -> Result<HomeworkView, AppError> {
        let homework = Self::find_visible(db, requester, homework_id).await?;
        Ok(Self::view(requester, homework))
    }

    #[instrument(skip(db, requester, dto), fields(db.operation = "UPDATE", db.table = "homework"))]
    pub async fn update_homework(
        db: &PgPool,
        requester: &Requester,
        homework_id: HomeworkId,
        dto: UpdateHomeworkDto,
    ) -> Result<HomeworkView, AppError> {
        let homework = Self::find_active(db, homework_id).await?;
        enforce(
            requester,
            EntityKind::Homework,
            WriteAction::Modify,
            can_write(requester, WriteAction::Modify, &OwnedRecord::from(&homework)),
        )?;

        let homework = sqlx::query_as::<_, Homework>(&format!(
            "UPDATE homework SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                attachment_path = COALESCE($4, attachment_path),
                due_date = COALESCE($5, due_date),
                updated_at = NOW()
             WHERE id = $1 AND is_active
             RETURNING {HOMEWORK_COLUMNS}"
        ))
        .bind(homework_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.attachment_path)
        .bind(dto.due_date)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Homework not found"))?;

        Ok(Self::view(requester, homework))
    }

    /// Soft delete: the row stays with `is_active = false` and `deleted_at` set.
    #[instrument(skip(db, requester), fields(db.operation = "UPDATE", db.table = "homework"))]
    pub async fn delete_homework(
        db: &PgPool,
        requester: &Requester,
        homework_id: HomeworkId,
    ) -> Result<(), AppError> {
        let homework = Self::find_active(db, homework_id).await?;
        enforce(
            requester,
            EntityKind::Homework,
            WriteAction::Delete,
            can_write(requester, WriteAction::Delete, &OwnedRecord::from(&homework)),
        )?;

        let result = sqlx::query(
            "UPDATE homework SET is_active = FALSE, deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND is_active",
        )
        .bind(homework_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Homework not found"));
        }

        info!(homework.id = %homework_id, deleted_by = %requester.user_id, "Homework deleted");
        Ok(())
    }
}
