use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info, instrument};

use scholaris_core::{AppError, PaginationMeta};
use scholaris_models::Requester;
use scholaris_models::classes::Class;
use scholaris_models::ids::{ClassId, SubjectId};
use scholaris_models::subjects::{
    CreateSubjectDto, PaginatedSubjectsResponse, Subject, SubjectFilterParams, UpdateSubjectDto,
};
use scholaris_policy::guard::check_subject_parent;
use scholaris_policy::{EntityKind, ScopeColumns, WriteAction, can_manage_catalog, read_scope};

use crate::modules::classes::service::{ClassService, catalog_school};
use crate::utils::auth_helpers::enforce;
use crate::utils::scope::bind_scope;

const COLUMNS: ScopeColumns = ScopeColumns::school("school_id");

pub(crate) const SUBJECT_COLUMNS: &str =
    "id, name, class_id, school_id, teacher_id, is_active, created_at, updated_at";

pub struct SubjectService;

impl SubjectService {
    pub async fn find_subject<'e, E: PgExecutor<'e>>(
        executor: E,
        subject_id: SubjectId,
    ) -> Result<Option<Subject>, AppError> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"
        ))
        .bind(subject_id)
        .fetch_optional(executor)
        .await?;

        Ok(subject)
    }

    /// Loads the class and subject a piece of content points at. A missing
    /// row is reported as a validation failure of the request.
    pub async fn find_with_class(
        db: &PgPool,
        class_id: ClassId,
        subject_id: SubjectId,
    ) -> Result<(Class, Subject), AppError> {
        let class = ClassService::find_class(db, class_id)
            .await?
            .ok_or_else(|| AppError::validation("The selected class does not exist"))?;
        let subject = Self::find_subject(db, subject_id)
            .await?
            .ok_or_else(|| AppError::validation("The selected subject does not exist"))?;

        Ok((class, subject))
    }

    /// A template subject goes under a template class, a school subject
    /// under a class of the same school.
    #[instrument(skip(db, requester), fields(db.operation = "INSERT", db.table = "subjects"))]
    pub async fn create_subject(
        db: &PgPool,
        requester: &Requester,
        dto: CreateSubjectDto,
    ) -> Result<Subject, AppError> {
        let school_id = catalog_school(requester);
        enforce(
            requester,
            EntityKind::Subject,
            WriteAction::Create,
            can_manage_catalog(requester, school_id),
        )?;

        let class = ClassService::find_class(db, dto.class_id)
            .await?
            .ok_or_else(|| AppError::validation("The selected class does not exist"))?;
        check_subject_parent(school_id, &class)?;

        let subject = sqlx::query_as::<_, Subject>(&format!(
            "INSERT INTO subjects (name, class_id, school_id) VALUES ($1, $2, $3)
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(class.id)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        info!(subject.id = %subject.id, class.id = %class.id, template = subject.is_template(), "Subject created");
        Ok(subject)
    }

    #[instrument(skip(db, requester, filters), fields(db.operation = "SELECT", db.table = "subjects"))]
    pub async fn get_subjects(
        db: &PgPool,
        requester: &Requester,
        filters: SubjectFilterParams,
    ) -> Result<PaginatedSubjectsResponse, AppError> {
        let predicate = read_scope(requester, EntityKind::Subject).sql_predicate(&COLUMNS, 1);
        let mut where_clause = format!("WHERE is_active AND {}", predicate.sql);
        let mut next = predicate.next_param(1);

        if filters.class_id.is_some() {
            where_clause.push_str(&format!(" AND class_id = ${next}"));
            next += 1;
        }
        let name_pattern = filters.name.as_ref().map(|n| format!("%{n}%"));
        if name_pattern.is_some() {
            where_clause.push_str(&format!(" AND name ILIKE ${next}"));
        }

        let count_sql = format!("SELECT COUNT(*) FROM subjects {where_clause}");
        let mut count_query = bind_scope!(sqlx::query_scalar::<_, i64>(&count_sql), predicate);
        if let Some(class_id) = filters.class_id {
            count_query = count_query.bind(class_id);
        }
        if let Some(pattern) = &name_pattern {
            count_query = count_query.bind(pattern);
        }
        let total = count_query.fetch_one(db).await?;

        let data_sql = format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects {where_clause} ORDER BY name, id LIMIT {} OFFSET {}",
            filters.pagination.limit(),
            filters.pagination.offset()
        );
        let mut data_query = bind_scope!(sqlx::query_as::<_, Subject>(&data_sql), predicate);
        if let Some(class_id) = filters.class_id {
            data_query = data_query.bind(class_id);
        }
        if let Some(pattern) = &name_pattern {
            data_query = data_query.bind(pattern);
        }
        let subjects = data_query.fetch_all(db).await?;

        debug!(total, returned = subjects.len(), "Fetched subjects");

        Ok(PaginatedSubjectsResponse {
            data: subjects,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "subjects"))]
    pub async fn get_subject_by_id(
        db: &PgPool,
        requester: &Requester,
        subject_id: SubjectId,
    ) -> Result<Subject, AppError> {
        let scope = read_scope(requester, EntityKind::Subject);

        Self::find_subject(db, subject_id)
            .await?
            .filter(|s| s.is_active && scope.admits(s.school_id, s.class_id, None))
            .ok_or_else(|| AppError::not_found("Subject not found"))
    }

    /// Renames a school subject. Template subjects are renamed through the
    /// template catalog so the change reaches their copies.
    #[instrument(skip(db, requester), fields(db.operation = "UPDATE", db.table = "subjects"))]
    pub async fn update_subject(
        db: &PgPool,
        requester: &Requester,
        subject_id: SubjectId,
        dto: UpdateSubjectDto,
    ) -> Result<Subject, AppError> {
        let subject = Self::get_subject_by_id(db, requester, subject_id).await?;
        enforce(
            requester,
            EntityKind::Subject,
            WriteAction::Modify,
            can_manage_catalog(requester, subject.school_id),
        )?;

        if subject.is_template() {
            return Err(AppError::bad_request(
                "Template subjects are renamed with PUT /api/templates/subjects/{id}",
            ));
        }

        let subject = sqlx::query_as::<_, Subject>(&format!(
            "UPDATE subjects SET name = $2, updated_at = NOW() WHERE id = $1
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(subject_id)
        .bind(&dto.name)
        .fetch_one(db)
        .await?;

        Ok(subject)
    }

    #[instrument(skip(db, requester), fields(db.operation = "UPDATE", db.table = "subjects"))]
    pub async fn delete_subject(
        db: &PgPool,
        requester: &Requester,
        subject_id: SubjectId,
    ) -> Result<(), AppError> {
        let subject = Self::get_subject_by_id(db, requester, subject_id).await?;
        enforce(
            requester,
            EntityKind::Subject,
            WriteAction::Delete,
            can_manage_catalog(requester, subject.school_id),
        )?;

        sqlx::query(
            "UPDATE subjects SET is_active = FALSE, teacher_id = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(subject_id)
        .execute(db)
        .await?;

        info!(subject.id = %subject_id, "Subject deactivated");
        Ok(())
    }
}
