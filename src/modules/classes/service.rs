use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info, instrument};

use scholaris_core::{AppError, PaginationMeta};
use scholaris_models::Requester;
use scholaris_models::classes::{
    Class, ClassFilterParams, CreateClassDto, PaginatedClassesResponse, UpdateClassDto,
};
use scholaris_models::ids::{ClassId, SchoolId};
use scholaris_policy::{EntityKind, ScopeColumns, WriteAction, can_manage_catalog, read_scope};

use crate::utils::auth_helpers::enforce;
use crate::utils::scope::bind_scope;

const COLUMNS: ScopeColumns = ScopeColumns::school("school_id");

pub(crate) const CLASS_COLUMNS: &str = "id, name, school_id, is_active, created_at, updated_at";

pub struct ClassService;

impl ClassService {
    pub async fn find_class<'e, E: PgExecutor<'e>>(
        executor: E,
        class_id: ClassId,
    ) -> Result<Option<Class>, AppError> {
        let class = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1"
        ))
        .bind(class_id)
        .fetch_optional(executor)
        .await?;

        Ok(class)
    }

    /// Super admins create templates; school admins create classes in their school.
    #[instrument(skip(db, requester), fields(db.operation = "INSERT", db.table = "classes"))]
    pub async fn create_class(
        db: &PgPool,
        requester: &Requester,
        dto: CreateClassDto,
    ) -> Result<Class, AppError> {
        let school_id = catalog_school(requester);
        enforce(
            requester,
            EntityKind::Class,
            WriteAction::Create,
            can_manage_catalog(requester, school_id),
        )?;

        let class = sqlx::query_as::<_, Class>(&format!(
            "INSERT INTO classes (name, school_id) VALUES ($1, $2) RETURNING {CLASS_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        info!(class.id = %class.id, template = class.is_template(), "Class created");
        Ok(class)
    }

    #[instrument(skip(db, requester, filters), fields(db.operation = "SELECT", db.table = "classes"))]
    pub async fn get_classes(
        db: &PgPool,
        requester: &Requester,
        filters: ClassFilterParams,
    ) -> Result<PaginatedClassesResponse, AppError> {
        let predicate = read_scope(requester, EntityKind::Class).sql_predicate(&COLUMNS, 1);
        let mut where_clause = format!("WHERE is_active AND {}", predicate.sql);

        let name_pattern = filters.name.as_ref().map(|n| format!("%{n}%"));
        if name_pattern.is_some() {
            where_clause.push_str(&format!(" AND name ILIKE ${}", predicate.next_param(1)));
        }

        let count_sql = format!("SELECT COUNT(*) FROM classes {where_clause}");
        let mut count_query = bind_scope!(sqlx::query_scalar::<_, i64>(&count_sql), predicate);
        if let Some(pattern) = &name_pattern {
            count_query = count_query.bind(pattern);
        }
        let total = count_query.fetch_one(db).await?;

        let data_sql = format!(
            "SELECT {CLASS_COLUMNS} FROM classes {where_clause} ORDER BY name, id LIMIT {} OFFSET {}",
            filters.pagination.limit(),
            filters.pagination.offset()
        );
        let mut data_query = bind_scope!(sqlx::query_as::<_, Class>(&data_sql), predicate);
        if let Some(pattern) = &name_pattern {
            data_query = data_query.bind(pattern);
        }
        let classes = data_query.fetch_all(db).await?;

        debug!(total, returned = classes.len(), "Fetched classes");

        Ok(PaginatedClassesResponse {
            data: classes,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "classes"))]
    pub async fn get_class_by_id(
        db: &PgPool,
        requester: &Requester,
        class_id: ClassId,
    ) -> Result<Class, AppError> {
        let scope = read_scope(requester, EntityKind::Class);

        Self::find_class(db, class_id)
            .await?
            .filter(|c| c.is_active && scope.admits(c.school_id, Some(c.id), None))
            .ok_or_else(|| AppError::not_found("Class not found"))
    }

    /// Renames one class. Template class renames do not reach school copies.
    #[instrument(skip(db, requester), fields(db.operation = "UPDATE", db.table = "classes"))]
    pub async fn update_class(
        db: &PgPool,
        requester: &Requester,
        class_id: ClassId,
        dto: UpdateClassDto,
    ) -> Result<Class, AppError> {
        let class = Self::get_class_by_id(db, requester, class_id).await?;
        enforce(
            requester,
            EntityKind::Class,
            WriteAction::Modify,
            can_manage_catalog(requester, class.school_id),
        )?;

        let class = sqlx::query_as::<_, Class>(&format!(
            "UPDATE classes SET name = $2, updated_at = NOW() WHERE id = $1 RETURNING {CLASS_COLUMNS}"
        ))
        .bind(class_id)
        .bind(&dto.name)
        .fetch_one(db)
        .await?;

        Ok(class)
    }

    /// Soft-deletes the class together with its subjects, and releases its
/// class-admin assignment and subject teachers.
    #[instrument(skip(db, requester), fields(db.operation = "UPDATE", db.table = "classes"))]
    pub async fn delete_class(
        db: &PgPool,
        requester: &Requester,
        class_id: ClassId,
    ) -> Result<(), AppError> {
        let class = Self::get_class_by_id(db, requester, class_id).await?;
        enforce(
            requester,
            EntityKind::Class,
            WriteAction::Delete,
            can_manage_catalog(requester, class.school_id),
        )?;

        let mut tx = db.begin().await?;

        sqlx::query("UPDATE classes SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(class_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from(e).in_transaction())?;

        let subjects = sqlx::query(
            "UPDATE subjects SET is_active = FALSE, teacher_id = NULL, updated_at = NOW()
             WHERE class_id = $1 AND is_active",
        )
        .bind(class_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::from(e).in_transaction())?;

        sqlx::query("DELETE FROM class_admin_profiles WHERE class_id = $1")
            .bind(class_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::from(e).in_transaction())?;

        tx.commit().await.map_err(AppError::transaction_failure)?;

        info!(
            class.id = %class_id,
            subjects_deactivated = subjects.rows_affected(),
            "Class deactivated"
        );
        Ok(())
    }
}

/// Where a catalog write lands: the template catalog for super admins, the
/// requester's school for everyone else.
pub(crate) fn catalog_school(requester: &Requester) -> Option<SchoolId> {
    if requester.is_super_admin() {
        None
    } else {
        requester.school_id
    }
}
