use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use scholaris_core::{AppError, PaginationMeta};
use scholaris_db::is_unique_violation;
use scholaris_models::Requester;
use scholaris_models::ids::SchoolId;
use scholaris_models::schools::{
    CreateSchoolDto, PaginatedSchoolsResponse, School, SchoolFilterParams,
};
use scholaris_policy::{EntityKind, ScopeColumns, read_scope};

use crate::utils::scope::bind_scope;

const COLUMNS: ScopeColumns = ScopeColumns::school("id");

pub struct SchoolService;

impl SchoolService {
    #[instrument(skip(db, dto), fields(school.name = %dto.name, db.operation = "INSERT", db.table = "schools"))]
    pub async fn create_school(db: &PgPool, dto: CreateSchoolDto) -> Result<School, AppError> {
        let school = sqlx::query_as::<_, School>(
            "INSERT INTO schools (name, address) VALUES ($1, $2)
             RETURNING id, name, address, created_at, updated_at",
        )
        .bind(&dto.name)
        .bind(&dto.address)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(school.name = %dto.name, "Attempted to create school with existing name");
                return AppError::conflict("A school with this name already exists");
            }
            AppError::from(e)
        })?;

        info!(school.id = %school.id, "School created");
        Ok(school)
    }

    #[instrument(skip(db, requester, filters), fields(db.operation = "SELECT", db.table = "schools"))]
    pub async fn get_schools(
        db: &PgPool,
        requester: &Requester,
        filters: SchoolFilterParams,
    ) -> Result<PaginatedSchoolsResponse, AppError> {
        let predicate = read_scope(requester, EntityKind::School).sql_predicate(&COLUMNS, 1);
        let mut where_clause = format!("WHERE {}", predicate.sql);

        let name_pattern = filters.name.as_ref().map(|n| format!("%{n}%"));
        if name_pattern.is_some() {
            where_clause.push_str(&format!(" AND name ILIKE ${}", predicate.next_param(1)));
        }

        let count_sql = format!("SELECT COUNT(*) FROM schools {where_clause}");
        let mut count_query = bind_scope!(sqlx::query_scalar::<_, i64>(&count_sql), predicate);
        if let Some(pattern) = &name_pattern {
            count_query = count_query.bind(pattern);
        }
        let total = count_query.fetch_one(db).await?;

        let data_sql = format!(
            "SELECT id, name, address, created_at, updated_at FROM schools {where_clause}
             ORDER BY name LIMIT {} OFFSET {}",
            filters.pagination.limit(),
            filters.pagination.offset()
        );
        let mut data_query = bind_scope!(sqlx::query_as::<_, School>(&data_sql), predicate);
        if let Some(pattern) = &name_pattern {
            data_query = data_query.bind(pattern);
        }
        let schools = data_query.fetch_all(db).await?;

        debug!(total, returned = schools.len(), "Fetched schools");

        Ok(PaginatedSchoolsResponse {
            data: schools,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "schools"))]
    pub async fn get_school_by_id(
        db: &PgPool,
        requester: &Requester,
        school_id: SchoolId,
    ) -> Result<School, AppError> {
        let scope = read_scope(requester, EntityKind::School);
        if !scope.admits(Some(school_id), None, None) {
            return Err(AppError::not_found("School not found"));
        }

        sqlx::query_as::<_, School>(
            "SELECT id, name, address, created_at, updated_at FROM schools WHERE id = $1",
        )
        .bind(school_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("School not found"))
    }

    /// Deletes a school and cascades to its classes and accounts. Schools
    /// that own homework or live classes, including soft-deleted ones, are
    /// kept so that their content history survives.
    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "schools"))]
    pub async fn delete_school(db: &PgPool, school_id: SchoolId) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM schools WHERE id = $1
               AND NOT EXISTS (SELECT 1 FROM homework WHERE school_id = $1)
               AND NOT EXISTS (SELECT 1 FROM live_classes WHERE school_id = $1)",
        )
        .bind(school_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM schools WHERE id = $1)")
                    .bind(school_id)
                    .fetch_one(db)
                    .await?;

            if !exists {
                return Err(AppError::not_found("School not found"));
            }

            warn!(school.id = %school_id, "Refused to delete school with content");
            return Err(AppError::conflict(
                "School still has homework or live classes and cannot be deleted",
            ));
        }

        info!(school.id = %school_id, "School deleted");
        Ok(())
    }
}
