use sqlx::{PgExecutor, PgPool};
use tracing::{debug, info, instrument, warn};

use scholaris_core::{AppError, PaginationMeta};
use scholaris_db::is_unique_violation;
use scholaris_models::ids::{SchoolId, UserId};
use scholaris_models::users::{CreateUserDto, PaginatedUsersResponse, User, UserFilterParams};
use scholaris_models::{Requester, Role};
use scholaris_policy::{
    EntityKind, ScopeColumns, WriteAction, can_manage_account, can_manage_assignments, read_scope,
};

use crate::metrics::track_user_created;
use crate::modules::classes::service::ClassService;
use crate::utils::auth_helpers::{enforce, target_school};
use crate::utils::password::hash_password;
use crate::utils::scope::bind_scope;

const COLUMNS: ScopeColumns = ScopeColumns::school("school_id").with_class("class_id");

const USER_COLUMNS: &str =
    "id, first_name, last_name, email, role_id, school_id, class_id, is_active, created_at, updated_at";

pub struct UserService;

impl UserService {
    pub async fn find_user<'e, E: PgExecutor<'e>>(
        executor: E,
        user_id: UserId,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

        Ok(user)
    }

    #[instrument(skip(db, requester, dto), fields(user.email = %dto.email, user.role = %dto.role, db.operation = "INSERT", db.table = "users"))]
    pub async fn create_user(
        db: &PgPool,
        requester: &Requester,
        dto: CreateUserDto,
    ) -> Result<User, AppError> {
        let school_id = target_school(requester, dto.school_id)?;
        enforce(
            requester,
            EntityKind::User,
            WriteAction::Create,
            can_manage_account(requester, dto.role, Some(school_id)),
        )?;

        let class_id = match (dto.role, dto.class_id) {
            (Role::Student, Some(class_id)) => {
                let class = ClassService::find_class(db, class_id)
                    .await?
                    .filter(|c| c.is_active && c.school_id == Some(school_id))
                    .ok_or_else(|| {
                        AppError::validation("The selected class does not belong to this school")
                    })?;
                Some(class.id)
            }
            (_, Some(_)) => {
                return Err(AppError::validation("Only students can be enrolled in a class"));
            }
            (_, None) => None,
        };

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (first_name, last_name, email, password, role_id, school_id, class_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(dto.role)
        .bind(school_id)
        .bind(class_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(user.email = %dto.email, "Attempted to create user with existing email");
                return AppError::conflict("A user with this email already exists");
            }
            AppError::from(e)
        })?;

        track_user_created(user.role.as_str());
        info!(user.id = %user.id, school.id = %school_id, "User created");

        Ok(user)
    }

    #[instrument(skip(db, requester, filters), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_users(
        db: &PgPool,
        requester: &Requester,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let predicate = read_scope(requester, EntityKind::User).sql_predicate(&COLUMNS, 1);
        let mut where_clause = format!("WHERE {}", predicate.sql);
        let mut next = predicate.next_param(1);

        if filters.role.is_some() {
            where_clause.push_str(&format!(" AND role_id = ${next}"));
            next += 1;
        }
        if filters.school_id.is_some() {
            where_clause.push_str(&format!(" AND school_id = ${next}"));
            next += 1;
        }
        if filters.class_id.is_some() {
            where_clause.push_str(&format!(" AND class_id = ${next}"));
        }

        let count_sql = format!("SELECT COUNT(*) FROM users {where_clause}");
        let mut count_query = bind_scope!(sqlx::query_scalar::<_, i64>(&count_sql), predicate);
        if let Some(role) = filters.role {
            count_query = count_query.bind(role);
        }
        if let Some(school_id) = filters.school_id {
            count_query = count_query.bind(school_id);
        }
        if let Some(class_id) = filters.class_id {
            count_query = count_query.bind(class_id);
        }
        let total = count_query.fetch_one(db).await?;

        let data_sql = format!(
            "SELECT {USER_COLUMNS} FROM users {where_clause}
             ORDER BY last_name, first_name LIMIT {} OFFSET {}",
            filters.pagination.limit(),
            filters.pagination.offset()
        );
        let mut data_query = bind_scope!(sqlx::query_as::<_, User>(&data_sql), predicate);
        if let Some(role) = filters.role {
            data_query = data_query.bind(role);
        }
        if let Some(school_id) = filters.school_id {
            data_query = data_query.bind(school_id);
        }
        if let Some(class_id) = filters.class_id {
            data_query = data_query.bind(class_id);
        }
        let users = data_query.fetch_all(db).await?;

        debug!(total, returned = users.len(), "Fetched users");

        Ok(PaginatedUsersResponse {
            data: users,
            meta: PaginationMeta::new(&filters.pagination, total),
        })
    }

    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_user_by_id(
        db: &PgPool,
        requester: &Requester,
        user_id: UserId,
    ) -> Result<User, AppError> {
        let scope = read_scope(requester, EntityKind::User);

        Self::find_user(db, user_id)
            .await?
            .filter(|u| scope.admits(u.school_id, u.class_id, None))
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Soft-deactivates an account and releases its class-admin and
    /// subject-teacher assignments.
    #[instrument(skip(db, requester), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn deactivate_user(
        db: &PgPool,
        requester: &Requester,
        user_id: UserId,
    ) -> Result<User, AppError> {
        let user = Self::get_user_by_id(db, requester, user_id).await?;
        enforce(
            requester,
            EntityKind::User,
            WriteAction::Delete,
            can_manage_account(requester, user.role, user.school_id),
        )?;

        let mut tx = db.begin().await?;

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from(e).in_transaction())?;

        if user.role == Role::Teacher {
            sqlx::query("DELETE FROM class_admin_profiles WHERE user_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::from(e).in_transaction())?;

            sqlx::query("UPDATE subjects SET teacher_id = NULL, updated_at = NOW() WHERE teacher_id = $1")
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::from(e).in_transaction())?;
        }

        tx.commit().await.map_err(AppError::transaction_failure)?;

        info!(user.id = %user_id, "User deactivated");
        Ok(user)
    }

    #[instrument(skip(db, requester), fields(db.operation = "INSERT", db.table = "parent_students"))]
    pub async fn link_student(
        db: &PgPool,
        requester: &Requester,
        parent_id: UserId,
        student_id: UserId,
    ) -> Result<(), AppError> {
        let school_id = Self::check_link(db, requester, parent_id, student_id).await?;

        sqlx::query(
            "INSERT INTO parent_students (parent_id, student_id) VALUES ($1, $2)
             ON CONFLICT (parent_id, student_id) DO NOTHING",
        )
        .bind(parent_id)
        .bind(student_id)
        .execute(db)
        .await?;

        info!(parent.id = %parent_id, student.id = %student_id, school.id = %school_id, "Student linked to parent");
        Ok(())
    }

    #[instrument(skip(db, requester), fields(db.operation = "DELETE", db.table = "parent_students"))]
    pub async fn unlink_student(
        db: &PgPool,
        requester: &Requester,
        parent_id: UserId,
        student_id: UserId,
    ) -> Result<(), AppError> {
        Self::check_link(db, requester, parent_id, student_id).await?;

        let result =
            sqlx::query("DELETE FROM parent_students WHERE parent_id = $1 AND student_id = $2")
                .bind(parent_id)
                .bind(student_id)
                .execute(db)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("This student is not linked to this parent"));
        }

        Ok(())
    }

    /// Active children of a parent. Parents may list their own; staff of the
    /// parent's school may list anyone's.
    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "parent_students"))]
    pub async fn get_children(
        db: &PgPool,
        requester: &Requester,
        parent_id: UserId,
    ) -> Result<Vec<User>, AppError> {
        if requester.user_id != parent_id {
            Self::get_user_by_id(db, requester, parent_id).await?;
        }

        let children = sqlx::query_as::<_, User>(
            r#"SELECT u.id, u.first_name, u.last_name, u.email, u.role_id, u.school_id,
                      u.class_id, u.is_active, u.created_at, u.updated_at
               FROM parent_students ps
               JOIN users u ON u.id = ps.student_id
               WHERE ps.parent_id = $1 AND u.is_active
               ORDER BY u.last_name, u.first_name"#,
        )
        .bind(parent_id)
        .fetch_all(db)
        .await?;

        Ok(children)
    }

    /// Both accounts must exist, be a parent and a student, and share a school
    /// the requester administers.
    async fn check_link(
        db: &PgPool,
        requester: &Requester,
        parent_id: UserId,
        student_id: UserId,
    ) -> Result<SchoolId, AppError> {
        let parent = Self::find_user(db, parent_id)
            .await?
            .filter(|u| u.role == Role::Parent)
            .ok_or_else(|| AppError::not_found("Parent not found"))?;
        let student = Self::find_user(db, student_id)
            .await?
            .filter(|u| u.role == Role::Student)
            .ok_or_else(|| AppError::not_found("Student not found"))?;

        let school_id = parent
            .school_id
            .ok_or_else(|| AppError::validation("The parent is not attached to a school"))?;

        enforce(
            requester,
            EntityKind::User,
            WriteAction::Modify,
            can_manage_assignments(requester, school_id),
        )?;

        if student.school_id != Some(school_id) {
            return Err(AppError::validation(
                "The parent and the student must belong to the same school",
            ));
        }

        Ok(school_id)
    }
}
