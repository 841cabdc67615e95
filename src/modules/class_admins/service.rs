use sqlx::{PgPool, Postgres, Transaction};
use tracing::{info, instrument, warn};

use scholaris_core::AppError;
use scholaris_db::{is_unique_violation, violated_constraint};
use scholaris_models::class_admins::{ClassAdminAssignment, ClassAdminView};
use scholaris_models::classes::Class;
use scholaris_models::ids::{ClassId, SchoolId, UserId};
use scholaris_models::users::User;
use scholaris_models::{Requester, Role};
use scholaris_policy::guard::{assignable_classes, ensure_class_free};
use scholaris_policy::{
    EntityKind, ScopeColumns, WriteAction, can_manage_assignments, read_scope,
};

use crate::modules::classes::service::CLASS_COLUMNS;
use crate::modules::users::service::UserService;
use crate::utils::auth_helpers::enforce;
use crate::utils::scope::bind_scope;

const COLUMNS: ScopeColumns = ScopeColumns::school("c.school_id").with_class("c.id");

const ASSIGNMENT_COLUMNS: &str = "id, user_id, class_id, created_at";

pub struct ClassAdminService;

impl ClassAdminService {
    /// Moves `teacher_id` to administer `class_id`, or only unassigns the
    /// teacher when `class_id` is `None`.
    ///
    /// Clear, check and insert run in one transaction. The unique constraints
    /// on `class_admin_profiles` settle concurrent assignments of the same
    /// class.
    #[instrument(skip(db, requester), fields(db.operation = "INSERT", db.table = "class_admin_profiles"))]
    pub async fn assign_class_admin(
        db: &PgPool,
        requester: &Requester,
        teacher_id: UserId,
        class_id: Option<ClassId>,
    ) -> Result<Option<ClassAdminAssignment>, AppError> {
        let teacher = active_teacher(db, requester, teacher_id).await?;
        let school_id = teacher
            .school_id
            .ok_or_else(|| AppError::validation("The teacher is not attached to a school"))?;

        enforce(
            requester,
            EntityKind::ClassAdminAssignment,
            WriteAction::Modify,
            can_manage_assignments(requester, school_id),
        )?;

        let mut tx = db.begin().await?;

        let assignment = Self::reassign(&mut tx, teacher_id, school_id, class_id)
            .await
            .map_err(AppError::in_transaction)?;

        tx.commit().await.map_err(AppError::transaction_failure)?;

        match &assignment {
            Some(a) => info!(teacher.id = %teacher_id, class.id = %a.class_id, "Class admin assigned"),
            None => info!(teacher.id = %teacher_id, "Class admin unassigned"),
        }

        Ok(assignment)
    }

    async fn reassign(
        tx: &mut Transaction<'_, Postgres>,
        teacher_id: UserId,
        school_id: SchoolId,
        class_id: Option<ClassId>,
    ) -> Result<Option<ClassAdminAssignment>, AppError> {
        sqlx::query("DELETE FROM class_admin_profiles WHERE user_id = $1")
            .bind(teacher_id)
            .execute(&mut **tx)
            .await?;

        let Some(class_id) = class_id else {
            return Ok(None);
        };

        sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1 FOR UPDATE"
        ))
        .bind(class_id)
        .fetch_optional(&mut **tx)
        .await?
        .filter(|c| c.is_active && c.school_id == Some(school_id))
        .ok_or_else(|| {
            AppError::validation("The selected class is not an active class of the teacher's school")
        })?;

        let existing = sqlx::query_as::<_, ClassAdminAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM class_admin_profiles WHERE class_id = $1"
        ))
        .bind(class_id)
        .fetch_optional(&mut **tx)
        .await?;
        ensure_class_free(existing.as_ref(), teacher_id)?;

        let assignment = sqlx::query_as::<_, ClassAdminAssignment>(&format!(
            "INSERT INTO class_admin_profiles (user_id, class_id) VALUES ($1, $2)
             RETURNING {ASSIGNMENT_COLUMNS}"
        ))
        .bind(teacher_id)
        .bind(class_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(
                    teacher.id = %teacher_id,
                    class.id = %class_id,
                    constraint = violated_constraint(&e).unwrap_or_default(),
                    "Class admin assignment lost a race"
                );
                return match violated_constraint(&e) {
                    Some("class_admin_profiles_user_id_key") => {
                        AppError::conflict("This teacher already administers another class")
                    }
                    _ => AppError::conflict("This class already has a class admin"),
                };
            }
            AppError::from(e)
        })?;

        Ok(Some(assignment))
    }

    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "class_admin_profiles"))]
    pub async fn get_class_admins(
        db: &PgPool,
        requester: &Requester,
    ) -> Result<Vec<ClassAdminView>, AppError> {
        let predicate =
            read_scope(requester, EntityKind::ClassAdminAssignment).sql_predicate(&COLUMNS, 1);

        let sql = format!(
            r#"SELECT cap.id, cap.user_id AS teacher_id,
                      u.first_name || ' ' || u.last_name AS teacher_name,
                      cap.class_id, c.name AS class_name
               FROM class_admin_profiles cap
               JOIN users u ON u.id = cap.user_id
               JOIN classes c ON c.id = cap.class_id
               WHERE {}
               ORDER BY c.name, cap.id"#,
            predicate.sql
        );
        let views = bind_scope!(sqlx::query_as::<_, ClassAdminView>(&sql), predicate)
            .fetch_all(db)
            .await?;

        Ok(views)
    }

    /// Classes of the teacher's school that have no admin or are
    /// administered by this teacher.
    #[instrument(skip(db, requester), fields(db.operation = "SELECT", db.table = "classes"))]
    pub async fn assignable_classes(
        db: &PgPool,
        requester: &Requester,
        teacher_id: UserId,
    ) -> Result<Vec<Class>, AppError> {
        let teacher = active_teacher(db, requester, teacher_id).await?;
        let Some(school_id) = teacher.school_id else {
            return Ok(Vec::new());
        };

        let classes = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE school_id = $1 AND is_active ORDER BY name, id"
        ))
        .bind(school_id)
        .fetch_all(db)
        .await?;

        let assignments = sqlx::query_as::<_, ClassAdminAssignment>(
            r#"SELECT cap.id, cap.user_id, cap.class_id, cap.created_at
               FROM class_admin_profiles cap
               JOIN classes c ON c.id = cap.class_id
               WHERE c.school_id = $1"#,
        )
        .bind(school_id)
        .fetch_all(db)
        .await?;

        Ok(assignable_classes(&classes, &assignments, teacher_id)
            .into_iter()
            .cloned()
            .collect())
    }
}

/// Loads a visible, active teacher account.
pub(crate) async fn active_teacher(
    db: &PgPool,
    requester: &Requester,
    teacher_id: UserId,
) -> Result<User, AppError> {
    let user = UserService::get_user_by_id(db, requester, teacher_id).await?;
    if user.role != Role::Teacher || !user.is_active {
        return Err(AppError::validation("The selected user is not an active teacher"));
    }
    Ok(user)
}
