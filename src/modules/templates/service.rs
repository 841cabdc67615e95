//! Template catalog and its one-way, name-keyed propagation into schools.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info, instrument, warn};

use scholaris_core::AppError;
use scholaris_models::Requester;
use scholaris_models::catalog::{CatalogKind, CatalogRows};
use scholaris_models::classes::{Class, TemplateAssignment};
use scholaris_models::ids::{ClassId, SchoolId, SubjectId};
use scholaris_models::subjects::{Subject, SubjectPlacement, SubjectRename, UpdateSubjectDto};
use scholaris_policy::propagation::{
    NameScope, find_by_name_in_scope, plan_subject_copies, rename_targets,
};
use scholaris_policy::{
    EntityKind, WriteAction, can_manage_assignments, can_manage_catalog,
};

use crate::metrics::track_template_assignment;
use crate::modules::classes::service::CLASS_COLUMNS;
use crate::modules::subjects::service::SUBJECT_COLUMNS;
use crate::utils::auth_helpers::enforce;

pub struct TemplateService;

impl TemplateService {
    /// Active rows with no owning school.
    #[instrument(skip(db), fields(db.operation = "SELECT"))]
    pub async fn list_templates(db: &PgPool, kind: CatalogKind) -> Result<CatalogRows, AppError> {
        let rows = match kind {
            CatalogKind::Class => CatalogRows::Classes(
                sqlx::query_as::<_, Class>(&format!(
                    "SELECT {CLASS_COLUMNS} FROM classes
                     WHERE school_id IS NULL AND is_active ORDER BY name, id"
                ))
                .fetch_all(db)
                .await?,
            ),
            CatalogKind::Subject => CatalogRows::Subjects(
                sqlx::query_as::<_, Subject>(&format!(
                    "SELECT {SUBJECT_COLUMNS} FROM subjects
                     WHERE school_id IS NULL AND is_active ORDER BY class_id, name, id"
                ))
                .fetch_all(db)
                .await?,
            ),
        };

        debug!(returned = rows.len(), "Fetched templates");
        Ok(rows)
    }

    /// Active rows owned by `school_id`. Requesters outside that school see
    /// an empty list.
    #[instrument(skip(db, requester), fields(db.operation = "SELECT"))]
    pub async fn list_school_instances(
        db: &PgPool,
        requester: &Requester,
        kind: CatalogKind,
        school_id: SchoolId,
    ) -> Result<CatalogRows, AppError> {
        let visible = requester.is_super_admin() || requester.belongs_to(school_id);

        let rows = match kind {
            CatalogKind::Class => CatalogRows::Classes(if visible {
                sqlx::query_as::<_, Class>(&format!(
                    "SELECT {CLASS_COLUMNS} FROM classes
                     WHERE school_id = $1 AND is_active ORDER BY name, id"
                ))
                .bind(school_id)
                .fetch_all(db)
                .await?
            } else {
                Vec::new()
            }),
            CatalogKind::Subject => CatalogRows::Subjects(if visible {
                sqlx::query_as::<_, Subject>(&format!(
                    "SELECT {SUBJECT_COLUMNS} FROM subjects
                     WHERE school_id = $1 AND is_active ORDER BY class_id, name, id"
                ))
                .bind(school_id)
                .fetch_all(db)
                .await?
            } else {
                Vec::new()
            }),
        };

        Ok(rows)
    }

    /// Deep-copies a template class and its active subjects into a school.
    ///
    /// Idempotent: a same-named active class in the school is reused and
    /// subjects already present by name are skipped. Either everything is
    /// written or nothing is.
    #[instrument(skip(db, requester), fields(db.operation = "INSERT", db.table = "classes"))]
    pub async fn assign_template_to_school(
        db: &PgPool,
        requester: &Requester,
        template_class_id: ClassId,
        school_id: SchoolId,
    ) -> Result<TemplateAssignment, AppError> {
        enforce(
            requester,
            EntityKind::Class,
            WriteAction::Create,
            can_manage_assignments(requester, school_id),
        )?;

        let mut tx = db.begin().await?;

        let assignment = Self::copy_template(&mut tx, template_class_id, school_id)
            .await
            .map_err(AppError::in_transaction)?;

        tx.commit().await.map_err(AppError::transaction_failure)?;

        track_template_assignment(assignment.class_created, assignment.subjects_created.len());
        info!(
            template.id = %template_class_id,
            school.id = %school_id,
            class.id = %assignment.class.id,
            class_created = assignment.class_created,
            subjects_created = assignment.subjects_created.len(),
            subjects_skipped = assignment.subjects_skipped,
            "Template assigned to school"
        );

        Ok(assignment)
    }

    async fn copy_template(
        tx: &mut Transaction<'_, Postgres>,
        template_class_id: ClassId,
        school_id: SchoolId,
    ) -> Result<TemplateAssignment, AppError> {
        // Serializes concurrent assignments into the same school.
        sqlx::query_scalar::<_, SchoolId>("SELECT id FROM schools WHERE id = $1 FOR UPDATE")
            .bind(school_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::not_found("School not found"))?;

        let template = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes
             WHERE id = $1 AND school_id IS NULL AND is_active"
        ))
        .bind(template_class_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::not_found("Template class not found"))?;

        let same_named = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE school_id = $1 AND name = $2 ORDER BY id"
        ))
        .bind(school_id)
        .bind(&template.name)
        .fetch_all(&mut **tx)
        .await?;

        let (class, class_created) =
            match find_by_name_in_scope(&same_named, &template.name, NameScope::School(school_id)) {
                Some(existing) => (existing.clone(), false),
                None => {
                    let created = sqlx::query_as::<_, Class>(&format!(
                        "INSERT INTO classes (name, school_id) VALUES ($1, $2)
                         RETURNING {CLASS_COLUMNS}"
                    ))
                    .bind(&template.name)
                    .bind(school_id)
                    .fetch_one(&mut **tx)
                    .await?;
                    (created, true)
                }
            };

        let template_subjects = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects
             WHERE class_id = $1 AND school_id IS NULL ORDER BY id"
        ))
        .bind(template.id)
        .fetch_all(&mut **tx)
        .await?;

        let existing_subjects = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE class_id = $1 AND school_id = $2"
        ))
        .bind(class.id)
        .bind(school_id)
        .fetch_all(&mut **tx)
        .await?;

        let plan = plan_subject_copies(&template_subjects, template.id, &existing_subjects, class.id);

        let mut subjects_created = Vec::with_capacity(plan.to_create.len());
        for name in &plan.to_create {
            let subject = sqlx::query_as::<_, Subject>(&format!(
                "INSERT INTO subjects (name, class_id, school_id) VALUES ($1, $2, $3)
                 RETURNING {SUBJECT_COLUMNS}"
            ))
            .bind(name)
            .bind(class.id)
            .bind(school_id)
            .fetch_one(&mut **tx)
            .await?;
            subjects_created.push(subject);
        }

        Ok(TemplateAssignment {
            class,
            class_created,
            subjects_created,
            subjects_skipped: plan.skipped,
        })
    }

    /// Renames a template subject and every school subject that still
    /// carries its old name inside a class named like the template's class.
    ///
    /// The match is by name only; see [`rename_targets`] for the collision
    /// this implies.
    #[instrument(skip(db, requester, dto), fields(new_name = %dto.name, db.operation = "UPDATE", db.table = "subjects"))]
    pub async fn rename_template_subject(
        db: &PgPool,
        requester: &Requester,
        subject_id: SubjectId,
        dto: UpdateSubjectDto,
    ) -> Result<SubjectRename, AppError> {
        enforce(
            requester,
            EntityKind::Subject,
            WriteAction::Modify,
            can_manage_catalog(requester, None),
        )?;

        let mut tx = db.begin().await?;

        let rename = Self::propagate_rename(&mut tx, subject_id, &dto.name)
            .await
            .map_err(AppError::in_transaction)?;

        tx.commit().await.map_err(AppError::transaction_failure)?;

        if !rename.propagated_subject_ids.is_empty() {
            warn!(
                template.id = %subject_id,
                propagated = rename.propagated_subject_ids.len(),
                "Template subject rename propagated to school subjects by name"
            );
        }

        Ok(rename)
    }

    async fn propagate_rename(
        tx: &mut Transaction<'_, Postgres>,
        subject_id: SubjectId,
        new_name: &str,
    ) -> Result<SubjectRename, AppError> {
        let template = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects
             WHERE id = $1 AND school_id IS NULL AND is_active FOR UPDATE"
        ))
        .bind(subject_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::not_found("Template subject not found"))?;

        let class_name = sqlx::query_scalar::<_, String>("SELECT name FROM classes WHERE id = $1")
            .bind(template.class_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::validation("The template subject has no class"))?;

        if template.name == new_name {
            return Ok(SubjectRename {
                template,
                propagated_subject_ids: Vec::new(),
            });
        }

        let candidates = sqlx::query_as::<_, SubjectPlacement>(
            r#"SELECT s.id, s.name, s.school_id, s.class_id, c.name AS class_name, s.is_active
               FROM subjects s
               JOIN classes c ON c.id = s.class_id
               WHERE s.school_id IS NOT NULL AND s.name = $1 AND c.name = $2
               FOR UPDATE OF s"#,
        )
        .bind(&template.name)
        .bind(&class_name)
        .fetch_all(&mut **tx)
        .await?;

        let targets = rename_targets(&template.name, &class_name, &candidates);

        let template = sqlx::query_as::<_, Subject>(&format!(
            "UPDATE subjects SET name = $2, updated_at = NOW() WHERE id = $1
             RETURNING {SUBJECT_COLUMNS}"
        ))
        .bind(subject_id)
        .bind(new_name)
        .fetch_one(&mut **tx)
        .await?;

        if !targets.is_empty() {
            sqlx::query("UPDATE subjects SET name = $1, updated_at = NOW() WHERE id = ANY($2)")
                .bind(new_name)
                .bind(&targets)
                .execute(&mut **tx)
                .await?;
        }

        Ok(SubjectRename {
            template,
            propagated_subject_ids: targets,
        })
    }
}
