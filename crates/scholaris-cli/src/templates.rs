//! Template catalog seeding.
//!
//! Seeding is idempotent: an active template class or subject with the same
//! name is reused, so running the command twice creates nothing the second
//! time.

use anyhow::Result;
use scholaris_models::classes::Class;
use scholaris_models::ids::ClassId;
use scholaris_models::subjects::Subject;
use scholaris_policy::propagation::{NameScope, find_by_name_in_scope};
use sqlx::{PgPool, Postgres, Transaction};

pub const STANDARD_SUBJECTS: &[&str] = &[
    "Mathematics",
    "English",
    "Science",
    "Social Studies",
    "Computer Science",
    "Physical Education",
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub classes_created: usize,
    pub subjects_created: usize,
    pub subjects_existing: usize,
}

pub fn class_names(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("Class {n}")).collect()
}

pub async fn seed_templates(db: &PgPool, class_count: usize, subjects: &[&str]) -> Result<SeedReport> {
    let mut tx = db.begin().await?;
    let mut report = SeedReport::default();

    let classes = sqlx::query_as::<_, Class>(
        "SELECT id, name, school_id, is_active, created_at, updated_at
         FROM classes WHERE school_id IS NULL AND is_active",
    )
    .fetch_all(&mut *tx)
    .await?;

    let existing_subjects = sqlx::query_as::<_, Subject>(
        "SELECT id, name, class_id, school_id, teacher_id, is_active, created_at, updated_at
         FROM subjects WHERE school_id IS NULL AND is_active",
    )
    .fetch_all(&mut *tx)
    .await?;

    for name in class_names(class_count) {
        let class_id = match find_by_name_in_scope(&classes, &name, NameScope::Templates) {
            Some(class) => class.id,
            None => {
                report.classes_created += 1;
                insert_class(&mut tx, &name).await?
            }
        };

        for &subject in subjects {
            if find_by_name_in_scope(&existing_subjects, subject, NameScope::Class(class_id)).is_some() {
                report.subjects_existing += 1;
                continue;
            }

            sqlx::query("INSERT INTO subjects (name, class_id, school_id) VALUES ($1, $2, NULL)")
                .bind(subject)
                .bind(class_id)
                .execute(&mut *tx)
                .await?;
            report.subjects_created += 1;
        }
    }

    tx.commit().await?;
    Ok(report)
}

async fn insert_class(tx: &mut Transaction<'_, Postgres>, name: &str) -> Result<ClassId> {
    let id = sqlx::query_scalar::<_, ClassId>(
        "INSERT INTO classes (name, school_id) VALUES ($1, NULL) RETURNING id",
    )
    .bind(name)
    .fetch_one(&mut **tx)
    .await?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_class_names() {
        assert_eq!(class_names(3), vec!["Class 1", "Class 2", "Class 3"]);
        assert!(class_names(0).is_empty());
    }

    #[test]
    fn test_standard_subjects_are_unique() {
        let unique: HashSet<_> = STANDARD_SUBJECTS.iter().collect();
        assert_eq!(unique.len(), STANDARD_SUBJECTS.len());
    }
}
