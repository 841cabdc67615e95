//! Pre-commit checks for assignments and class/subject references.
//!
//! These checks run on rows loaded inside the same transaction as the write
//! they protect. The store's unique constraints on `class_admin_profiles`
//! remain the final authority when two writers race.

use std::collections::HashSet;

use chrono::NaiveTime;
use scholaris_core::AppError;
use scholaris_models::class_admins::ClassAdminAssignment;
use scholaris_models::classes::Class;
use scholaris_models::ids::{SchoolId, SubjectId, UserId};
use scholaris_models::subjects::Subject;

/// The class and subject a homework, live class or timetable entry points at
/// must both be active and belong to `school_id`, and the subject must belong
/// to the class.
pub fn check_class_subject_scope(
    school_id: SchoolId,
    class: &Class,
    subject: &Subject,
) -> Result<(), AppError> {
    if !class.is_active || class.school_id != Some(school_id) {
        return Err(AppError::validation(
            "The selected class does not belong to this school",
        ));
    }
    if !subject.is_active || subject.school_id != Some(school_id) {
        return Err(AppError::validation(
            "The selected subject does not belong to this school",
        ));
    }
    if subject.class_id != Some(class.id) {
        return Err(AppError::validation(
            "The selected subject does not belong to the selected class",
        ));
    }
    Ok(())
}

/// A subject is a template exactly when its class is, and an instance
/// subject lives in its class's school.
pub fn check_subject_parent(subject_school: Option<SchoolId>, class: &Class) -> Result<(), AppError> {
    if !class.is_active {
        return Err(AppError::validation("The selected class is not active"));
    }
    match (subject_school, class.school_id) {
        (None, None) => Ok(()),
        (Some(a), Some(b)) if a == b => Ok(()),
        (None, Some(_)) => Err(AppError::validation(
            "Template subjects must belong to a template class",
        )),
        (Some(_), None) => Err(AppError::validation(
            "School subjects cannot be added to a template class",
        )),
        (Some(_), Some(_)) => Err(AppError::validation(
            "The selected class belongs to another school",
        )),
    }
}

/// Fails when the class is administered by someone other than `teacher_id`.
pub fn ensure_class_free(
    existing: Option<&ClassAdminAssignment>,
    teacher_id: UserId,
) -> Result<(), AppError> {
    match existing {
        Some(assignment) if assignment.teacher_id != teacher_id => Err(AppError::conflict(
            "This class already has a class admin",
        )),
        _ => Ok(()),
    }
}

/// Active classes with no admin, or administered by `teacher_id`.
pub fn assignable_classes<'a>(
    classes: &'a [Class],
    assignments: &[ClassAdminAssignment],
    teacher_id: UserId,
) -> Vec<&'a Class> {
    classes
        .iter()
        .filter(|class| class.is_active && !class.is_template())
        .filter(|class| {
            assignments
                .iter()
                .find(|a| a.class_id == class.id)
                .is_none_or(|a| a.teacher_id == teacher_id)
        })
        .collect()
}

/// Validates a requested subject set against the rows found for it and
/// returns the de-duplicated ids. Every id must exist as an active subject
/// of `school_id`.
pub fn check_subject_set(
    school_id: SchoolId,
    requested: &[SubjectId],
    found: &[Subject],
) -> Result<Vec<SubjectId>, AppError> {
    let mut seen = HashSet::new();
    let unique: Vec<SubjectId> = requested
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect();

    for id in &unique {
        let valid = found
            .iter()
            .any(|s| s.id == *id && s.is_active && s.school_id == Some(school_id));
        if !valid {
            return Err(AppError::validation(format!(
                "Subject {id} is not an active subject of this school"
            )));
        }
    }

    Ok(unique)
}

pub fn check_timetable_slot(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::validation("End time must be after start time"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scholaris_core::ErrorKind;
    use scholaris_models::ids::{ClassAdminAssignmentId, ClassId};

    fn class(id: i64, school: Option<i64>) -> Class {
        Class {
            id: ClassId(id),
            name: format!("Class {id}"),
            school_id: school.map(SchoolId),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn subject(id: i64, class_id: i64, school: Option<i64>) -> Subject {
        Subject {
            id: SubjectId(id),
            name: "Math".to_string(),
            class_id: Some(ClassId(class_id)),
            school_id: school.map(SchoolId),
            teacher_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn assignment(teacher: i64, class_id: i64) -> ClassAdminAssignment {
        ClassAdminAssignment {
            id: ClassAdminAssignmentId(1),
            teacher_id: UserId(teacher),
            class_id: ClassId(class_id),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_class_subject_scope() {
        let s2 = SchoolId(2);
        assert!(check_class_subject_scope(s2, &class(55, Some(2)), &subject(200, 55, Some(2))).is_ok());

        let wrong_school = check_class_subject_scope(s2, &class(56, Some(3)), &subject(200, 56, Some(3)));
        assert_eq!(wrong_school.unwrap_err().kind, ErrorKind::Validation);

        let wrong_class = check_class_subject_scope(s2, &class(55, Some(2)), &subject(201, 57, Some(2)));
        assert!(wrong_class.unwrap_err().public_message().contains("selected class"));

        let mut retired = subject(200, 55, Some(2));
        retired.is_active = false;
        assert!(check_class_subject_scope(s2, &class(55, Some(2)), &retired).is_err());
    }

    #[test]
    fn test_subject_parent_templateness_must_match() {
        assert!(check_subject_parent(None, &class(10, None)).is_ok());
        assert!(check_subject_parent(Some(SchoolId(2)), &class(55, Some(2))).is_ok());
        assert!(check_subject_parent(None, &class(55, Some(2))).is_err());
        assert!(check_subject_parent(Some(SchoolId(2)), &class(10, None)).is_err());
        assert!(check_subject_parent(Some(SchoolId(3)), &class(55, Some(2))).is_err());
    }

    #[test]
    fn test_ensure_class_free() {
        assert!(ensure_class_free(None, UserId(40)).is_ok());
        assert!(ensure_class_free(Some(&assignment(40, 55)), UserId(40)).is_ok());

        let err = ensure_class_free(Some(&assignment(40, 55)), UserId(41)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[test]
    fn test_assignable_classes_hide_other_admins() {
        let classes = vec![class(55, Some(2)), class(56, Some(2)), class(57, Some(2))];
        let assignments = vec![assignment(40, 55), assignment(41, 56)];

        let ids: Vec<_> = assignable_classes(&classes, &assignments, UserId(40))
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![ClassId(55), ClassId(57)]);
    }

    #[test]
    fn test_assignable_classes_skip_templates_and_inactive() {
        let mut inactive = class(56, Some(2));
        inactive.is_active = false;
        let classes = vec![class(10, None), inactive, class(57, Some(2))];

        let ids: Vec<_> = assignable_classes(&classes, &[], UserId(40))
            .iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![ClassId(57)]);
    }

    #[test]
    fn test_subject_set_dedupes_and_validates() {
        let found = vec![subject(5, 55, Some(2)), subject(7, 55, Some(2))];
        let ids = check_subject_set(
            SchoolId(2),
            &[SubjectId(5), SubjectId(7), SubjectId(5)],
            &found,
        )
        .unwrap();
        assert_eq!(ids, vec![SubjectId(5), SubjectId(7)]);

        assert!(check_subject_set(SchoolId(2), &[SubjectId(9)], &found).is_err());
        assert!(check_subject_set(SchoolId(3), &[SubjectId(5)], &found).is_err());
        assert_eq!(check_subject_set(SchoolId(2), &[], &found).unwrap(), vec![]);
    }

    #[test]
    fn test_template_subjects_cannot_be_taught() {
        let found = vec![subject(100, 10, None)];
        assert!(check_subject_set(SchoolId(2), &[SubjectId(100)], &found).is_err());
    }

    #[test]
    fn test_timetable_slot() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        assert!(check_timetable_slot(t(8), t(9)).is_ok());
        assert!(check_timetable_slot(t(9), t(9)).is_err());
        assert!(check_timetable_slot(t(10), t(9)).is_err());
    }
}
