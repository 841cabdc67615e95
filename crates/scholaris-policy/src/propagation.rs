//! Name-keyed matching between template and school records.
//!
//! School copies of a template class or subject keep no reference back to
//! the template. Every link between them, and between same-named classes of
//! different schools, is an exact name match done by [`find_by_name_in_scope`].
//!
//! The match is a heuristic. A school subject that was created independently
//! but happens to share both its own name and its class's name with a
//! template is indistinguishable from a copy, and a template rename will
//! rename it too.

use std::collections::HashSet;

use scholaris_models::classes::Class;
use scholaris_models::ids::{ClassId, SchoolId, SubjectId};
use scholaris_models::subjects::{Subject, SubjectPlacement};

pub trait NamedRecord {
    fn name(&self) -> &str;
    fn school_id(&self) -> Option<SchoolId>;
    /// Enclosing class, for records that have one.
    fn class_id(&self) -> Option<ClassId>;
    fn is_active(&self) -> bool;
}

impl NamedRecord for Class {
    fn name(&self) -> &str {
        &self.name
    }

    fn school_id(&self) -> Option<SchoolId> {
        self.school_id
    }

    fn class_id(&self) -> Option<ClassId> {
        None
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl NamedRecord for Subject {
    fn name(&self) -> &str {
        &self.name
    }

    fn school_id(&self) -> Option<SchoolId> {
        self.school_id
    }

    fn class_id(&self) -> Option<ClassId> {
        self.class_id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameScope {
    Templates,
    School(SchoolId),
    Class(ClassId),
}

impl NameScope {
    fn contains<T: NamedRecord>(self, record: &T) -> bool {
        match self {
            NameScope::Templates => record.school_id().is_none(),
            NameScope::School(school_id) => record.school_id() == Some(school_id),
            NameScope::Class(class_id) => record.class_id() == Some(class_id),
        }
    }
}

/// First active record in `scope` whose name equals `name` exactly.
pub fn find_by_name_in_scope<'a, T: NamedRecord>(
    records: &'a [T],
    name: &str,
    scope: NameScope,
) -> Option<&'a T> {
    records
        .iter()
        .find(|r| r.is_active() && r.name() == name && scope.contains(*r))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectCopyPlan {
    /// Names to insert under the school class, in template order.
    pub to_create: Vec<String>,
    pub skipped: usize,
}

/// Which active template subjects of `template_class_id` still need a copy
/// under `instance_class_id`. Existing same-named subjects are reused.
pub fn plan_subject_copies(
    template_subjects: &[Subject],
    template_class_id: ClassId,
    existing: &[Subject],
    instance_class_id: ClassId,
) -> SubjectCopyPlan {
    let mut plan = SubjectCopyPlan::default();
    let mut planned = HashSet::new();

    for template in template_subjects.iter().filter(|s| {
        s.is_active && s.is_template() && s.class_id == Some(template_class_id)
    }) {
        let present =
            find_by_name_in_scope(existing, &template.name, NameScope::Class(instance_class_id))
                .is_some();

        if present || !planned.insert(template.name.as_str()) {
            plan.skipped += 1;
        } else {
            plan.to_create.push(template.name.clone());
        }
    }

    plan
}

/// School subjects a template rename reaches: active instances named
/// `old_name` inside a class named `template_class_name`.
pub fn rename_targets(
    old_name: &str,
    template_class_name: &str,
    candidates: &[SubjectPlacement],
) -> Vec<SubjectId> {
    candidates
        .iter()
        .filter(|c| {
            c.school_id.is_some()
                && c.is_active
                && c.name == old_name
                && c.class_name == template_class_name
        })
        .map(|c| c.id)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchoolMatch {
    pub school_id: SchoolId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossSchoolMatch {
    pub matched: Vec<SchoolMatch>,
    /// Targets without a same-named class, or whose class lacks the subject.
    pub skipped: Vec<SchoolId>,
}

/// Resolves one (class name, subject name) selection in every target school.
///
/// A school that cannot be matched is reported in `skipped` and the others
/// still match. Duplicate targets are considered once.
pub fn match_across_schools(
    class_name: &str,
    subject_name: &str,
    target_school_ids: &[SchoolId],
    classes: &[Class],
    subjects: &[Subject],
) -> CrossSchoolMatch {
    let mut result = CrossSchoolMatch::default();
    let mut seen = HashSet::new();

    for &school_id in target_school_ids {
        if !seen.insert(school_id) {
            continue;
        }

        let matched = find_by_name_in_scope(classes, class_name, NameScope::School(school_id))
            .and_then(|class| {
                find_by_name_in_scope(subjects, subject_name, NameScope::Class(class.id))
                    .filter(|s| s.school_id == Some(school_id))
                    .map(|subject| SchoolMatch {
                        school_id,
                        class_id: class.id,
                        subject_id: subject.id,
                    })
            });

        match matched {
            Some(m) => result.matched.push(m),
            None => result.skipped.push(school_id),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn class(id: i64, name: &str, school: Option<i64>) -> Class {
        Class {
            id: ClassId(id),
            name: name.to_string(),
            school_id: school.map(SchoolId),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn subject(id: i64, name: &str, class_id: i64, school: Option<i64>) -> Subject {
        Subject {
            id: SubjectId(id),
            name: name.to_string(),
            class_id: Some(ClassId(class_id)),
            school_id: school.map(SchoolId),
            teacher_id: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn placement(id: i64, name: &str, school: i64, class_name: &str) -> SubjectPlacement {
        SubjectPlacement {
            id: SubjectId(id),
            name: name.to_string(),
            school_id: Some(SchoolId(school)),
            class_id: Some(ClassId(id * 10)),
            class_name: class_name.to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_find_by_name_respects_scope() {
        let classes = vec![
            class(10, "Class 6", None),
            class(55, "Class 6", Some(2)),
            class(56, "Class 6", Some(3)),
        ];

        let found = find_by_name_in_scope(&classes, "Class 6", NameScope::School(SchoolId(3))).unwrap();
        assert_eq!(found.id, ClassId(56));
        let template = find_by_name_in_scope(&classes, "Class 6", NameScope::Templates).unwrap();
        assert_eq!(template.id, ClassId(10));
        assert!(find_by_name_in_scope(&classes, "Class 6", NameScope::School(SchoolId(4))).is_none());
    }

    #[test]
    fn test_find_by_name_is_exact_and_skips_inactive() {
        let mut inactive = class(57, "Class 7", Some(2));
        inactive.is_active = false;
        let classes = vec![class(55, "Class 6", Some(2)), inactive];

        assert!(find_by_name_in_scope(&classes, "class 6", NameScope::School(SchoolId(2))).is_none());
        assert!(find_by_name_in_scope(&classes, "Class 6 ", NameScope::School(SchoolId(2))).is_none());
        assert!(find_by_name_in_scope(&classes, "Class 7", NameScope::School(SchoolId(2))).is_none());
    }

    #[test]
    fn test_plan_copies_every_template_subject() {
        let templates = vec![
            subject(100, "Math", 10, None),
            subject(101, "English", 10, None),
            subject(102, "Physics", 11, None),
        ];

        let plan = plan_subject_copies(&templates, ClassId(10), &[], ClassId(55));
        assert_eq!(plan.to_create, vec!["Math", "English"]);
        assert_eq!(plan.skipped, 0);
    }

    #[test]
    fn test_plan_is_idempotent() {
        let templates = vec![
            subject(100, "Math", 10, None),
            subject(101, "English", 10, None),
        ];
        let existing = vec![
            subject(200, "Math", 55, Some(2)),
            subject(201, "English", 55, Some(2)),
        ];

        let plan = plan_subject_copies(&templates, ClassId(10), &existing, ClassId(55));
        assert!(plan.to_create.is_empty());
        assert_eq!(plan.skipped, 2);
    }

    #[test]
    fn test_plan_ignores_subjects_of_other_classes() {
        let templates = vec![subject(100, "Math", 10, None)];
        let existing = vec![subject(200, "Math", 56, Some(2))];

        let plan = plan_subject_copies(&templates, ClassId(10), &existing, ClassId(55));
        assert_eq!(plan.to_create, vec!["Math"]);
    }

    #[test]
    fn test_plan_collapses_duplicate_template_names() {
        let templates = vec![subject(100, "Math", 10, None), subject(101, "Math", 10, None)];

        let plan = plan_subject_copies(&templates, ClassId(10), &[], ClassId(55));
        assert_eq!(plan.to_create, vec!["Math"]);
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn test_plan_skips_inactive_templates() {
        let mut retired = subject(101, "Latin", 10, None);
        retired.is_active = false;
        let templates = vec![subject(100, "Math", 10, None), retired];

        let plan = plan_subject_copies(&templates, ClassId(10), &[], ClassId(55));
        assert_eq!(plan.to_create, vec!["Math"]);
    }

    #[test]
    fn test_rename_targets_match_subject_and_class_names() {
        let candidates = vec![
            placement(200, "Math", 2, "Class 6"),
            placement(201, "Math", 3, "Class 6"),
            placement(202, "Math", 2, "Class 7"),
            placement(203, "Maths", 2, "Class 6"),
        ];

        let targets = rename_targets("Math", "Class 6", &candidates);
        assert_eq!(targets, vec![SubjectId(200), SubjectId(201)]);
    }

    #[test]
    fn test_rename_reaches_unrelated_subject_with_colliding_names() {
        // School 3 created its own "Class 6" and "Math" without copying the
        // template. Names are the only link, so the rename reaches it too.
        let copied = placement(200, "Math", 2, "Class 6");
        let independent = placement(300, "Math", 3, "Class 6");

        let targets = rename_targets("Math", "Class 6", &[copied, independent]);
        assert!(targets.contains(&SubjectId(300)));
    }

    #[test]
    fn test_rename_skips_templates_and_inactive_rows() {
        let mut template = placement(100, "Math", 0, "Class 6");
        template.school_id = None;
        let mut inactive = placement(201, "Math", 2, "Class 6");
        inactive.is_active = false;

        assert!(rename_targets("Math", "Class 6", &[template, inactive]).is_empty());
    }

    #[test]
    fn test_match_across_schools_skips_partial_matches() {
        let classes = vec![
            class(55, "Class 6", Some(2)),
            class(56, "Class 6", Some(3)),
            class(57, "Class 5", Some(4)),
        ];
        let subjects = vec![
            subject(200, "Math", 55, Some(2)),
            subject(201, "English", 56, Some(3)),
        ];

        let result = match_across_schools(
            "Class 6",
            "Math",
            &[SchoolId(2), SchoolId(3), SchoolId(4), SchoolId(2)],
            &classes,
            &subjects,
        );

        assert_eq!(
            result.matched,
            vec![SchoolMatch {
                school_id: SchoolId(2),
                class_id: ClassId(55),
                subject_id: SubjectId(200),
            }]
        );
        assert_eq!(result.skipped, vec![SchoolId(3), SchoolId(4)]);
    }
}
