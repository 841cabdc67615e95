//! Read scopes and write decisions.
//!
//! Reads are never refused: a requester's [`ReadScope`] is pushed into the
//! query as a `WHERE` fragment, and rows outside it are simply not returned.
//! Writes are decided per record by [`can_write`] and the `can_*` checks,
//! which return a [`Decision`] carrying a human-readable reason on denial.
//!
//! Owned content (homework, live classes) is keyed on the provenance tag
//! recorded at creation, never on the creator's current role:
//!
//! | owner role | modify | delete |
//! |------------|--------|--------|
//! | SuperAdmin | SuperAdmin | SuperAdmin |
//! | SchoolAdmin | SchoolAdmin of that school | SchoolAdmin of that school |
//! | Teacher | the creator, SuperAdmin, SchoolAdmin of that school | SuperAdmin, SchoolAdmin of that school |
//!
//! Students and parents never write owned content.

use std::borrow::Cow;

use serde::Serialize;

use scholaris_core::AppError;
use scholaris_models::ids::{ClassId, SchoolId, UserId};
use scholaris_models::{RecordPermissions, Requester, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    School,
    User,
    Class,
    Subject,
    ClassAdminAssignment,
    Homework,
    LiveClass,
    Attendance,
    Timetable,
}

impl EntityKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::School => "school",
            EntityKind::User => "user",
            EntityKind::Class => "class",
            EntityKind::Subject => "subject",
            EntityKind::ClassAdminAssignment => "class_admin_assignment",
            EntityKind::Homework => "homework",
            EntityKind::LiveClass => "live_class",
            EntityKind::Attendance => "attendance",
            EntityKind::Timetable => "timetable",
        }
    }

    /// Class and Subject are split into templates and school instances.
    pub const fn has_templates(self) -> bool {
        matches!(self, EntityKind::Class | EntityKind::Subject)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadScope {
    /// No narrowing.
    All,
    /// Only rows with no owning school.
    Templates,
    School(SchoolId),
    /// Rows of one school restricted to the listed classes.
    Classes {
        school_id: SchoolId,
        class_ids: Vec<ClassId>,
    },
    /// Rows about the user, or about students linked to the user as a parent.
    Personal { school_id: SchoolId, user_id: UserId },
    Nothing,
}

/// Column names an entity exposes for scope narrowing.
#[derive(Debug, Clone, Copy)]
pub struct ScopeColumns {
    pub school: &'static str,
    pub class: Option<&'static str>,
    pub student: Option<&'static str>,
}

impl ScopeColumns {
    pub const fn school(school: &'static str) -> Self {
        Self {
            school,
            class: None,
            student: None,
        }
    }

    pub const fn with_class(mut self, class: &'static str) -> Self {
        self.class = Some(class);
        self
    }

    pub const fn with_student(mut self, student: &'static str) -> Self {
        self.student = Some(student);
        self
    }
}

/// A value bound to a placeholder of a [`ScopePredicate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeBind {
    School(SchoolId),
    Classes(Vec<ClassId>),
    User(UserId),
}

/// SQL fragment with `$n` placeholders numbered from the caller's offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePredicate {
    pub sql: String,
    pub binds: Vec<ScopeBind>,
}

impl ScopePredicate {
    fn fixed(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            binds: Vec::new(),
        }
    }

    /// Index of the next free placeholder after this fragment.
    pub fn next_param(&self, first_param: usize) -> usize {
        first_param + self.binds.len()
    }
}

impl ReadScope {
    /// Renders the scope as a `WHERE` fragment. `first_param` is the number of
    /// the first placeholder this fragment may use.
    pub fn sql_predicate(&self, columns: &ScopeColumns, first_param: usize) -> ScopePredicate {
        let p = first_param;
        match self {
            ReadScope::All => ScopePredicate::fixed("TRUE"),
            ReadScope::Nothing => ScopePredicate::fixed("FALSE"),
            ReadScope::Templates => ScopePredicate::fixed(&format!("{} IS NULL", columns.school)),
            ReadScope::School(school_id) => ScopePredicate {
                sql: format!("{} = ${p}", columns.school),
                binds: vec![ScopeBind::School(*school_id)],
            },
            ReadScope::Classes {
                school_id,
                class_ids,
            } => match columns.class {
                Some(class) => ScopePredicate {
                    sql: format!("{} = ${p} AND {class} = ANY(${})", columns.school, p + 1),
                    binds: vec![
                        ScopeBind::School(*school_id),
                        ScopeBind::Classes(class_ids.clone()),
                    ],
                },
                None => ReadScope::School(*school_id).sql_predicate(columns, first_param),
            },
            ReadScope::Personal { school_id, user_id } => match columns.student {
                Some(student) => ScopePredicate {
                    sql: format!(
                        "{school} = ${p} AND ({student} = ${u} OR {student} IN \
                         (SELECT student_id FROM parent_students WHERE parent_id = ${u}))",
                        school = columns.school,
                        u = p + 1,
                    ),
                    binds: vec![ScopeBind::School(*school_id), ScopeBind::User(*user_id)],
                },
                None => ScopePredicate::fixed("FALSE"),
            },
        }
    }

    /// In-memory form of the predicate, used after loading a single row.
    ///
    /// `Personal` only admits rows about the requester; links to children are
    /// resolved in SQL.
    pub fn admits(
        &self,
        school_id: Option<SchoolId>,
        class_id: Option<ClassId>,
        student_id: Option<UserId>,
    ) -> bool {
        match self {
            ReadScope::All => true,
            ReadScope::Nothing => false,
            ReadScope::Templates => school_id.is_none(),
            ReadScope::School(s) => school_id == Some(*s),
            ReadScope::Classes {
                school_id: s,
                class_ids,
            } => school_id == Some(*s) && class_id.is_some_and(|c| class_ids.contains(&c)),
            ReadScope::Personal {
                school_id: s,
                user_id,
            } => school_id == Some(*s) && student_id == Some(*user_id),
        }
    }
}

/// The rows `requester` may see for `entity`.
pub fn read_scope(requester: &Requester, entity: EntityKind) -> ReadScope {
    if requester.is_super_admin() {
        return if entity.has_templates() {
            ReadScope::Templates
        } else {
            ReadScope::All
        };
    }

    let Some(school_id) = requester.school_id else {
        return ReadScope::Nothing;
    };

    match requester.role {
        Role::SchoolAdmin | Role::Teacher | Role::ClassAdmin => ReadScope::School(school_id),
        Role::Student | Role::Parent => match entity {
            EntityKind::School | EntityKind::Class | EntityKind::Subject => {
                ReadScope::School(school_id)
            }
            EntityKind::Homework | EntityKind::LiveClass | EntityKind::Timetable => {
                if requester.class_ids.is_empty() {
                    ReadScope::Nothing
                } else {
                    ReadScope::Classes {
                        school_id,
                        class_ids: requester.class_ids.clone(),
                    }
                }
            }
            EntityKind::Attendance => ReadScope::Personal {
                school_id,
                user_id: requester.user_id,
            },
            EntityKind::User | EntityKind::ClassAdminAssignment => ReadScope::Nothing,
        },
        Role::SuperAdmin => ReadScope::All,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    Create,
    Modify,
    Delete,
}

impl WriteAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            WriteAction::Create => "create",
            WriteAction::Modify => "modify",
            WriteAction::Delete => "delete",
        }
    }
}

/// The ownership facts of a homework or live-class row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnedRecord {
    pub owner_role: Role,
    pub school_id: SchoolId,
    pub created_by: UserId,
}

impl OwnedRecord {
    /// The record `requester` would own if it created one in `school_id`.
    pub fn authored_by(requester: &Requester, school_id: SchoolId) -> Self {
        Self {
            owner_role: requester.role,
            school_id,
            created_by: requester.user_id,
        }
    }
}

impl From<&scholaris_models::homework::Homework> for OwnedRecord {
    fn from(h: &scholaris_models::homework::Homework) -> Self {
        Self {
            owner_role: h.owner_role,
            school_id: h.school_id,
            created_by: h.created_by,
        }
    }
}

impl From<&scholaris_models::live_classes::LiveClass> for OwnedRecord {
    fn from(l: &scholaris_models::live_classes::LiveClass) -> Self {
        Self {
            owner_role: l.owner_role,
            school_id: l.school_id,
            created_by: l.created_by,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(Cow<'static, str>),
}

impl Decision {
    fn deny(reason: &'static str) -> Self {
        Decision::Deny(Cow::Borrowed(reason))
    }

    fn allow_if(cond: bool, reason: &'static str) -> Self {
        if cond { Decision::Allow } else { Decision::deny(reason) }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Deny(reason) => Some(reason.as_ref()),
        }
    }

    pub fn into_result(self) -> Result<(), AppError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::permission_denied(reason)),
        }
    }
}

fn is_school_admin_of(requester: &Requester, school_id: SchoolId) -> bool {
    requester.role == Role::SchoolAdmin && requester.belongs_to(school_id)
}

/// Super admins, or the school admin of `school_id`.
fn school_authority(requester: &Requester, school_id: SchoolId, reason: &'static str) -> Decision {
    Decision::allow_if(
        requester.is_super_admin() || is_school_admin_of(requester, school_id),
        reason,
    )
}

/// Create/modify/delete on homework and live classes.
pub fn can_write(requester: &Requester, action: WriteAction, target: &OwnedRecord) -> Decision {
    if requester.role.is_end_user() {
        return Decision::deny("Students and parents cannot change this content");
    }

    if action == WriteAction::Create {
        return Decision::allow_if(
            requester.is_super_admin() || requester.belongs_to(target.school_id),
            "You can only create content for your own school",
        );
    }

    match (target.owner_role.account_role(), action) {
        (Role::SuperAdmin, _) => Decision::allow_if(
            requester.is_super_admin(),
            "Only super admins can change content created by a super admin",
        ),
        (Role::SchoolAdmin, _) => Decision::allow_if(
            is_school_admin_of(requester, target.school_id),
            "Only the school admin of this school can change content created by a school admin",
        ),
        (Role::Teacher, WriteAction::Modify) => {
            if requester.role == Role::Teacher && requester.user_id == target.created_by {
                Decision::Allow
            } else {
                school_authority(
                    requester,
                    target.school_id,
                    "Teachers can only edit content they created",
                )
            }
        }
        (Role::Teacher, _) => school_authority(
            requester,
            target.school_id,
            "Only an administrator can delete content created by a teacher",
        ),
        _ => school_authority(
            requester,
            target.school_id,
            "Only an administrator can change this content",
        ),
    }
}

/// Edit/delete flags for one row, from the same rules as [`can_write`].
pub fn record_permissions(requester: &Requester, record: &OwnedRecord) -> RecordPermissions {
    RecordPermissions {
        can_edit: can_write(requester, WriteAction::Modify, record).is_allowed(),
        can_delete: can_write(requester, WriteAction::Delete, record).is_allowed(),
    }
}

/// Class/subject writes. `None` targets the template catalog.
pub fn can_manage_catalog(requester: &Requester, school_id: Option<SchoolId>) -> Decision {
    match school_id {
        None => Decision::allow_if(
            requester.is_super_admin(),
            "Only super admins can manage templates",
        ),
        Some(school_id) => Decision::allow_if(
            is_school_admin_of(requester, school_id),
            "Only the school admin of this school can manage its classes and subjects",
        ),
    }
}

/// Class-admin and subject-teacher assignment.
pub fn can_manage_assignments(requester: &Requester, school_id: SchoolId) -> Decision {
    school_authority(
        requester,
        school_id,
        "Only an administrator of this school can manage assignments",
    )
}

pub fn can_record_attendance(
    requester: &Requester,
    school_id: SchoolId,
    class_id: ClassId,
) -> Decision {
    Decision::allow_if(
        requester.is_super_admin()
            || is_school_admin_of(requester, school_id)
            || (requester.belongs_to(school_id) && requester.administers_class(class_id)),
        "Only administrators and the class admin of this class can record attendance",
    )
}

pub fn can_manage_timetable(requester: &Requester, school_id: SchoolId) -> Decision {
    school_authority(
        requester,
        school_id,
        "Only an administrator of this school can manage the timetable",
    )
}

pub fn can_manage_schools(requester: &Requester) -> Decision {
    Decision::allow_if(
        requester.is_super_admin(),
        "Only super admins can manage schools",
    )
}

/// Creating or deactivating an account of `target_role` in `target_school`.
pub fn can_manage_account(
    requester: &Requester,
    target_role: Role,
    target_school: Option<SchoolId>,
) -> Decision {
    match target_role {
        Role::SuperAdmin => return Decision::deny("Super admin accounts are managed from the CLI"),
        Role::ClassAdmin => {
            return Decision::deny(
                "Class admins are teachers with a class assignment; create a teacher instead",
            );
        }
        _ => {}
    }

    if requester.is_super_admin() {
        return Decision::Allow;
    }

    let in_school = target_school.is_some_and(|s| is_school_admin_of(requester, s));
    Decision::allow_if(
        in_school && target_role != Role::SchoolAdmin,
        "School admins can only manage teachers, students and parents of their own school",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHOOL_2: SchoolId = SchoolId(2);
    const SCHOOL_3: SchoolId = SchoolId(3);

    fn super_admin() -> Requester {
        Requester::new(UserId(1), Role::SuperAdmin, None)
    }

    fn school_admin(school: SchoolId) -> Requester {
        Requester::new(UserId(10 + school.get()), Role::SchoolAdmin, Some(school))
    }

    fn teacher(id: i64) -> Requester {
        Requester::new(UserId(id), Role::Teacher, Some(SCHOOL_2))
    }

    fn student() -> Requester {
        Requester::new(UserId(7), Role::Student, Some(SCHOOL_2)).with_class_ids(vec![ClassId(55)])
    }

    fn parent() -> Requester {
        Requester::new(UserId(8), Role::Parent, Some(SCHOOL_2)).with_class_ids(vec![ClassId(55)])
    }

    fn record(owner_role: Role, created_by: i64) -> OwnedRecord {
        OwnedRecord {
            owner_role,
            school_id: SCHOOL_2,
            created_by: UserId(created_by),
        }
    }

    fn allowed(r: &Requester, action: WriteAction, target: &OwnedRecord) -> bool {
        can_write(r, action, target).is_allowed()
    }

    #[test]
    fn test_teacher_homework_scenario() {
        let hw = OwnedRecord::authored_by(&teacher(40), SCHOOL_2);
        assert_eq!(hw.owner_role, Role::Teacher);

        assert!(allowed(&teacher(40), WriteAction::Modify, &hw));
        let denied = can_write(&teacher(40), WriteAction::Delete, &hw);
        assert!(!denied.is_allowed());
        assert!(denied.reason().unwrap().contains("delete"));
        assert!(allowed(&school_admin(SCHOOL_2), WriteAction::Delete, &hw));
    }

    #[test]
    fn test_school_admin_live_class_scenario() {
        let lc = OwnedRecord::authored_by(&school_admin(SCHOOL_2), SCHOOL_2);

        assert!(!allowed(&super_admin(), WriteAction::Delete, &lc));
        assert!(!allowed(&super_admin(), WriteAction::Modify, &lc));
        assert!(!allowed(&school_admin(SCHOOL_3), WriteAction::Delete, &lc));
        assert!(allowed(&school_admin(SCHOOL_2), WriteAction::Delete, &lc));
    }

    #[test]
    fn test_super_admin_content_is_super_admin_only() {
        let target = record(Role::SuperAdmin, 1);
        for action in [WriteAction::Modify, WriteAction::Delete] {
            assert!(allowed(&super_admin(), action, &target));
            assert!(!allowed(&school_admin(SCHOOL_2), action, &target));
            assert!(!allowed(&teacher(40), action, &target));
        }
    }

    #[test]
    fn test_other_teacher_cannot_modify() {
        let target = record(Role::Teacher, 40);
        assert!(!allowed(&teacher(41), WriteAction::Modify, &target));
        assert!(!allowed(&teacher(41), WriteAction::Delete, &target));
    }

    #[test]
    fn test_teacher_content_admin_rights() {
        let target = record(Role::Teacher, 40);
        for action in [WriteAction::Modify, WriteAction::Delete] {
            assert!(allowed(&super_admin(), action, &target));
            assert!(allowed(&school_admin(SCHOOL_2), action, &target));
            assert!(!allowed(&school_admin(SCHOOL_3), action, &target));
        }
    }

    #[test]
    fn test_class_admin_tag_is_treated_as_teacher() {
        let target = record(Role::ClassAdmin, 40);
        let class_admin = teacher(40).with_class_admin_of(ClassId(55));
        assert!(allowed(&class_admin, WriteAction::Modify, &target));
        assert!(!allowed(&class_admin, WriteAction::Delete, &target));
    }

    #[test]
    fn test_end_users_never_write() {
        for requester in [student(), parent()] {
            for owner in Role::ALL {
                for action in [WriteAction::Create, WriteAction::Modify, WriteAction::Delete] {
                    let target = record(owner, requester.user_id.get());
                    assert!(!allowed(&requester, action, &target));
                }
            }
        }
    }

    #[test]
    fn test_create_is_limited_to_own_school() {
        let in_3 = |r: &Requester| OwnedRecord::authored_by(r, SCHOOL_3);
        assert!(allowed(&super_admin(), WriteAction::Create, &in_3(&super_admin())));
        assert!(!allowed(&teacher(40), WriteAction::Create, &in_3(&teacher(40))));
        assert!(allowed(
            &teacher(40),
            WriteAction::Create,
            &OwnedRecord::authored_by(&teacher(40), SCHOOL_2)
        ));
        let sa = school_admin(SCHOOL_2);
        assert!(!allowed(&sa, WriteAction::Create, &in_3(&sa)));
    }

    #[test]
    fn test_record_permissions_match_can_write() {
        let target = record(Role::Teacher, 40);
        assert_eq!(
            record_permissions(&teacher(40), &target),
            RecordPermissions {
                can_edit: true,
                can_delete: false
            }
        );
        assert_eq!(
            record_permissions(&school_admin(SCHOOL_2), &target),
            RecordPermissions {
                can_edit: true,
                can_delete: true
            }
        );
        assert_eq!(
            record_permissions(&student(), &target),
            RecordPermissions::default()
        );
    }

    #[test]
    fn test_denial_renders_as_permission_denied() {
        let err = can_write(&teacher(40), WriteAction::Delete, &record(Role::Teacher, 40))
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind, scholaris_core::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_read_scope_by_role() {
        assert_eq!(read_scope(&super_admin(), EntityKind::Homework), ReadScope::All);
        assert_eq!(read_scope(&super_admin(), EntityKind::Class), ReadScope::Templates);
        assert_eq!(read_scope(&super_admin(), EntityKind::Subject), ReadScope::Templates);
        assert_eq!(
            read_scope(&school_admin(SCHOOL_2), EntityKind::LiveClass),
            ReadScope::School(SCHOOL_2)
        );
        assert_eq!(
            read_scope(&teacher(40), EntityKind::Homework),
            ReadScope::School(SCHOOL_2)
        );
        assert_eq!(
            read_scope(&student(), EntityKind::LiveClass),
            ReadScope::Classes {
                school_id: SCHOOL_2,
                class_ids: vec![ClassId(55)]
            }
        );
        assert_eq!(
            read_scope(&parent(), EntityKind::Attendance),
            ReadScope::Personal {
                school_id: SCHOOL_2,
                user_id: UserId(8)
            }
        );
        assert_eq!(read_scope(&student(), EntityKind::User), ReadScope::Nothing);
    }

    #[test]
    fn test_read_scope_without_school_is_nothing() {
        let orphan = Requester::new(UserId(9), Role::Teacher, None);
        assert_eq!(read_scope(&orphan, EntityKind::Homework), ReadScope::Nothing);

        let unenrolled = Requester::new(UserId(9), Role::Student, Some(SCHOOL_2));
        assert_eq!(read_scope(&unenrolled, EntityKind::Homework), ReadScope::Nothing);
    }

    #[test]
    fn test_sql_predicates() {
        let cols = ScopeColumns::school("h.school_id").with_class("h.class_id");

        assert_eq!(ReadScope::All.sql_predicate(&cols, 1).sql, "TRUE");
        assert_eq!(ReadScope::Nothing.sql_predicate(&cols, 1).sql, "FALSE");
        assert_eq!(
            ReadScope::Templates.sql_predicate(&cols, 1).sql,
            "h.school_id IS NULL"
        );

        let school = ReadScope::School(SCHOOL_2).sql_predicate(&cols, 3);
        assert_eq!(school.sql, "h.school_id = $3");
        assert_eq!(school.binds, vec![ScopeBind::School(SCHOOL_2)]);
        assert_eq!(school.next_param(3), 4);

        let classes = ReadScope::Classes {
            school_id: SCHOOL_2,
            class_ids: vec![ClassId(55)],
        }
        .sql_predicate(&cols, 1);
        assert_eq!(classes.sql, "h.school_id = $1 AND h.class_id = ANY($2)");
        assert_eq!(classes.binds.len(), 2);
    }

    #[test]
    fn test_class_scope_without_class_column_falls_back_to_school() {
        let cols = ScopeColumns::school("c.school_id");
        let p = ReadScope::Classes {
            school_id: SCHOOL_2,
            class_ids: vec![ClassId(55)],
        }
        .sql_predicate(&cols, 1);
        assert_eq!(p.sql, "c.school_id = $1");
    }

    #[test]
    fn test_personal_predicate_includes_children() {
        let cols = ScopeColumns::school("a.school_id").with_student("a.student_id");
        let p = ReadScope::Personal {
            school_id: SCHOOL_2,
            user_id: UserId(8),
        }
        .sql_predicate(&cols, 2);
        assert!(p.sql.starts_with("a.school_id = $2 AND (a.student_id = $3"));
        assert!(p.sql.contains("parent_id = $3"));
        assert_eq!(
            p.binds,
            vec![ScopeBind::School(SCHOOL_2), ScopeBind::User(UserId(8))]
        );
    }

    #[test]
    fn test_admits() {
        let classes = ReadScope::Classes {
            school_id: SCHOOL_2,
            class_ids: vec![ClassId(55)],
        };
        assert!(classes.admits(Some(SCHOOL_2), Some(ClassId(55)), None));
        assert!(!classes.admits(Some(SCHOOL_2), Some(ClassId(56)), None));
        assert!(!classes.admits(Some(SCHOOL_3), Some(ClassId(55)), None));

        assert!(ReadScope::Templates.admits(None, None, None));
        assert!(!ReadScope::Templates.admits(Some(SCHOOL_2), None, None));
        assert!(!ReadScope::Nothing.admits(Some(SCHOOL_2), None, None));
    }

    #[test]
    fn test_catalog_writes() {
        assert!(can_manage_catalog(&super_admin(), None).is_allowed());
        assert!(!can_manage_catalog(&super_admin(), Some(SCHOOL_2)).is_allowed());
        assert!(can_manage_catalog(&school_admin(SCHOOL_2), Some(SCHOOL_2)).is_allowed());
        assert!(!can_manage_catalog(&school_admin(SCHOOL_2), Some(SCHOOL_3)).is_allowed());
        assert!(!can_manage_catalog(&school_admin(SCHOOL_2), None).is_allowed());
        assert!(!can_manage_catalog(&teacher(40), Some(SCHOOL_2)).is_allowed());
    }

    #[test]
    fn test_attendance_rights() {
        let class_admin = teacher(40).with_class_admin_of(ClassId(55));
        assert!(can_record_attendance(&class_admin, SCHOOL_2, ClassId(55)).is_allowed());
        assert!(!can_record_attendance(&class_admin, SCHOOL_2, ClassId(56)).is_allowed());
        assert!(!can_record_attendance(&teacher(41), SCHOOL_2, ClassId(55)).is_allowed());
        assert!(can_record_attendance(&school_admin(SCHOOL_2), SCHOOL_2, ClassId(56)).is_allowed());
        assert!(can_record_attendance(&super_admin(), SCHOOL_3, ClassId(56)).is_allowed());
    }

    #[test]
    fn test_assignment_and_timetable_rights() {
        assert!(can_manage_assignments(&super_admin(), SCHOOL_2).is_allowed());
        assert!(can_manage_assignments(&school_admin(SCHOOL_2), SCHOOL_2).is_allowed());
        assert!(!can_manage_assignments(&school_admin(SCHOOL_3), SCHOOL_2).is_allowed());
        assert!(!can_manage_assignments(&teacher(40), SCHOOL_2).is_allowed());
        assert!(!can_manage_timetable(&teacher(40), SCHOOL_2).is_allowed());
        assert!(can_manage_timetable(&school_admin(SCHOOL_2), SCHOOL_2).is_allowed());
    }

    #[test]
    fn test_account_management() {
        let sa = school_admin(SCHOOL_2);
        assert!(can_manage_account(&sa, Role::Teacher, Some(SCHOOL_2)).is_allowed());
        assert!(can_manage_account(&sa, Role::Parent, Some(SCHOOL_2)).is_allowed());
        assert!(!can_manage_account(&sa, Role::Teacher, Some(SCHOOL_3)).is_allowed());
        assert!(!can_manage_account(&sa, Role::SchoolAdmin, Some(SCHOOL_2)).is_allowed());
        assert!(can_manage_account(&super_admin(), Role::SchoolAdmin, Some(SCHOOL_3)).is_allowed());
        assert!(!can_manage_account(&super_admin(), Role::SuperAdmin, None).is_allowed());
        assert!(!can_manage_account(&super_admin(), Role::ClassAdmin, Some(SCHOOL_2)).is_allowed());
        assert!(!can_manage_account(&teacher(40), Role::Student, Some(SCHOOL_2)).is_allowed());
    }
}
