//! Static role table.
//!
//! Each role maps to a permission tier (how far its authority reaches) and the
//! navigation it is shown. The table is data, not logic: the scope resolver
//! never consults it.

use serde::Serialize;

use scholaris_models::auth::{NavItem, NavSection};
use scholaris_models::{Requester, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionTier {
    /// Every school, plus the template catalog.
    Global,
    /// One school.
    School,
    /// One class inside one school.
    Class,
    /// Own authored content inside one school.
    Staff,
    /// Own (or own children's) records.
    Personal,
}

impl PermissionTier {
    pub const fn as_str(self) -> &'static str {
        match self {
            PermissionTier::Global => "global",
            PermissionTier::School => "school",
            PermissionTier::Class => "class",
            PermissionTier::Staff => "staff",
            PermissionTier::Personal => "personal",
        }
    }
}

pub struct NavSectionDef {
    pub title: &'static str,
    pub items: &'static [(&'static str, &'static str)],
}

pub struct RoleProfile {
    pub role: Role,
    pub tier: PermissionTier,
    pub label: &'static str,
    pub navigation: &'static [NavSectionDef],
}

const DASHBOARD: NavSectionDef = NavSectionDef {
    title: "Overview",
    items: &[("Dashboard", "/dashboard")],
};

const CONTENT: NavSectionDef = NavSectionDef {
    title: "Content",
    items: &[("Homework", "/homework"), ("Live classes", "/live-classes")],
};

static PROFILES: [RoleProfile; 6] = [
    RoleProfile {
        role: Role::SuperAdmin,
        tier: PermissionTier::Global,
        label: "Super Admin",
        navigation: &[
            DASHBOARD,
            NavSectionDef {
                title: "Schools",
                items: &[("Schools", "/schools"), ("School admins", "/users?role=school_admin")],
            },
            NavSectionDef {
                title: "Templates",
                items: &[
                    ("Template classes", "/templates/classes"),
                    ("Template subjects", "/templates/subjects"),
                ],
            },
            CONTENT,
        ],
    },
    RoleProfile {
        role: Role::SchoolAdmin,
        tier: PermissionTier::School,
        label: "School Admin",
        navigation: &[
            DASHBOARD,
            NavSectionDef {
                title: "Academics",
                items: &[
                    ("Classes", "/classes"),
                    ("Subjects", "/subjects"),
                    ("Timetable", "/timetable"),
                    ("Attendance", "/attendance"),
                ],
            },
            NavSectionDef {
                title: "People",
                items: &[
                    ("Teachers", "/users?role=teacher"),
                    ("Students", "/users?role=student"),
                    ("Parents", "/users?role=parent"),
                    ("Class admins", "/class-admins"),
                ],
            },
            CONTENT,
        ],
    },
    RoleProfile {
        role: Role::ClassAdmin,
        tier: PermissionTier::Class,
        label: "Class Admin",
        navigation: &[
            DASHBOARD,
            NavSectionDef {
                title: "My class",
                items: &[("Attendance", "/attendance"), ("Timetable", "/timetable")],
            },
            CONTENT,
        ],
    },
    RoleProfile {
        role: Role::Teacher,
        tier: PermissionTier::Staff,
        label: "Teacher",
        navigation: &[
            DASHBOARD,
            NavSectionDef {
                title: "Teaching",
                items: &[("My subjects", "/subjects"), ("Timetable", "/timetable")],
            },
            CONTENT,
        ],
    },
    RoleProfile {
        role: Role::Student,
        tier: PermissionTier::Personal,
        label: "Student",
        navigation: &[
            DASHBOARD,
            NavSectionDef {
                title: "Learning",
                items: &[
                    ("Homework", "/homework"),
                    ("Live classes", "/live-classes"),
                    ("Timetable", "/timetable"),
                    ("Attendance", "/attendance"),
                ],
            },
        ],
    },
    RoleProfile {
        role: Role::Parent,
        tier: PermissionTier::Personal,
        label: "Parent",
        navigation: &[
            DASHBOARD,
            NavSectionDef {
                title: "My children",
                items: &[
                    ("Children", "/children"),
                    ("Homework", "/homework"),
                    ("Live classes", "/live-classes"),
                    ("Attendance", "/attendance"),
                ],
            },
        ],
    },
];

pub fn profile(role: Role) -> &'static RoleProfile {
    // PROFILES is ordered by role id, 1-based.
    &PROFILES[(role.id() - 1) as usize]
}

/// Navigation for the requester's effective role.
pub fn navigation_for(requester: &Requester) -> Vec<NavSection> {
    profile(requester.effective_role())
        .navigation
        .iter()
        .map(|section| NavSection {
            title: section.title,
            items: section
                .items
                .iter()
                .map(|&(label, path)| NavItem { label, path })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholaris_models::ids::{ClassId, SchoolId, UserId};

    #[test]
    fn test_profiles_are_indexed_by_role_id() {
        for role in Role::ALL {
            assert_eq!(profile(role).role, role);
        }
    }

    #[test]
    fn test_tiers() {
        assert_eq!(profile(Role::SuperAdmin).tier, PermissionTier::Global);
        assert_eq!(profile(Role::SchoolAdmin).tier, PermissionTier::School);
        assert_eq!(profile(Role::ClassAdmin).tier, PermissionTier::Class);
        assert_eq!(profile(Role::Teacher).tier, PermissionTier::Staff);
        assert_eq!(profile(Role::Student).tier, PermissionTier::Personal);
        assert_eq!(profile(Role::Parent).tier, PermissionTier::Personal);
    }

    #[test]
    fn test_class_admin_navigation_follows_flag() {
        let teacher = Requester::new(UserId(40), Role::Teacher, Some(SchoolId(2)));
        let titles: Vec<_> = navigation_for(&teacher).iter().map(|s| s.title).collect();
        assert!(titles.contains(&"Teaching"));
        assert!(!titles.contains(&"My class"));

        let class_admin = teacher.with_class_admin_of(ClassId(55));
        let titles: Vec<_> = navigation_for(&class_admin).iter().map(|s| s.title).collect();
        assert!(titles.contains(&"My class"));
    }

    #[test]
    fn test_only_super_admin_sees_templates() {
        for role in Role::ALL {
            let has_templates = profile(role)
                .navigation
                .iter()
                .any(|s| s.title == "Templates");
            assert_eq!(has_templates, role == Role::SuperAdmin, "{role}");
        }
    }
}
