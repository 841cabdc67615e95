//! The closed set of user roles.
//!
//! Roles are persisted as `SMALLINT` ids (`users.role_id`, and the provenance
//! tag `homework.owner_role` / `live_classes.owner_role`). Comparisons are
//! always made on the enum, never on the raw number.
//!
//! | id | role | kind |
//! |----|------|------|
//! | 1 | SuperAdmin | staff |
//! | 2 | SchoolAdmin | staff |
//! | 3 | ClassAdmin | staff (a Teacher flagged as the admin of one class) |
//! | 4 | Teacher | staff |
//! | 5 | Student | end user |
//! | 6 | Parent | end user |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum Role {
    SuperAdmin = 1,
    SchoolAdmin = 2,
    ClassAdmin = 3,
    Teacher = 4,
    Student = 5,
    Parent = 6,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::SuperAdmin,
        Role::SchoolAdmin,
        Role::ClassAdmin,
        Role::Teacher,
        Role::Student,
        Role::Parent,
    ];

    pub const fn id(self) -> i16 {
        self as i16
    }

    pub fn from_id(id: i16) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.id() == id)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::SchoolAdmin => "school_admin",
            Role::ClassAdmin => "class_admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Parent => "parent",
        }
    }

    /// Roles 1-4.
    pub const fn is_staff(self) -> bool {
        matches!(
            self,
            Role::SuperAdmin | Role::SchoolAdmin | Role::ClassAdmin | Role::Teacher
        )
    }

    /// Roles 5-6.
    pub const fn is_end_user(self) -> bool {
        !self.is_staff()
    }

    /// ClassAdmin is not an account type: it is stored as Teacher plus an
    /// assignment row. Anything keyed on accounts or provenance uses this.
    pub const fn account_role(self) -> Role {
        match self {
            Role::ClassAdmin => Role::Teacher,
            other => other,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role: {}", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable() {
        assert_eq!(Role::SuperAdmin.id(), 1);
        assert_eq!(Role::SchoolAdmin.id(), 2);
        assert_eq!(Role::ClassAdmin.id(), 3);
        assert_eq!(Role::Teacher.id(), 4);
        assert_eq!(Role::Student.id(), 5);
        assert_eq!(Role::Parent.id(), 6);
    }

    #[test]
    fn test_from_id() {
        for role in Role::ALL {
            assert_eq!(Role::from_id(role.id()), Some(role));
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(7), None);
    }

    #[test]
    fn test_staff_and_end_users() {
        let staff: Vec<Role> = Role::ALL.into_iter().filter(|r| r.is_staff()).collect();
        assert_eq!(
            staff,
            vec![
                Role::SuperAdmin,
                Role::SchoolAdmin,
                Role::ClassAdmin,
                Role::Teacher
            ]
        );
        assert!(Role::Student.is_end_user());
        assert!(Role::Parent.is_end_user());
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert!("principal".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SchoolAdmin).unwrap(),
            r#""school_admin""#
        );
        let role: Role = serde_json::from_str(r#""class_admin""#).unwrap();
        assert_eq!(role, Role::ClassAdmin);
    }

    #[test]
    fn test_class_admin_accounts_are_teachers() {
        assert_eq!(Role::ClassAdmin.account_role(), Role::Teacher);
        assert_eq!(Role::Parent.account_role(), Role::Parent);
    }
}
