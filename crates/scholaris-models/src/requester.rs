//! The identity every authorization decision is computed from.
//!
//! A `Requester` is built once per request by the session layer and passed
//! explicitly to every policy and service call. Nothing reads identity from
//! ambient state.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ids::{ClassId, SchoolId, UserId};
use crate::roles::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Requester {
    pub user_id: UserId,
    /// Account role. A class administrator is a `Teacher` with `is_class_admin` set.
    pub role: Role,
    /// Home school. `None` only for super admins.
    pub school_id: Option<SchoolId>,
    pub is_class_admin: bool,
    pub class_admin_of: Option<ClassId>,
    /// Classes an end user follows: a student's own class, or the classes of a
    /// parent's linked children. Empty for staff.
    #[serde(default)]
    pub class_ids: Vec<ClassId>,
}

impl Requester {
    pub fn new(user_id: UserId, role: Role, school_id: Option<SchoolId>) -> Self {
        Self {
            user_id,
            role: role.account_role(),
            school_id,
            is_class_admin: false,
            class_admin_of: None,
            class_ids: Vec::new(),
        }
    }

    pub fn with_class_admin_of(mut self, class_id: ClassId) -> Self {
        self.is_class_admin = true;
        self.class_admin_of = Some(class_id);
        self
    }

    pub fn with_class_ids(mut self, class_ids: Vec<ClassId>) -> Self {
        self.class_ids = class_ids;
        self
    }

    /// The role used for navigation: a flagged Teacher acts as ClassAdmin.
    pub fn effective_role(&self) -> Role {
        match self.role {
            Role::Teacher if self.is_class_admin => Role::ClassAdmin,
            other => other,
        }
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role.account_role()
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn belongs_to(&self, school_id: SchoolId) -> bool {
        self.school_id == Some(school_id)
    }

    pub fn administers_class(&self, class_id: ClassId) -> bool {
        self.is_class_admin && self.class_admin_of == Some(class_id)
    }
}
