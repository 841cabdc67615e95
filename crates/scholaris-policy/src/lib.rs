//! # Scholaris Policy
//!
//! Every authorization rule in the system lives here, as pure functions over
//! an explicit [`Requester`](scholaris_models::Requester) and data the caller
//! has already loaded. Nothing in this crate touches the database.
//!
//! - [`registry`]: static role table, permission tiers and navigation
//! - [`scope`]: read scopes (rendered as SQL `WHERE` fragments) and write decisions
//! - [`propagation`]: name-keyed matching between template and school records
//! - [`guard`]: one-admin-per-class and class/subject scoping checks

pub mod guard;
pub mod propagation;
pub mod registry;
pub mod scope;

pub use registry::{PermissionTier, RoleProfile, navigation_for, profile};
pub use scope::{
    Decision, EntityKind, OwnedRecord, ReadScope, ScopeBind, ScopeColumns, ScopePredicate,
    WriteAction, can_manage_account, can_manage_assignments, can_manage_catalog,
    can_manage_schools, can_manage_timetable, can_record_attendance, can_write, read_scope,
    record_permissions,
};
