//! Domain models and DTOs shared by the API, the policy crate and the CLI.

pub mod attendance;
pub mod auth;
pub mod catalog;
pub mod class_admins;
pub mod classes;
pub mod homework;
pub mod ids;
pub mod live_classes;
pub mod permissions;
pub mod requester;
pub mod roles;
pub mod schools;
pub mod subjects;
pub mod timetable;
pub mod users;

pub use permissions::RecordPermissions;
pub use requester::Requester;
pub use roles::Role;
