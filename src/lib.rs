//! # Scholaris API
//!
//! Multi-tenant school management over Axum and PostgreSQL. Schools, classes,
//! subjects, homework, live classes, attendance and the timetable are managed
//! through role-scoped endpoints; every authorization decision is delegated
//! to [`scholaris_policy`].
//!
//! ```text
//! src/
//! ├── middleware/   # AuthUser extractor and role gates
//! ├── modules/      # One directory per feature: controller, service, router
//! └── utils/        # Authorization and scope-binding helpers, passwords
//! ```
//!
//! ## Roles
//!
//! | Role | Scope |
//! |------|-------|
//! | Super Admin | Every school, plus the template catalog (CLI-created) |
//! | School Admin | One school |
//! | Class Admin | A teacher administering exactly one class |
//! | Teacher | One school; edits own content |
//! | Student / Parent | Own classes, own or children's records |
//!
//! ## Templates
//!
//! Classes and subjects with no school are global templates. Assigning a
//! template to a school deep-copies it; renames of template subjects reach the
//! copies by name.

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

pub use scholaris_auth;
pub use scholaris_config;
pub use scholaris_core;
pub use scholaris_db;
pub use scholaris_models;
pub use scholaris_policy;
