//! # Scholaris CLI
//!
//! Operator tasks that have no HTTP surface: creating the first super admin
//! and seeding the global template catalog.
//!
//! ```ignore
//! use scholaris_cli::templates::{seed_templates, STANDARD_SUBJECTS};
//!
//! let report = seed_templates(&pool, 12, STANDARD_SUBJECTS).await?;
//! println!("{} classes created", report.classes_created);
//! ```

pub mod admin;
pub mod templates;
