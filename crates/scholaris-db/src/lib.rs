//! # Scholaris DB
//!
//! Connection pool initialization, embedded migrations, and helpers for
//! interpreting store-level failures.
//!
//! The relational store is the authority for the uniqueness invariants
//! (`class_admin_profiles.user_id`, `class_admin_profiles.class_id`,
//! `attendance (student_id, date)`, `users.email`). Services pre-check these
//! for friendlier messages but always map a unique violation coming back from
//! the store with [`is_unique_violation`].
//!
//! ```ignore
//! use scholaris_db::{init_db_pool, run_migrations};
//!
//! let pool = init_db_pool().await;
//! run_migrations(&pool).await?;
//! ```

use std::env;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

pub use sqlx::PgPool;

/// Creates the PostgreSQL pool from `DATABASE_URL`.
///
/// `DATABASE_MAX_CONNECTIONS` (default 10) bounds the pool size.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the database is unreachable. This is
/// only called once during startup.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    info!(max_connections, "Database pool initialized");
    pool
}

/// Applies the embedded migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// True when the store rejected a write because of a unique constraint.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Name of the violated constraint, when the store reports one.
pub fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

/// True when the store rejected a write because a referenced row is missing.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_violations() {
        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
        assert!(!is_foreign_key_violation(&err));
        assert_eq!(violated_constraint(&err), None);
    }
}
