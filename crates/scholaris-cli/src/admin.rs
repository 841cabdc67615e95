use anyhow::{Context, Result, bail};
use bcrypt::{DEFAULT_COST, hash};
use scholaris_models::Role;
use scholaris_models::ids::UserId;
use sqlx::PgPool;

pub struct NewSuperAdmin<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Super admins have no school and can only be created here.
pub async fn create_super_admin(db: &PgPool, admin: &NewSuperAdmin<'_>) -> Result<UserId> {
    if admin.password.len() < 8 {
        bail!("Password must be at least 8 characters");
    }

    let hashed = hash(admin.password, DEFAULT_COST).context("Failed to hash password")?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (first_name, last_name, email, password, role_id, school_id)
         VALUES ($1, $2, $3, $4, $5, NULL)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(admin.first_name)
    .bind(admin.last_name)
    .bind(admin.email)
    .bind(&hashed)
    .bind(Role::SuperAdmin)
    .fetch_optional(db)
    .await?;

    match user_id {
        Some(id) => Ok(id),
        None => bail!("User with this email already exists"),
    }
}
