use sqlx::PgPool;
use tracing::instrument;

use scholaris_auth::{TokenIdentity, create_access_token};
use scholaris_config::JwtConfig;
use scholaris_core::AppError;
use scholaris_models::Role;
use scholaris_models::auth::{LoginRequest, LoginResponse};
use scholaris_models::ids::{ClassId, UserId};
use scholaris_models::users::UserCredentials;

use crate::metrics::track_login;
use crate::utils::password::verify_password;

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config), fields(email = %dto.email))]
    pub async fn login_user(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let user = sqlx::query_as::<_, UserCredentials>(
            r#"SELECT id, email, password, role_id, school_id, class_id, is_active
               FROM users WHERE email = $1"#,
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?;

        let user = match user {
            Some(user) if user.is_active && verify_password(&dto.password, &user.password)? => {
                user
            }
            _ => {
                track_login(false);
                return Err(AppError::unauthorized("Invalid email or password"));
            }
        };

        let identity = Self::token_identity(db, &user).await?;
        let access_token = create_access_token(&identity, jwt_config)?;
        track_login(true);

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            role: user.role,
        })
    }

    /// Facts the policy layer reads from the token, captured at login.
    async fn token_identity(
        db: &PgPool,
        user: &UserCredentials,
    ) -> Result<TokenIdentity, AppError> {
        let class_admin_of = match user.role {
            Role::Teacher => {
                sqlx::query_scalar::<_, ClassId>(
                    "SELECT class_id FROM class_admin_profiles WHERE user_id = $1",
                )
                .bind(user.id)
                .fetch_optional(db)
                .await?
            }
            _ => None,
        };

        let class_ids = match user.role {
            Role::Student => user.class_id.into_iter().collect(),
            Role::Parent => Self::children_class_ids(db, user.id).await?,
            _ => Vec::new(),
        };

        Ok(TokenIdentity {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            school_id: user.school_id,
            class_admin_of,
            class_ids,
        })
    }

    async fn children_class_ids(db: &PgPool, parent_id: UserId) -> Result<Vec<ClassId>, AppError> {
        let ids = sqlx::query_scalar::<_, ClassId>(
            r#"SELECT DISTINCT u.class_id
               FROM parent_students ps
               JOIN users u ON u.id = ps.student_id
               WHERE ps.parent_id = $1 AND u.is_active AND u.class_id IS NOT NULL
               ORDER BY u.class_id"#,
        )
        .bind(parent_id)
        .fetch_all(db)
        .await?;

        Ok(ids)
    }
}
