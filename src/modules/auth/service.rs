use serde_json::json;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::{hash_password, verify_password};

use super::model::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

pub struct AuthService;

impl AuthService {
    /// Stores a new user with a hashed password and mints their first token.
    #[instrument(skip(db, jwt_config, dto), fields(email = %dto.email))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
            .bind(&dto.email)
            .fetch_optional(db)
            .await?;

        if existing.is_some() {
            return Err(AppError::validation(json!({
                "email": ["email has already been taken"]
            })));
        }

        let hashed_password = hash_password(&dto.password)?;

        // the pre-check above is advisory; a concurrent register can still
        // race to the unique index, so the violation maps to the same error
        let user = sqlx::query_as::<_, UserResponse>(
            "INSERT INTO users (name, email, password)
             VALUES ($1, $2, $3)
             RETURNING id, name, email",
        )
        .bind(&dto.name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .fetch_one(db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::validation(json!({
                    "email": ["email has already been taken"]
                }))
            }
            _ => AppError::internal(e),
        })?;

        let token = create_access_token(user.id, &user.email, jwt_config)?;

        Ok(AuthResponse {
            token,
            name: user.name,
        })
    }

    /// Verifies credentials and mints a brand-new token. Previously issued
    /// tokens stay valid until they expire.
    #[instrument(skip(db, jwt_config, dto), fields(email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        #[derive(sqlx::FromRow)]
        struct UserWithPassword {
            id: Uuid,
            name: String,
            email: String,
            password: String,
        }

        let user = sqlx::query_as::<_, UserWithPassword>(
            "SELECT id, name, email, password FROM users WHERE email = $1",
        )
        .bind(&dto.email)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::unauthorized("Unauthorised."))?;

        if !verify_password(&dto.password, &user.password)? {
            return Err(AppError::unauthorized("Unauthorised."));
        }

        let token = create_access_token(user.id, &user.email, jwt_config)?;

        Ok(AuthResponse {
            token,
            name: user.name,
        })
    }

    /// Looks up the identity behind a verified token.
    #[instrument(skip(db))]
    pub async fn current_user(db: &PgPool, user_id: Uuid) -> Result<UserResponse, AppError> {
        sqlx::query_as::<_, UserResponse>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unauthorised."))
    }
}
