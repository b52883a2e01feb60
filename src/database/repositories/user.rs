//! User profile repository implementation

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{CreateProfileRequest, UpdateProfileRequest, UserProfile};
use crate::utils::errors::AppError;

const USER_COLUMNS: &str = "id, email, display_name, avatar_key, is_admin_approved, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a profile row for a newly signed-up identity
    pub async fn create(&self, request: CreateProfileRequest) -> Result<UserProfile, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO users (id, email, display_name, avatar_key)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(request.id)
        .bind(&request.email)
        .bind(&request.display_name)
        .bind(&request.avatar_key)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Profile already exists".to_string())
            }
            other => AppError::from(other),
        })?;

        Ok(profile)
    }

    /// Find user profile by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Partial update of a user profile
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            UPDATE users
            SET display_name = COALESCE($2, display_name),
                avatar_key = COALESCE($3, avatar_key),
                is_admin_approved = COALESCE($4, is_admin_approved),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.display_name)
        .bind(request.avatar_key)
        .bind(request.is_admin_approved)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::UserNotFound { user_id: id })?;

        Ok(profile)
    }
}
