//! User directory service implementation
//!
//! Profile reads and partial updates, restricted to the profile owner and
//! admins.

use tracing::info;
use uuid::Uuid;

use crate::database::repositories::UserRepository;
use crate::models::user::{CreateProfileRequest, UpdateProfileRequest, UserProfile};
use crate::services::auth::AuthContext;
use crate::utils::errors::{AppError, Result};

/// User service for profile management
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(users: UserRepository) -> Self {
        Self { users }
    }

    /// Provision the caller's own profile. Identifier and email come from
    /// the token, never from the request body.
    pub async fn create_profile(
        &self,
        auth: &AuthContext,
        display_name: String,
        avatar_key: Option<String>,
    ) -> Result<UserProfile> {
        let email = auth.email.clone().ok_or_else(|| {
            AppError::InvalidArgument("Token carries no email address".to_string())
        })?;

        if display_name.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "Display name is required".to_string(),
            ));
        }

        let profile = self
            .users
            .create(CreateProfileRequest {
                id: auth.user_id,
                email,
                display_name,
                avatar_key,
            })
            .await?;

        info!(user_id = %profile.id, "User profile created");
        Ok(profile)
    }

    /// Fetch a profile, visible to its owner and to admins
    pub async fn get_profile(&self, auth: &AuthContext, user_id: Uuid) -> Result<UserProfile> {
        if !auth.can_access_user(user_id) {
            return Err(AppError::Forbidden(
                "Not authorized to access this profile".to_string(),
            ));
        }

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound { user_id })
    }

    /// Partially update a profile. Only admins may change the approval flag.
    pub async fn update_profile(
        &self,
        auth: &AuthContext,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<UserProfile> {
        if !auth.can_access_user(user_id) {
            return Err(AppError::Forbidden(
                "Not authorized to update this profile".to_string(),
            ));
        }

        if request.is_admin_approved.is_some() && !auth.is_admin {
            return Err(AppError::Forbidden(
                "Only admins may change the approval flag".to_string(),
            ));
        }

        let profile = self.users.update(user_id, request).await?;
        info!(user_id = %user_id, caller_id = %auth.user_id, "User profile updated");
        Ok(profile)
    }
}
