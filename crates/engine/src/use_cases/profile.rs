//! The signed-in user's own profile.

use std::sync::Arc;

use grimoire_domain::UserId;
use grimoire_shared::{ProfileUpdateResponse, ProfileView, UpdateProfileRequest};

use crate::infrastructure::auth::TokenService;
use crate::infrastructure::ports::UserRepo;

use super::auth::{user_view, AuthError};

pub struct ProfileUseCases {
    users: Arc<dyn UserRepo>,
    tokens: Arc<TokenService>,
}

impl ProfileUseCases {
    pub fn new(users: Arc<dyn UserRepo>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    pub async fn get(&self, id: UserId) -> Result<ProfileView, AuthError> {
        let user = self.users.get(id).await?.ok_or(AuthError::UserNotFound)?;
        Ok(ProfileView {
            user: user_view(&user),
            email: user.email,
        })
    }

    /// Store the new preferences and hand back a token that carries them.
    pub async fn update(
        &self,
        id: UserId,
        request: &UpdateProfileRequest,
    ) -> Result<ProfileUpdateResponse, AuthError> {
        self.users
            .set_preferred_edition(id, request.preferred_edition_id)
            .await?;
        let user = self.users.get(id).await?.ok_or(AuthError::UserNotFound)?;
        let token = self.tokens.issue(&user)?;

        tracing::info!(
            user_id = %id,
            preferred_edition_id = ?request.preferred_edition_id,
            "Updated profile"
        );
        Ok(ProfileUpdateResponse {
            message: "Profile updated successfully".into(),
            user: ProfileView {
                user: user_view(&user),
                email: user.email,
            },
            token,
        })
    }
}
