//! Account use cases: registration, login and token refresh.

use std::sync::Arc;

use grimoire_domain::{NewUser, User, UserId};
use grimoire_shared::{LoginRequest, LoginResponse, RegisterRequest, UserView};

use crate::infrastructure::auth::{CredentialError, PasswordHasher, TokenService};
use crate::infrastructure::config::AdminBootstrap;
use crate::infrastructure::ports::{RepoError, UserRepo};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown user or wrong password; callers can't tell which.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Username or email already exists")]
    UserExists,
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("Repository error: {0}")]
    Repo(RepoError),
}

impl From<RepoError> for AuthError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict(_) => Self::UserExists,
            RepoError::NotFound { .. } => Self::UserNotFound,
            other => Self::Repo(other),
        }
    }
}

pub(crate) fn user_view(user: &User) -> UserView {
    UserView::new(
        user.id.get(),
        user.username.clone(),
        user.is_admin,
        user.preferred_edition_id,
    )
}

pub struct AuthUseCases {
    users: Arc<dyn UserRepo>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
}

impl AuthUseCases {
    pub fn new(
        users: Arc<dyn UserRepo>,
        tokens: Arc<TokenService>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<UserId, AuthError> {
        if self
            .users
            .exists_by_username_or_email(&request.username, &request.email)
            .await?
        {
            return Err(AuthError::UserExists);
        }

        let password_hash = self.hasher.hash(&request.password).await?;
        let id = self
            .users
            .create(&NewUser {
                username: request.username.clone(),
                email: request.email.clone(),
                password_hash,
                is_admin: false,
            })
            .await?;

        tracing::info!(user_id = %id, username = %request.username, "Registered user");
        Ok(id)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthError> {
        let Some(user) = self.users.find_by_username(&request.username).await? else {
            tracing::warn!(username = %request.username, "Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify(&request.password, &user.password_hash)
            .await?
        {
            tracing::warn!(user_id = %user.id, "Login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginResponse {
            token,
            user: user_view(&user),
        })
    }

    /// The user as currently stored, not as the token remembers them.
    pub async fn current_user(&self, id: UserId) -> Result<User, AuthError> {
        self.users.get(id).await?.ok_or(AuthError::UserNotFound)
    }

    pub async fn me(&self, id: UserId) -> Result<UserView, AuthError> {
        Ok(user_view(&self.current_user(id).await?))
    }

    /// A fresh token carrying the user's current role and preferences.
    pub async fn refresh_token(&self, id: UserId) -> Result<String, AuthError> {
        let user = self.current_user(id).await?;
        Ok(self.tokens.issue(&user)?)
    }

    /// Make sure the configured admin account exists and is an admin.
    ///
    /// An existing user keeps their password; only the role is raised.
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> Result<UserId, AuthError> {
        if let Some(user) = self.users.find_by_username(&admin.username).await? {
            if !user.is_admin {
                self.users.set_admin(user.id, true).await?;
                tracing::info!(user_id = %user.id, "Promoted bootstrap user to admin");
            }
            return Ok(user.id);
        }

        let password_hash = self.hasher.hash(&admin.password).await?;
        let id = self
            .users
            .create(&NewUser {
                username: admin.username.clone(),
                email: admin.email.clone(),
                password_hash,
                is_admin: true,
            })
            .await?;
        tracing::info!(user_id = %id, username = %admin.username, "Created bootstrap admin");
        Ok(id)
    }
}
