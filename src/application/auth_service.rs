use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{CreateUser, LoginRequest, User};
use crate::infrastructure::security::{hash_password, sign_token, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};
use uuid::Uuid;

pub struct AuthService<R: UserRepository> {
    user_repository: Arc<R>,
    jwt_secret: String,
}

impl<R: UserRepository> AuthService<R> {
    pub fn new(user_repository: Arc<R>, jwt_secret: String) -> Self {
        Self {
            user_repository,
            jwt_secret,
        }
    }

    #[instrument(skip(self, req), fields(email = %req.email, username = %req.username))]
    pub async fn register_user(&self, req: CreateUser) -> Result<(String, User)> {
        trace!("Starting user registration");

        if req.username.trim().is_empty()
            || req.email.trim().is_empty()
            || req.password.is_empty()
        {
            warn!("Registration rejected, missing required fields");
            return Err(DomainError::Validation(
                "username, email and password are required".to_string(),
            )
            .into());
        }

        if self
            .user_repository
            .find_user_by_email(&req.email)
            .await?
            .is_some()
        {
            warn!(email = %req.email, "User already exists");
            return Err(DomainError::Validation(
                "User with this email already exists".to_string(),
            )
            .into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: req.username,
            email: req.email,
            password_hash,
            saved_books: Vec::new(),
        };

        debug!(user_id = %user.id, "Saving user to repository");
        self.user_repository.save_user(user.clone()).await?;

        let token = sign_token(&user, &self.jwt_secret).map_err(|e| {
            error!(error = %e, "Failed to sign token");
            DomainError::Internal(format!("Failed to sign token: {}", e))
        })?;

        info!(user_id = %user.id, email = %user.email, "User registered successfully");

        Ok((token, user))
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<(String, User)> {
        trace!("Starting login");

        let user = self
            .user_repository
            .find_user_by_email(&req.email)
            .await?
            .ok_or_else(|| {
                warn!(email = %req.email, "User not found during login");
                DomainError::incorrect_credentials()
            })?;

        let is_valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
            error!(error = %e, "Failed to verify password");
            DomainError::Internal(format!("Failed to verify password: {}", e))
        })?;

        if !is_valid {
            warn!(user_id = %user.id, "Invalid password during login");
            return Err(DomainError::incorrect_credentials().into());
        }

        let token = sign_token(&user, &self.jwt_secret).map_err(|e| {
            error!(error = %e, "Failed to sign token");
            DomainError::Internal(format!("Failed to sign token: {}", e))
        })?;

        info!(user_id = %user.id, email = %user.email, "Login successful");

        Ok((token, user))
    }
}
