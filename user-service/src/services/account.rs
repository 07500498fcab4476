use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::dtos::user::{ChangePasswordRequest, CreateAdminRequest, UpdateUserRequest};
use crate::dtos::auth::RegisterRequest;
use crate::models::{AccessLevel, AuthenticatedIdentity, User};
use crate::repos::{SessionRepository, UserRepository};
use crate::services::ServiceError;
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

/// Account operations with the authorization policy applied inline:
/// every mutation resolves its target through the same gate.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    /// Public registration; always creates a customer account.
    pub async fn register(&self, req: RegisterRequest) -> Result<User, ServiceError> {
        let password_hash = hash_on_blocking_pool(req.password).await?;
        let user = self
            .users
            .create(User::new(req.email, password_hash, AccessLevel::Customer))
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Elevation: create an admin account. The privilege check runs
    /// before any other work.
    pub async fn create_admin(
        &self,
        caller: &AuthenticatedIdentity,
        req: CreateAdminRequest,
    ) -> Result<User, ServiceError> {
        if !caller.level.is_elevated() {
            return Err(ServiceError::InsufficientPrivileges);
        }

        let password_hash = hash_on_blocking_pool(req.password).await?;
        let user = self
            .users
            .create(User::new(req.email, password_hash, AccessLevel::Admin))
            .await?;

        tracing::info!(user_id = %user.id, created_by = %caller.id, "Admin account created");
        Ok(user)
    }

    /// The caller's own record.
    pub async fn get_self(&self, caller: &AuthenticatedIdentity) -> Result<User, ServiceError> {
        self.users
            .find_by_id(caller.id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn get_user(
        &self,
        caller: &AuthenticatedIdentity,
        target_id: Uuid,
    ) -> Result<User, ServiceError> {
        self.resolve_target(caller, target_id).await
    }

    /// Update mutable fields. An email change is an identity change
    /// and invalidates the target's session.
    pub async fn update_user(
        &self,
        caller: &AuthenticatedIdentity,
        target_id: Uuid,
        req: UpdateUserRequest,
    ) -> Result<User, ServiceError> {
        let mut user = self.resolve_target(caller, target_id).await?;

        let mut identity_changed = false;
        if let Some(email) = req.email {
            if email != user.email {
                user.email = email;
                identity_changed = true;
            }
        }

        if !identity_changed {
            return Ok(user);
        }

        user.updated_at = Utc::now();
        let user = self.users.update(user).await?;

        // Stale tokens must not outlive the identity they were minted
        // for.
        self.sessions.delete_by_owner(user.id).await?;

        tracing::info!(user_id = %user.id, "User updated, session invalidated");
        Ok(user)
    }

    /// Set a new password. Self-service callers must present their
    /// current password; elevated callers resetting someone else need
    /// not. Either way the target's session dies with the old
    /// credential.
    pub async fn change_password(
        &self,
        caller: &AuthenticatedIdentity,
        target_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), ServiceError> {
        let mut user = self.resolve_target(caller, target_id).await?;

        if caller.id == user.id {
            let current = req.current_password.ok_or_else(|| {
                ServiceError::Validation("current_password is required".to_string())
            })?;
            let stored = PasswordHashString::new(user.password_hash.clone());
            let current = Password::new(current);
            let matched = tokio::task::spawn_blocking(move || {
                verify_password(&current, &stored).is_ok()
            })
            .await
            .map_err(|e| {
                ServiceError::Internal(anyhow::anyhow!("password verification task failed: {}", e))
            })?;
            if !matched {
                return Err(ServiceError::InvalidCredentials);
            }
        }

        user.password_hash = hash_on_blocking_pool(req.new_password).await?;
        user.updated_at = Utc::now();
        self.users.update(user).await?;

        self.sessions.delete_by_owner(target_id).await?;

        tracing::info!(user_id = %target_id, "Password changed, session invalidated");
        Ok(())
    }

    pub async fn delete_user(
        &self,
        caller: &AuthenticatedIdentity,
        target_id: Uuid,
    ) -> Result<(), ServiceError> {
        let user = self.resolve_target(caller, target_id).await?;

        self.users.delete(user.id).await?;
        self.sessions.delete_by_owner(user.id).await?;

        tracing::info!(user_id = %user.id, deleted_by = %caller.id, "User deleted");
        Ok(())
    }

    /// Policy gate for every operation aimed at a target account,
    /// evaluated in order:
    ///
    /// 1. A customer reaching for any account but its own sees
    ///    "not found" rather than "forbidden".
    /// 2. A genuinely absent target is not found.
    /// 3. The root account is not found for every caller, itself
    ///    included.
    async fn resolve_target(
        &self,
        caller: &AuthenticatedIdentity,
        target_id: Uuid,
    ) -> Result<User, ServiceError> {
        if caller.level == AccessLevel::Customer && target_id != caller.id {
            return Err(ServiceError::UserNotFound);
        }

        let user = self
            .users
            .find_by_id(target_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        if user.level == AccessLevel::Root {
            return Err(ServiceError::UserNotFound);
        }

        Ok(user)
    }
}

async fn hash_on_blocking_pool(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || hash_password(&Password::new(password)))
        .await
        .map_err(|e| ServiceError::Internal(anyhow::anyhow!("password hashing task failed: {}", e)))?
        .map(PasswordHashString::into_string)
        .map_err(ServiceError::Internal)
}
