//! First-boot provisioning of the root account.

use std::sync::Arc;

use service_core::error::AppError;

use crate::config::RootAccountConfig;
use crate::models::{AccessLevel, User};
use crate::repos::UserRepository;
use crate::utils::{hash_password, Password};

/// Ensure the root account exists, creating it from the configured
/// credentials if it does not. Idempotent; runs before the listener
/// binds, so no request ever observes a rootless system.
pub async fn ensure_root(
    users: &Arc<dyn UserRepository>,
    config: &RootAccountConfig,
) -> Result<User, AppError> {
    if let Some(existing) = users
        .find_by_email(&config.email)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?
    {
        tracing::debug!(user_id = %existing.id, "Root account already provisioned");
        return Ok(existing);
    }

    let password = Password::new(config.password.clone());
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("hashing task failed: {}", e)))?
        .map_err(AppError::InternalError)?;

    let root = users
        .create(User::new(
            config.email.clone(),
            password_hash.into_string(),
            AccessLevel::Root,
        ))
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

    tracing::info!(user_id = %root.id, "Root account provisioned");
    Ok(root)
}
