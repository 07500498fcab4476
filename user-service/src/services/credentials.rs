use std::sync::Arc;

use uuid::Uuid;

use crate::models::User;
use crate::repos::UserRepository;
use crate::services::ServiceError;
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

/// Verifies login credentials against the user store.
#[derive(Clone)]
pub struct CredentialService {
    users: Arc<dyn UserRepository>,
    /// Verified against when no account matches the email, so both
    /// failure paths cost one argon2 verification.
    dummy_hash: PasswordHashString,
}

impl CredentialService {
    pub fn new(users: Arc<dyn UserRepository>) -> Result<Self, anyhow::Error> {
        let dummy_hash = hash_password(&Password::new(Uuid::new_v4().to_string()))?;
        Ok(Self { users, dummy_hash })
    }

    /// Check an email/password pair.
    ///
    /// The failure is uniform: unknown email and wrong password both
    /// come back as `InvalidCredentials`, and the unknown-email path
    /// still runs a hash verification. Argon2 work happens on the
    /// blocking pool, off the async executor.
    pub async fn verify(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        let user = self.users.find_by_email(email).await?;

        let candidate_hash = match &user {
            Some(u) => PasswordHashString::new(u.password_hash.clone()),
            None => self.dummy_hash.clone(),
        };
        let password = Password::new(password.to_string());

        let matched =
            tokio::task::spawn_blocking(move || verify_password(&password, &candidate_hash).is_ok())
                .await
                .map_err(|e| {
                    ServiceError::Internal(anyhow::anyhow!("password verification task failed: {}", e))
                })?;

        match user {
            Some(user) if matched => Ok(user),
            _ => Err(ServiceError::InvalidCredentials),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccessLevel;
    use crate::repos::InMemoryUserRepository;

    async fn service_with_user(email: &str, password: &str) -> CredentialService {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        let hash = hash_password(&Password::new(password.to_string())).unwrap();
        users
            .create(User::new(
                email.to_string(),
                hash.into_string(),
                AccessLevel::Customer,
            ))
            .await
            .unwrap();
        CredentialService::new(users).unwrap()
    }

    #[tokio::test]
    async fn test_verify_accepts_valid_credentials() {
        let service = service_with_user("who@example.com", "correct horse").await;
        let user = service.verify("who@example.com", "correct horse").await.unwrap();
        assert_eq!(user.email, "who@example.com");
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_fail_identically() {
        let service = service_with_user("who@example.com", "correct horse").await;

        let wrong_password = service
            .verify("who@example.com", "battery staple")
            .await
            .unwrap_err();
        let unknown_email = service
            .verify("nobody@example.com", "correct horse")
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
        assert!(matches!(unknown_email, ServiceError::InvalidCredentials));
    }
}
