use std::sync::Arc;

use uuid::Uuid;

use crate::models::Session;
use crate::repos::SessionRepository;
use crate::services::{CredentialService, JwtService, ServiceError, TokenError, TokenResponse};

/// Orchestrates the session lifecycle: login, refresh, logout.
///
/// Per user the store holds at most one live session, and every
/// transition replaces or deletes that record wholesale.
#[derive(Clone)]
pub struct SessionService {
    credentials: CredentialService,
    jwt: JwtService,
    sessions: Arc<dyn SessionRepository>,
}

impl SessionService {
    pub fn new(
        credentials: CredentialService,
        jwt: JwtService,
        sessions: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            credentials,
            jwt,
            sessions,
        }
    }

    /// Exchange credentials for a fresh token pair.
    ///
    /// The sole session-creation path; a prior session for the same
    /// user is unconditionally superseded. If the store rejects the
    /// new session, no tokens escape.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ServiceError> {
        let user = self.credentials.verify(email, password).await?;

        let (access_token, refresh_token) =
            self.jwt.issue_pair(&user).map_err(ServiceError::Internal)?;

        self.sessions
            .replace(Session::new(user.id, &refresh_token))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(TokenResponse::new(
            access_token,
            refresh_token,
            self.jwt.access_token_expiry_seconds(),
        ))
    }

    /// Rotate a refresh token: consume the presented one, mint a new
    /// pair.
    ///
    /// The store lookup comes first, so a rotated or logged-out token
    /// is reported missing before its signature is ever examined.
    pub async fn refresh(
        &self,
        presented: &str,
        claimed_owner: Option<Uuid>,
    ) -> Result<TokenResponse, ServiceError> {
        let session = self
            .sessions
            .find_by_token(&Session::hash_token(presented))
            .await?
            .ok_or(ServiceError::RefreshTokenNotFound)?;

        // A pre-authenticated caller must own the token it presents.
        if let Some(owner) = claimed_owner {
            if session.owner_id != owner {
                return Err(ServiceError::TokenOwnershipMismatch);
            }
        }

        let claims = self
            .jwt
            .validate_refresh_token(presented)
            .map_err(|e| match e {
                TokenError::Expired => ServiceError::RefreshTokenExpired,
                TokenError::Malformed => ServiceError::InvalidRefreshToken,
            })?;

        // Reissue from the token's own signed claims, not the store
        // record.
        let (access_token, refresh_token) = self
            .jwt
            .reissue_pair(&claims)
            .map_err(ServiceError::Internal)?;

        // Single-use rotation: the consumed token is overwritten and
        // can never satisfy the lookup again.
        self.sessions
            .replace(Session::new(session.owner_id, &refresh_token))
            .await?;

        tracing::debug!(user_id = %session.owner_id, "Session rotated");

        Ok(TokenResponse::new(
            access_token,
            refresh_token,
            self.jwt.access_token_expiry_seconds(),
        ))
    }

    /// End a session. A second logout with the same token fails with
    /// `RefreshTokenNotFound`; it does not silently succeed.
    pub async fn logout(
        &self,
        presented: &str,
        claimed_owner: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let session = self
            .sessions
            .find_by_token(&Session::hash_token(presented))
            .await?
            .ok_or(ServiceError::RefreshTokenNotFound)?;

        if let Some(owner) = claimed_owner {
            if session.owner_id != owner {
                return Err(ServiceError::TokenOwnershipMismatch);
            }
        }

        self.sessions.delete_by_token(&session.token_hash).await?;

        tracing::info!(user_id = %session.owner_id, "User logged out");
        Ok(())
    }
}
