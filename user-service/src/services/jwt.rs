use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::{AccessLevel, User};

/// Why a token failed validation. The two cases surface as different
/// user-facing messages, so the split is part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Well-formed and correctly signed, but past its expiry.
    Expired,
    /// Everything else: bad signature, structural corruption, or a
    /// token from the other family presented in this slot.
    Malformed,
}

/// JWT issuance and validation for both token families.
///
/// Access and refresh tokens are signed with disjoint secrets, so a
/// token from one family can never validate in the other slot; each
/// family has its own TTL.
#[derive(Clone)]
pub struct JwtService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_token_expiry_minutes: i64,
    refresh_token_expiry_days: i64,
}

/// Claims for access tokens (short-lived).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub level: AccessLevel,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

/// Claims for refresh tokens (long-lived). Carries the same identity
/// fields as the access family so a rotation can reissue purely from
/// the token's own signed content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub sub: String,
    pub email: String,
    pub level: AccessLevel,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// Token pair returned to the client.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_token_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_token_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_token_secret.as_bytes()),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
        }
    }

    /// Generate an access token for a user.
    pub fn issue_access_token(&self, user: &User) -> Result<String, anyhow::Error> {
        self.issue_access(&user.id.to_string(), &user.email, user.level)
    }

    /// Generate a refresh token for a user.
    pub fn issue_refresh_token(&self, user: &User) -> Result<String, anyhow::Error> {
        self.issue_refresh(&user.id.to_string(), &user.email, user.level)
    }

    /// Generate both tokens for a user.
    pub fn issue_pair(&self, user: &User) -> Result<(String, String), anyhow::Error> {
        Ok((
            self.issue_access_token(user)?,
            self.issue_refresh_token(user)?,
        ))
    }

    /// Generate a fresh pair from a validated refresh token's claims,
    /// without consulting any store.
    pub fn reissue_pair(
        &self,
        claims: &RefreshTokenClaims,
    ) -> Result<(String, String), anyhow::Error> {
        Ok((
            self.issue_access(&claims.sub, &claims.email, claims.level)?,
            self.issue_refresh(&claims.sub, &claims.email, claims.level)?,
        ))
    }

    /// Validate and decode an access token.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        decode::<AccessTokenClaims>(token, &self.access_decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Validate and decode a refresh token.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, TokenError> {
        decode::<RefreshTokenClaims>(token, &self.refresh_decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(classify)
    }

    /// Access token lifetime in seconds, for the client.
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }

    fn issue_access(
        &self,
        sub: &str,
        email: &str,
        level: AccessLevel,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_token_expiry_minutes);

        let claims = AccessTokenClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            level,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))
    }

    fn issue_refresh(
        &self,
        sub: &str,
        email: &str,
        level: AccessLevel,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::days(self.refresh_token_expiry_days);

        let claims = RefreshTokenClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            level,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| anyhow::anyhow!("Failed to encode refresh token: {}", e))
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation
    }
}

/// Only a clean expiry counts as `Expired`; every other failure is
/// indistinguishable corruption.
fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}
