use service_core::error::AppError;
use thiserror::Error;

use crate::repos::RepoError;

/// Expected, recoverable outcomes of service operations, one variant
/// per outcome with its fixed user-facing message.
///
/// Login failures are deliberately generic so an unknown email and a
/// wrong password are indistinguishable; refresh and logout failures
/// are specific, since those callers already hold a token.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No token provided")]
    NoTokenProvided,

    #[error("Invalid authorization type")]
    InvalidAuthorizationType,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    #[error("Token does not belong to user")]
    TokenOwnershipMismatch,

    #[error("Insufficient privileges")]
    InsufficientPrivileges,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RepoError> for ServiceError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::DuplicateEmail => ServiceError::EmailAlreadyRegistered,
            RepoError::Backend(e) => ServiceError::Internal(e),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidCredentials
            | ServiceError::NoTokenProvided
            | ServiceError::InvalidAuthorizationType
            | ServiceError::TokenExpired
            | ServiceError::InvalidToken
            | ServiceError::RefreshTokenExpired
            | ServiceError::InvalidRefreshToken => {
                AppError::Unauthorized(anyhow::anyhow!(err.to_string()))
            }
            ServiceError::TokenOwnershipMismatch | ServiceError::InsufficientPrivileges => {
                AppError::Forbidden(anyhow::anyhow!(err.to_string()))
            }
            ServiceError::RefreshTokenNotFound | ServiceError::UserNotFound => {
                AppError::NotFound(anyhow::anyhow!(err.to_string()))
            }
            ServiceError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!(err.to_string()))
            }
            ServiceError::Validation(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
