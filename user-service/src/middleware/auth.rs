use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};
use service_core::error::AppError;

use crate::models::AuthenticatedIdentity;
use crate::services::{JwtService, ServiceError, TokenError};
use crate::AppState;

pub const BEARER_SCHEME: &str = "Bearer";

/// Turn a raw Authorization header into an authenticated identity.
///
/// Fully stateless: the claims alone carry everything, no store
/// lookup. Each failure has its own cause:
/// absent/unsplittable header, wrong scheme, expired token, anything
/// else wrong with the token.
pub fn authenticate(
    header: Option<&str>,
    jwt: &JwtService,
) -> Result<AuthenticatedIdentity, ServiceError> {
    let value = match header {
        Some(v) if !v.trim().is_empty() => v,
        _ => return Err(ServiceError::NoTokenProvided),
    };

    let parts: Vec<&str> = value.split(' ').collect();
    let (scheme, token) = match parts.as_slice() {
        [scheme, token] if !token.is_empty() => (*scheme, *token),
        _ => return Err(ServiceError::NoTokenProvided),
    };

    // Case-sensitive exact match.
    if scheme != BEARER_SCHEME {
        return Err(ServiceError::InvalidAuthorizationType);
    }

    let claims = jwt.validate_access_token(token).map_err(|e| match e {
        TokenError::Expired => ServiceError::TokenExpired,
        TokenError::Malformed => ServiceError::InvalidToken,
    })?;

    let id = claims.sub.parse().map_err(|_| ServiceError::InvalidToken)?;
    Ok(AuthenticatedIdentity {
        id,
        email: claims.email,
        level: claims.level,
    })
}

/// Middleware guarding routes that require a valid access token. The
/// identity lands in request extensions for [`AuthUser`] to pick up.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = authenticate(header, &state.jwt)?;
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Extractor for the identity placed by [`auth_middleware`].
pub struct AuthUser(pub AuthenticatedIdentity);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<AuthenticatedIdentity>()
            .cloned()
            .ok_or_else(|| {
                AppError::InternalError(anyhow::anyhow!(
                    "identity missing from request extensions"
                ))
            })?;

        Ok(AuthUser(identity))
    }
}

/// Optional identity for endpoints usable with or without a token.
///
/// A missing or invalid header yields `None` rather than a rejection:
/// refresh callers usually hold nothing but an expired access token.
pub struct MaybeAuthUser(pub Option<AuthenticatedIdentity>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        Ok(MaybeAuthUser(authenticate(header, &state.jwt).ok()))
    }
}
