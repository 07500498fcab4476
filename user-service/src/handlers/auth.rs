use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::auth::{LoginRequest, LogoutRequest, RefreshRequest, RegisterRequest},
    middleware::{AuthUser, MaybeAuthUser},
    utils::ValidatedJson,
    AppState,
};

/// Register a new customer account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.accounts.register(req).await?;
    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.session_service.login(&req.email, &req.password).await?;
    Ok((StatusCode::OK, Json(res)))
}

/// Rotate a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token refreshed", body = TokenResponse),
        (status = 401, description = "Expired or invalid refresh token", body = ErrorResponse),
        (status = 403, description = "Token belongs to another user", body = ErrorResponse),
        (status = 404, description = "Refresh token not found", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn refresh(
    State(state): State<AppState>,
    MaybeAuthUser(identity): MaybeAuthUser,
    Json(req): Json<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let claimed_owner = identity.map(|i| i.id);
    let res = state
        .session_service
        .refresh(&req.refresh_token, claimed_owner)
        .await?;
    Ok((StatusCode::OK, Json(res)))
}

/// Logout and invalidate the session
#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Logged out"),
        (status = 403, description = "Token belongs to another user", body = ErrorResponse),
        (status = 404, description = "Refresh token not found", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<LogoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .session_service
        .logout(&req.refresh_token, Some(user.0.id))
        .await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Logged out successfully"
        })),
    ))
}
