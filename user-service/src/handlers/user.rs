use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::user::{ChangePasswordRequest, UpdateUserRequest},
    middleware::AuthUser,
    utils::ValidatedJson,
    AppState,
};

/// Current caller's profile
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Caller profile", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let account = state.accounts.get_self(&user.0).await?;
    Ok(Json(account.sanitized()))
}

/// Fetch a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "Target user id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.accounts.get_user(&user.0, id).await?;
    Ok(Json(account.sanitized()))
}

/// Update a user's mutable fields
#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "Target user id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let account = state.accounts.update_user(&user.0, id, req).await?;
    Ok(Json(account.sanitized()))
}

/// Change a user's password
#[utoipa::path(
    post,
    path = "/users/{id}/password",
    params(("id" = Uuid, Path, description = "Target user id")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Current password incorrect", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.accounts.change_password(&user.0, id, req).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Password changed successfully. The account's session has been logged out."
        })),
    ))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "Target user id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.accounts.delete_user(&user.0, id).await?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "User deleted"
        })),
    ))
}
