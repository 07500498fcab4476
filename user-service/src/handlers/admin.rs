use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::user::CreateAdminRequest, middleware::AuthUser, utils::ValidatedJson, AppState,
};

/// Create an admin account (requires admin or root)
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin account created", body = UserResponse),
        (status = 403, description = "Insufficient privileges", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "Admin",
    security(("bearer_auth" = []))
)]
pub async fn create_admin(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created = state.accounts.create_admin(&user.0, req).await?;
    Ok((StatusCode::CREATED, Json(created.sanitized())))
}
