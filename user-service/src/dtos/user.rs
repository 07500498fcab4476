use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Fields a caller may change on an account. The privilege level is
/// deliberately absent: it is fixed at creation.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "new-address@example.com")]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    /// Required when changing one's own password; elevated callers
    /// resetting another account omit it.
    pub current_password: Option<String>,

    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    #[schema(example = "newpassword123", min_length = 8)]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdminRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "operator@example.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "password123", min_length = 8)]
    pub password: String,
}
