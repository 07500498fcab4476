pub mod auth;
pub mod user;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error body shape shared by every failure response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid credentials")]
    pub error: String,
}
