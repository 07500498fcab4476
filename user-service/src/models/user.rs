//! User model - accounts with a fixed privilege level.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Privilege tier of an account, assigned at creation and never
/// changed through update paths.
///
/// Variant order gives `Customer < Admin < Root`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Customer,
    Admin,
    Root,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Customer => "customer",
            AccessLevel::Admin => "admin",
            AccessLevel::Root => "root",
        }
    }

    /// Admin-or-above: may operate on accounts other than its own.
    pub fn is_elevated(&self) -> bool {
        matches!(self, AccessLevel::Admin | AccessLevel::Root)
    }
}

/// User entity. The password hash never leaves this struct; outward
/// representation is [`UserResponse`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub level: AccessLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, level: AccessLevel) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            level,
            created_at: now,
            updated_at: now,
        }
    }

    /// Convert to the API representation (no credential material).
    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self.clone())
    }
}

/// User response for the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub level: AccessLevel,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            level: u.level,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}
