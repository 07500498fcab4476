//! Repository contracts and the in-memory implementations behind them.
//!
//! Services depend only on the traits; the in-memory stores are one
//! implementation, constructed explicitly and injected, so tests and
//! concurrent callers never share hidden global state.

mod memory;

pub use memory::{InMemorySessionRepository, InMemoryUserRepository};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Session, User};

/// Failures a repository may surface. Uniqueness violations are typed
/// so callers can map them to a Conflict instead of a server error.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("email already taken")]
    DuplicateEmail,

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence contract for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;
    /// Fails with [`RepoError::DuplicateEmail`] if the email is taken.
    async fn create(&self, user: User) -> Result<User, RepoError>;
    /// Replaces the stored record for `user.id`; fails with
    /// [`RepoError::DuplicateEmail`] if the new email collides with
    /// another account.
    async fn update(&self, user: User) -> Result<User, RepoError>;
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;
}

/// Persistence contract for refresh-token sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Supersede any existing session for `session.owner_id` and
    /// install the new one, as a single logical operation: concurrent
    /// callers for the same owner must never observe zero or two live
    /// sessions.
    async fn replace(&self, session: Session) -> Result<(), RepoError>;
    async fn find_by_token(&self, token_hash: &str) -> Result<Option<Session>, RepoError>;
    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Session>, RepoError>;
    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<(), RepoError>;
    /// Returns whether a record was removed.
    async fn delete_by_token(&self, token_hash: &str) -> Result<bool, RepoError>;
}
