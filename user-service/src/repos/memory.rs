//! In-memory repository implementations.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Session, User};
use crate::repos::{RepoError, SessionRepository, UserRepository};

/// User store backed by an id map plus an email index, kept consistent
/// under a single lock.
#[derive(Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<UserTable>,
}

#[derive(Default)]
struct UserTable {
    by_id: HashMap<Uuid, User>,
    id_by_email: HashMap<String, Uuid>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let table = self
            .inner
            .read()
            .map_err(|_| anyhow!("user table lock poisoned"))?;
        Ok(table
            .id_by_email
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let table = self
            .inner
            .read()
            .map_err(|_| anyhow!("user table lock poisoned"))?;
        Ok(table.by_id.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| anyhow!("user table lock poisoned"))?;
        if table.id_by_email.contains_key(&user.email) {
            return Err(RepoError::DuplicateEmail);
        }
        table.id_by_email.insert(user.email.clone(), user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| anyhow!("user table lock poisoned"))?;
        if let Some(holder) = table.id_by_email.get(&user.email) {
            if *holder != user.id {
                return Err(RepoError::DuplicateEmail);
            }
        }
        // Email may have changed; drop the stale index entry.
        let stale_email = table.by_id.get(&user.id).and_then(|previous| {
            if previous.email != user.email {
                Some(previous.email.clone())
            } else {
                None
            }
        });
        if let Some(stale_email) = stale_email {
            table.id_by_email.remove(&stale_email);
        }
        table.id_by_email.insert(user.email.clone(), user.id);
        table.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut table = self
            .inner
            .write()
            .map_err(|_| anyhow!("user table lock poisoned"))?;
        if let Some(user) = table.by_id.remove(&id) {
            table.id_by_email.remove(&user.email);
        }
        Ok(())
    }
}

/// Session store: one record per owner, indexed both ways.
///
/// Both indexes mutate under one mutex, which is what makes `replace`
/// a single logical operation for concurrent callers of the same
/// owner. The lock is never held across an await point.
#[derive(Default)]
pub struct InMemorySessionRepository {
    inner: Mutex<SessionIndex>,
}

#[derive(Default)]
struct SessionIndex {
    by_owner: HashMap<Uuid, Session>,
    owner_by_hash: HashMap<String, Uuid>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn replace(&self, session: Session) -> Result<(), RepoError> {
        let mut index = self
            .inner
            .lock()
            .map_err(|_| anyhow!("session index lock poisoned"))?;
        let owner_id = session.owner_id;
        let new_hash = session.token_hash.clone();
        index.owner_by_hash.insert(new_hash.clone(), owner_id);
        if let Some(superseded) = index.by_owner.insert(owner_id, session) {
            if superseded.token_hash != new_hash {
                index.owner_by_hash.remove(&superseded.token_hash);
            }
        }
        Ok(())
    }

    async fn find_by_token(&self, token_hash: &str) -> Result<Option<Session>, RepoError> {
        let index = self
            .inner
            .lock()
            .map_err(|_| anyhow!("session index lock poisoned"))?;
        Ok(index
            .owner_by_hash
            .get(token_hash)
            .and_then(|owner| index.by_owner.get(owner))
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> Result<Option<Session>, RepoError> {
        let index = self
            .inner
            .lock()
            .map_err(|_| anyhow!("session index lock poisoned"))?;
        Ok(index.by_owner.get(&owner_id).cloned())
    }

    async fn delete_by_owner(&self, owner_id: Uuid) -> Result<(), RepoError> {
        let mut index = self
            .inner
            .lock()
            .map_err(|_| anyhow!("session index lock poisoned"))?;
        if let Some(session) = index.by_owner.remove(&owner_id) {
            index.owner_by_hash.remove(&session.token_hash);
        }
        Ok(())
    }

    async fn delete_by_token(&self, token_hash: &str) -> Result<bool, RepoError> {
        let mut index = self
            .inner
            .lock()
            .map_err(|_| anyhow!("session index lock poisoned"))?;
        match index.owner_by_hash.remove(token_hash) {
            Some(owner) => {
                index.by_owner.remove(&owner);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
