//! In-process user store backed by a sharded concurrent map.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::models::{UserChanges, UserRecord};
use crate::store::{StoreError, StoreResult, UserStore};

/// User store that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> StoreResult<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.users.iter().map(|e| e.value().clone()).collect();
        users.sort_by(|a, b| a.user.cmp(&b.user));
        Ok(users)
    }

    async fn find(&self, user: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.get(user).map(|e| e.value().clone()))
    }

    async fn insert(&self, record: UserRecord) -> StoreResult<UserRecord> {
        match self.users.entry(record.user.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate { user: record.user }),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update(&self, user: &str, changes: UserChanges) -> StoreResult<Option<UserRecord>> {
        Ok(self.users.get_mut(user).map(|mut entry| {
            changes.apply_to(entry.value_mut());
            entry.value().clone()
        }))
    }

    async fn delete(&self, user: &str) -> StoreResult<bool> {
        Ok(self.users.remove(user).is_some())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
