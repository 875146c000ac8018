//! UserStore trait definition.

use async_trait::async_trait;

use crate::models::{UserChanges, UserRecord};
use crate::store::StoreResult;

/// Persistence operations for user accounts.
///
/// All backends must implement this trait so the users service can run
/// against any of them.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All stored users, ordered by name.
    async fn list(&self) -> StoreResult<Vec<UserRecord>>;

    /// Look up a single user by name.
    async fn find(&self, user: &str) -> StoreResult<Option<UserRecord>>;

    /// Insert a new user. Fails with `StoreError::Duplicate` if the name is taken.
    async fn insert(&self, record: UserRecord) -> StoreResult<UserRecord>;

    /// Apply a change set. Returns `None` if the user does not exist.
    async fn update(&self, user: &str, changes: UserChanges) -> StoreResult<Option<UserRecord>>;

    /// Delete a user. Returns `false` if the user did not exist.
    async fn delete(&self, user: &str) -> StoreResult<bool>;

    /// Cheap connectivity check used by the health endpoint.
    async fn ping(&self) -> StoreResult<()>;
}
