//! In-memory view of credential data consulted by password checks.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use crate::models::UserRecord;
use crate::services::UserError;
use crate::utils::password;

#[derive(Debug, Clone)]
struct Credential {
    hash: String,
    active: bool,
}

/// Snapshot of password hashes and active flags, keyed by user name.
///
/// The cache is only refreshed by [`CredentialCache::rebuild`]; writes to
/// the store are invisible to [`CredentialCache::verify`] until then.
#[derive(Debug, Default)]
pub struct CredentialCache {
    entries: DashMap<String, Credential>,
    generation: AtomicU64,
}

impl CredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the cached view with the given records.
    ///
    /// Entries are overwritten in place and stale names dropped afterwards,
    /// so concurrent readers never observe an empty cache.
    pub fn rebuild(&self, records: &[UserRecord]) {
        for record in records {
            self.entries.insert(
                record.user.clone(),
                Credential {
                    hash: record.passwd.clone(),
                    active: record.active,
                },
            );
        }
        let current: HashSet<&str> = records.iter().map(|record| record.user.as_str()).collect();
        self.entries.retain(|name, _| current.contains(name.as_str()));

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(users = records.len(), generation, "Credential cache rebuilt");
    }

    /// Checks a clear-text password against the cached hash.
    ///
    /// Unknown and inactive users verify as `false`.
    pub fn verify(&self, user: &str, passwd: &str) -> Result<bool, UserError> {
        // Clone out so no shard lock is held while hashing.
        let Some(credential) = self.entries.get(user).map(|entry| entry.clone()) else {
            return Ok(false);
        };
        if !credential.active {
            return Ok(false);
        }

        password::verify_password(passwd, &credential.hash)
            .map_err(|source| UserError::Hashing { source })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
