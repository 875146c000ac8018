//! Users collaborator: account CRUD, credential checks and cache reloads.
//!
//! The HTTP resource only talks to the [`UserDirectory`] trait; this module
//! provides the concrete [`UserService`] on top of a [`UserStore`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use validator::{Validate, ValidationError};

use crate::config::BootstrapConfig;
use crate::models::{UserChanges, UserDocument, UserRecord};
use crate::services::credentials::CredentialCache;
use crate::services::{UserError, UserResult};
use crate::store::UserStore;
use crate::utils::password;

/// Account fields accepted by create, replace and update.
///
/// `None` means "not supplied": create and replace fill in defaults,
/// update leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountFields {
    pub passwd: Option<String>,
    pub active: Option<bool>,
    pub extra: Option<Value>,
    pub change_password: Option<bool>,
}

/// Operations the user resource delegates to.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Every user document, sorted by name.
    async fn all(&self) -> UserResult<Vec<UserDocument>>;

    async fn document(&self, user: &str) -> UserResult<UserDocument>;

    /// Checks a password against the cached credentials.
    ///
    /// A wrong password or unknown user is `Ok(false)`, never an error.
    async fn is_valid(&self, user: &str, passwd: &str) -> UserResult<bool>;

    async fn save(&self, user: &str, fields: AccountFields) -> UserResult<UserDocument>;

    async fn replace(&self, user: &str, fields: AccountFields) -> UserResult<UserDocument>;

    async fn update(&self, user: &str, fields: AccountFields) -> UserResult<UserDocument>;

    async fn remove(&self, user: &str) -> UserResult<()>;

    async fn set_password_token(&self, user: &str, token: &str) -> UserResult<()>;

    /// Refreshes the cached view of credential data.
    async fn reload(&self) -> UserResult<()>;
}

#[derive(Debug, Validate)]
struct NewUserName {
    #[validate(
        length(min = 1, max = 256, message = "must be between 1 and 256 characters"),
        custom(function = "validate_user_name")
    )]
    user: String,
}

fn validate_user_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    if name.chars().any(char::is_control) {
        return Err(ValidationError::new("control_character")
            .with_message("must not contain control characters".into()));
    }
    Ok(())
}

fn check_name(user: &str) -> UserResult<()> {
    let candidate = NewUserName {
        user: user.to_string(),
    };
    candidate.validate().map_err(|errors| {
        let reason = errors
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .filter_map(|error| error.message.as_ref().map(|m| m.to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        UserError::InvalidName {
            user: user.to_string(),
            reason,
        }
    })
}

fn check_extra(extra: Option<Value>) -> UserResult<Option<Value>> {
    match extra {
        Some(Value::Object(_)) | None => Ok(extra),
        Some(_) => Err(UserError::invalid_parameter("extra", "must be an object")),
    }
}

fn hash(passwd: &str) -> UserResult<String> {
    password::hash_password(passwd).map_err(|source| UserError::Hashing { source })
}

/// Default [`UserDirectory`] backed by a [`UserStore`].
///
/// Cloning is cheap: the store and credential cache are shared.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    credentials: Arc<CredentialCache>,
    /// Held across list + rebuild so an older snapshot never lands last.
    reload_lock: Arc<Mutex<()>>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            credentials: Arc::new(CredentialCache::new()),
            reload_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn credentials(&self) -> &CredentialCache {
        &self.credentials
    }

    /// Creates the configured bootstrap user when the store holds no users.
    ///
    /// Returns `true` if a user was created. The caller reloads afterwards.
    pub async fn ensure_bootstrap_user(&self, config: &BootstrapConfig) -> UserResult<bool> {
        if !config.enabled {
            return Ok(false);
        }
        if !self.store.list().await?.is_empty() {
            tracing::debug!("User store already populated, skipping bootstrap user");
            return Ok(false);
        }

        let fields = AccountFields {
            passwd: Some(config.passwd.clone()),
            ..Default::default()
        };
        self.save(&config.user, fields).await?;
        tracing::info!(user = %config.user, "Created bootstrap user");
        Ok(true)
    }

    async fn apply(&self, user: &str, changes: UserChanges) -> UserResult<UserRecord> {
        self.store
            .update(user, changes)
            .await?
            .ok_or_else(|| UserError::not_found(user))
    }
}

#[async_trait]
impl UserDirectory for UserService {
    async fn all(&self) -> UserResult<Vec<UserDocument>> {
        let records = self.store.list().await?;
        Ok(records.into_iter().map(UserDocument::from).collect())
    }

    async fn document(&self, user: &str) -> UserResult<UserDocument> {
        self.store
            .find(user)
            .await?
            .map(UserDocument::from)
            .ok_or_else(|| UserError::not_found(user))
    }

    async fn is_valid(&self, user: &str, passwd: &str) -> UserResult<bool> {
        self.credentials.verify(user, passwd)
    }

    async fn save(&self, user: &str, fields: AccountFields) -> UserResult<UserDocument> {
        check_name(user)?;
        let extra = check_extra(fields.extra)?;

        let record = UserRecord {
            user: user.to_string(),
            passwd: hash(fields.passwd.as_deref().unwrap_or(""))?,
            active: fields.active.unwrap_or(true),
            extra: extra.unwrap_or_else(|| Value::Object(Map::new())),
            change_password: fields.change_password.unwrap_or(false),
            password_token: None,
        };

        let created = self.store.insert(record).await?;
        Ok(created.into())
    }

    async fn replace(&self, user: &str, fields: AccountFields) -> UserResult<UserDocument> {
        let extra = check_extra(fields.extra)?;
        let changes = UserChanges {
            passwd: Some(hash(fields.passwd.as_deref().unwrap_or(""))?),
            active: Some(fields.active.unwrap_or(true)),
            extra: Some(extra.unwrap_or_else(|| Value::Object(Map::new()))),
            change_password: Some(fields.change_password.unwrap_or(false)),
            password_token: None,
        };

        Ok(self.apply(user, changes).await?.into())
    }

    async fn update(&self, user: &str, fields: AccountFields) -> UserResult<UserDocument> {
        let extra = check_extra(fields.extra)?;
        let passwd = match fields.passwd {
            Some(passwd) => Some(hash(&passwd)?),
            None => None,
        };
        let changes = UserChanges {
            passwd,
            active: fields.active,
            extra,
            change_password: fields.change_password,
            password_token: None,
        };

        Ok(self.apply(user, changes).await?.into())
    }

    async fn remove(&self, user: &str) -> UserResult<()> {
        if self.store.delete(user).await? {
            Ok(())
        } else {
            Err(UserError::not_found(user))
        }
    }

    async fn set_password_token(&self, user: &str, token: &str) -> UserResult<()> {
        let changes = UserChanges {
            password_token: Some(token.to_string()),
            ..Default::default()
        };
        self.apply(user, changes).await.map(|_| ())
    }

    async fn reload(&self) -> UserResult<()> {
        let _serialized = self.reload_lock.lock().await;
        let records = self.store.list().await?;
        self.credentials.rebuild(&records);
        Ok(())
    }
}
