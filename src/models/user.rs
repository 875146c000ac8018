use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Stored user account, including credential material.
///
/// `passwd` holds an argon2 PHC string, never the clear-text password.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRecord {
    #[diesel(column_name = user_name)]
    pub user: String,
    pub passwd: String,
    pub active: bool,
    pub extra: Value,
    pub change_password: bool,
    pub password_token: Option<String>,
}

/// Partial change set for a stored user. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, AsChangeset)]
#[diesel(table_name = crate::schema::users)]
pub struct UserChanges {
    pub passwd: Option<String>,
    pub active: Option<bool>,
    pub extra: Option<Value>,
    pub change_password: Option<bool>,
    pub password_token: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.passwd.is_none()
            && self.active.is_none()
            && self.extra.is_none()
            && self.change_password.is_none()
            && self.password_token.is_none()
    }

    /// Applies the change set to an in-memory record.
    pub fn apply_to(self, record: &mut UserRecord) {
        if let Some(passwd) = self.passwd {
            record.passwd = passwd;
        }
        if let Some(active) = self.active {
            record.active = active;
        }
        if let Some(extra) = self.extra {
            record.extra = extra;
        }
        if let Some(change_password) = self.change_password {
            record.change_password = change_password;
        }
        if let Some(token) = self.password_token {
            record.password_token = Some(token);
        }
    }
}

/// Public view of a user account (no credential material).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    pub user: String,
    pub active: bool,
    #[schema(value_type = Object)]
    pub extra: Value,
    pub change_password: bool,
}

impl From<UserRecord> for UserDocument {
    fn from(record: UserRecord) -> Self {
        Self {
            user: record.user,
            active: record.active,
            extra: record.extra,
            change_password: record.change_password,
        }
    }
}
