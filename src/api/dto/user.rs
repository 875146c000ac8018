//! User-related DTOs for API requests.

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::services::AccountFields;

/// JSON body accepted by the user resource.
///
/// Every field is optional; which ones matter depends on the verb.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    /// User name, read by create only
    #[schema(example = "alice")]
    pub user: Option<String>,
    #[schema(format = "password")]
    pub passwd: Option<String>,
    pub active: Option<bool>,
    /// Arbitrary JSON object stored with the user
    #[schema(value_type = Object)]
    pub extra: Option<Value>,
    pub change_password: Option<bool>,
    /// Set after a successful create
    pub password_token: Option<String>,
}

impl UserPayload {
    /// The account fields shared by create, replace and update.
    pub fn account_fields(&self) -> AccountFields {
        AccountFields {
            passwd: self.passwd.clone(),
            active: self.active,
            extra: self.extra.clone(),
            change_password: self.change_password,
        }
    }
}
