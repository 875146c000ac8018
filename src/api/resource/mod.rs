//! The `/_api/user` resource.
//!
//! [`UserResource`] resolves a request against its [`RouteTable`], runs the
//! matching action against a [`UserDirectory`] and renders the outcome with
//! a [`Responder`]. It holds no per-request state.

mod request;
mod responder;
mod route_table;

use std::sync::Arc;

use axum::{
    http::{Method, StatusCode},
    response::Response,
};
use serde_json::json;

pub use crate::error::ErrorNum;
pub use request::{BodyError, ResourceRequest, SuffixError};
pub use responder::{JsonResponder, Responder};
pub use route_table::{Resolution, Route, RouteTable, RouteTableError, UserAction};

use crate::api::dto::UserPayload;
use crate::services::{UserDirectory, UserError, UserResult};

/// Path the resource is mounted under.
pub const USER_ROOT: &str = "/_api/user";

#[derive(Clone)]
pub struct UserResource {
    directory: Arc<dyn UserDirectory>,
    responder: Arc<dyn Responder>,
    routes: RouteTable,
}

impl UserResource {
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        responder: Arc<dyn Responder>,
    ) -> Result<Self, RouteTableError> {
        Ok(Self {
            directory,
            responder,
            routes: RouteTable::users()?,
        })
    }

    pub fn responder(&self) -> &dyn Responder {
        self.responder.as_ref()
    }

    /// Handles one request. Never fails: unexpected collaborator errors
    /// become the exception response.
    pub async fn handle(&self, request: ResourceRequest) -> Response {
        match self.dispatch(&request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(
                    method = %request.method,
                    error = %error,
                    source = ?std::error::Error::source(&error),
                    "User resource request failed"
                );
                self.responder.exception(&error)
            }
        }
    }

    async fn dispatch(&self, request: &ResourceRequest) -> UserResult<Response> {
        // POST reads its body before the suffix is checked, PUT and PATCH after.
        let early_payload = if request.method == Method::POST {
            match self.read_body(request) {
                Ok(payload) => Some(payload),
                Err(response) => return Ok(response),
            }
        } else {
            None
        };

        let action = match self.routes.resolve(&request.method, request.suffix.len()) {
            Resolution::Matched(action) => action,
            Resolution::BadArity => {
                return Ok(self.responder.bad(
                    ErrorNum::HttpBadParameter,
                    &format!(
                        "unexpected number of path segments for {}: {}",
                        request.method,
                        request.suffix.len()
                    ),
                ));
            }
            Resolution::Unsupported => return Ok(self.responder.unsupported()),
        };

        let payload = match early_payload {
            Some(payload) => payload,
            None if action.reads_body() => match self.read_body(request) {
                Ok(payload) => payload,
                Err(response) => return Ok(response),
            },
            None => UserPayload::default(),
        };

        let name = request.suffix.first().map(String::as_str).unwrap_or_default();
        match self.perform(action, name, payload).await {
            Err(UserError::NotFound { user }) => {
                tracing::debug!(user = %user, ?action, "User not found");
                Ok(self.responder.not_found(ErrorNum::UserNotFound))
            }
            outcome => outcome,
        }
    }

    fn read_body(&self, request: &ResourceRequest) -> Result<UserPayload, Response> {
        request.json_body::<UserPayload>().map_err(|error| match error {
            BodyError::Corrupted => self
                .responder
                .bad(ErrorNum::HttpCorruptedJson, ErrorNum::HttpCorruptedJson.message()),
            BodyError::Shape(reason) => self.responder.bad(ErrorNum::HttpBadParameter, &reason),
        })
    }

    /// Runs the action. Mutations reload once the store has changed, even
    /// when a follow-up step such as setting the password token fails.
    async fn perform(
        &self,
        action: UserAction,
        name: &str,
        payload: UserPayload,
    ) -> UserResult<Response> {
        let users = &self.directory;

        let (response, deferred) = match action {
            UserAction::List => {
                let documents = users.all().await?;
                (self.responder.ok(StatusCode::OK, json!(documents)), Ok(()))
            }
            UserAction::Fetch => {
                let document = users.document(name).await?;
                (self.responder.ok(StatusCode::OK, json!(document)), Ok(()))
            }
            UserAction::CheckCredentials => {
                let passwd = payload.passwd.as_deref().unwrap_or_default();
                let response = if users.is_valid(name, passwd).await? {
                    self.responder.ok(StatusCode::OK, json!(true))
                } else {
                    self.responder.not_found(ErrorNum::UserNotFound)
                };
                (response, Ok(()))
            }
            UserAction::Create => {
                let user = payload.user.clone().unwrap_or_default();
                let document = users.save(&user, payload.account_fields()).await?;
                tracing::info!(user = %document.user, "User created");
                let token = match payload.password_token.as_deref().filter(|t| !t.is_empty()) {
                    Some(token) => users.set_password_token(&document.user, token).await,
                    None => Ok(()),
                };
                (self.responder.ok(StatusCode::CREATED, json!(document)), token)
            }
            UserAction::Replace => {
                let document = users.replace(name, payload.account_fields()).await?;
                tracing::info!(user = %name, "User replaced");
                (self.responder.ok(StatusCode::OK, json!(document)), Ok(()))
            }
            UserAction::Update => {
                let document = users.update(name, payload.account_fields()).await?;
                tracing::info!(user = %name, "User updated");
                (self.responder.ok(StatusCode::OK, json!(document)), Ok(()))
            }
            UserAction::Remove => {
                users.remove(name).await?;
                tracing::info!(user = %name, "User removed");
                (self.responder.ok(StatusCode::ACCEPTED, json!({})), Ok(()))
            }
        };

        if action.is_mutation() {
            users.reload().await?;
        }
        deferred.map(|()| response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserDocument;
    use crate::services::{AccountFields, UserService};
    use crate::store::{MemoryUserStore, StoreError};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Bytes};
    use axum::http::Method;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Wraps the real service and counts reloads.
    struct CountingDirectory {
        inner: UserService,
        reloads: AtomicUsize,
        token_writes: AtomicUsize,
        fail_reads: bool,
        fail_tokens: bool,
    }

    impl CountingDirectory {
        fn reloads(&self) -> usize {
            self.reloads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserDirectory for CountingDirectory {
        async fn all(&self) -> UserResult<Vec<UserDocument>> {
            if self.fail_reads {
                return Err(StoreError::backend("list users", "connection reset").into());
            }
            self.inner.all().await
        }
        async fn document(&self, user: &str) -> UserResult<UserDocument> {
            self.inner.document(user).await
        }
        async fn is_valid(&self, user: &str, passwd: &str) -> UserResult<bool> {
            self.inner.is_valid(user, passwd).await
        }
        async fn save(&self, user: &str, fields: AccountFields) -> UserResult<UserDocument> {
            self.inner.save(user, fields).await
        }
        async fn replace(&self, user: &str, fields: AccountFields) -> UserResult<UserDocument> {
            self.inner.replace(user, fields).await
        }
        async fn update(&self, user: &str, fields: AccountFields) -> UserResult<UserDocument> {
            self.inner.update(user, fields).await
        }
        async fn remove(&self, user: &str) -> UserResult<()> {
            self.inner.remove(user).await
        }
        async fn set_password_token(&self, user: &str, token: &str) -> UserResult<()> {
            self.token_writes.fetch_add(1, Ordering::SeqCst);
            if self.fail_tokens {
                return Err(StoreError::backend("set password token", "disk full").into());
            }
            self.inner.set_password_token(user, token).await
        }
        async fn reload(&self) -> UserResult<()> {
            self.reloads.fetch_add(1, Ordering::SeqCst);
            self.inner.reload().await
        }
    }

    fn fixture(fail_reads: bool) -> (UserResource, Arc<CountingDirectory>) {
        fixture_with(fail_reads, false)
    }

    fn fixture_with(fail_reads: bool, fail_tokens: bool) -> (UserResource, Arc<CountingDirectory>) {
        let directory = Arc::new(CountingDirectory {
            inner: UserService::new(Arc::new(MemoryUserStore::new())),
            reloads: AtomicUsize::new(0),
            token_writes: AtomicUsize::new(0),
            fail_reads,
            fail_tokens,
        });
        let resource = UserResource::new(directory.clone(), Arc::new(JsonResponder)).unwrap();
        (resource, directory)
    }

    async fn call(
        resource: &UserResource,
        method: Method,
        suffix: &[&str],
        body: &str,
    ) -> (StatusCode, Value) {
        let request = ResourceRequest::new(
            method,
            suffix.iter().map(|s| s.to_string()).collect(),
            Bytes::from(body.to_string()),
        );
        let response = resource.handle(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn create(resource: &UserResource, user: &str, passwd: &str) {
        let body = json!({"user": user, "passwd": passwd}).to_string();
        let (status, _) = call(resource, Method::POST, &[], &body).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_create_then_fetch() {
        let (resource, directory) = fixture(false);
        let body = json!({
            "user": "alice",
            "passwd": "wonderland",
            "active": false,
            "extra": {"team": "ops"},
            "changePassword": true
        });
        let (status, created) = call(&resource, Method::POST, &[], &body.to_string()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["code"], 201);
        assert_eq!(created["error"], false);
        assert_eq!(directory.reloads(), 1);

        let (status, fetched) = call(&resource, Method::GET, &["alice"], "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            fetched,
            json!({
                "user": "alice",
                "active": false,
                "extra": {"team": "ops"},
                "changePassword": true,
                "error": false,
                "code": 200
            })
        );
        assert_eq!(directory.reloads(), 1);
    }

    #[tokio::test]
    async fn test_list_wraps_result() {
        let (resource, _) = fixture(false);
        create(&resource, "bob", "b").await;
        create(&resource, "alice", "a").await;

        let (status, body) = call(&resource, Method::GET, &[], "").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<_> = body["result"]
            .as_array()
            .unwrap()
            .iter()
            .map(|doc| doc["user"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["alice", "bob"]);
    }

    #[tokio::test]
    async fn test_fetch_unknown_user() {
        let (resource, _) = fixture(false);
        let (status, body) = call(&resource, Method::GET, &["ghost"], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorNum"], 1703);
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_too_many_segments() {
        let (resource, directory) = fixture(false);
        for method in [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let (status, body) = call(&resource, method, &["a", "b"], "{}").await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["errorNum"], 400);
        }
        assert_eq!(directory.reloads(), 0);
    }

    #[tokio::test]
    async fn test_post_reads_body_before_suffix() {
        let (resource, _) = fixture(false);

        let (status, body) = call(&resource, Method::POST, &["a", "b"], "{oops").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorNum"], 600);

        for method in [Method::PUT, Method::PATCH] {
            let (status, body) = call(&resource, method, &["a", "b"], "{oops").await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["errorNum"], 400);
        }
    }

    #[tokio::test]
    async fn test_mutation_without_name_is_bad_parameter() {
        let (resource, _) = fixture(false);
        for method in [Method::PUT, Method::PATCH, Method::DELETE] {
            let (status, _) = call(&resource, method, &[], "{}").await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn test_check_credentials() {
        let (resource, _) = fixture(false);
        create(&resource, "alice", "wonderland").await;

        let (status, body) =
            call(&resource, Method::POST, &["alice"], r#"{"passwd":"wonderland"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"result": true, "error": false, "code": 200}));

        let (status, body) = call(&resource, Method::POST, &["alice"], r#"{"passwd":"nope"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorNum"], 1703);

        let (status, _) = call(&resource, Method::POST, &["ghost"], r#"{"passwd":"x"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_password_change_visible_after_reload() {
        let (resource, directory) = fixture(false);
        create(&resource, "alice", "old").await;

        let (status, _) = call(&resource, Method::PATCH, &["alice"], r#"{"passwd":"new"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(directory.reloads(), 2);

        let (status, _) = call(&resource, Method::POST, &["alice"], r#"{"passwd":"new"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&resource, Method::POST, &["alice"], r#"{"passwd":"old"}"#).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_replace_and_update() {
        let (resource, directory) = fixture(false);
        create(&resource, "alice", "a").await;

        let (status, body) = call(
            &resource,
            Method::PATCH,
            &["alice"],
            r#"{"extra":{"team":"ops"}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extra"], json!({"team": "ops"}));
        assert_eq!(body["active"], true);

        let (status, body) = call(&resource, Method::PUT, &["alice"], r#"{"active":false}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["extra"], json!({}));
        assert_eq!(body["active"], false);

        let (status, _) = call(&resource, Method::PATCH, &["alice"], "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(directory.reloads(), 4);
    }

    #[tokio::test]
    async fn test_failed_mutations_do_not_reload() {
        let (resource, directory) = fixture(false);

        let (status, _) = call(&resource, Method::PUT, &["ghost"], "{}").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&resource, Method::PATCH, &["ghost"], "{}").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, body) = call(&resource, Method::DELETE, &["ghost"], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorNum"], 1703);

        assert_eq!(directory.reloads(), 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let (resource, directory) = fixture(false);
        create(&resource, "alice", "a").await;

        let (status, body) = call(&resource, Method::DELETE, &["alice"], "").await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, json!({"error": false, "code": 202}));
        assert_eq!(directory.reloads(), 2);

        let (status, _) = call(&resource, Method::GET, &["alice"], "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_errors() {
        let (resource, directory) = fixture(false);

        let (status, body) = call(&resource, Method::POST, &[], "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorNum"], 600);

        let (status, body) = call(&resource, Method::POST, &[], "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorNum"], 600);

        let (status, body) = call(&resource, Method::POST, &[], "[1, 2]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorNum"], 400);

        let (status, body) = call(&resource, Method::POST, &[], r#"{"user":"a","active":"yes"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorNum"], 400);

        assert_eq!(directory.reloads(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_verb() {
        let (resource, _) = fixture(false);
        for method in [Method::HEAD, Method::OPTIONS, Method::TRACE] {
            let (status, body) = call(&resource, method, &["alice"], "").await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(body["errorNum"], 405);
        }
    }

    #[tokio::test]
    async fn test_duplicate_create_is_exception() {
        let (resource, directory) = fixture(false);
        create(&resource, "alice", "a").await;

        let (status, body) = call(&resource, Method::POST, &[], r#"{"user":"alice"}"#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errorNum"], 1702);
        assert_eq!(directory.reloads(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_sanitised_exception() {
        let (resource, _) = fixture(true);
        let (status, body) = call(&resource, Method::GET, &[], "").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errorNum"], 4);
        assert!(!body["errorMessage"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_create_with_password_token() {
        let (resource, directory) = fixture(false);
        let body = r#"{"user":"alice","passwordToken":"reset-me"}"#;
        let (status, created) = call(&resource, Method::POST, &[], body).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(created.get("passwordToken").is_none());
        assert_eq!(directory.token_writes.load(Ordering::SeqCst), 1);
        assert_eq!(directory.reloads(), 1);
    }

    #[tokio::test]
    async fn test_empty_password_token_is_skipped() {
        let (resource, directory) = fixture(false);
        let body = r#"{"user":"alice","passwordToken":""}"#;
        let (status, _) = call(&resource, Method::POST, &[], body).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(directory.token_writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_token_failure_still_reloads_created_user() {
        let (resource, directory) = fixture_with(false, true);
        let body = r#"{"user":"alice","passwd":"a","passwordToken":"reset-me"}"#;
        let (status, body) = call(&resource, Method::POST, &[], body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["errorNum"], 4);
        assert_eq!(directory.reloads(), 1);

        // The account exists and is already known to the credential cache
        let (status, _) = call(&resource, Method::POST, &["alice"], r#"{"passwd":"a"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }
}
