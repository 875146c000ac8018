//! Explicit `(method, arity) -> action` table for the user resource.

use std::collections::HashSet;

use axum::http::Method;
use thiserror::Error;

/// What the user resource does for a resolved request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserAction {
    List,
    Fetch,
    CheckCredentials,
    Create,
    Replace,
    Update,
    Remove,
}

impl UserAction {
    /// Whether the action takes its input from the JSON body.
    pub fn reads_body(self) -> bool {
        matches!(
            self,
            UserAction::CheckCredentials | UserAction::Create | UserAction::Replace | UserAction::Update
        )
    }

    pub fn is_mutation(self) -> bool {
        matches!(
            self,
            UserAction::Create | UserAction::Replace | UserAction::Update | UserAction::Remove
        )
    }
}

/// One row of the table: a verb with an exact suffix length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub method: Method,
    pub arity: usize,
    pub action: UserAction,
}

impl Route {
    pub fn new(method: Method, arity: usize, action: UserAction) -> Self {
        Self {
            method,
            arity,
            action,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RouteTableError {
    #[error("Duplicate route for {method} with {arity} suffix segment(s)")]
    Duplicate { method: Method, arity: usize },

    #[error("No route registered for {method}")]
    MissingVerb { method: Method },
}

/// Result of looking a request up in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Matched(UserAction),
    /// The verb is served, but not with this many suffix segments.
    BadArity,
    Unsupported,
}

/// Verbs the user resource answers. Anything else is unsupported.
pub const SUPPORTED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Builds a table, rejecting duplicates and verbs without any route.
    pub fn new(routes: Vec<Route>) -> Result<Self, RouteTableError> {
        let mut seen = HashSet::new();
        for route in &routes {
            if !seen.insert((route.method.clone(), route.arity)) {
                return Err(RouteTableError::Duplicate {
                    method: route.method.clone(),
                    arity: route.arity,
                });
            }
        }

        for method in SUPPORTED_METHODS {
            if !routes.iter().any(|route| route.method == method) {
                return Err(RouteTableError::MissingVerb { method });
            }
        }

        Ok(Self { routes })
    }

    /// The table served under `/_api/user`.
    pub fn users() -> Result<Self, RouteTableError> {
        Self::new(vec![
            Route::new(Method::GET, 0, UserAction::List),
            Route::new(Method::GET, 1, UserAction::Fetch),
            Route::new(Method::POST, 0, UserAction::Create),
            Route::new(Method::POST, 1, UserAction::CheckCredentials),
            Route::new(Method::PUT, 1, UserAction::Replace),
            Route::new(Method::PATCH, 1, UserAction::Update),
            Route::new(Method::DELETE, 1, UserAction::Remove),
        ])
    }

    pub fn resolve(&self, method: &Method, arity: usize) -> Resolution {
        let mut known_verb = false;
        for route in self.routes.iter().filter(|route| &route.method == method) {
            known_verb = true;
            if route.arity == arity {
                return Resolution::Matched(route.action);
            }
        }

        if known_verb {
            Resolution::BadArity
        } else {
            Resolution::Unsupported
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}
