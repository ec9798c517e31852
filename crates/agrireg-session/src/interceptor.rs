//! Outgoing request hook
//!
//! Every authenticated request counts as user activity. The interceptor is
//! transport-agnostic: callers copy the headers onto whatever client they use.

use std::collections::BTreeMap;

use tracing::trace;

use crate::store::SessionStore;

/// Header carrying the bearer token
pub const AUTHORIZATION: &str = "Authorization";

/// Minimal description of a request about to be sent
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
}

impl OutgoingRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: BTreeMap::new(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Attaches the bearer token and records activity
#[derive(Clone, Debug)]
pub struct SessionInterceptor {
    store: SessionStore,
}

impl SessionInterceptor {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Prepare `request` for sending
    ///
    /// Returns whether the request was authenticated. Anonymous requests are
    /// left untouched and do not reset the idle clock.
    pub fn intercept(&self, request: &mut OutgoingRequest) -> bool {
        let Some(token) = self.store.access_token() else {
            return false;
        };
        request
            .headers
            .insert(AUTHORIZATION.to_string(), format!("Bearer {}", token));
        self.store.record_activity();
        trace!(method = %request.method, path = %request.path, "Authenticated request");
        true
    }
}
