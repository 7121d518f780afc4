//! Per-request context: the parsed request, matched path parameters, and a
//! handle to the shared application state.
//!
//! Handlers receive state through the context (explicit dependency
//! injection) rather than through ambient globals, so tests can build a
//! fresh state per case and tear it down with the test.

use std::collections::HashMap;
use std::sync::Arc;

use crate::app::AppState;
use crate::config::Config;
use crate::http::Request;
use crate::store::Store;

/// Path parameters extracted from the matched route pattern.
///
/// For this service there is exactly one capture (`:id` on the user detail
/// and delete routes), but the map keeps the router generic.
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    map: HashMap<String, String>,
}

impl PathParams {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a captured value under its pattern name.
    pub fn insert(&mut self, key: String, value: String) {
        self.map.insert(key, value);
    }

    /// Returns the captured value for `key`, if the pattern bound one.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }
}

/// Everything a handler needs for one request.
pub struct Context {
    request: Request,
    params: PathParams,
    state: Arc<AppState>,
}

impl Context {
    /// Creates a context with no path parameters; the router fills them in
    /// via [`set_params`](Self::set_params) once a pattern matches.
    pub fn new(request: Request, state: Arc<AppState>) -> Self {
        Self {
            request,
            params: PathParams::new(),
            state,
        }
    }

    /// Replaces the path parameters after a successful route match.
    pub fn set_params(&mut self, params: PathParams) {
        self.params = params;
    }

    /// Returns the parsed request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the path parameters captured by the matched route.
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    /// Returns the shared application state.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns the in-memory store.
    pub fn store(&self) -> &Store {
        &self.state.store
    }

    /// Returns the process configuration.
    pub fn config(&self) -> &Config {
        &self.state.config
    }

    /// Deserializes the request body as JSON into `T`.
    pub fn json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(self.request.body())
    }
}
