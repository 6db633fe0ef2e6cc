//! REST client for the Admin Auto backend.
//!
//! [`AutoApiClient`] exposes typed endpoint methods on top of an
//! [`ApiTransport`]. The production transport is [`HttpTransport`]; tests swap
//! in their own implementation or point the HTTP transport at a mock server.

use async_trait::async_trait;
use auto_store::PageRequest;
use serde_json::Value;

mod client;
mod error;
mod http;

pub use client::AutoApiClient;
pub use error::{ApiError, ApiErrorKind, ApiResult};
pub use http::{HttpTransport, HttpTransportConfig, api_base_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl ApiMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

/// One request against the backend, relative to its `/api` base.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: ApiMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: ApiMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(ApiMethod::Get, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(ApiMethod::Delete, path)
    }

    #[must_use]
    pub fn with_query(mut self, query: &ListQuery) -> Self {
        self.query = query
            .pairs()
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends requests to the backend.
///
/// Implementations return `Ok(None)` for empty bodies (204 responses).
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> ApiResult<Option<Value>>;
}

/// Query string for list endpoints. Only values that are set are forwarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    params: Vec<(&'static str, String)>,
}

impl ListQuery {
    #[must_use]
    pub const fn new() -> Self {
        Self { params: Vec::new() }
    }

    #[must_use]
    pub fn from_page(request: &PageRequest) -> Self {
        Self::new()
            .with_opt("page", request.page)
            .with_opt("per_page", request.per_page)
            .with_opt("search", request.search.as_deref())
    }

    #[must_use]
    pub fn with(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }

    #[must_use]
    pub fn with_opt<T: ToString>(self, key: &'static str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with(key, value),
            None => self,
        }
    }

    #[must_use]
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.params
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_skips_unset_values() {
        let query = ListQuery::new()
            .with("page", 2)
            .with_opt("search", None::<&str>)
            .with_opt("environment", Some("prd"));

        assert_eq!(
            query.pairs(),
            [("page", "2".to_string()), ("environment", "prd".to_string())]
        );
        assert_eq!(query.get("environment"), Some("prd"));
        assert_eq!(query.get("search"), None);
    }

    #[test]
    fn page_request_becomes_query() {
        let request = PageRequest {
            page: None,
            per_page: Some(10),
            search: Some("git".to_string()),
        };
        let query = ListQuery::from_page(&request);
        assert_eq!(query.get("per_page"), Some("10"));
        assert_eq!(query.get("search"), Some("git"));
        assert_eq!(query.get("page"), None);
    }
}
