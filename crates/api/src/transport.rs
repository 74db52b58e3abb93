//! The narrow contract the entry services depend on.
//!
//! A transport takes a method, an API-relative path, query pairs, extra
//! headers, and an optional JSON body, and returns the decoded JSON response
//! or an error. [`CmaClient`](crate::CmaClient) is the HTTP implementation;
//! tests substitute an in-memory one.

use std::sync::Arc;

use async_trait::async_trait;
use cma_util::JsonParseError;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

/// A single call against the management API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, already percent-encoded.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header_name, _)| header_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// First query value for `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(query_key, _)| query_key == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Failure reported by a [`Transport`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (DNS, TLS, timeout, connection reset).
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),
    /// The service answered with a non-success status.
    #[error("HTTP {status}{}: {message}", code_suffix(.code))]
    Status {
        status: u16,
        /// Error identifier from the response body, e.g. `VersionMismatch`.
        code: Option<String>,
        message: String,
    },
    /// The response body was not valid JSON.
    #[error(transparent)]
    Parse(#[from] JsonParseError),
    /// A header name or value could not be encoded.
    #[error("invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },
}

impl TransportError {
    /// HTTP status of the failed call, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|code| format!(" ({code})")).unwrap_or_default()
}

/// Sends [`ApiRequest`]s and returns the decoded JSON body.
///
/// An empty response body is returned as `Value::Null`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        (**self).send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_ignores_case() {
        let request = ApiRequest::new(Method::PUT, "/spaces/abc/entries/e1").with_header("X-Contentful-Version", "3");
        assert_eq!(request.header("x-contentful-version"), Some("3"));
        assert!(request.header("x-contentful-content-type").is_none());
    }

    #[test]
    fn status_error_mentions_service_code() {
        let error = TransportError::Status {
            status: 409,
            code: Some("VersionMismatch".into()),
            message: "stale".into(),
        };
        assert_eq!(error.to_string(), "HTTP 409 (VersionMismatch): stale");
        assert_eq!(error.status(), Some(409));
    }
}
