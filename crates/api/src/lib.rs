//! Content management API client utilities.
//!
//! This crate provides the transport layer the entry services talk through:
//!
//! - The [`Transport`] trait and its request/error types
//! - [`CmaClient`], a `reqwest`-backed implementation with sensible defaults
//! - Validation of the configured base URL
//! - Authentication and media-type headers on every request
//!
//! # Example
//!
//! ```ignore
//! use cma_api::{ApiRequest, CmaClient, Transport};
//! use cma_util::ClientConfig;
//! use reqwest::Method;
//!
//! async fn run() -> anyhow::Result<()> {
//!     let client = CmaClient::new(&ClientConfig::load()?)?;
//!     let payload = client.send(ApiRequest::new(Method::GET, "/spaces/abc/entries")).await?;
//!     println!("{payload}");
//!     Ok(())
//! }
//! ```

mod transport;

pub use transport::{ApiRequest, Transport, TransportError};

use std::env;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use cma_types::CONTENT_MEDIA_TYPE;
use cma_util::{ClientConfig, parse_response_json_strict, status_error_message, truncate_response_preview};
use reqwest::header::{self, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

/// Allowed hostnames or base domains for non-local base URLs. Subdomains
/// (for example regional endpoints) are also allowed.
const ALLOWED_API_DOMAINS: &[&str] = &["contentful.com"];
/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client`.
///
/// The client pre-configures authentication and media-type headers and
/// resolves every request against a validated base URL.
pub struct CmaClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl CmaClient {
    /// Construct a [`CmaClient`] from resolved configuration.
    ///
    /// Non-localhost base URLs must use HTTPS and be within an allowed domain.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut default_headers = header::HeaderMap::new();
        if let Some(token) = config.access_token.as_deref() {
            let mut authorization =
                HeaderValue::from_str(&format!("Bearer {}", token)).context("access token is not a valid header value")?;
            authorization.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, authorization);
        }
        default_headers.insert(header::ACCEPT, HeaderValue::from_static(CONTENT_MEDIA_TYPE));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("build http client")?;

        let base_url = config.base_url().trim_end_matches('/').to_string();
        validate_base_url(&base_url)?;
        Ok(Self {
            base_url,
            http,
            user_agent: format!("cma/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http.request(method, url).header(header::USER_AGENT, &self.user_agent)
    }

    /// Translate an [`ApiRequest`] into a ready-to-send builder.
    fn prepare(&self, request: ApiRequest) -> Result<RequestBuilder, TransportError> {
        let mut builder = self.request(request.method, &request.path);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|error| TransportError::InvalidHeader {
                name: name.clone(),
                reason: error.to_string(),
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|error| TransportError::InvalidHeader {
                name: name.clone(),
                reason: error.to_string(),
            })?;
            builder = builder.header(header_name, header_value);
        }
        if let Some(body) = request.body {
            builder = builder
                .header(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_MEDIA_TYPE))
                .json(&body);
        }
        Ok(builder)
    }
}

#[async_trait]
impl Transport for CmaClient {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let start = Instant::now();
        let method = request.method.clone();
        let path = request.path.clone();
        debug!(
            method = %method,
            path = %path,
            query_parameter_count = request.query.len(),
            has_body = request.body.is_some(),
            "http request started"
        );

        let response = self.prepare(request)?.send().await.map_err(|error| {
            warn!(
                method = %method,
                path = %path,
                error = %error,
                duration_ms = start.elapsed().as_millis(),
                "http request failed before a response"
            );
            TransportError::Network(error)
        })?;
        let status = response.status();
        let body_text = response.text().await.map_err(TransportError::Network)?;

        match into_result(status, &body_text) {
            Ok(parsed) => {
                debug!(
                    method = %method,
                    path = %path,
                    status = %status,
                    body_len = body_text.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "http request completed"
                );
                Ok(parsed)
            }
            Err(error) => {
                warn!(
                    method = %method,
                    path = %path,
                    status = %status,
                    body_len = body_text.len(),
                    error = %error,
                    duration_ms = start.elapsed().as_millis(),
                    "http request failed"
                );
                Err(error)
            }
        }
    }
}

/// Map a received status and body to the transport result.
///
/// Non-2xx statuses become [`TransportError::Status`]. A blank 2xx body is
/// [`Value::Null`] (deletes and state changes may answer with no content);
/// any other 2xx body must be JSON.
fn into_result(status: StatusCode, body_text: &str) -> Result<Value, TransportError> {
    if !status.is_success() {
        return Err(status_error(status, body_text));
    }
    if body_text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(parse_response_json_strict(body_text, Some(status))?)
}

/// Build a [`TransportError::Status`] from a failed response.
///
/// The service reports errors as `{"sys": {"type": "Error", "id": "<code>"}, "message": "..."}`.
/// When the body has that shape its code and message are used; otherwise
/// the message falls back to a status hint or a preview of the body.
fn status_error(status: StatusCode, body_text: &str) -> TransportError {
    let parsed = serde_json::from_str::<Value>(body_text).ok();
    let code = parsed
        .as_ref()
        .and_then(|body| body.pointer("/sys/id"))
        .and_then(Value::as_str)
        .map(str::to_string);
    let service_message = parsed
        .as_ref()
        .and_then(|body| body.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let message = match (service_message, status_error_message(status.as_u16())) {
        (Some(message), Some(hint)) => format!("{message}. {hint}"),
        (Some(message), None) => message,
        (None, Some(hint)) => hint,
        (None, None) => truncate_response_preview(body_text, 200),
    };

    TransportError::Status {
        status: status.as_u16(),
        code,
        message,
    }
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS, and host must be one of the allowed
///   domains or a subdomain thereof
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid base URL '{}': {}", base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("base URL must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "base URL must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        ));
    }

    let is_allowed_domain = ALLOWED_API_DOMAINS.iter().any(|&allowed_domain| {
        host_name.eq_ignore_ascii_case(allowed_domain) || host_name.ends_with(&format!(".{}", allowed_domain))
    });
    if !is_allowed_domain {
        return Err(anyhow!(
            "base URL host '{}' is not allowed; must be one of {:?} or a subdomain, or localhost",
            host_name,
            ALLOWED_API_DOMAINS
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cma_types::{CONTENT_TYPE_HEADER, VERSION_HEADER};
    use serde_json::json;

    fn local_client() -> CmaClient {
        let config = ClientConfig {
            base_url: Some("http://localhost:8080/".into()),
            access_token: Some("CFPAT-test".into()),
            default_space: None,
        };
        CmaClient::new(&config).expect("client")
    }

    #[test]
    fn validate_base_url_rules() {
        assert!(validate_base_url("https://api.contentful.com").is_ok());
        assert!(validate_base_url("https://api.eu.contentful.com").is_ok());
        assert!(validate_base_url("http://localhost:3000").is_ok());
        assert!(validate_base_url("http://127.0.0.1").is_ok());
        assert!(validate_base_url("http://api.contentful.com").is_err());
        assert!(validate_base_url("https://evil.example.com").is_err());
        assert!(validate_base_url("https://notcontentful.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn prepare_applies_path_query_headers_and_body() {
        let client = local_client();
        let request = ApiRequest::new(Method::PUT, "/spaces/abc/entries/e1")
            .with_query([("limit".to_string(), "10".to_string())])
            .with_header(VERSION_HEADER, "3")
            .with_header(CONTENT_TYPE_HEADER, "post")
            .with_body(json!({ "sys": null, "fields": { "title": "Hello" } }));

        let built = client.prepare(request).expect("prepare").build().expect("build");

        assert_eq!(built.method(), &Method::PUT);
        assert_eq!(built.url().as_str(), "http://localhost:8080/spaces/abc/entries/e1?limit=10");
        assert_eq!(built.headers().get(VERSION_HEADER).and_then(|v| v.to_str().ok()), Some("3"));
        assert_eq!(built.headers().get(CONTENT_TYPE_HEADER).and_then(|v| v.to_str().ok()), Some("post"));
        assert_eq!(
            built.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some(CONTENT_MEDIA_TYPE)
        );
        let body = built.body().and_then(|body| body.as_bytes()).expect("body bytes");
        let decoded: Value = serde_json::from_slice(body).expect("json body");
        assert_eq!(decoded, json!({ "sys": null, "fields": { "title": "Hello" } }));
    }

    #[test]
    fn prepare_rejects_invalid_header_values() {
        let client = local_client();
        let request = ApiRequest::new(Method::POST, "/spaces/abc/entries").with_header(CONTENT_TYPE_HEADER, "bad\nvalue");

        let error = client.prepare(request).expect_err("newline is not a valid header value");
        assert!(matches!(error, TransportError::InvalidHeader { .. }));
    }

    #[test]
    fn blank_success_body_is_null() {
        assert_eq!(into_result(StatusCode::NO_CONTENT, "").expect("no content"), Value::Null);
        assert_eq!(into_result(StatusCode::OK, " \n").expect("blank body"), Value::Null);
    }

    #[test]
    fn success_body_is_parsed_json() {
        let value = into_result(StatusCode::OK, r#"{"sys":{"id":"e1","version":2}}"#).expect("json body");
        assert_eq!(value.pointer("/sys/version"), Some(&json!(2)));
    }

    #[test]
    fn failed_status_carries_service_code() {
        let body = r#"{"sys":{"type":"Error","id":"NotFound"},"message":"The resource could not be found."}"#;
        match into_result(StatusCode::NOT_FOUND, body) {
            Err(TransportError::Status { status, code, .. }) => {
                assert_eq!(status, 404);
                assert_eq!(code.as_deref(), Some("NotFound"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_json_success_body_is_a_parse_error() {
        let error = into_result(StatusCode::OK, "<html>maintenance</html>").expect_err("html is not json");
        assert!(matches!(error, TransportError::Parse(_)), "error: {error:?}");
        assert!(error.to_string().contains("status 200"), "error: {error}");
    }

    #[test]
    fn status_error_prefers_service_payload() {
        let body = r#"{"sys":{"type":"Error","id":"VersionMismatch"},"message":"Version mismatch"}"#;
        let error = status_error(StatusCode::CONFLICT, body);
        match error {
            TransportError::Status { status, code, message } => {
                assert_eq!(status, 409);
                assert_eq!(code.as_deref(), Some("VersionMismatch"));
                assert!(message.starts_with("Version mismatch."), "message: {message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn status_error_falls_back_to_body_preview() {
        let error = status_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream\nexploded");
        match error {
            TransportError::Status { code, message, .. } => {
                assert!(code.is_none());
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
