//! HTTP plumbing: request/response values and the transport seam.
//!
//! Option builders produce an [`HttpRequest`] that names a [`Host`] rather
//! than a full URL. The OAuth client resolves it against [`Endpoints`] into a
//! [`PreparedRequest`], which a [`Transport`] sends.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;

use crate::error::{DropboxError, Result};

/// RPC endpoints (JSON in, JSON out) and OAuth token exchange.
pub const API_BASE: &str = "https://api.dropboxapi.com";

/// Content upload/download endpoints.
pub const CONTENT_BASE: &str = "https://content.dropboxapi.com";

/// User-facing web host, used for the authorization page.
pub const WWW_BASE: &str = "https://www.dropbox.com";

/// The Dropbox host family a request is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Api,
    Content,
}

/// Base URLs for each host family. Overridable so tests can point the
/// client at a mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api: String,
    pub content: String,
    pub www: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: API_BASE.to_string(),
            content: CONTENT_BASE.to_string(),
            www: WWW_BASE.to_string(),
        }
    }
}

impl Endpoints {
    /// Route every host family to a single base URL.
    pub fn single(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            api: base.clone(),
            content: base.clone(),
            www: base,
        }
    }

    /// Base URL for the given host, without a trailing slash.
    pub fn base(&self, host: Host) -> &str {
        let base = match host {
            Host::Api => &self.api,
            Host::Content => &self.content,
        };
        base.trim_end_matches('/')
    }
}

/// Request body variants used by the Dropbox endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
}

/// A request as described by an options value, before host resolution
/// and authorization.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub host: Host,
    pub path: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Whether the bearer token should be attached.
    pub authenticated: bool,
}

impl HttpRequest {
    /// A POST to `path` on `host` with an empty body.
    pub fn post(host: Host, path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            host,
            path: path.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            authenticated: true,
        }
    }

    /// A POST with a JSON body.
    pub fn post_json(host: Host, path: impl Into<String>, body: Value) -> Self {
        Self::post(host, path).with_body(RequestBody::Json(body))
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Add a header. Fails if the value is not a valid header value.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let header = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| DropboxError::InvalidHeader(format!("{}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| DropboxError::InvalidHeader(format!("{}: {}", name, e)))?;
        self.headers.insert(header, value);
        Ok(self)
    }

    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Full URL against the given endpoints.
    pub fn url(&self, endpoints: &Endpoints) -> String {
        format!("{}{}", endpoints.base(self.host), self.path)
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A fully resolved request, ready for a [`Transport`].
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// Raw HTTP response: status, headers and a binary-capable body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Capability to send a prepared request and return the raw response.
///
/// Implementations decide on timeouts, TLS and connection reuse.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing, pre-configured client.
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }

    /// Transport whose requests time out after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: PreparedRequest) -> Result<HttpResponse> {
        let PreparedRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let mut builder = self.http.request(method, &url).headers(headers);
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(json) => builder.json(&json),
            RequestBody::Form(fields) => builder.form(&fields),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_uses_host_base() {
        let endpoints = Endpoints::default();
        let request = HttpRequest::post(Host::Content, "/2/files/download");
        assert_eq!(
            request.url(&endpoints),
            "https://content.dropboxapi.com/2/files/download"
        );
    }

    #[test]
    fn test_single_endpoint_trims_trailing_slash() {
        let endpoints = Endpoints::single("http://127.0.0.1:1234/");
        let request = HttpRequest::post(Host::Api, "/2/files/list_folder");
        assert_eq!(
            request.url(&endpoints),
            "http://127.0.0.1:1234/2/files/list_folder"
        );
    }

    #[test]
    fn test_with_header_rejects_control_characters() {
        let result = HttpRequest::post(Host::Api, "/").with_header("dropbox-api-arg", "a\nb");
        assert!(matches!(result, Err(DropboxError::InvalidHeader(_))));
    }

    #[test]
    fn test_with_header_accepts_mixed_case_name() {
        let request = HttpRequest::post(Host::Content, "/2/files/download")
            .with_header("Dropbox-API-Arg", r#"{"path":"/a.txt"}"#)
            .unwrap();
        assert_eq!(request.header("dropbox-api-arg"), Some(r#"{"path":"/a.txt"}"#));
    }

    #[test]
    fn test_with_header_rejects_invalid_name() {
        let result = HttpRequest::post(Host::Api, "/").with_header("bad header", "x");
        assert!(matches!(result, Err(DropboxError::InvalidHeader(_))));
    }

    #[test]
    fn test_response_text_and_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-test", HeaderValue::from_static("yes"));
        let response = HttpResponse::new(200, headers, "hello");
        assert_eq!(response.status(), 200);
        assert_eq!(response.header("x-test"), Some("yes"));
        assert_eq!(response.text(), "hello");
    }
}
