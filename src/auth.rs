//! OAuth 2.0 configuration and request preparation for Dropbox.
//!
//! [`OAuthClient`] holds the app credentials and the access token. It never
//! talks to the network itself: it builds authorization URLs and token
//! requests, and turns option-built requests into [`PreparedRequest`]s.

use std::fmt;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use url::Url;

use crate::error::{DropboxError, Result};
use crate::http::{Endpoints, Host, HttpRequest, PreparedRequest, RequestBody};

/// Path of the authorization page on the www host.
const AUTHORIZE_PATH: &str = "/oauth2/authorize";

/// Path of the token endpoint on the API host.
const TOKEN_PATH: &str = "/oauth2/token";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// App credentials, access token and endpoint configuration.
#[derive(Clone, Default)]
pub struct OAuthClient {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub access_token: Option<String>,
    pub endpoints: Endpoints,
}

impl fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClient")
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .field("has_client_secret", &self.client_secret.is_some())
            .field("access_token", &self.masked_token())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl OAuthClient {
    /// Client for the authorization flow.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            redirect_uri: Some(redirect_uri.into()),
            ..Self::default()
        }
    }

    /// Client that only makes authenticated API calls.
    pub fn with_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Token preview safe for logs.
    pub fn masked_token(&self) -> Option<String> {
        self.access_token.as_deref().map(|token| {
            if token.len() <= 8 {
                "****".to_string()
            } else {
                let head: String = token.chars().take(4).collect();
                let tail: String = token
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("{}...{}", head, tail)
            }
        })
    }

    /// URL of the Dropbox authorization page.
    ///
    /// `state` is passed back to the redirect URI and should be used to
    /// protect against CSRF. With `force_reapprove`, users who already
    /// approved the app are asked again instead of being redirected.
    pub fn authorization_url(&self, state: &str, force_reapprove: bool) -> Result<String> {
        let client_id = non_blank(self.client_id.as_deref())
            .ok_or(DropboxError::MissingConfiguration("client_id"))?;
        let redirect_uri = non_blank(self.redirect_uri.as_deref())
            .ok_or(DropboxError::MissingConfiguration("redirect_uri"))?;
        if state.trim().is_empty() {
            return Err(DropboxError::InvalidArgument(
                "state must not be empty".to_string(),
            ));
        }

        let base = format!("{}{}", self.endpoints.www.trim_end_matches('/'), AUTHORIZE_PATH);
        let mut url = Url::parse(&base)
            .map_err(|e| DropboxError::InvalidArgument(format!("{}: {}", base, e)))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("state", state);
            if force_reapprove {
                query.append_pair("force_reapprove", "true");
            }
        }

        Ok(url.into())
    }

    /// Token request exchanging an authorization code for an access token.
    pub fn token_request(&self, code: &str) -> Result<HttpRequest> {
        let client_id = non_blank(self.client_id.as_deref())
            .ok_or(DropboxError::MissingConfiguration("client_id"))?;
        let client_secret = non_blank(self.client_secret.as_deref())
            .ok_or(DropboxError::MissingConfiguration("client_secret"))?;
        let redirect_uri = non_blank(self.redirect_uri.as_deref())
            .ok_or(DropboxError::MissingConfiguration("redirect_uri"))?;
        if code.trim().is_empty() {
            return Err(DropboxError::InvalidArgument(
                "authorization code must not be empty".to_string(),
            ));
        }

        let fields: Vec<(String, String)> = [
            ("code", code),
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("redirect_uri", redirect_uri),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Ok(HttpRequest::post(Host::Api, TOKEN_PATH)
            .with_body(RequestBody::Form(fields))
            .unauthenticated())
    }

    /// Resolve the request URL and attach the bearer token when the
    /// request is authenticated and a token is configured.
    pub fn prepare(&self, request: &HttpRequest) -> Result<PreparedRequest> {
        let mut headers = request.headers.clone();

        if request.authenticated {
            if let Some(token) = non_blank(self.access_token.as_deref()) {
                let value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|e| DropboxError::InvalidHeader(format!("authorization: {}", e)))?;
                headers.insert(AUTHORIZATION, value);
            }
        }

        Ok(PreparedRequest {
            method: request.method.clone(),
            url: request.url(&self.endpoints),
            headers,
            body: request.body.clone(),
        })
    }
}
