//! App credentials loaded from a JSON file or the environment.

use std::env;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::auth::OAuthClient;
use crate::error::{DropboxError, Result};

pub const ENV_CLIENT_ID: &str = "DROPBOX_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "DROPBOX_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "DROPBOX_REDIRECT_URI";
pub const ENV_ACCESS_TOKEN: &str = "DROPBOX_ACCESS_TOKEN";

/// Dropbox app credentials. Every field is optional; operations report
/// `MissingConfiguration` for the ones they need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Credentials {
    /// Load credentials from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| DropboxError::ConfigParseError(e.to_string()))
    }

    /// Load credentials from `DROPBOX_*` environment variables.
    pub fn from_env() -> Self {
        let var = |name: &str| env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            client_id: var(ENV_CLIENT_ID),
            client_secret: var(ENV_CLIENT_SECRET),
            redirect_uri: var(ENV_REDIRECT_URI),
            access_token: var(ENV_ACCESS_TOKEN),
        }
    }

    /// Fill fields missing here from `other`.
    pub fn or(self, other: Credentials) -> Self {
        Self {
            client_id: self.client_id.or(other.client_id),
            client_secret: self.client_secret.or(other.client_secret),
            redirect_uri: self.redirect_uri.or(other.redirect_uri),
            access_token: self.access_token.or(other.access_token),
        }
    }

    pub fn into_oauth_client(self) -> OAuthClient {
        OAuthClient {
            client_id: self.client_id,
            client_secret: self.client_secret,
            redirect_uri: self.redirect_uri,
            access_token: self.access_token,
            ..OAuthClient::default()
        }
    }
}
