//! Tests for loading credentials from files.

use std::io::Write;

use dropbox_files::{Credentials, DropboxError};
use serde_json::json;
use tempfile::NamedTempFile;

#[test]
fn test_credentials_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let creds_json = json!({
        "client_id": "app-key",
        "client_secret": "app-secret",
        "redirect_uri": "https://example.com/cb"
    });
    temp_file.write_all(creds_json.to_string().as_bytes()).unwrap();

    let creds = Credentials::from_file(temp_file.path()).unwrap();
    assert_eq!(creds.client_id.as_deref(), Some("app-key"));
    assert_eq!(creds.client_secret.as_deref(), Some("app-secret"));
    assert!(creds.access_token.is_none());

    let oauth = creds.into_oauth_client();
    assert!(oauth.token_request("code").is_ok());
}

#[test]
fn test_credentials_token_only() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(br#"{"access_token": "sl.abc"}"#)
        .unwrap();

    let oauth = Credentials::from_file(temp_file.path())
        .unwrap()
        .into_oauth_client();
    assert!(matches!(
        oauth.authorization_url("state", false),
        Err(DropboxError::MissingConfiguration("client_id"))
    ));
}

#[test]
fn test_credentials_from_missing_file() {
    let result = Credentials::from_file("/nonexistent/path/dropbox.json");
    assert!(matches!(result, Err(DropboxError::ConfigFileError(_))));
}

#[test]
fn test_credentials_from_invalid_json() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"not valid json").unwrap();

    let result = Credentials::from_file(temp_file.path());
    assert!(matches!(result, Err(DropboxError::ConfigParseError(_))));
}
