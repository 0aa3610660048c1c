//! Response validation and typed bodies.

use bytes::Bytes;
use log::warn;
use serde_json::Value;

use crate::error::{DropboxError, Result};
use crate::http::HttpResponse;
use crate::models::{
    DropboxObject, FileMetadata, ListFolderResult, Metadata, ThumbnailBatchResult, Token,
};
use crate::options::API_RESULT_HEADER;

/// A successful Dropbox response together with its parsed body.
#[derive(Debug, Clone)]
pub struct DropboxResponse<T> {
    response: HttpResponse,
    body: T,
}

pub type ListFolderResponse = DropboxResponse<ListFolderResult>;
pub type GetMetadataResponse = DropboxResponse<Metadata>;
pub type DownloadResponse = DropboxResponse<DownloadResult>;
pub type ThumbnailBatchResponse = DropboxResponse<ThumbnailBatchResult>;
pub type TokenResponse = DropboxResponse<Token>;

/// Fail with `RemoteApiError` unless the status is 200.
pub fn ensure_success(response: HttpResponse) -> Result<HttpResponse> {
    if response.status() == 200 {
        return Ok(response);
    }
    warn!(
        "Dropbox API responded with status {}: {}",
        response.status(),
        response.text()
    );
    Err(DropboxError::RemoteApiError(Box::new(response)))
}

/// Parse a JSON document, mapping failures to `MalformedResponse`.
fn parse_json(data: &[u8], what: &str) -> Result<Value> {
    serde_json::from_slice(data)
        .map_err(|e| DropboxError::MalformedResponse(format!("{} is not valid JSON: {}", what, e)))
}

impl<T> DropboxResponse<T> {
    /// Validate the status, then parse the body with `parse`.
    pub fn new<F>(response: HttpResponse, parse: F) -> Result<Self>
    where
        F: FnOnce(&HttpResponse) -> Result<T>,
    {
        let response = ensure_success(response)?;
        let body = parse(&response)?;
        Ok(Self { response, body })
    }

    pub fn body(&self) -> &T {
        &self.body
    }

    pub fn into_body(self) -> T {
        self.body
    }

    pub fn status(&self) -> u16 {
        self.response.status()
    }

    /// The underlying HTTP response.
    pub fn response(&self) -> &HttpResponse {
        &self.response
    }
}

impl<T: DropboxObject> DropboxResponse<T> {
    /// Validate the status and parse the JSON body as `T`.
    pub fn from_json(response: HttpResponse) -> Result<Self> {
        Self::new(response, |response| {
            T::parse(&parse_json(response.body(), "response body")?)
        })
    }
}

/// File contents returned by `files/download`.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadResult {
    /// Parsed from the `dropbox-api-result` response header.
    pub metadata: FileMetadata,
    pub data: Bytes,
}

impl DownloadResponse {
    /// Validate the status; metadata comes from the `dropbox-api-result`
    /// header and the body is kept as-is.
    pub fn from_download(response: HttpResponse) -> Result<Self> {
        Self::new(response, |response| {
            let header = response
                .header(API_RESULT_HEADER)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| {
                    DropboxError::MalformedResponse(format!(
                        "missing {} header",
                        API_RESULT_HEADER
                    ))
                })?;
            let metadata = FileMetadata::parse(&parse_json(header.as_bytes(), API_RESULT_HEADER)?)?;

            Ok(DownloadResult {
                metadata,
                data: response.body().clone(),
            })
        })
    }

    pub fn metadata(&self) -> &FileMetadata {
        &self.body.metadata
    }

    pub fn data(&self) -> &Bytes {
        &self.body.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};
    use serde_json::json;

    #[test]
    fn test_non_200_is_remote_error() {
        let response = HttpResponse::new(201, HeaderMap::new(), "{}");
        let err = ListFolderResponse::from_json(response).unwrap_err();
        assert_eq!(err.status(), Some(201));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let response = HttpResponse::new(200, HeaderMap::new(), "not json");
        assert!(matches!(
            ListFolderResponse::from_json(response),
            Err(DropboxError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let body = json!({"entries": [], "has_more": false}).to_string();
        let response = HttpResponse::new(200, HeaderMap::new(), body);
        assert!(matches!(
            ListFolderResponse::from_json(response),
            Err(DropboxError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_download_requires_result_header() {
        let response = HttpResponse::new(200, HeaderMap::new(), "data");
        assert!(matches!(
            DownloadResponse::from_download(response),
            Err(DropboxError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_download_parses_header() {
        let metadata = json!({
            "name": "a.txt",
            "id": "id:1",
            "path_lower": "/a.txt",
            "path_display": "/a.txt",
            "client_modified": "2020-01-01T00:00:00Z",
            "server_modified": "2020-01-01T00:00:00Z",
            "rev": "015",
            "size": 12
        });
        let mut headers = HeaderMap::new();
        headers.insert(
            API_RESULT_HEADER,
            HeaderValue::from_str(&metadata.to_string()).unwrap(),
        );
        let response = HttpResponse::new(200, headers, &b"hello world\n"[..]);
        let download = DownloadResponse::from_download(response).unwrap();
        assert_eq!(download.metadata().name, "a.txt");
        assert_eq!(download.metadata().size, 12);
        assert_eq!(download.data().as_ref(), b"hello world\n");
    }
}
