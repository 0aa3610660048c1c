//! Dropbox API client for file operations.

use log::debug;

use crate::auth::OAuthClient;
use crate::error::{DropboxError, Result};
use crate::http::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::options::{
    DownloadFileOptions, GetMetadataOptions, GetThumbnailBatchOptions, ListFolderOptions,
    RequestOptions,
};
use crate::response::{
    DownloadResponse, GetMetadataResponse, ListFolderResponse, ThumbnailBatchResponse,
    TokenResponse,
};

/// Client for the Dropbox files API.
///
/// Each call is a single request/response round trip: no retries, no
/// caching, no token refresh.
#[derive(Debug, Clone)]
pub struct DropboxClient<T: Transport = ReqwestTransport> {
    oauth: OAuthClient,
    transport: T,
}

impl DropboxClient<ReqwestTransport> {
    /// Create a client using the default reqwest transport.
    pub fn new(oauth: OAuthClient) -> Self {
        Self::with_transport(oauth, ReqwestTransport::new())
    }

    /// Create a client for an existing access token.
    pub fn from_access_token(access_token: &str) -> Result<Self> {
        if access_token.trim().is_empty() {
            return Err(DropboxError::InvalidArgument(
                "access token must not be empty".to_string(),
            ));
        }
        Ok(Self::new(OAuthClient::with_access_token(access_token)))
    }
}

impl<T: Transport> DropboxClient<T> {
    /// Create a client that sends requests through `transport`.
    pub fn with_transport(oauth: OAuthClient, transport: T) -> Self {
        Self { oauth, transport }
    }

    pub fn oauth(&self) -> &OAuthClient {
        &self.oauth
    }

    /// Send the request described by `options` and return the raw response,
    /// whatever its status.
    pub async fn send<O: RequestOptions + ?Sized>(&self, options: &O) -> Result<HttpResponse> {
        let request = options.request()?;
        self.execute(&request).await
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let prepared = self.oauth.prepare(request)?;
        debug!("{} {}", prepared.method, prepared.url);

        let response = self.transport.send(prepared).await?;
        debug!(
            "{} {} -> {}",
            request.method,
            request.path,
            response.status()
        );
        Ok(response)
    }

    /// List the contents of a folder (one page).
    pub async fn list_folder(&self, options: &ListFolderOptions) -> Result<ListFolderResponse> {
        ListFolderResponse::from_json(self.send(options).await?)
    }

    /// List the contents of the folder at `path`; `""` is the root.
    pub async fn list_folder_path(&self, path: &str) -> Result<ListFolderResponse> {
        self.list_folder(&ListFolderOptions::new(path)).await
    }

    /// Get metadata for a file or folder.
    pub async fn get_metadata(&self, options: &GetMetadataOptions) -> Result<GetMetadataResponse> {
        GetMetadataResponse::from_json(self.send(options).await?)
    }

    /// Download a file. The body holds the file contents unchanged.
    pub async fn download(&self, options: &DownloadFileOptions) -> Result<DownloadResponse> {
        DownloadResponse::from_download(self.send(options).await?)
    }

    /// Download the file at `path`.
    pub async fn download_path(&self, path: &str) -> Result<DownloadResponse> {
        self.download(&DownloadFileOptions::new(path)).await
    }

    /// Get thumbnails for a batch of images.
    pub async fn get_thumbnail_batch(
        &self,
        options: &GetThumbnailBatchOptions,
    ) -> Result<ThumbnailBatchResponse> {
        ThumbnailBatchResponse::from_json(self.send(options).await?)
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_auth_code(&self, code: &str) -> Result<TokenResponse> {
        let request = self.oauth.token_request(code)?;
        TokenResponse::from_json(self.execute(&request).await?)
    }
}
