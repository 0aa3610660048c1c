//! dropbox_files - A typed client for a subset of the Dropbox HTTP API.
//!
//! This library provides:
//! - Folder listing and metadata lookup
//! - File download (metadata from the `dropbox-api-result` header)
//! - Batch thumbnail retrieval
//! - OAuth 2.0 authorization URLs and authorization-code exchange
//!
//! # Example
//!
//! ```no_run
//! use dropbox_files::{DropboxClient, ListFolderOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = DropboxClient::from_access_token("sl.xxxx")?;
//!
//!     let listing = client.list_folder(&ListFolderOptions::new("/Photos")).await?;
//!     for entry in &listing.body().entries {
//!         println!("{}", entry);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod options;
pub mod response;

// Re-exports for convenience
pub use auth::OAuthClient;
pub use client::DropboxClient;
pub use config::Credentials;
pub use error::{DropboxError, Result};
pub use http::{Endpoints, HttpResponse, ReqwestTransport, Transport};
pub use models::{
    DropboxObject, FileMetadata, FolderMetadata, FolderSharingInfo, ListFolderResult, Metadata,
    ThumbnailBatchEntry, ThumbnailBatchResult, Token,
};
pub use options::{
    DownloadFileOptions, GetMetadataOptions, GetThumbnailBatchOptions, ListFolderOptions,
    RequestOptions, ThumbnailArg, ThumbnailFormat, ThumbnailMode, ThumbnailSize,
};
pub use response::{
    DownloadResponse, DownloadResult, DropboxResponse, GetMetadataResponse, ListFolderResponse,
    ThumbnailBatchResponse, TokenResponse,
};
