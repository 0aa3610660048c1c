//! Request options for the supported Dropbox endpoints.
//!
//! Each options type builds an [`HttpRequest`] without touching the
//! network, so validation errors surface before anything is sent.

use std::fmt;

use serde::Serialize;
use serde_json::json;

use crate::error::{DropboxError, Result};
use crate::http::{Host, HttpRequest};

/// Header carrying the arguments of content endpoints.
pub const API_ARG_HEADER: &str = "dropbox-api-arg";

/// Header carrying the result metadata of content downloads.
pub const API_RESULT_HEADER: &str = "dropbox-api-result";

/// Maximum page size accepted by `list_folder`.
pub const LIST_FOLDER_MAX_LIMIT: u32 = 2000;

/// Something that can describe a Dropbox request.
pub trait RequestOptions {
    fn request(&self) -> Result<HttpRequest>;
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn to_body<T: Serialize>(arg: &T) -> Result<serde_json::Value> {
    serde_json::to_value(arg).map_err(|e| DropboxError::InvalidArgument(e.to_string()))
}

/// Serialize JSON so it is safe inside an HTTP header: every character
/// outside printable ASCII is written as a `\uXXXX` escape.
pub fn header_safe_json(value: &serde_json::Value) -> String {
    let compact = value.to_string();
    let mut out = String::with_capacity(compact.len());
    for c in compact.chars() {
        if (' '..='~').contains(&c) {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

/// Options for `files/list_folder`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFolderOptions {
    /// Folder path; empty string is the root.
    pub path: String,
    pub include_deleted: bool,
    /// Approximate page size, 1 to 2000.
    pub limit: Option<u32>,
}

#[derive(Serialize)]
struct ListFolderArg<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    include_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

impl ListFolderOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn include_deleted(mut self, include_deleted: bool) -> Self {
        self.include_deleted = include_deleted;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl RequestOptions for ListFolderOptions {
    fn request(&self) -> Result<HttpRequest> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > LIST_FOLDER_MAX_LIMIT {
                return Err(DropboxError::InvalidArgument(format!(
                    "limit must be between 1 and {}, got {}",
                    LIST_FOLDER_MAX_LIMIT, limit
                )));
            }
        }

        let arg = ListFolderArg {
            path: &self.path,
            include_deleted: self.include_deleted,
            limit: self.limit,
        };
        Ok(HttpRequest::post_json(
            Host::Api,
            "/2/files/list_folder",
            to_body(&arg)?,
        ))
    }
}

/// Options for `files/get_metadata`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetMetadataOptions {
    /// Path, ID or revision of a file or folder. Required.
    pub path: Option<String>,
    pub include_media_info: bool,
    pub include_deleted: bool,
    pub include_has_explicit_shared_members: bool,
}

#[derive(Serialize)]
struct GetMetadataArg<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    include_media_info: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    include_deleted: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    include_has_explicit_shared_members: bool,
}

impl GetMetadataOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn include_media_info(mut self, value: bool) -> Self {
        self.include_media_info = value;
        self
    }

    pub fn include_deleted(mut self, value: bool) -> Self {
        self.include_deleted = value;
        self
    }

    pub fn include_has_explicit_shared_members(mut self, value: bool) -> Self {
        self.include_has_explicit_shared_members = value;
        self
    }
}

impl RequestOptions for GetMetadataOptions {
    fn request(&self) -> Result<HttpRequest> {
        let path = self
            .path
            .as_deref()
            .ok_or(DropboxError::MissingRequiredField("path"))?;

        let arg = GetMetadataArg {
            path,
            include_media_info: self.include_media_info,
            include_deleted: self.include_deleted,
            include_has_explicit_shared_members: self.include_has_explicit_shared_members,
        };
        Ok(HttpRequest::post_json(
            Host::Api,
            "/2/files/get_metadata",
            to_body(&arg)?,
        ))
    }
}

/// Options for `files/download`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadFileOptions {
    /// Path, ID or revision of the file. Required.
    pub path: Option<String>,
}

impl DownloadFileOptions {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}

impl RequestOptions for DownloadFileOptions {
    /// The body of a download response is the file itself, so the
    /// arguments travel in the `Dropbox-API-Arg` header.
    fn request(&self) -> Result<HttpRequest> {
        let path = self
            .path
            .as_deref()
            .filter(|path| !is_blank(path))
            .ok_or(DropboxError::MissingRequiredField("path"))?;

        HttpRequest::post(Host::Content, "/2/files/download")
            .with_header(API_ARG_HEADER, &header_safe_json(&json!({ "path": path })))?
            .with_header("content-type", "text/plain")
    }
}

/// Image format of a thumbnail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailFormat {
    /// Preferred for photos.
    #[default]
    Jpeg,
    /// Preferred for screenshots and digital art.
    Png,
}

/// Thumbnail dimensions, width by height in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailSize {
    W32H32,
    #[default]
    W64H64,
    W128H128,
    W256H256,
    W480H320,
    W640H480,
    W960H640,
    W1024H768,
    W2048H1536,
}

/// How the image is resized and cropped to reach the requested size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailMode {
    /// Scale down to fit within the size.
    #[default]
    Strict,
    /// Scale down to fit within the size or its transpose.
    Bestfit,
    /// Scale down to completely cover the size or its transpose.
    FitoneBestfit,
}

impl ThumbnailFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailFormat::Jpeg => "jpeg",
            ThumbnailFormat::Png => "png",
        }
    }

    /// File extension for images of this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ThumbnailFormat::Jpeg => "jpg",
            ThumbnailFormat::Png => "png",
        }
    }
}

impl ThumbnailSize {
    pub const ALL: [ThumbnailSize; 9] = [
        ThumbnailSize::W32H32,
        ThumbnailSize::W64H64,
        ThumbnailSize::W128H128,
        ThumbnailSize::W256H256,
        ThumbnailSize::W480H320,
        ThumbnailSize::W640H480,
        ThumbnailSize::W960H640,
        ThumbnailSize::W1024H768,
        ThumbnailSize::W2048H1536,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailSize::W32H32 => "w32h32",
            ThumbnailSize::W64H64 => "w64h64",
            ThumbnailSize::W128H128 => "w128h128",
            ThumbnailSize::W256H256 => "w256h256",
            ThumbnailSize::W480H320 => "w480h320",
            ThumbnailSize::W640H480 => "w640h480",
            ThumbnailSize::W960H640 => "w960h640",
            ThumbnailSize::W1024H768 => "w1024h768",
            ThumbnailSize::W2048H1536 => "w2048h1536",
        }
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ThumbnailSize::W32H32 => (32, 32),
            ThumbnailSize::W64H64 => (64, 64),
            ThumbnailSize::W128H128 => (128, 128),
            ThumbnailSize::W256H256 => (256, 256),
            ThumbnailSize::W480H320 => (480, 320),
            ThumbnailSize::W640H480 => (640, 480),
            ThumbnailSize::W960H640 => (960, 640),
            ThumbnailSize::W1024H768 => (1024, 768),
            ThumbnailSize::W2048H1536 => (2048, 1536),
        }
    }
}

impl ThumbnailMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailMode::Strict => "strict",
            ThumbnailMode::Bestfit => "bestfit",
            ThumbnailMode::FitoneBestfit => "fitone_bestfit",
        }
    }
}

macro_rules! wire_str_impls {
    ($($ty:ident => [$($variant:ident),+]),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl std::str::FromStr for $ty {
                type Err = DropboxError;

                fn from_str(s: &str) -> Result<Self> {
                    $(
                        if $ty::$variant.as_str() == s {
                            return Ok($ty::$variant);
                        }
                    )+
                    Err(DropboxError::InvalidArgument(format!(
                        "unknown {}: {}",
                        stringify!($ty),
                        s
                    )))
                }
            }
        )+
    };
}

wire_str_impls! {
    ThumbnailFormat => [Jpeg, Png],
    ThumbnailSize => [W32H32, W64H64, W128H128, W256H256, W480H320, W640H480, W960H640, W1024H768, W2048H1536],
    ThumbnailMode => [Strict, Bestfit, FitoneBestfit],
}

/// An image to get a thumbnail for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailArg {
    /// Path, ID or revision of the image.
    pub path: String,
    pub format: ThumbnailFormat,
    pub size: ThumbnailSize,
    pub mode: ThumbnailMode,
}

impl ThumbnailArg {
    /// Thumbnail arg with jpeg / w64h64 / strict.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with(
            path,
            ThumbnailFormat::default(),
            ThumbnailSize::default(),
            ThumbnailMode::default(),
        )
    }

    pub fn with(
        path: impl Into<String>,
        format: ThumbnailFormat,
        size: ThumbnailSize,
        mode: ThumbnailMode,
    ) -> Self {
        Self {
            path: path.into(),
            format,
            size,
            mode,
        }
    }
}

/// Options for `files/get_thumbnail_batch`. Dropbox accepts up to 25
/// entries per batch; the limit is enforced server side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GetThumbnailBatchOptions {
    pub entries: Vec<ThumbnailArg>,
}

impl GetThumbnailBatchOptions {
    pub fn new(entries: Vec<ThumbnailArg>) -> Self {
        Self { entries }
    }

    /// One entry per path, with default format, size and mode.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(paths.into_iter().map(ThumbnailArg::new).collect())
    }

    /// One entry per path, all sharing format, size and mode.
    pub fn from_paths_with<I, S>(
        paths: I,
        format: ThumbnailFormat,
        size: ThumbnailSize,
        mode: ThumbnailMode,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            paths
                .into_iter()
                .map(|path| ThumbnailArg::with(path, format, size, mode))
                .collect(),
        )
    }

    pub fn push(&mut self, entry: ThumbnailArg) {
        self.entries.push(entry);
    }
}

impl RequestOptions for GetThumbnailBatchOptions {
    fn request(&self) -> Result<HttpRequest> {
        if self.entries.is_empty() {
            return Err(DropboxError::InvalidArgument(
                "thumbnail batch needs at least one entry".to_string(),
            ));
        }
        Ok(HttpRequest::post_json(
            Host::Content,
            "/2/files/get_thumbnail_batch",
            to_body(self)?,
        ))
    }
}
