//! Data models for Dropbox API responses.
//!
//! Every model keeps the JSON object it was parsed from, so fields this
//! crate does not model are still reachable through [`DropboxObject::json`].

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{DropboxError, Result};

/// Discriminator field selecting the metadata variant.
pub const TAG_FIELD: &str = ".tag";

/// A typed model backed by a raw JSON object.
pub trait DropboxObject: Sized {
    /// Parse the model from a JSON object.
    fn parse(json: &Value) -> Result<Self>;

    /// The JSON object this model was parsed from.
    fn json(&self) -> &Value;
}

/// Deserialize `T` from a JSON object, mapping failures to `MalformedResponse`.
fn from_object<T: DeserializeOwned>(json: &Value, what: &str) -> Result<T> {
    if !json.is_object() {
        return Err(DropboxError::MalformedResponse(format!(
            "{} is not a JSON object",
            what
        )));
    }
    T::deserialize(json).map_err(|e| DropboxError::MalformedResponse(format!("{}: {}", what, e)))
}

fn check_entry(name: &str, path_lower: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DropboxError::MalformedResponse(
            "metadata entry has an empty name".to_string(),
        ));
    }
    if path_lower.is_empty() {
        return Err(DropboxError::MalformedResponse(format!(
            "metadata entry {} has an empty path_lower",
            name
        )));
    }
    Ok(())
}

/// Metadata for a file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub id: String,
    pub path_lower: String,
    pub path_display: String,
    /// Set by the uploading client. Not verified by Dropbox; display only.
    pub client_modified: DateTime<Utc>,
    pub server_modified: DateTime<Utc>,
    pub rev: String,
    pub size: u64,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(skip)]
    json: Value,
}

impl DropboxObject for FileMetadata {
    fn parse(json: &Value) -> Result<Self> {
        let mut file: FileMetadata = from_object(json, "file metadata")?;
        check_entry(&file.name, &file.path_lower)?;
        file.json = json.clone();
        Ok(file)
    }

    fn json(&self) -> &Value {
        &self.json
    }
}

/// Sharing details of a folder inside a shared folder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FolderSharingInfo {
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub parent_shared_folder_id: Option<String>,
    #[serde(default)]
    pub shared_folder_id: Option<String>,
    #[serde(default)]
    pub traverse_only: bool,
    #[serde(default)]
    pub no_access: bool,
    #[serde(skip)]
    json: Value,
}

impl DropboxObject for FolderSharingInfo {
    fn parse(json: &Value) -> Result<Self> {
        let mut info: FolderSharingInfo = from_object(json, "sharing info")?;
        info.json = json.clone();
        Ok(info)
    }

    fn json(&self) -> &Value {
        &self.json
    }
}

/// Metadata for a folder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FolderMetadata {
    pub name: String,
    pub id: String,
    pub path_lower: String,
    pub path_display: String,
    #[serde(skip)]
    pub sharing_info: Option<FolderSharingInfo>,
    #[serde(skip)]
    json: Value,
}

impl DropboxObject for FolderMetadata {
    fn parse(json: &Value) -> Result<Self> {
        let mut folder: FolderMetadata = from_object(json, "folder metadata")?;
        check_entry(&folder.name, &folder.path_lower)?;
        folder.sharing_info = match json.get("sharing_info") {
            None | Some(Value::Null) => None,
            Some(info) => Some(FolderSharingInfo::parse(info)?),
        };
        folder.json = json.clone();
        Ok(folder)
    }

    fn json(&self) -> &Value {
        &self.json
    }
}

/// A file or folder entry, selected by the `.tag` discriminator.
#[derive(Debug, Clone, PartialEq)]
pub enum Metadata {
    File(FileMetadata),
    Folder(FolderMetadata),
}

impl Metadata {
    pub fn name(&self) -> &str {
        match self {
            Metadata::File(file) => &file.name,
            Metadata::Folder(folder) => &folder.name,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Metadata::File(file) => &file.id,
            Metadata::Folder(folder) => &folder.id,
        }
    }

    pub fn path_lower(&self) -> &str {
        match self {
            Metadata::File(file) => &file.path_lower,
            Metadata::Folder(folder) => &folder.path_lower,
        }
    }

    pub fn path_display(&self) -> &str {
        match self {
            Metadata::File(file) => &file.path_display,
            Metadata::Folder(folder) => &folder.path_display,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Metadata::File(_))
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Metadata::Folder(_))
    }

    pub fn as_file(&self) -> Option<&FileMetadata> {
        match self {
            Metadata::File(file) => Some(file),
            Metadata::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderMetadata> {
        match self {
            Metadata::Folder(folder) => Some(folder),
            Metadata::File(_) => None,
        }
    }
}

impl DropboxObject for Metadata {
    /// Dispatch on `.tag`: `"file"` and `"folder"` are supported, anything
    /// else (including `"deleted"`) is an `UnrecognizedVariant`.
    fn parse(json: &Value) -> Result<Self> {
        let tag = json
            .get(TAG_FIELD)
            .ok_or_else(|| {
                DropboxError::MalformedResponse(format!("metadata has no {} field", TAG_FIELD))
            })?
            .as_str()
            .ok_or_else(|| {
                DropboxError::MalformedResponse(format!("metadata {} is not a string", TAG_FIELD))
            })?;

        match tag {
            "file" => Ok(Metadata::File(FileMetadata::parse(json)?)),
            "folder" => Ok(Metadata::Folder(FolderMetadata::parse(json)?)),
            other => Err(DropboxError::UnrecognizedVariant {
                tag: other.to_string(),
            }),
        }
    }

    fn json(&self) -> &Value {
        match self {
            Metadata::File(file) => file.json(),
            Metadata::Folder(folder) => folder.json(),
        }
    }
}

impl Metadata {
    /// Column header matching the [`Display`](fmt::Display) row layout.
    pub fn listing_header() -> String {
        listing_row("TYPE", "SIZE", "MODIFIED", "PATH")
    }
}

fn listing_row(kind: &str, size: &str, modified: &str, path: &str) -> String {
    format!("{:<8} {:>10} {:<16} {}", kind, size, modified, path)
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = match self {
            Metadata::File(file) => listing_row(
                "file",
                &format_size(file.size),
                &file.server_modified.format("%Y-%m-%d %H:%M").to_string(),
                &file.path_display,
            ),
            Metadata::Folder(folder) => listing_row("folder", "-", "-", &folder.path_display),
        };
        f.write_str(&row)
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// One page of a folder listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ListFolderResult {
    pub entries: Vec<Metadata>,
    /// Opaque token for `list_folder/continue`.
    pub cursor: String,
    pub has_more: bool,
    json: Value,
}

#[derive(Deserialize)]
struct ListFolderFields {
    entries: Vec<Value>,
    cursor: String,
    has_more: bool,
}

impl DropboxObject for ListFolderResult {
    fn parse(json: &Value) -> Result<Self> {
        let fields: ListFolderFields = from_object(json, "list_folder result")?;
        let entries = fields
            .entries
            .iter()
            .map(Metadata::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            entries,
            cursor: fields.cursor,
            has_more: fields.has_more,
            json: json.clone(),
        })
    }

    fn json(&self) -> &Value {
        &self.json
    }
}

/// One entry of a thumbnail batch result.
///
/// Failed entries carry no thumbnail; the failure reason is only available
/// through [`DropboxObject::json`].
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailBatchEntry {
    pub metadata: Option<FileMetadata>,
    /// Base64-encoded image data.
    pub thumbnail: Option<String>,
    json: Value,
}

#[derive(Deserialize)]
struct ThumbnailBatchEntryFields {
    #[serde(default)]
    metadata: Option<Value>,
    #[serde(default)]
    thumbnail: Option<String>,
}

impl ThumbnailBatchEntry {
    /// Decode the thumbnail into image bytes. `Ok(None)` when absent.
    pub fn decode_thumbnail(&self) -> Result<Option<Vec<u8>>> {
        self.thumbnail
            .as_deref()
            .map(|data| {
                STANDARD.decode(data).map_err(|e| {
                    DropboxError::MalformedResponse(format!("thumbnail is not valid base64: {}", e))
                })
            })
            .transpose()
    }
}

impl DropboxObject for ThumbnailBatchEntry {
    fn parse(json: &Value) -> Result<Self> {
        let fields: ThumbnailBatchEntryFields = from_object(json, "thumbnail batch entry")?;
        let metadata = match fields.metadata {
            None | Some(Value::Null) => None,
            Some(metadata) => Some(FileMetadata::parse(&metadata)?),
        };

        Ok(Self {
            metadata,
            thumbnail: fields.thumbnail,
            json: json.clone(),
        })
    }

    fn json(&self) -> &Value {
        &self.json
    }
}

/// Result of `get_thumbnail_batch`, in request order.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailBatchResult {
    pub entries: Vec<ThumbnailBatchEntry>,
    json: Value,
}

#[derive(Deserialize)]
struct ThumbnailBatchFields {
    entries: Vec<Value>,
}

impl DropboxObject for ThumbnailBatchResult {
    fn parse(json: &Value) -> Result<Self> {
        let fields: ThumbnailBatchFields = from_object(json, "thumbnail batch result")?;
        let entries = fields
            .entries
            .iter()
            .map(ThumbnailBatchEntry::parse)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            entries,
            json: json.clone(),
        })
    }

    fn json(&self) -> &Value {
        &self.json
    }
}

/// OAuth2 token issued for an authorization code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(skip)]
    json: Value,
}

impl DropboxObject for Token {
    fn parse(json: &Value) -> Result<Self> {
        let mut token: Token = from_object(json, "token")?;
        if token.access_token.is_empty() {
            return Err(DropboxError::MalformedResponse(
                "token response has an empty access_token".to_string(),
            ));
        }
        token.json = json.clone();
        Ok(token)
    }

    fn json(&self) -> &Value {
        &self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file_json() -> Value {
        json!({
            ".tag": "file",
            "name": "Prime_Numbers.txt",
            "id": "id:a4ayc_80_OEAAAAAAAAAXw",
            "client_modified": "2015-05-12T15:50:38Z",
            "server_modified": "2015-05-12T15:50:38Z",
            "rev": "a1c10ce0dd78",
            "size": 7212,
            "path_lower": "/homework/math/prime_numbers.txt",
            "path_display": "/Homework/math/Prime_Numbers.txt",
            "content_hash": "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        })
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_parse_file_keeps_raw_json() {
        let json = file_json();
        let metadata = Metadata::parse(&json).unwrap();
        let file = metadata.as_file().unwrap();
        assert_eq!(file.size, 7212);
        assert_eq!(file.rev, "a1c10ce0dd78");
        assert_eq!(file.client_modified.to_rfc3339(), "2015-05-12T15:50:38+00:00");
        assert_eq!(metadata.json(), &json);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let json = file_json();
        assert_eq!(Metadata::parse(&json).unwrap(), Metadata::parse(&json).unwrap());
    }

    #[test]
    fn test_parse_missing_tag() {
        let mut json = file_json();
        json.as_object_mut().unwrap().remove(".tag");
        assert!(matches!(
            Metadata::parse(&json),
            Err(DropboxError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_file_missing_size() {
        let mut json = file_json();
        json.as_object_mut().unwrap().remove("size");
        assert!(matches!(
            Metadata::parse(&json),
            Err(DropboxError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        let mut json = file_json();
        json["name"] = json!("");
        assert!(matches!(
            Metadata::parse(&json),
            Err(DropboxError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_sharing_info_defaults() {
        let json = json!({"read_only": true});
        let info = FolderSharingInfo::parse(&json).unwrap();
        assert!(info.read_only);
        assert!(!info.traverse_only);
        assert!(!info.no_access);
        assert_eq!(info.shared_folder_id, None);
    }

    #[test]
    fn test_decode_thumbnail() {
        let json = json!({"metadata": file_json(), "thumbnail": "aGVsbG8="});
        let entry = ThumbnailBatchEntry::parse(&json).unwrap();
        assert_eq!(entry.decode_thumbnail().unwrap(), Some(b"hello".to_vec()));
    }

    #[test]
    fn test_decode_thumbnail_invalid() {
        let json = json!({"thumbnail": "***"});
        let entry = ThumbnailBatchEntry::parse(&json).unwrap();
        assert!(entry.decode_thumbnail().is_err());
    }

    #[test]
    fn test_metadata_display() {
        let metadata = Metadata::parse(&file_json()).unwrap();
        let display = format!("{}", metadata);
        assert!(display.starts_with("file"));
        assert!(display.contains("7.04 KB"));
        assert!(display.contains("/Homework/math/Prime_Numbers.txt"));
    }

    #[test]
    fn test_metadata_display_lines_up_with_header() {
        let header = Metadata::listing_header();
        let row = Metadata::parse(&file_json()).unwrap().to_string();
        assert!(!row.contains('\t'));
        assert_eq!(header.find("PATH"), row.find("/Homework"));
        assert_eq!(header.find("MODIFIED"), row.find("2015"));
    }
}
