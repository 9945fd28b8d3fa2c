//! Remote file storage abstraction
//!
//! Request and response shapes follow the Drive v3 `files` resource so the
//! HTTP client can deserialize straight into them.

use crate::error::Result;
use serde::Deserialize;

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Largest page the listing endpoint accepts
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Field mask for file listings
pub const FILE_LIST_FIELDS: &str =
    "nextPageToken,files(id,name,webViewLink,mimeType,size,createdTime,modifiedTime,parents)";

/// One page request of a file listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileListRequest {
    pub owner: String,
    pub exclude_folders: bool,
    pub exclude_trashed: bool,
    pub page_token: Option<String>,
    pub page_size: u32,
    pub fields: String,
}

impl FileListRequest {
    /// Non-folder, non-trashed files owned by `owner`
    pub fn owned_by(owner: &str, page_size: u32) -> Self {
        Self {
            owner: owner.to_string(),
            exclude_folders: true,
            exclude_trashed: true,
            page_token: None,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            fields: FILE_LIST_FIELDS.to_string(),
        }
    }

    pub fn with_page_token(mut self, token: Option<String>) -> Self {
        self.page_token = token;
        self
    }

    /// Drive search expression for this request
    pub fn query(&self) -> String {
        let mut clauses = vec![format!("'{}' in owners", escape_query(&self.owner))];
        if self.exclude_folders {
            clauses.push(format!("mimeType != '{}'", FOLDER_MIME_TYPE));
        }
        if self.exclude_trashed {
            clauses.push("trashed = false".to_string());
        }
        clauses.join(" and ")
    }
}

/// Escape a literal for use inside a single-quoted Drive query string
pub fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub web_view_link: String,
    #[serde(default)]
    pub mime_type: String,
    /// Byte size as a decimal string; absent for native documents
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub created_time: String,
    #[serde(default)]
    pub modified_time: String,
    #[serde(default)]
    pub parents: Vec<String>,
}

impl RemoteFile {
    /// Byte size, 0 when absent or unparseable
    pub fn size_bytes(&self) -> u64 {
        self.size
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileListPage {
    #[serde(default)]
    pub files: Vec<RemoteFile>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// A folder in the drive tree
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
}

/// Operations against the remote drive
///
/// Every call blocks until the service answers.
pub trait StorageService {
    /// Identity of the signed-in user, as used in owner filters
    fn current_user(&self) -> Result<String>;

    fn list_files(&self, request: &FileListRequest) -> Result<FileListPage>;

    /// Permanently delete a file, skipping the trash
    fn delete_file(&mut self, file_id: &str) -> Result<()>;

    fn get_folder(&self, folder_id: &str) -> Result<FolderNode>;

    /// Direct, non-trashed subfolders
    fn list_child_folders(&self, folder_id: &str) -> Result<Vec<FolderNode>>;

    fn has_child_files(&self, folder_id: &str) -> Result<bool>;

    fn has_child_folders(&self, folder_id: &str) -> Result<bool>;

    /// Move a folder to the trash
    fn trash_folder(&mut self, folder_id: &str) -> Result<()>;
}
