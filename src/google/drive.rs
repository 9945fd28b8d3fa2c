//! Drive v3 `files` and `about` endpoints

use super::{check, encode_segment, read_json, ApiClient};
use crate::config::Config;
use crate::error::{Result, TidyError};
use crate::storage::{
    escape_query, FileListPage, FileListRequest, FolderNode, StorageService, FOLDER_MIME_TYPE,
    MAX_PAGE_SIZE,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct About {
    user: AboutUser,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutUser {
    email_address: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FolderPage {
    #[serde(default)]
    files: Vec<FolderNode>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMeta {
    id: String,
    name: String,
    #[serde(default)]
    mime_type: String,
}

pub struct DriveClient {
    api: ApiClient,
    base: String,
}

impl DriveClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(config.access_token()?, config.google.timeout_secs),
            base: config.google.drive_api_base.trim_end_matches('/').to_string(),
        })
    }

    fn file_url(&self, file_id: &str) -> String {
        format!("{}/files/{}", self.base, encode_segment(file_id))
    }

    /// One page of a raw `files.list` search
    fn search(
        &self,
        query: &str,
        fields: &str,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ureq::Response> {
        let mut request = self
            .api
            .request("GET", &format!("{}/files", self.base))
            .query("q", query)
            .query("fields", fields)
            .query("pageSize", &page_size.to_string());
        if let Some(token) = page_token {
            request = request.query("pageToken", token);
        }
        check("files.list", request.call())
    }

    fn child_query(folder_id: &str, folders: bool) -> String {
        format!(
            "'{}' in parents and mimeType {} '{}' and trashed = false",
            escape_query(folder_id),
            if folders { "=" } else { "!=" },
            FOLDER_MIME_TYPE
        )
    }

    fn has_any(&self, folder_id: &str, folders: bool) -> Result<bool> {
        let response = self.search(&Self::child_query(folder_id, folders), "files(id)", 1, None)?;
        let page: FolderIds = read_json("files.list", response)?;
        Ok(!page.files.is_empty())
    }
}

#[derive(Deserialize)]
struct FolderIds {
    #[serde(default)]
    files: Vec<serde_json::Value>,
}

impl StorageService for DriveClient {
    fn current_user(&self) -> Result<String> {
        let response = check(
            "about.get",
            self.api
                .request("GET", &format!("{}/about", self.base))
                .query("fields", "user(emailAddress)")
                .call(),
        )?;
        let about: About = read_json("about.get", response)?;
        Ok(about.user.email_address)
    }

    fn list_files(&self, request: &FileListRequest) -> Result<FileListPage> {
        let response = self.search(
            &request.query(),
            &request.fields,
            request.page_size,
            request.page_token.as_deref(),
        )?;
        read_json("files.list", response)
    }

    fn delete_file(&mut self, file_id: &str) -> Result<()> {
        check(
            "files.delete",
            self.api.request("DELETE", &self.file_url(file_id)).call(),
        )?;
        Ok(())
    }

    fn get_folder(&self, folder_id: &str) -> Result<FolderNode> {
        let response = check(
            "files.get",
            self.api
                .request("GET", &self.file_url(folder_id))
                .query("fields", "id,name,mimeType")
                .call(),
        )?;
        let meta: FileMeta = read_json("files.get", response)?;
        if meta.mime_type != FOLDER_MIME_TYPE {
            return Err(TidyError::remote(
                "files.get",
                format!("'{}' is not a folder ({})", meta.name, meta.mime_type),
            ));
        }
        Ok(FolderNode {
            id: meta.id,
            name: meta.name,
        })
    }

    fn list_child_folders(&self, folder_id: &str) -> Result<Vec<FolderNode>> {
        let query = Self::child_query(folder_id, true);
        let mut folders = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let response = self.search(
                &query,
                "nextPageToken,files(id,name)",
                MAX_PAGE_SIZE,
                token.as_deref(),
            )?;
            let page: FolderPage = read_json("files.list", response)?;
            folders.extend(page.files);
            match page.next_page_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }
        Ok(folders)
    }

    fn has_child_files(&self, folder_id: &str) -> Result<bool> {
        self.has_any(folder_id, false)
    }

    fn has_child_folders(&self, folder_id: &str) -> Result<bool> {
        self.has_any(folder_id, true)
    }

    fn trash_folder(&mut self, folder_id: &str) -> Result<()> {
        check(
            "files.update",
            self.api
                .request("PATCH", &self.file_url(folder_id))
                .send_json(json!({ "trashed": true })),
        )?;
        Ok(())
    }
}
