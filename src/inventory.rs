//! Collect every file the user owns into the primary sheet
//!
//! The listing is assembled completely in memory before the sheet is touched,
//! so a failed page leaves the previous inventory in place.

use crate::config::Config;
use crate::error::Result;
use crate::output::Notifier;
use crate::record::{FileRecord, Hyperlink, RemovalFlag};
use crate::row_model::{ColumnMap, Field, SheetLayout};
use crate::sheet::{CellRange, CellValue, TabularStore};
use crate::storage::{FileListRequest, RemoteFile, StorageService};
use chrono::{DateTime, FixedOffset};
use tracing::{debug, info, warn};

pub const STATUS_TITLE: &str = "Status";

const BYTES_TO_MB: f64 = 0.000001;
const VIEW_LABEL: &str = "View";
const FOLDER_LABEL: &str = "Folder";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectSummary {
    /// Files written to the sheet
    pub count: usize,
    pub total_bytes: u64,
}

/// Page through every non-folder, non-trashed file owned by the current user
///
/// There is no cap on pages or items; the first failed page aborts.
pub fn list_owned_files<S>(storage: &S, config: &Config) -> Result<Vec<RemoteFile>>
where
    S: StorageService + ?Sized,
{
    let owner = storage.current_user()?;
    let mut files = Vec::new();
    let mut page_token = None;
    let mut page = 0usize;

    loop {
        let request =
            FileListRequest::owned_by(&owner, config.page_size()).with_page_token(page_token);
        let result = storage.list_files(&request)?;
        page += 1;
        debug!(page, items = result.files.len(), "fetched file listing page");
        files.extend(result.files);

        match result.next_page_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => break,
        }
    }

    Ok(files)
}

/// Calendar date of an RFC 3339 timestamp at `offset`, empty when unparseable
pub fn format_date(timestamp: &str, offset: FixedOffset) -> String {
    match DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.with_timezone(&offset).format("%Y-%m-%d").to_string(),
        Err(e) => {
            if !timestamp.is_empty() {
                warn!("Unparseable timestamp '{}': {}", timestamp, e);
            }
            String::new()
        }
    }
}

/// Build the sheet record for one listed file
///
/// Files with several parents link to the first one only.
pub fn to_record(file: &RemoteFile, folder_url_prefix: &str, offset: FixedOffset) -> FileRecord {
    FileRecord {
        removal_flag: RemovalFlag::Unset,
        name: file.name.clone(),
        view_link: Hyperlink::new(file.web_view_link.as_str(), VIEW_LABEL),
        id: file.id.clone(),
        mime_type: file.mime_type.clone(),
        size_mb: file.size_bytes() as f64 * BYTES_TO_MB,
        created: format_date(&file.created_time, offset),
        modified: format_date(&file.modified_time, offset),
        parent_folder_link: file
            .parents
            .first()
            .map(|parent| Hyperlink::new(format!("{}{}", folder_url_prefix, parent), FOLDER_LABEL)),
    }
}

/// Replace the primary sheet's rows with a fresh inventory
pub fn collect_files<S, T>(
    storage: &S,
    store: &mut T,
    notifier: &dyn Notifier,
    config: &Config,
    columns: &ColumnMap,
) -> Result<CollectSummary>
where
    S: StorageService + ?Sized,
    T: TabularStore + ?Sized,
{
    let offset = config.date_offset()?;
    let files = list_owned_files(storage, config)?;
    let total_bytes: u64 = files.iter().map(RemoteFile::size_bytes).sum();
    let records: Vec<FileRecord> = files
        .iter()
        .map(|f| to_record(f, &config.inventory.folder_url_prefix, offset))
        .collect();

    let sheet = config.sheets.primary.as_str();
    let existing = store.read_all(sheet)?;
    let header = if existing.header.iter().all(|h| h.trim().is_empty()) {
        let header = columns.header();
        let header_row: Vec<CellValue> = header.iter().map(|h| CellValue::text(h.as_str())).collect();
        store.write_range(sheet, 1, 1, &[header_row])?;
        header
    } else {
        existing.header.clone()
    };
    let layout = SheetLayout::resolve(&header, columns)?;

    if existing.last_row() >= 2 {
        let columns_to_clear = existing.last_column().max(layout.width());
        store.clear_range(
            sheet,
            CellRange::new(2, 1, existing.last_row() - 1, columns_to_clear),
        )?;
    }

    let rows: Vec<Vec<CellValue>> = records.iter().map(|r| r.to_row(&layout)).collect();
    if !rows.is_empty() {
        store.write_range(sheet, 2, 1, &rows)?;
        let flag_column = layout.position(Field::RemovalFlag) + 1;
        store.apply_checkboxes(sheet, CellRange::new(2, flag_column, rows.len(), 1))?;
    }

    info!(count = rows.len(), total_bytes, "inventory written to '{}'", sheet);
    notifier.notify(STATUS_TITLE, &format!("Found {} files", rows.len()));

    Ok(CollectSummary {
        count: rows.len(),
        total_bytes,
    })
}
