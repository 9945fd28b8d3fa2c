//! In-memory drive and spreadsheet backends
//!
//! Both keep a record of the calls made against them and can be told to fail
//! specific operations, which is how the sweeps' failure handling is tested.

use crate::error::{Result, TidyError};
use crate::sheet::{CellRange, CellValue, Table, TabularStore};
use crate::storage::{FileListPage, FileListRequest, FolderNode, RemoteFile, StorageService};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct MemoryFolder {
    id: String,
    name: String,
    parent: Option<String>,
    trashed: bool,
}

/// Drive held in memory
///
/// Owned files (what the inventory lists) and the folder tree (what the
/// pruner walks) are tracked separately.
#[derive(Debug, Default)]
pub struct MemoryDrive {
    user: String,
    files: Vec<RemoteFile>,
    folders: Vec<MemoryFolder>,
    /// Folder id -> names of files directly inside it
    folder_files: HashMap<String, Vec<String>>,
    list_requests: RefCell<Vec<FileListRequest>>,
    deleted: Vec<String>,
    trashed: Vec<String>,
    fail_listing_at: Option<usize>,
    fail_deletes: HashSet<String>,
    fail_enumerations: HashSet<String>,
    fail_trash: HashSet<String>,
}

impl MemoryDrive {
    pub fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            ..Self::default()
        }
    }

    pub fn add_file(&mut self, file: RemoteFile) {
        self.files.push(file);
    }

    pub fn add_folder(&mut self, id: &str, name: &str, parent: Option<&str>) {
        self.folders.push(MemoryFolder {
            id: id.to_string(),
            name: name.to_string(),
            parent: parent.map(str::to_string),
            trashed: false,
        });
    }

    pub fn add_file_in_folder(&mut self, folder_id: &str, name: &str) {
        self.folder_files
            .entry(folder_id.to_string())
            .or_default()
            .push(name.to_string());
    }

    /// Fail the listing request for the given zero-based page
    pub fn fail_listing_at_page(&mut self, page: usize) {
        self.fail_listing_at = Some(page);
    }

    pub fn fail_delete_of(&mut self, file_id: &str) {
        self.fail_deletes.insert(file_id.to_string());
    }

    /// Make every child listing of this folder fail
    pub fn fail_enumeration_of(&mut self, folder_id: &str) {
        self.fail_enumerations.insert(folder_id.to_string());
    }

    pub fn fail_trash_of(&mut self, folder_id: &str) {
        self.fail_trash.insert(folder_id.to_string());
    }

    pub fn list_requests(&self) -> Vec<FileListRequest> {
        self.list_requests.borrow().clone()
    }

    /// Ids passed to successful `delete_file` calls, in call order
    pub fn deleted_files(&self) -> &[String] {
        &self.deleted
    }

    /// Ids passed to successful `trash_folder` calls, in call order
    pub fn trashed_folders(&self) -> &[String] {
        &self.trashed
    }

    pub fn remaining_files(&self) -> Vec<String> {
        self.files.iter().map(|f| f.id.clone()).collect()
    }

    fn live_folder(&self, folder_id: &str) -> Option<&MemoryFolder> {
        self.folders.iter().find(|f| f.id == folder_id && !f.trashed)
    }

    fn check_enumeration(&self, folder_id: &str) -> Result<()> {
        if self.fail_enumerations.contains(folder_id) {
            return Err(TidyError::remote(
                format!("list children of {}", folder_id),
                "500 Internal Error",
            ));
        }
        if self.live_folder(folder_id).is_none() {
            return Err(TidyError::remote(
                format!("list children of {}", folder_id),
                "404 File not found",
            ));
        }
        Ok(())
    }
}

impl StorageService for MemoryDrive {
    fn current_user(&self) -> Result<String> {
        Ok(self.user.clone())
    }

    fn list_files(&self, request: &FileListRequest) -> Result<FileListPage> {
        let page_index = self.list_requests.borrow().len();
        self.list_requests.borrow_mut().push(request.clone());

        if self.fail_listing_at == Some(page_index) {
            return Err(TidyError::remote("files.list", "503 Service Unavailable"));
        }

        let offset: usize = match request.page_token.as_deref() {
            Some(token) => token
                .parse()
                .map_err(|_| TidyError::remote("files.list", "400 Invalid page token"))?,
            None => 0,
        };
        let size = request.page_size.max(1) as usize;
        let end = (offset + size).min(self.files.len());
        let files = self.files.get(offset..end).unwrap_or_default().to_vec();
        let next_page_token = (end < self.files.len()).then(|| end.to_string());

        Ok(FileListPage {
            files,
            next_page_token,
        })
    }

    fn delete_file(&mut self, file_id: &str) -> Result<()> {
        if self.fail_deletes.contains(file_id) {
            return Err(TidyError::remote("files.delete", "403 Insufficient permissions"));
        }
        let before = self.files.len();
        self.files.retain(|f| f.id != file_id);
        if self.files.len() == before {
            return Err(TidyError::remote("files.delete", "404 File not found"));
        }
        self.deleted.push(file_id.to_string());
        Ok(())
    }

    fn get_folder(&self, folder_id: &str) -> Result<FolderNode> {
        self.live_folder(folder_id)
            .map(|f| FolderNode {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .ok_or_else(|| TidyError::remote("files.get", "404 File not found"))
    }

    fn list_child_folders(&self, folder_id: &str) -> Result<Vec<FolderNode>> {
        self.check_enumeration(folder_id)?;
        Ok(self
            .folders
            .iter()
            .filter(|f| !f.trashed && f.parent.as_deref() == Some(folder_id))
            .map(|f| FolderNode {
                id: f.id.clone(),
                name: f.name.clone(),
            })
            .collect())
    }

    fn has_child_files(&self, folder_id: &str) -> Result<bool> {
        self.check_enumeration(folder_id)?;
        Ok(self
            .folder_files
            .get(folder_id)
            .is_some_and(|files| !files.is_empty()))
    }

    fn has_child_folders(&self, folder_id: &str) -> Result<bool> {
        Ok(!self.list_child_folders(folder_id)?.is_empty())
    }

    fn trash_folder(&mut self, folder_id: &str) -> Result<()> {
        if self.fail_trash.contains(folder_id) {
            return Err(TidyError::remote("files.update", "403 Insufficient permissions"));
        }
        let folder = self
            .folders
            .iter_mut()
            .find(|f| f.id == folder_id && !f.trashed)
            .ok_or_else(|| TidyError::remote("files.update", "404 File not found"))?;
        folder.trashed = true;
        self.trashed.push(folder_id.to_string());
        Ok(())
    }
}

/// Spreadsheet held in memory, one grid per sheet name
#[derive(Debug, Default)]
pub struct MemorySheets {
    sheets: HashMap<String, Vec<Vec<CellValue>>>,
    checkboxes: Vec<(String, CellRange)>,
    writes: usize,
    row_deletes: usize,
    failing_row_delete: Option<usize>,
}

impl MemorySheets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, name: &str) {
        self.sheets.entry(name.to_string()).or_default();
    }

    /// Create a sheet whose first row is `header`
    pub fn add_sheet_with_header(&mut self, name: &str, header: &[&str]) {
        let row = header.iter().map(|h| CellValue::text(*h)).collect();
        self.sheets.insert(name.to_string(), vec![row]);
    }

    pub fn push_row(&mut self, name: &str, row: Vec<CellValue>) {
        self.sheets.entry(name.to_string()).or_default().push(row);
    }

    /// The data range of a sheet as a rectangular grid
    pub fn grid(&self, name: &str) -> Vec<Vec<CellValue>> {
        self.sheets.get(name).map(|g| trimmed(g)).unwrap_or_default()
    }

    /// Ranges passed to `apply_checkboxes`, in call order
    pub fn checkbox_ranges(&self) -> &[(String, CellRange)] {
        &self.checkboxes
    }

    /// Fail the given zero-based `delete_row` call
    pub fn fail_row_delete_at(&mut self, call: usize) {
        self.failing_row_delete = Some(call);
    }

    /// Number of `write_range` calls made
    pub fn write_count(&self) -> usize {
        self.writes
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Vec<Vec<CellValue>>> {
        self.sheets
            .get_mut(name)
            .ok_or_else(|| TidyError::Configuration(format!("no sheet named '{}'", name)))
    }
}

/// Drop trailing empty rows and columns, pad the rest to one width
fn trimmed(grid: &[Vec<CellValue>]) -> Vec<Vec<CellValue>> {
    let last_row = grid
        .iter()
        .rposition(|row| row.iter().any(|c| !c.is_empty()))
        .map(|i| i + 1)
        .unwrap_or(0);
    let width = grid[..last_row]
        .iter()
        .filter_map(|row| row.iter().rposition(|c| !c.is_empty()))
        .map(|i| i + 1)
        .max()
        .unwrap_or(0);
    grid[..last_row]
        .iter()
        .map(|row| {
            let mut row: Vec<CellValue> = row.iter().take(width).cloned().collect();
            row.resize(width, CellValue::Empty);
            row
        })
        .collect()
}

fn set_cell(grid: &mut Vec<Vec<CellValue>>, row: usize, column: usize, value: CellValue) {
    if grid.len() < row {
        grid.resize(row, Vec::new());
    }
    let cells = &mut grid[row - 1];
    if cells.len() < column {
        cells.resize(column, CellValue::Empty);
    }
    cells[column - 1] = value;
}

fn check_origin(row: usize, column: usize) -> Result<()> {
    if row == 0 || column == 0 {
        return Err(TidyError::DataShape(format!(
            "rows and columns start at 1, got ({}, {})",
            row, column
        )));
    }
    Ok(())
}

impl TabularStore for MemorySheets {
    fn read_all(&self, sheet: &str) -> Result<Table> {
        let grid = self
            .sheets
            .get(sheet)
            .ok_or_else(|| TidyError::Configuration(format!("no sheet named '{}'", sheet)))?;
        Ok(Table::from_grid(trimmed(grid)))
    }

    fn clear_range(&mut self, sheet: &str, range: CellRange) -> Result<()> {
        check_origin(range.row, range.column)?;
        let grid = self.sheet_mut(sheet)?;
        for r in range.row..=range.last_row() {
            let Some(cells) = grid.get_mut(r - 1) else { break };
            for c in range.column..=range.last_column() {
                if let Some(cell) = cells.get_mut(c - 1) {
                    *cell = CellValue::Empty;
                }
            }
        }
        Ok(())
    }

    fn write_range(
        &mut self,
        sheet: &str,
        row: usize,
        column: usize,
        values: &[Vec<CellValue>],
    ) -> Result<()> {
        check_origin(row, column)?;
        let grid = self.sheet_mut(sheet)?;
        for (dr, cells) in values.iter().enumerate() {
            for (dc, value) in cells.iter().enumerate() {
                set_cell(grid, row + dr, column + dc, value.clone());
            }
        }
        self.writes += 1;
        Ok(())
    }

    fn append_row(&mut self, sheet: &str, values: &[CellValue]) -> Result<()> {
        let grid = self.sheet_mut(sheet)?;
        let next = trimmed(grid).len() + 1;
        for (dc, value) in values.iter().enumerate() {
            set_cell(grid, next, dc + 1, value.clone());
        }
        Ok(())
    }

    fn clear_all(&mut self, sheet: &str) -> Result<()> {
        self.sheet_mut(sheet)?.clear();
        Ok(())
    }

    fn delete_row(&mut self, sheet: &str, row: usize) -> Result<()> {
        check_origin(row, 1)?;
        let call = self.row_deletes;
        self.row_deletes += 1;
        if self.failing_row_delete == Some(call) {
            return Err(TidyError::remote("deleteDimension", "503 Service Unavailable"));
        }
        let grid = self.sheet_mut(sheet)?;
        if row <= grid.len() {
            grid.remove(row - 1);
        }
        Ok(())
    }

    fn apply_checkboxes(&mut self, sheet: &str, range: CellRange) -> Result<()> {
        check_origin(range.row, range.column)?;
        self.sheet_mut(sheet)?;
        self.checkboxes.push((sheet.to_string(), range));
        Ok(())
    }
}
