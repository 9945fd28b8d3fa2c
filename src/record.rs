//! Typed rows of the primary table and the prune log

use crate::row_model::{Field, SheetLayout};
use crate::sheet::{hyperlink_formula, CellValue};

/// Written into the removal flag once a file's deletion has gone through
pub const PROCESSED_MARKER: &str = "ReMoVeD";

/// State of a row's removal checkbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovalFlag {
    #[default]
    Unset,
    /// User ticked the checkbox
    Flagged,
    /// File was deleted; row is waiting to be archived
    Processed,
}

impl RemovalFlag {
    /// Only an actual boolean `true` counts as flagged, and only the exact
    /// marker text counts as processed.
    pub fn from_cell(cell: Option<&CellValue>) -> Self {
        match cell {
            Some(CellValue::Bool(true)) => RemovalFlag::Flagged,
            Some(CellValue::Text(s)) if s == PROCESSED_MARKER => RemovalFlag::Processed,
            _ => RemovalFlag::Unset,
        }
    }

    pub fn to_cell(self) -> CellValue {
        match self {
            RemovalFlag::Unset => CellValue::Empty,
            RemovalFlag::Flagged => CellValue::Bool(true),
            RemovalFlag::Processed => CellValue::text(PROCESSED_MARKER),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub url: String,
    pub label: String,
}

impl Hyperlink {
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
        }
    }

    pub fn to_cell(&self) -> CellValue {
        CellValue::Text(hyperlink_formula(&self.url, &self.label))
    }
}

/// One file owned by the user
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    pub removal_flag: RemovalFlag,
    pub name: String,
    pub view_link: Hyperlink,
    pub id: String,
    pub mime_type: String,
    pub size_mb: f64,
    /// `yyyy-MM-dd`
    pub created: String,
    /// `yyyy-MM-dd`
    pub modified: String,
    /// `None` for files without any parent folder
    pub parent_folder_link: Option<Hyperlink>,
}

impl FileRecord {
    pub fn cell(&self, field: Field) -> CellValue {
        match field {
            Field::RemovalFlag => self.removal_flag.to_cell(),
            Field::Name => CellValue::text(self.name.as_str()),
            Field::ViewLink => self.view_link.to_cell(),
            Field::Id => CellValue::text(self.id.as_str()),
            Field::MimeType => CellValue::text(self.mime_type.as_str()),
            Field::SizeMb => CellValue::Number(self.size_mb),
            Field::Created => CellValue::text(self.created.as_str()),
            Field::Modified => CellValue::text(self.modified.as_str()),
            Field::ParentFolder => self
                .parent_folder_link
                .as_ref()
                .map(Hyperlink::to_cell)
                .unwrap_or_default(),
        }
    }

    /// Lay the record out in the column order of `layout`
    pub fn to_row(&self, layout: &SheetLayout) -> Vec<CellValue> {
        let mut row = vec![CellValue::Empty; layout.width()];
        for field in Field::ALL {
            row[layout.position(field)] = self.cell(field);
        }
        row
    }
}

/// A folder the pruner moved to the trash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyFolderLogEntry {
    pub id: String,
    pub name: String,
}

impl EmptyFolderLogEntry {
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::text(self.id.as_str()),
            CellValue::text(self.name.as_str()),
        ]
    }
}
