//! Header-driven row access
//!
//! Rows come out of a sheet as plain cell arrays. The header row is the schema:
//! [`row_as_record`] keys a row by its normalized header names, and
//! [`SheetLayout`] resolves the typed fields of a [`ColumnMap`] to header
//! positions so records can be written in whatever order the sheet declares.

use crate::error::{Result, TidyError};
use crate::sheet::CellValue;
use std::collections::HashMap;

/// Bumped whenever a default column name changes
pub const COLUMN_MAP_VERSION: u32 = 1;

/// A row keyed by normalized header name
pub type RowRecord = HashMap<String, CellValue>;

/// Lowercase a header name and replace each whitespace character with `_`
///
/// "Size MB" becomes "size_mb", "RemoveMe" becomes "removeme".
pub fn normalize_key(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Key each cell of `row` by the normalized header name at the same position
///
/// Header columns past the end of the row map to [`CellValue::Empty`]; cells
/// past the end of the header are dropped.
pub fn row_as_record(row: &[CellValue], header: &[String]) -> RowRecord {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| (normalize_key(name), row.get(i).cloned().unwrap_or_default()))
        .collect()
}

/// Zero-based position of `name` in the header, `None` when absent
pub fn column_index(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|h| h == name)
}

/// Like [`column_index`], but a missing column is a [`TidyError::DataShape`]
pub fn require_column(header: &[String], name: &str) -> Result<usize> {
    column_index(header, name).ok_or_else(|| {
        TidyError::DataShape(format!("header has no '{}' column", name))
    })
}

/// One single-cell row per body row, taken from the named column
///
/// This is the shape a single-column write expects, so callers can edit
/// entries in place and write the buffer back.
pub fn column_values(
    header: &[String],
    body: &[Vec<CellValue>],
    name: &str,
) -> Result<Vec<Vec<CellValue>>> {
    let index = require_column(header, name)?;
    Ok(body
        .iter()
        .map(|row| vec![row.get(index).cloned().unwrap_or_default()])
        .collect())
}

/// Fields of a file row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    RemovalFlag,
    Name,
    ViewLink,
    Id,
    MimeType,
    SizeMb,
    Created,
    Modified,
    ParentFolder,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::RemovalFlag,
        Field::Name,
        Field::ViewLink,
        Field::Id,
        Field::MimeType,
        Field::SizeMb,
        Field::Created,
        Field::Modified,
        Field::ParentFolder,
    ];
}

/// Declared mapping from field to header name
///
/// Renaming a column in the sheet means changing one entry here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub version: u32,
    columns: Vec<(Field, String)>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        let columns = [
            (Field::RemovalFlag, "RemoveMe"),
            (Field::Name, "Name"),
            (Field::ViewLink, "Link"),
            (Field::Id, "Id"),
            (Field::MimeType, "Type"),
            (Field::SizeMb, "Size MB"),
            (Field::Created, "Created"),
            (Field::Modified, "Modified"),
            (Field::ParentFolder, "Folder"),
        ]
        .into_iter()
        .map(|(f, n)| (f, n.to_string()))
        .collect();

        Self {
            version: COLUMN_MAP_VERSION,
            columns,
        }
    }
}

impl ColumnMap {
    pub fn name(&self, field: Field) -> &str {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, n)| n.as_str())
            .unwrap_or_default()
    }

    /// Record key of a field, as produced by [`row_as_record`]
    pub fn key(&self, field: Field) -> String {
        normalize_key(self.name(field))
    }

    /// Override the header name of one field
    pub fn rename(&mut self, field: Field, name: impl Into<String>) {
        let name = name.into();
        match self.columns.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = name,
            None => self.columns.push((field, name)),
        }
    }

    /// Header row in declaration order, used when a sheet has none yet
    pub fn header(&self) -> Vec<String> {
        self.columns.iter().map(|(_, n)| n.clone()).collect()
    }
}

/// Header positions of every mapped field in one particular sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLayout {
    positions: HashMap<Field, usize>,
    width: usize,
}

impl SheetLayout {
    /// Resolve every field of `map` against `header`
    pub fn resolve(header: &[String], map: &ColumnMap) -> Result<Self> {
        let mut positions = HashMap::new();
        for field in Field::ALL {
            positions.insert(field, require_column(header, map.name(field))?);
        }
        Ok(Self {
            positions,
            width: header.len(),
        })
    }

    pub fn position(&self, field: Field) -> usize {
        self.positions[&field]
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("RemoveMe"), "removeme");
        assert_eq!(normalize_key("Size MB"), "size_mb");
        assert_eq!(normalize_key("Last\tModified Date"), "last_modified_date");
    }

    #[test]
    fn test_row_as_record_keys_and_values() {
        let h = header(&["RemoveMe", "Name", "Size MB"]);
        let row = vec![CellValue::Bool(true), "report.pdf".into(), CellValue::Number(1.5)];
        let record = row_as_record(&row, &h);

        let mut keys: Vec<_> = record.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["name", "removeme", "size_mb"]);
        assert_eq!(record["removeme"], CellValue::Bool(true));
        assert_eq!(record["name"], CellValue::text("report.pdf"));
        assert_eq!(record["size_mb"], CellValue::Number(1.5));
    }

    #[test]
    fn test_row_as_record_short_row() {
        let h = header(&["RemoveMe", "Id"]);
        let record = row_as_record(&[CellValue::Bool(false)], &h);
        assert_eq!(record["id"], CellValue::Empty);
    }

    #[test]
    fn test_column_index_inverse_of_position() {
        let h = header(&["Id", "RemoveMe", "Name", "Folder"]);
        for name in &h {
            let idx = column_index(&h, name).unwrap();
            assert_eq!(&h[idx], name);
        }
        assert_eq!(column_index(&h, "Missing"), None);
        assert!(matches!(
            require_column(&h, "Missing"),
            Err(TidyError::DataShape(_))
        ));
    }

    #[test]
    fn test_column_values_preserves_order() {
        let h = header(&["Name", "RemoveMe"]);
        let body = vec![
            vec!["a".into(), CellValue::Bool(true)],
            vec!["b".into()],
            vec!["c".into(), "ReMoVeD".into()],
        ];
        let values = column_values(&h, &body, "RemoveMe").unwrap();
        assert_eq!(
            values,
            vec![
                vec![CellValue::Bool(true)],
                vec![CellValue::Empty],
                vec![CellValue::text("ReMoVeD")],
            ]
        );
        assert!(column_values(&h, &body, "Id").is_err());
    }

    #[test]
    fn test_layout_follows_header_order() {
        let map = ColumnMap::default();
        let mut h = map.header();
        h.reverse();
        let layout = SheetLayout::resolve(&h, &map).unwrap();
        assert_eq!(layout.position(Field::ParentFolder), 0);
        assert_eq!(layout.position(Field::RemovalFlag), 8);
        assert_eq!(layout.width(), 9);
    }

    #[test]
    fn test_layout_missing_column() {
        let map = ColumnMap::default();
        let h = header(&["RemoveMe", "Name"]);
        assert!(SheetLayout::resolve(&h, &map).is_err());
    }

    #[test]
    fn test_column_map_rename() {
        let mut map = ColumnMap::default();
        map.rename(Field::RemovalFlag, "Delete Me");
        assert_eq!(map.name(Field::RemovalFlag), "Delete Me");
        assert_eq!(map.key(Field::RemovalFlag), "delete_me");
        assert_eq!(map.header()[0], "Delete Me");
    }
}
