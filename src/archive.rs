//! Move processed rows from the primary sheet into the archive sheet

use crate::config::Config;
use crate::error::Result;
use crate::inventory::STATUS_TITLE;
use crate::output::Notifier;
use crate::record::RemovalFlag;
use crate::row_model::{require_column, row_as_record, ColumnMap, Field};
use crate::sheet::{rectangular, CellValue, TabularStore};
use tracing::{debug, info};

/// Move every row marked processed into the archive sheet
///
/// The archive sheet is rewritten once, before anything leaves the primary
/// sheet, so a failure part way through can leave a row in both sheets but
/// never in neither. Rows are then deleted in original order, each at its
/// original row number minus the rows already removed. Returns the number of
/// rows moved.
pub fn archive_removed<T>(
    store: &mut T,
    notifier: &dyn Notifier,
    config: &Config,
    columns: &ColumnMap,
) -> Result<usize>
where
    T: TabularStore + ?Sized,
{
    let primary = config.sheets.primary.as_str();
    let archive = config.sheets.archive.as_str();

    let files = store.read_all(primary)?;
    let archived = store.read_all(archive)?;
    require_column(&files.header, columns.name(Field::RemovalFlag))?;

    let mut archive_rows = archived.to_grid();
    if archive_rows.is_empty() {
        archive_rows.push(files.header.iter().map(|h| CellValue::text(h.as_str())).collect());
    }

    let flag_key = columns.key(Field::RemovalFlag);
    let mut processed = Vec::new();
    for (index, row) in files.rows.iter().enumerate() {
        let record = row_as_record(row, &files.header);
        if RemovalFlag::from_cell(record.get(&flag_key)) == RemovalFlag::Processed {
            archive_rows.push(row.clone());
            processed.push(index);
        }
    }

    if !processed.is_empty() {
        store.clear_all(archive)?;
        store.write_range(archive, 1, 1, &rectangular(&archive_rows))?;
    }

    for (moved, index) in processed.iter().enumerate() {
        // header is row 1, so body index 0 is sheet row 2
        let sheet_row = index + 2 - moved;
        store.delete_row(primary, sheet_row)?;
        debug!(sheet_row, "moved row to archive");
    }

    let moved = processed.len();
    info!(moved, "archive sweep finished");
    notifier.notify(STATUS_TITLE, &format!("Archived {} rows", moved));
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySheets;
    use crate::output::RecordingNotifier;
    use crate::record::PROCESSED_MARKER;

    fn row(flag: CellValue, name: &str) -> Vec<CellValue> {
        vec![flag, name.into(), format!("id-{}", name).into()]
    }

    fn names(grid: &[Vec<CellValue>]) -> Vec<String> {
        grid.iter().map(|r| r[1].to_string()).collect()
    }

    #[test]
    fn test_moves_processed_rows_in_order() {
        let config = Config::default();
        let mut sheets = MemorySheets::new();
        sheets.add_sheet_with_header(&config.sheets.primary, &["RemoveMe", "Name", "Id"]);
        sheets.add_sheet_with_header(&config.sheets.archive, &["RemoveMe", "Name", "Id"]);
        sheets.push_row(&config.sheets.archive, row(PROCESSED_MARKER.into(), "Z"));
        sheets.push_row(&config.sheets.primary, row(CellValue::Empty, "A"));
        sheets.push_row(&config.sheets.primary, row(PROCESSED_MARKER.into(), "B"));
        sheets.push_row(&config.sheets.primary, row(CellValue::Bool(false), "C"));
        sheets.push_row(&config.sheets.primary, row(PROCESSED_MARKER.into(), "D"));

        let notifier = RecordingNotifier::new();
        let moved = archive_removed(&mut sheets, &notifier, &config, &ColumnMap::default()).unwrap();

        assert_eq!(moved, 2);
        assert_eq!(names(&sheets.grid(&config.sheets.primary)), vec!["Name", "A", "C"]);
        assert_eq!(
            names(&sheets.grid(&config.sheets.archive)),
            vec!["Name", "Z", "B", "D"]
        );
        assert_eq!(notifier.messages(), vec!["Archived 2 rows"]);
    }

    #[test]
    fn test_adjacent_processed_rows() {
        let config = Config::default();
        let mut sheets = MemorySheets::new();
        sheets.add_sheet_with_header(&config.sheets.primary, &["RemoveMe", "Name", "Id"]);
        sheets.add_sheet(&config.sheets.archive);
        for name in ["A", "B", "C"] {
            sheets.push_row(&config.sheets.primary, row(PROCESSED_MARKER.into(), name));
        }
        sheets.push_row(&config.sheets.primary, row(CellValue::Empty, "D"));

        let moved = archive_removed(
            &mut sheets,
            &RecordingNotifier::new(),
            &config,
            &ColumnMap::default(),
        )
        .unwrap();

        assert_eq!(moved, 3);
        assert_eq!(names(&sheets.grid(&config.sheets.primary)), vec!["Name", "D"]);
        // Blank archive sheet gets the primary header first
        assert_eq!(
            names(&sheets.grid(&config.sheets.archive)),
            vec!["Name", "A", "B", "C"]
        );
    }

    #[test]
    fn test_flagged_but_not_processed_stays() {
        let config = Config::default();
        let mut sheets = MemorySheets::new();
        sheets.add_sheet_with_header(&config.sheets.primary, &["RemoveMe", "Name", "Id"]);
        sheets.add_sheet_with_header(&config.sheets.archive, &["RemoveMe", "Name", "Id"]);
        sheets.push_row(&config.sheets.primary, row(CellValue::Bool(true), "A"));
        let archive_before = sheets.grid(&config.sheets.archive);

        let moved = archive_removed(
            &mut sheets,
            &RecordingNotifier::new(),
            &config,
            &ColumnMap::default(),
        )
        .unwrap();

        assert_eq!(moved, 0);
        assert_eq!(sheets.grid(&config.sheets.archive), archive_before);
        assert_eq!(sheets.write_count(), 0);
    }

    #[test]
    fn test_failed_row_delete_keeps_rows_archived() {
        let config = Config::default();
        let mut sheets = MemorySheets::new();
        sheets.add_sheet_with_header(&config.sheets.primary, &["RemoveMe", "Name", "Id"]);
        sheets.add_sheet(&config.sheets.archive);
        sheets.push_row(&config.sheets.primary, row(PROCESSED_MARKER.into(), "B"));
        sheets.push_row(&config.sheets.primary, row(PROCESSED_MARKER.into(), "D"));
        sheets.fail_row_delete_at(1);

        let notifier = RecordingNotifier::new();
        let result = archive_removed(&mut sheets, &notifier, &config, &ColumnMap::default());

        assert!(result.unwrap_err().is_remote());
        // B left the primary sheet and is archived; D is in both, never in neither
        assert_eq!(names(&sheets.grid(&config.sheets.primary)), vec!["Name", "D"]);
        assert_eq!(
            names(&sheets.grid(&config.sheets.archive)),
            vec!["Name", "B", "D"]
        );
        assert!(notifier.messages().is_empty());
    }
}
