//! Permanently delete the files whose rows are flagged
//!
//! Each delete is its own remote call. A failure is recorded against that
//! file and the sweep moves on to the next row.

use crate::config::Config;
use crate::error::Result;
use crate::inventory::STATUS_TITLE;
use crate::output::Notifier;
use crate::record::RemovalFlag;
use crate::row_model::{column_values, require_column, row_as_record, ColumnMap, Field};
use crate::sheet::TabularStore;
use crate::storage::StorageService;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionFailure {
    pub file_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionOutcome {
    /// Files actually deleted
    pub deleted: usize,
    pub failures: Vec<DeletionFailure>,
}

/// Number of rows currently flagged for deletion
pub fn count_flagged<T>(store: &T, config: &Config, columns: &ColumnMap) -> Result<usize>
where
    T: TabularStore + ?Sized,
{
    let table = store.read_all(&config.sheets.primary)?;
    let flags = column_values(&table.header, &table.rows, columns.name(Field::RemovalFlag))?;
    Ok(flags
        .iter()
        .filter(|cell| RemovalFlag::from_cell(cell.first()) == RemovalFlag::Flagged)
        .count())
}

/// Delete every flagged file and mark its row processed
///
/// Only the removal flag column is written back, in a single write, and only
/// when at least one file was deleted.
pub fn delete_flagged<S, T>(
    storage: &mut S,
    store: &mut T,
    notifier: &dyn Notifier,
    config: &Config,
    columns: &ColumnMap,
) -> Result<DeletionOutcome>
where
    S: StorageService + ?Sized,
    T: TabularStore + ?Sized,
{
    notifier.notify(STATUS_TITLE, "Working...");

    let sheet = config.sheets.primary.as_str();
    let table = store.read_all(sheet)?;
    let flag_name = columns.name(Field::RemovalFlag);
    let flag_index = require_column(&table.header, flag_name)?;
    require_column(&table.header, columns.name(Field::Id))?;

    let mut flags = column_values(&table.header, &table.rows, flag_name)?;
    let flag_key = columns.key(Field::RemovalFlag);
    let id_key = columns.key(Field::Id);
    let mut outcome = DeletionOutcome::default();

    for (index, row) in table.rows.iter().enumerate() {
        let record = row_as_record(row, &table.header);
        if RemovalFlag::from_cell(record.get(&flag_key)) != RemovalFlag::Flagged {
            continue;
        }

        let file_id = record
            .get(&id_key)
            .map(|cell| cell.to_string().trim().to_string())
            .unwrap_or_default();
        if file_id.is_empty() {
            warn!("Row {} is flagged but has no file id", index + 2);
            outcome.failures.push(DeletionFailure {
                file_id,
                message: format!("row {} has no file id", index + 2),
            });
            continue;
        }

        let result = storage.delete_file(&file_id);
        match result {
            Ok(()) => {
                debug!(file_id = %file_id, "deleted");
                outcome.deleted += 1;
                flags[index] = vec![RemovalFlag::Processed.to_cell()];
            }
            Err(e) => {
                warn!("Failed to delete {}: {}", file_id, e);
                outcome.failures.push(DeletionFailure {
                    file_id,
                    message: e.to_string(),
                });
            }
        }
    }

    if outcome.deleted > 0 {
        store.write_range(sheet, 2, flag_index + 1, &flags)?;
    }

    info!(
        deleted = outcome.deleted,
        failed = outcome.failures.len(),
        "deletion sweep finished"
    );
    let summary = if outcome.failures.is_empty() {
        format!("Removed {} files", outcome.deleted)
    } else {
        format!(
            "Removed {} files, {} failed",
            outcome.deleted,
            outcome.failures.len()
        )
    };
    notifier.notify(STATUS_TITLE, &summary);

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TidyError;
    use crate::memory::{MemoryDrive, MemorySheets};
    use crate::output::RecordingNotifier;
    use crate::record::PROCESSED_MARKER;
    use crate::sheet::CellValue;
    use crate::storage::RemoteFile;

    fn setup(flags: &[CellValue]) -> (MemoryDrive, MemorySheets, Config) {
        let config = Config::default();
        let mut drive = MemoryDrive::new("me");
        let mut sheets = MemorySheets::new();
        sheets.add_sheet_with_header(&config.sheets.primary, &["RemoveMe", "Name", "Id"]);
        for (i, flag) in flags.iter().enumerate() {
            let id = format!("f{}", i + 1);
            drive.add_file(RemoteFile {
                id: id.clone(),
                name: format!("file {}", i + 1),
                ..RemoteFile::default()
            });
            sheets.push_row(
                &config.sheets.primary,
                vec![flag.clone(), format!("file {}", i + 1).into(), id.into()],
            );
        }
        (drive, sheets, config)
    }

    fn flag_column(sheets: &MemorySheets, config: &Config) -> Vec<CellValue> {
        sheets
            .grid(&config.sheets.primary)
            .iter()
            .skip(1)
            .map(|row| row[0].clone())
            .collect()
    }

    #[test]
    fn test_deletes_only_true_flags() {
        let (mut drive, mut sheets, config) = setup(&[
            CellValue::Bool(true),
            CellValue::Bool(false),
            CellValue::Bool(true),
        ]);
        let notifier = RecordingNotifier::new();

        let outcome =
            delete_flagged(&mut drive, &mut sheets, &notifier, &config, &ColumnMap::default())
                .unwrap();

        assert_eq!(outcome.deleted, 2);
        assert!(outcome.failures.is_empty());
        assert_eq!(drive.deleted_files(), &["f1".to_string(), "f3".to_string()]);
        assert_eq!(
            flag_column(&sheets, &config),
            vec![
                CellValue::text(PROCESSED_MARKER),
                CellValue::Bool(false),
                CellValue::text(PROCESSED_MARKER),
            ]
        );
        assert_eq!(sheets.write_count(), 1);
        assert_eq!(notifier.messages(), vec!["Working...", "Removed 2 files"]);
    }

    #[test]
    fn test_no_flags_means_no_write() {
        let (mut drive, mut sheets, config) = setup(&[CellValue::Empty, CellValue::text("TRUE")]);
        let outcome = delete_flagged(
            &mut drive,
            &mut sheets,
            &RecordingNotifier::new(),
            &config,
            &ColumnMap::default(),
        )
        .unwrap();

        assert_eq!(outcome.deleted, 0);
        assert!(drive.deleted_files().is_empty());
        assert_eq!(sheets.write_count(), 0);
    }

    #[test]
    fn test_failed_delete_does_not_stop_sweep() {
        let (mut drive, mut sheets, config) = setup(&[
            CellValue::Bool(true),
            CellValue::Bool(true),
            CellValue::Bool(true),
        ]);
        drive.fail_delete_of("f2");

        let notifier = RecordingNotifier::new();
        let outcome =
            delete_flagged(&mut drive, &mut sheets, &notifier, &config, &ColumnMap::default())
                .unwrap();

        assert_eq!(outcome.deleted, 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].file_id, "f2");
        assert_eq!(
            flag_column(&sheets, &config),
            vec![
                CellValue::text(PROCESSED_MARKER),
                CellValue::Bool(true),
                CellValue::text(PROCESSED_MARKER),
            ]
        );
        assert_eq!(notifier.messages()[1], "Removed 2 files, 1 failed");
    }

    #[test]
    fn test_flag_column_position_comes_from_header() {
        let config = Config::default();
        let mut drive = MemoryDrive::new("me");
        drive.add_file(RemoteFile {
            id: "x".to_string(),
            ..RemoteFile::default()
        });
        let mut sheets = MemorySheets::new();
        sheets.add_sheet_with_header(&config.sheets.primary, &["Id", "Name", "RemoveMe"]);
        sheets.push_row(
            &config.sheets.primary,
            vec!["x".into(), "x.txt".into(), CellValue::Bool(true)],
        );

        delete_flagged(
            &mut drive,
            &mut sheets,
            &RecordingNotifier::new(),
            &config,
            &ColumnMap::default(),
        )
        .unwrap();

        let grid = sheets.grid(&config.sheets.primary);
        assert_eq!(grid[1][0], CellValue::text("x"));
        assert_eq!(grid[1][2], CellValue::text(PROCESSED_MARKER));
    }

    #[test]
    fn test_missing_flag_column() {
        let config = Config::default();
        let mut drive = MemoryDrive::new("me");
        let mut sheets = MemorySheets::new();
        sheets.add_sheet_with_header(&config.sheets.primary, &["Name", "Id"]);

        let err = delete_flagged(
            &mut drive,
            &mut sheets,
            &RecordingNotifier::new(),
            &config,
            &ColumnMap::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TidyError::DataShape(_)));
    }

    #[test]
    fn test_count_flagged() {
        let (_, sheets, config) = setup(&[
            CellValue::Bool(true),
            CellValue::text(PROCESSED_MARKER),
            CellValue::Bool(true),
        ]);
        assert_eq!(count_flagged(&sheets, &config, &ColumnMap::default()).unwrap(), 2);
    }
}
