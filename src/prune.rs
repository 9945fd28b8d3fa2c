//! Trash empty folders below a root folder
//!
//! The walk is depth-first and post-order: a folder's subfolders are handled
//! before the folder itself is tested, so a folder that only held empty
//! folders is empty by the time it is checked. Child lists are snapshotted
//! before recursing. The root itself is never tested.

use crate::config::Config;
use crate::error::{Result, TidyError};
use crate::inventory::STATUS_TITLE;
use crate::output::Notifier;
use crate::record::EmptyFolderLogEntry;
use crate::sheet::TabularStore;
use crate::storage::{FolderNode, StorageService};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Trashed folders, deepest first within each branch
    pub trashed: Vec<EmptyFolderLogEntry>,
    /// Folders whose enumeration or trashing failed; their branch was skipped
    pub failed_branches: usize,
}

pub fn prune_empty_folders<S, T>(
    storage: &mut S,
    store: &mut T,
    notifier: &dyn Notifier,
    config: &Config,
) -> Result<PruneReport>
where
    S: StorageService + ?Sized,
    T: TabularStore + ?Sized,
{
    let root_id = config.root_folder_id()?;
    let log_sheet = config.sheets.prune_log.as_str();
    // Fails early when the log sheet is missing, before anything is trashed
    store.read_all(log_sheet)?;

    let root = storage.get_folder(root_id).map_err(|e| {
        TidyError::Configuration(format!("root folder '{}' is not accessible: {}", root_id, e))
    })?;
    let children = storage.list_child_folders(&root.id)?;
    info!(root = %root.name, children = children.len(), "pruning empty folders");

    let mut report = PruneReport::default();
    for child in &children {
        visit(storage, store, log_sheet, child, &mut report);
    }

    info!(
        trashed = report.trashed.len(),
        failed = report.failed_branches,
        "prune finished"
    );
    notifier.notify(
        STATUS_TITLE,
        &format!("Trashed {} empty folders", report.trashed.len()),
    );
    Ok(report)
}

fn visit<S, T>(
    storage: &mut S,
    store: &mut T,
    log_sheet: &str,
    folder: &FolderNode,
    report: &mut PruneReport,
) where
    S: StorageService + ?Sized,
    T: TabularStore + ?Sized,
{
    let children = match storage.list_child_folders(&folder.id) {
        Ok(children) => children,
        Err(e) => {
            warn!("Skipping '{}' ({}): {}", folder.name, folder.id, e);
            report.failed_branches += 1;
            return;
        }
    };

    for child in &children {
        visit(storage, store, log_sheet, child, report);
    }

    // Re-queried rather than taken from the snapshot: children may be gone now
    let occupied = match storage.has_child_files(&folder.id) {
        Ok(false) => storage.has_child_folders(&folder.id),
        other => other,
    };
    match occupied {
        Ok(true) => {
            debug!(folder = %folder.name, "not empty");
            return;
        }
        Ok(false) => {}
        Err(e) => {
            warn!("Skipping '{}' ({}): {}", folder.name, folder.id, e);
            report.failed_branches += 1;
            return;
        }
    }

    if let Err(e) = storage.trash_folder(&folder.id) {
        warn!("Failed to trash '{}' ({}): {}", folder.name, folder.id, e);
        report.failed_branches += 1;
        return;
    }

    let entry = EmptyFolderLogEntry {
        id: folder.id.clone(),
        name: folder.name.clone(),
    };
    if let Err(e) = store.append_row(log_sheet, &entry.to_row()) {
        warn!("Trashed '{}' but could not log it: {}", folder.name, e);
    }
    debug!(folder = %folder.name, "trashed");
    report.trashed.push(entry);
}
