//! Archive command feature.
//!
//! This module owns and handles the "drivetidy archive" command behavior.

use super::open_sheets;
use crate::archive;
use crate::config::Config;
use crate::output::{ConsoleNotifier, OutputMode};
use crate::row_model::ColumnMap;
use anyhow::Context;

pub(crate) fn handle_archive(output_mode: OutputMode) -> anyhow::Result<()> {
    let config = Config::load();
    let mut sheets = open_sheets(&config)?;
    let notifier = ConsoleNotifier::new(output_mode);

    archive::archive_removed(&mut sheets, &notifier, &config, &ColumnMap::default())
        .with_context(|| {
            format!(
                "Failed to archive rows from '{}' into '{}'",
                config.sheets.primary, config.sheets.archive
            )
        })?;
    Ok(())
}
