//! Collect command feature.
//!
//! This module owns and handles the "drivetidy collect" command behavior.

use super::{open_drive, open_sheets};
use crate::config::Config;
use crate::inventory;
use crate::output::{self, ConsoleNotifier, OutputMode};
use crate::progress;
use crate::row_model::ColumnMap;
use anyhow::Context;

pub(crate) fn handle_collect(output_mode: OutputMode) -> anyhow::Result<()> {
    let config = Config::load();
    let drive = open_drive(&config)?;
    let mut sheets = open_sheets(&config)?;

    let spinner = progress::create_spinner("Listing your files...", output_mode);
    let notifier = ConsoleNotifier::with_progress(output_mode, spinner.clone());
    let result = inventory::collect_files(
        &drive,
        &mut sheets,
        &notifier,
        &config,
        &ColumnMap::default(),
    );
    spinner.finish_and_clear();

    let summary = result.with_context(|| {
        format!("Failed to collect files into '{}'", config.sheets.primary)
    })?;
    output::print_collect_summary(summary.count, summary.total_bytes, output_mode);
    Ok(())
}
