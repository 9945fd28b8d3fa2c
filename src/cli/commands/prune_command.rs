//! Prune command feature.
//!
//! This module owns and handles the "drivetidy prune" command behavior.

use super::{open_drive, open_sheets};
use crate::config::Config;
use crate::output::{self, ConsoleNotifier, OutputMode};
use crate::progress;
use crate::prune;
use anyhow::Context;

pub(crate) fn handle_prune(root: Option<String>, output_mode: OutputMode) -> anyhow::Result<()> {
    let mut config = Config::load();
    config.apply_cli_overrides(root);
    let mut drive = open_drive(&config)?;
    let mut sheets = open_sheets(&config)?;

    let spinner = progress::create_spinner("Looking for empty folders...", output_mode);
    let notifier = ConsoleNotifier::with_progress(output_mode, spinner.clone());
    let result = prune::prune_empty_folders(&mut drive, &mut sheets, &notifier, &config);
    spinner.finish_and_clear();

    let report = result.context("Failed to prune empty folders")?;
    output::print_prune_report(&report, output_mode);
    Ok(())
}
