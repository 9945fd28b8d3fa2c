//! Delete command feature.
//!
//! This module owns and handles the "drivetidy delete" command behavior.

use super::{open_drive, open_sheets};
use crate::cli::confirm;
use crate::config::Config;
use crate::deletion;
use crate::output::{self, ConsoleNotifier, OutputMode};
use crate::progress;
use crate::row_model::ColumnMap;
use crate::theme::Theme;
use anyhow::Context;

pub(crate) fn handle_delete(yes: bool, output_mode: OutputMode) -> anyhow::Result<()> {
    let config = Config::load();
    let columns = ColumnMap::default();
    let mut drive = open_drive(&config)?;
    let mut sheets = open_sheets(&config)?;

    let flagged = deletion::count_flagged(&sheets, &config, &columns)
        .with_context(|| format!("Failed to read '{}'", config.sheets.primary))?;
    if flagged == 0 {
        if output_mode != OutputMode::Quiet {
            println!("{}", Theme::muted("No rows are flagged for removal."));
        }
        return Ok(());
    }

    if !yes {
        println!();
        println!(
            "{}",
            Theme::warning(&format!(
                "This will permanently delete {} files from your Drive.",
                flagged
            ))
        );
        println!("{}", Theme::muted("Deleted files do not go to the trash."));
        println!();
        if !confirm("Are you sure you want to continue?") {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let spinner = progress::create_spinner("Deleting flagged files...", output_mode);
    let notifier = ConsoleNotifier::with_progress(output_mode, spinner.clone());
    let result = deletion::delete_flagged(&mut drive, &mut sheets, &notifier, &config, &columns);
    spinner.finish_and_clear();

    let outcome = result.context("Deletion sweep failed")?;
    output::print_deletion_outcome(&outcome, output_mode);
    Ok(())
}
