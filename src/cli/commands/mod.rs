//! Command feature handlers.
//!
//! Each module owns one command feature.

pub mod archive_command;
pub mod collect_command;
pub mod config_command;
pub mod delete_command;
pub mod prune_command;

use crate::config::Config;
use crate::google::{DriveClient, SheetsClient};
use anyhow::Context;

/// Drive and Sheets clients built from the loaded config
pub(crate) fn open_drive(config: &Config) -> anyhow::Result<DriveClient> {
    DriveClient::new(config).context("Failed to set up the Drive client")
}

pub(crate) fn open_sheets(config: &Config) -> anyhow::Result<SheetsClient> {
    SheetsClient::new(config).context("Failed to set up the Sheets client")
}
