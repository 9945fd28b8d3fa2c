//! Drivetidy library crate
//!
//! Inventories the files a user owns in Google Drive into a spreadsheet,
//! deletes the ones flagged there, archives the processed rows and prunes
//! empty folders. The binary wraps these operations in a CLI; the library
//! API works against any [`storage::StorageService`] and [`sheet::TabularStore`].

pub mod archive;
pub mod cli;
pub mod config;
pub mod deletion;
pub mod error;
pub mod google;
pub mod inventory;
pub mod logging;
pub mod memory;
pub mod output;
pub mod progress;
pub mod prune;
pub mod record;
pub mod row_model;
pub mod sheet;
pub mod storage;
pub mod theme;
