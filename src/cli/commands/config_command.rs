//! Config command feature.
//!
//! This module owns and handles the "drivetidy config" command behavior.

use crate::config::{Config, ACCESS_TOKEN_ENV};
use crate::theme::Theme;
use anyhow::Context;

pub(crate) fn handle_config(show: bool, reset: bool, path: bool) -> anyhow::Result<()> {
    if reset {
        Config::default()
            .save()
            .context("Failed to write the config file")?;
        println!("{} Configuration reset to defaults.", Theme::success("OK"));
    }
    if path {
        println!("{}", Config::config_path()?.display());
    }
    // Bare `config` shows too
    if show || (!reset && !path) {
        print_config(&Config::load());
    }
    Ok(())
}

/// Hide all but the last four characters of a token
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

fn or_unset(value: &str) -> String {
    if value.trim().is_empty() {
        "(not set)".to_string()
    } else {
        value.to_string()
    }
}

fn print_config(config: &Config) {
    println!("{}", Theme::header("Current Configuration"));
    println!("{}", Theme::divider_bold(60));
    println!();
    println!("Google:");
    match config.google.access_token.as_deref() {
        Some(token) if !token.trim().is_empty() => {
            println!("  Access token: {}", mask_token(token.trim()))
        }
        _ => println!("  Access token: (not set, or use {})", ACCESS_TOKEN_ENV),
    }
    println!("  Drive API: {}", config.google.drive_api_base);
    println!("  Sheets API: {}", config.google.sheets_api_base);
    println!("  Timeout: {} s", config.google.timeout_secs);
    println!();
    println!("Sheets:");
    println!("  Spreadsheet: {}", or_unset(&config.sheets.spreadsheet_id));
    println!("  Files sheet: {}", config.sheets.primary);
    println!("  Archive sheet: {}", config.sheets.archive);
    println!("  Empty folder log: {}", config.sheets.prune_log);
    println!();
    println!("Inventory:");
    println!("  Page size: {}", config.page_size());
    println!("  Date offset: UTC{:+}", config.inventory.utc_offset_hours);
    println!("  Folder link prefix: {}", config.inventory.folder_url_prefix);
    println!();
    println!("Prune:");
    match config.root_folder_id() {
        Ok(root) => println!("  Root folder: {}", root),
        Err(_) => println!("  Root folder: (not set)"),
    }
    println!();
    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}
