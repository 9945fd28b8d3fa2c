//! Console output: verbosity modes, status notifications and report tables

use crate::deletion::DeletionOutcome;
use crate::prune::PruneReport;
use crate::theme::Theme;
use indicatif::ProgressBar;
use std::cell::RefCell;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Quiet,       // Only errors
    Normal,      // Standard output
    Verbose,     // More details
    VeryVerbose, // All details including per-item ids
}

impl OutputMode {
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            OutputMode::Quiet
        } else if verbose >= 2 {
            OutputMode::VeryVerbose
        } else if verbose == 1 {
            OutputMode::Verbose
        } else {
            OutputMode::Normal
        }
    }
}

/// Short-lived status messages shown to the user while a sweep runs
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Prints notifications as status lines
///
/// With a progress bar attached, lines go through the bar so they do not
/// tear its redraws.
pub struct ConsoleNotifier {
    mode: OutputMode,
    progress: Option<ProgressBar>,
}

impl ConsoleNotifier {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode, progress: None }
    }

    pub fn with_progress(mode: OutputMode, progress: ProgressBar) -> Self {
        Self {
            mode,
            progress: Some(progress),
        }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) {
        if self.mode == OutputMode::Quiet {
            return;
        }
        let line = format!("{} {}", Theme::muted(&format!("[{}]", title)), message);
        match &self.progress {
            Some(pb) if !pb.is_hidden() => pb.println(line),
            _ => println!("{}", line),
        }
    }
}

/// Keeps every notification; used to assert on what a sweep reported
#[derive(Default)]
pub struct RecordingNotifier {
    messages: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().iter().map(|(_, m)| m.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.messages
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

/// Truncate a string to a maximum display width (adds ellipsis if needed).
fn truncate_to_width(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }

    let ellipsis = "…";
    let target = max_width.saturating_sub(UnicodeWidthStr::width(ellipsis));

    let mut out = String::new();
    let mut w = 0usize;
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if w + cw > target {
            break;
        }
        out.push(ch);
        w += cw;
    }
    out.push_str(ellipsis);
    out
}

/// Pad/truncate content to a specific display width (Unicode-aware).
fn pad_right_to_width(s: &str, width: usize) -> String {
    let truncated = truncate_to_width(s, width);
    let w = UnicodeWidthStr::width(truncated.as_str());
    format!("{}{}", truncated, " ".repeat(width.saturating_sub(w)))
}

fn table_row(cols: &[(&str, usize)]) -> String {
    let mut row = String::from("│");
    for (content, width) in cols {
        row.push(' ');
        row.push_str(&pad_right_to_width(content, *width));
        row.push_str(" │");
    }
    row
}

/// Widths are content widths (excluding the 1-space left/right padding).
fn table_separator(widths: &[usize], left: &str, mid: &str, right: &str) -> String {
    let mut sep = left.to_string();
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            sep.push_str(mid);
        }
        sep.push_str(&"─".repeat(width + 2));
    }
    sep.push_str(right);
    sep
}

fn print_table(headers: [&str; 2], rows: &[(String, String)], widths: [usize; 2]) {
    println!("{}", table_separator(&widths, "┌", "┬", "┐"));
    println!("{}", table_row(&[(headers[0], widths[0]), (headers[1], widths[1])]));
    println!("{}", table_separator(&widths, "├", "┼", "┤"));
    for (a, b) in rows {
        println!("{}", table_row(&[(a.as_str(), widths[0]), (b.as_str(), widths[1])]));
    }
    println!("{}", table_separator(&widths, "└", "┴", "┘"));
}

/// Summary of a collect run
pub fn print_collect_summary(count: usize, total_bytes: u64, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }
    println!();
    println!(
        "{} {} files, {}",
        Theme::success("Collected"),
        Theme::value(&count.to_string()),
        Theme::value(&bytesize::to_string(total_bytes, false))
    );
}

/// Per-file failures of a deletion sweep
pub fn print_deletion_outcome(outcome: &DeletionOutcome, mode: OutputMode) {
    if mode == OutputMode::Quiet || outcome.failures.is_empty() {
        return;
    }
    println!();
    println!(
        "{}",
        Theme::warning(&format!("{} files could not be deleted:", outcome.failures.len()))
    );
    let rows: Vec<_> = outcome
        .failures
        .iter()
        .map(|f| (f.file_id.clone(), f.message.clone()))
        .collect();
    print_table(["File Id", "Error"], &rows, [34, 60]);
}

/// Folders trashed by a prune run
pub fn print_prune_report(report: &PruneReport, mode: OutputMode) {
    if mode == OutputMode::Quiet {
        return;
    }
    println!();
    if report.trashed.is_empty() {
        println!("{}", Theme::muted("No empty folders found."));
    } else if mode == OutputMode::Normal {
        println!(
            "{} {} empty folders",
            Theme::success("Trashed"),
            Theme::value(&report.trashed.len().to_string())
        );
    } else {
        let rows: Vec<_> = report
            .trashed
            .iter()
            .map(|e| (e.id.clone(), e.name.clone()))
            .collect();
        print_table(["Folder Id", "Name"], &rows, [34, 40]);
    }
    if report.failed_branches > 0 {
        println!(
            "{}",
            Theme::warning(&format!(
                "{} folders were skipped because the drive returned an error",
                report.failed_branches
            ))
        );
    }
}
