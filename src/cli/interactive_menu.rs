//! Interactive menu feature.
//!
//! This module owns the menu shown when no command is given.

use super::{read_line_from_stdin, Cli, Commands};
use crate::output::OutputMode;
use crate::theme::Theme;

/// Menu entries in display order: label, command name, alias
const MENU: [(&str, &str, &str); 4] = [
    ("Collect Files", "collect", "c"),
    ("Delete Flagged Files", "delete", "d"),
    ("Archive Removed Rows", "archive", "a"),
    ("Prune Empty Folders", "prune", "p"),
];

/// Map a menu answer (number, name or alias) to a command
fn parse_choice(input: &str) -> Option<Commands> {
    let input = input.trim().to_lowercase();
    let index = match input.parse::<usize>() {
        Ok(n) if (1..=MENU.len()).contains(&n) => n - 1,
        Ok(_) => return None,
        Err(_) => MENU
            .iter()
            .position(|(_, name, alias)| input == *name || input == *alias)?,
    };
    Some(match index {
        0 => Commands::Collect,
        1 => Commands::Delete { yes: false },
        2 => Commands::Archive,
        _ => Commands::Prune { root: None },
    })
}

impl Cli {
    /// Show the operation menu and run the chosen one
    pub fn show_interactive_menu(output_mode: OutputMode) -> anyhow::Result<()> {
        println!();
        println!("{}", Theme::header("Drivetidy - Clean Up Your Drive"));
        println!("{}", Theme::divider_bold(60));
        println!();
        println!("{}", Theme::primary("Operations:"));
        println!();
        for (i, (label, name, alias)) in MENU.iter().enumerate() {
            println!(
                "  {}  {}  {} {} {}",
                Theme::value(&format!("{}.", i + 1)),
                label,
                Theme::command(name),
                Theme::muted("or"),
                Theme::command(alias),
            );
        }
        println!();
        println!("{}", Theme::divider(60));
        print!("Choose an operation [1-{}, Enter to quit]: ", MENU.len());

        let input = match read_line_from_stdin() {
            Ok(line) => line,
            Err(_) => return Ok(()),
        };
        if input.trim().is_empty() || input.trim().eq_ignore_ascii_case("q") {
            return Ok(());
        }
        match parse_choice(&input) {
            Some(command) => Self::dispatch(command, output_mode),
            None => {
                println!("{}", Theme::error(&format!("Unknown choice '{}'", input.trim())));
                println!(
                    "{}",
                    Theme::muted("Tip: Use --help with any command for detailed options")
                );
                Ok(())
            }
        }
    }
}
