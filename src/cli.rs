use clap::{ArgAction, Parser, Subcommand};
use std::io::{self, BufRead, Write};

mod commands;
mod interactive_menu;

use crate::logging;
use crate::output::OutputMode;

/// Read one line from stdin after flushing any pending prompt
pub(crate) fn read_line_from_stdin() -> io::Result<String> {
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input)
}

/// Ask a y/N question; anything but an explicit yes (or unreadable stdin) is no
pub(crate) fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    match read_line_from_stdin() {
        Ok(line) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

#[derive(Parser)]
#[command(name = "drivetidy")]
#[command(version)]
#[command(about = "Inventory, flag and clean up the files you own in Google Drive")]
#[command(
    long_about = "Drivetidy lists every file you own in Google Drive into a spreadsheet. \
    Tick the RemoveMe box on the rows you no longer want, then delete and archive them.\n\n\
    Examples:\n  \
    drivetidy                     # Interactive menu\n  \
    drivetidy collect             # Rebuild the file inventory\n  \
    drivetidy delete -y           # Delete flagged files without confirmation\n  \
    drivetidy archive             # Move processed rows to the archive sheet\n  \
    drivetidy prune --root <ID>   # Trash empty folders below a folder"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity (-v, -vv for more)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every file you own into the primary sheet
    #[command(visible_alias = "c")]
    Collect,

    /// Permanently delete the files flagged in the primary sheet
    #[command(visible_alias = "d")]
    Delete {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long = "yes")]
        yes: bool,
    },

    /// Move rows of deleted files into the archive sheet
    #[command(visible_alias = "a")]
    Archive,

    /// Trash empty folders below the configured root folder
    #[command(visible_alias = "p")]
    Prune {
        /// Root folder id (overrides prune.root_folder_id)
        #[arg(long, value_name = "ID")]
        root: Option<String>,
    },

    /// View or reset the configuration file
    Config {
        /// Print the current configuration
        #[arg(long)]
        show: bool,

        /// Overwrite the config file with defaults
        #[arg(long)]
        reset: bool,

        /// Print the config file location
        #[arg(long)]
        path: bool,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn run(self) -> anyhow::Result<()> {
        let output_mode = OutputMode::from_flags(self.quiet, self.verbose);
        logging::init_logger(output_mode);

        match self.command {
            None => Self::show_interactive_menu(output_mode),
            Some(command) => Self::dispatch(command, output_mode),
        }
    }

    fn dispatch(command: Commands, output_mode: OutputMode) -> anyhow::Result<()> {
        match command {
            Commands::Collect => commands::collect_command::handle_collect(output_mode),
            Commands::Delete { yes } => commands::delete_command::handle_delete(yes, output_mode),
            Commands::Archive => commands::archive_command::handle_archive(output_mode),
            Commands::Prune { root } => commands::prune_command::handle_prune(root, output_mode),
            Commands::Config { show, reset, path } => {
                commands::config_command::handle_config(show, reset, path)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_aliases_parse() {
        let cli = Cli::try_parse_from(["drivetidy", "d", "-y"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Delete { yes: true })));

        let cli = Cli::try_parse_from(["drivetidy", "p", "--root", "abc"]).unwrap();
        match cli.command {
            Some(Commands::Prune { root }) => assert_eq!(root.as_deref(), Some("abc")),
            _ => panic!("expected prune"),
        }
    }

    #[test]
    fn test_no_subcommand_and_global_flags() {
        let cli = Cli::try_parse_from(["drivetidy", "-vv"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 2);

        assert!(Cli::try_parse_from(["drivetidy", "-q", "-v", "collect"]).is_err());
    }
}
