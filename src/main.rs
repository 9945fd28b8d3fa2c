use anyhow::Result;
use drivetidy::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
