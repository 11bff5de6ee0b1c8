use clap::{Parser, Subcommand};

mod cmd;
mod core;

#[derive(Parser, Debug)]
#[command(
    name = "regimetax",
    version,
    about = "Indian income tax calculator (old and new regimes)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the tax liability for each income statement
    Compute(cmd::compute::ComputeCommand),
    /// Compare the old and new regimes and recommend one
    Compare(cmd::compare::CompareCommand),
    /// Render a computation statement as HTML, CSV or text
    Report(cmd::report::ReportCommand),
    /// Print the expected input formats
    Schema(cmd::schema::SchemaCommand),
    /// Print the tax rules for an assessment year
    Rules(cmd::rules::RulesCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Compute(command) => command.exec(),
        Command::Compare(command) => command.exec(),
        Command::Report(command) => command.exec(),
        Command::Schema(command) => command.exec(),
        Command::Rules(command) => command.exec(),
    }
}
