use clap::{Parser, Subcommand};

mod cmd;
mod config;
mod error;
mod input;
mod tax;
mod utils;

#[derive(Parser, Debug)]
#[command(
    name = "taxin",
    version,
    about = "Calculate India Income Tax under the old and new regimes"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare tax liability under both regimes and recommend one
    Compare(cmd::compare::CompareCommand),
    /// Show per-section eligible deductions for one regime
    Deductions(cmd::deductions::DeductionsCommand),
    /// List built-in financial-year configurations
    Years(cmd::years::YearsCommand),
    /// Print expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Compare(cmd) => cmd.exec(),
        Command::Deductions(cmd) => cmd.exec(),
        Command::Years(cmd) => cmd.exec(),
        Command::Schema(cmd) => cmd.exec(),
    }
}
