mod commands;
mod format;
mod writer;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use commands::{convert::ConvertArgs, info::InfoArgs};

#[derive(Parser)]
#[command(name = "gsfconvert", about = "Inspect GSF sonar files and convert them to various formats")]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert pings to jsonl/csv/parquet
    Convert(ConvertArgs),
    /// Print record counts, ping groups and quality checks
    Info(InfoArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    match cli.command {
        Commands::Convert(args) => args.run(),
        Commands::Info(args) => args.run(),
    }
}
