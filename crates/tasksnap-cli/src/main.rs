//! tasksnap CLI
//!
//! Runs the snapshot service and inspects its database

use clap::{Parser, Subcommand};
use tasksnap_core::logging_facility::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "tasksnap")]
#[command(about = "tasksnap - Append-only task-list snapshot service", long_about = None)]
struct Cli {
    /// Log output format: pretty or json
    #[arg(
        long,
        global = true,
        env = "TASKSNAP_LOG_FORMAT",
        default_value = "pretty"
    )]
    log_format: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve(commands::serve::ServeArgs),
    /// Inspect or append revisions directly
    Snapshot(commands::snapshot::SnapshotArgs),
}

fn main() {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging_facility::init(cli.log_format);

    let result = match cli.command {
        Commands::Serve(args) => commands::serve::execute(args),
        Commands::Snapshot(args) => commands::snapshot::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
