//! Globe Terrain CLI - Command-line interface
//!
//! Queries terrain elevations and globe geometry through the `globe_terrain`
//! library. Results are printed as JSON on stdout; logs go to stderr.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use globe_terrain::logging::{init_logging, LoggingConfig};

use commands::elevation::{self, ElevationAction};
use commands::geodesy::{self, GeodesyAction};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "globe-terrain")]
#[command(version, about = "Terrain elevations and globe geometry", long_about = None)]
struct Cli {
    /// Also write logs to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Query the elevation model
    Elevation {
        #[command(subcommand)]
        action: ElevationAction,
    },
    /// Convert between geographic and Cartesian coordinates
    Geodesy {
        #[command(subcommand)]
        action: GeodesyAction,
    },
}

fn log_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut logging = LoggingConfig::default().with_default_directive(log_directive(cli.verbose));
    if let Some(path) = cli.log_file {
        logging = logging.with_log_file(path);
    }
    let _guard = init_logging(&logging)?;

    match cli.command {
        Commands::Elevation { action } => elevation::run(action).await,
        Commands::Geodesy { action } => geodesy::run(action),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
