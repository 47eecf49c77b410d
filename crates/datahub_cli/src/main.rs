//! DataHub CLI
//!
//! Launcher for the DataHub sensor store.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP server
//! - `version` - Show version information

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// DataHub in-memory sensor store.
#[derive(Parser)]
#[command(name = "datahub")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve(commands::serve::ServeArgs),

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose when set
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve(args) => commands::serve::run(args)?,
        Commands::Version => {
            println!("DataHub CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use datahub_server::UpdateMode;

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["datahub", "serve"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };

        let config = args.config();
        assert_eq!(config.bind_addr.port(), 5555);
        assert_eq!(config.store.segments, 16);
        assert_eq!(config.store.max_bytes, 3 * 1024 * 1024 * 1024);
        assert_eq!(config.update_mode, UpdateMode::ReadModifyWrite);
    }

    #[test]
    fn serve_flags() {
        let cli = Cli::try_parse_from([
            "datahub",
            "serve",
            "--port",
            "8080",
            "--segments",
            "10",
            "--capacity",
            "256",
            "--atomic-updates",
            "--strict-location-ids",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };

        let config = args.config();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.store.normalized_segments(), 16);
        assert_eq!(config.store.max_bytes, 256);
        assert_eq!(config.update_mode, UpdateMode::Atomic);
        assert!(config.strict_location_ids);
    }
}
