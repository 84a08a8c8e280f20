//! sitekit CLI
//!
//! Builds, checks and previews the project website.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use sitekit::cmd::build::BuildOptions;

/// Command-line interface for sitekit.
#[derive(Parser)]
#[command(name = "sitekit", version, about = "Static site generator for the project website")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Override site base path (e.g., /engine)
        #[arg(long)]
        base_path: Option<String>,
        /// Override site origin (e.g., https://example.com)
        #[arg(long)]
        origin: Option<String>,
        /// Skip fetching conformance results
        #[arg(long)]
        no_metrics: bool,
    },
    /// Validate configuration and content
    Check,
    /// Serve the generated site locally
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
        /// Directory to serve instead of the configured output directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    sitekit::init_tracing(cli.verbose);

    let config = cli.config;
    match cli.command {
        Commands::Build {
            output,
            base_path,
            origin,
            no_metrics,
        } => {
            let options = BuildOptions {
                output,
                base_path,
                origin,
                no_metrics,
            };
            // The build makes blocking HTTP requests.
            tokio::task::spawn_blocking(move || sitekit::cmd::build::run(&config, &options)).await??;
        }
        Commands::Check => {
            tokio::task::spawn_blocking(move || sitekit::cmd::check::run(&config)).await??;
        }
        Commands::Serve { port, dir } => {
            sitekit::cmd::serve::run(&config, dir, port).await?;
        }
    }

    Ok(())
}
