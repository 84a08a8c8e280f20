//! Serve command - preview the generated site

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr, bail};
use sitekit_core::Config;
use tokio::net::TcpListener;

use crate::server::create_router;

/// Run the serve command.
///
/// Serves `dir`, or the configured output directory, until interrupted.
pub async fn run(config_path: &Path, dir: Option<PathBuf>, port: u16) -> Result<()> {
    let output_dir = match dir {
        Some(dir) => dir,
        None => {
            let config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
            PathBuf::from(config.build.output_dir)
        }
    };

    if !output_dir.is_dir() {
        bail!(
            "Output directory {} does not exist; run `sitekit build` first",
            output_dir.display()
        );
    }

    tracing::info!(dir = %output_dir.display(), port, "Starting preview server");

    let app = create_router(&output_dir);
    let addr = format!("127.0.0.1:{port}");

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!();
    println!("  Serving {} at http://{addr}", output_dir.display());
    println!("  Press Ctrl+C to stop");
    println!();

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .wrap_err("Server error")?;

    Ok(())
}
