//! Build command - generates the static site

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use color_eyre::eyre::{Result, WrapErr};
use sitekit_core::Config;
use sitekit_generator::Builder;

/// Command-line overrides for a build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Output directory instead of `build.output_dir`.
    pub output: Option<PathBuf>,
    /// Base path instead of `site.base_path`.
    pub base_path: Option<String>,
    /// Origin instead of `site.origin`.
    pub origin: Option<String>,
    /// Skip the conformance page.
    pub no_metrics: bool,
}

impl BuildOptions {
    /// Apply the overrides and re-validate.
    pub fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(output) = &self.output {
            config.build.output_dir = output.to_string_lossy().to_string();
        }

        if let Some(bp) = &self.base_path {
            tracing::info!(base_path = %bp, "Overriding site base_path from CLI");
            config.site.base_path = bp.clone();
        }

        if let Some(origin) = &self.origin {
            tracing::info!(origin = %origin, "Overriding site origin from CLI");
            config.site.origin = origin.clone();
        }

        if self.no_metrics {
            config.metrics.enabled = false;
        }

        config.validate().wrap_err("Invalid configuration after overrides")?;
        Ok(())
    }
}

/// Run the build command.
///
/// Blocks on network fetches; call from a blocking context.
pub fn run(config_path: &Path, options: &BuildOptions) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?options, "Starting build");

    let mut config = Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    options.apply(&mut config)?;
    tracing::debug!(?config, "Loaded configuration");

    let output = PathBuf::from(&config.build.output_dir);
    let stats = Builder::new(config).build().wrap_err("Build failed")?;

    let duration = start.elapsed();

    println!();
    println!("  Build completed successfully!");
    println!();
    println!("  Pages:      {}", stats.pages);
    println!("  Posts:      {}", stats.posts);
    println!("  Feeds:      {}", stats.feeds);
    println!("  Assets:     {}", stats.assets);
    println!();
    println!("  Duration:   {:.2}s", duration.as_secs_f64());
    println!("  Output:     {}", output.display());
    println!();

    tracing::info!(?stats, ?duration, "Build completed successfully");

    Ok(())
}
