//! Check command - validate configuration and content

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use sitekit_core::{Config, content::load_talks};
use sitekit_generator::PostLoader;

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Run the check command.
///
/// Validates the configuration, every post and the talks file without
/// writing any output.
pub fn run(config_path: &Path) -> Result<()> {
    tracing::info!(?config_path, "Checking configuration and content");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match Config::load_with_env(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            c
        }
        Err(e) => {
            println!("  ✗ Configuration invalid: {e}");
            bail!("Configuration error: {e}");
        }
    };

    let content_dir = Path::new(&config.build.content_dir);

    println!("\nChecking posts...");
    validate_posts(&content_dir.join("blog"), &mut result);

    println!("\nChecking talks...");
    match load_talks(&content_dir.join("talks.toml")) {
        Ok(talks) => println!("  ✓ {} talks", talks.len()),
        Err(e) => {
            println!("  ✗ Talks invalid");
            result.add_error(e.to_string());
        }
    }

    println!("\nChecking contributing guide...");
    check_contributing(&config, &mut result);

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if !result.errors.is_empty() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if !result.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Parse every post, recording each failure instead of stopping at the first.
fn validate_posts(dir: &Path, result: &mut ValidationResult) {
    if !dir.is_dir() {
        result.add_warning(format!("No blog directory at {}", dir.display()));
        return;
    }

    let posts = match PostLoader::new(dir).posts() {
        Ok(posts) => posts,
        Err(e) => {
            result.add_error(e.to_string());
            return;
        }
    };

    let mut checked = 0;
    let mut failed = 0;
    for post in posts {
        checked += 1;
        if let Err(e) = post {
            result.add_error(e.to_string());
            failed += 1;
        }
    }

    if failed == 0 {
        println!("  ✓ All {checked} posts valid");
    } else {
        println!("  ✗ {failed}/{checked} posts have errors");
    }
}

fn check_contributing(config: &Config, result: &mut ValidationResult) {
    if config.contributing_is_remote() {
        println!("  ✓ Fetched at build time from {}", config.contributing.source);
        return;
    }

    let source = Path::new(&config.contributing.source);
    if source.is_file() {
        println!("  ✓ {} exists", source.display());
    } else {
        result.add_error(format!("Contributing guide not found: {}", source.display()));
        println!("  ✗ {} missing", source.display());
    }
}
