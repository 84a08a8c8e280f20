//! sitekit CLI Library
//!
//! Command implementations behind the `sitekit` binary.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (build, check, serve)
//! - [`server`] - Static preview server
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use sitekit::cmd::{self, build::BuildOptions};
//!
//! cmd::build::run(Path::new("site.toml"), &BuildOptions::default()).unwrap();
//! ```

pub mod cmd;
pub mod server;

pub use sitekit_core::Config;
pub use sitekit_generator::{BuildStats, Builder};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
