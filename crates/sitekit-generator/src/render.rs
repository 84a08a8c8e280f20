//! Per-page rendering state.

use std::path::PathBuf;

use sitekit_core::{Config, CoreError, PathResolver, config::SiteConfig};
use sitekit_parser::ClassMap;
use thiserror::Error;

use crate::{
    metrics::MetricsError,
    styles::{StyleError, StyleRegistry},
    template::TemplateError,
};

/// Page rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Style module could not be registered.
    #[error("style error: {0}")]
    Style(#[from] StyleError),

    /// Document template failed.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// Page data file is malformed or unreadable.
    #[error("content error: {0}")]
    Content(#[from] CoreError),

    /// Conformance data unavailable.
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Local page source could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Remote page source could not be fetched.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Page output could not be written.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rendering.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Class names of one style module.
#[derive(Debug, Clone, Default)]
pub struct Classes(ClassMap);

impl Classes {
    /// Generated class string for `name`, or `name` itself when the module
    /// does not define it.
    #[must_use]
    pub fn get<'a>(&'a self, name: &'a str) -> &'a str {
        self.0.get(name).map_or(name, String::as_str)
    }
}

/// State threaded through the components of one page.
#[derive(Debug)]
pub struct RenderContext<'a> {
    config: &'a Config,
    resolver: &'a PathResolver,
    styles: &'a StyleRegistry,
    used: Vec<String>,
}

impl<'a> RenderContext<'a> {
    /// Create a context for one page.
    #[must_use]
    pub fn new(config: &'a Config, resolver: &'a PathResolver, styles: &'a StyleRegistry) -> Self {
        Self {
            config,
            resolver,
            styles,
            used: Vec::new(),
        }
    }

    /// Site configuration.
    #[must_use]
    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// `[site]` section.
    #[must_use]
    pub fn site(&self) -> &'a SiteConfig {
        &self.config.site
    }

    /// Path resolver.
    #[must_use]
    pub fn resolver(&self) -> &'a PathResolver {
        self.resolver
    }

    /// Register a style module and mark it as used by this page.
    pub fn classes(&mut self, module_id: &str) -> Result<Classes> {
        let classes = self.styles.register(module_id)?;
        if !self.used.iter().any(|id| id == module_id) {
            self.used.push(module_id.to_string());
        }
        Ok(Classes(classes))
    }

    /// Modules used so far, in first-use order.
    #[must_use]
    pub fn used_styles(&self) -> &[String] {
        &self.used
    }

    /// CSS of the modules this page used.
    #[must_use]
    pub fn stylesheet(&self) -> String {
        self.styles.stylesheet(&self.used)
    }
}
