//! Site configuration management.

use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    paths::PathResolver,
};

/// Environment variable overriding `site.base_path`.
pub const ENV_BASE_PATH: &str = "BASE_PATH";

/// Environment variable overriding `site.origin`.
pub const ENV_ORIGIN: &str = "SITE_ORIGIN";

/// Environment variable carrying the metrics API token.
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";

/// Main configuration structure for sitekit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Build settings.
    #[serde(default)]
    pub build: BuildConfig,

    /// Feed settings.
    #[serde(default)]
    pub feed: FeedConfig,

    /// test262 conformance metrics settings.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Contributing guide settings.
    #[serde(default)]
    pub contributing: ContributingConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Origin used for absolute links (e.g., "https://example.com").
    pub origin: String,

    /// Path prefix for internal links when served from a subpath (e.g., "/site").
    #[serde(default)]
    pub base_path: String,

    /// Site description for meta tags and feeds.
    #[serde(default)]
    pub description: Option<String>,

    /// Site author name.
    #[serde(default)]
    pub author: Option<String>,

    /// Source repository URL shown in the navigation.
    #[serde(default)]
    pub repository: Option<String>,
}

/// Build configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Directory holding Markdown posts and data files.
    #[serde(default = "default_content_dir")]
    pub content_dir: String,

    /// Output directory for the generated site.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Static assets copied verbatim into the output directory.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

/// Feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Maximum number of items in each feed.
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
}

/// Conformance metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether the conformance page is built at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Repository owner holding the results history.
    #[serde(default = "default_metrics_owner")]
    pub owner: String,

    /// Repository holding the results history.
    #[serde(default = "default_metrics_repo")]
    pub repo: String,

    /// Path of the results document inside the repository.
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// Number of commits to chart.
    #[serde(default = "default_metrics_history")]
    pub history: usize,

    /// REST API root.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Raw file host root.
    #[serde(default = "default_raw_url")]
    pub raw_url: String,

    /// Access token, usually supplied through `GITHUB_TOKEN`.
    #[serde(default, skip_serializing)]
    pub token: Option<Secret>,
}

/// Contributing guide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributingConfig {
    /// Local path (relative to the working directory) or URL of the guide.
    #[serde(default = "default_contributing_source")]
    pub source: String,
}

/// A string that never shows up in debug output.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the wrapped value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

fn default_content_dir() -> String {
    "content".to_string()
}

fn default_output_dir() -> String {
    "dist".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_feed_limit() -> usize {
    20
}

fn default_true() -> bool {
    true
}

fn default_metrics_owner() -> String {
    "boa-dev".to_string()
}

fn default_metrics_repo() -> String {
    "data".to_string()
}

fn default_metrics_path() -> String {
    "test262/refs/heads/main/latest.json".to_string()
}

fn default_metrics_history() -> usize {
    30
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_raw_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}

fn default_contributing_source() -> String {
    "content/contributing.md".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            output_dir: default_output_dir(),
            public_dir: default_public_dir(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            limit: default_feed_limit(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            owner: default_metrics_owner(),
            repo: default_metrics_repo(),
            path: default_metrics_path(),
            history: default_metrics_history(),
            api_url: default_api_url(),
            raw_url: default_raw_url(),
            token: None,
        }
    }
}

impl Default for ContributingConfig {
    fn default() -> Self {
        Self {
            source: default_contributing_source(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration layering `SITEKIT__SECTION__KEY` variables over the file.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("SITEKIT").separator("__"))
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply the dedicated override variables through a lookup function.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base_path) = lookup(ENV_BASE_PATH) {
            tracing::debug!(base_path = %base_path, "base path from environment");
            self.site.base_path = base_path;
        }
        if let Some(origin) = lookup(ENV_ORIGIN) {
            tracing::debug!(origin = %origin, "origin from environment");
            self.site.origin = origin;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
            self.metrics.token = Some(Secret::new(token));
        }
    }

    /// Validate and normalize the configuration.
    pub fn validate(&mut self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.site.origin.is_empty() {
            return Err(CoreError::config("site.origin cannot be empty"));
        }

        if self.site.origin.ends_with('/') {
            tracing::warn!("site.origin should not have a trailing slash");
            self.site.origin = self.site.origin.trim_end_matches('/').to_string();
        }

        if !self.site.base_path.is_empty() && !self.site.base_path.starts_with('/') {
            return Err(CoreError::config(format!(
                "site.base_path must start with '/': {}",
                self.site.base_path
            )));
        }

        if self.site.base_path.ends_with('/') {
            tracing::warn!("site.base_path should not have a trailing slash");
            self.site.base_path = self.site.base_path.trim_end_matches('/').to_string();
        }

        if self.feed.limit == 0 {
            return Err(CoreError::config("feed.limit must be at least 1"));
        }

        Ok(())
    }

    /// Build the path resolver for this configuration.
    #[must_use]
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(
            &self.build.content_dir,
            &self.build.output_dir,
            &self.site.base_path,
            &self.site.origin,
        )
    }

    /// Whether the contributing guide comes from the network.
    #[must_use]
    pub fn contributing_is_remote(&self) -> bool {
        let source = &self.contributing.source;
        source.starts_with("http://") || source.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, io::Write};

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
title = "Test Site"
origin = "https://example.com"
base_path = "/site"
description = "A test site"

[build]
content_dir = "posts"
output_dir = "out"

[feed]
limit = 15

[metrics]
owner = "example"
repo = "results"
history = 5

[contributing]
source = "https://example.com/CONTRIBUTING.md"
"#
        .to_string()
    }

    fn write_config(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("site.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(content.as_bytes()).expect("write");
        (dir, config_path)
    }

    #[test]
    fn test_load_config() {
        let (_dir, config_path) = write_config(&create_test_config());
        let mut config: Config = toml::from_str(&std::fs::read_to_string(&config_path).unwrap())
            .expect("parse config");
        config.validate().expect("valid config");

        assert_eq!(config.site.title, "Test Site");
        assert_eq!(config.site.origin, "https://example.com");
        assert_eq!(config.site.base_path, "/site");
        assert_eq!(config.build.content_dir, "posts");
        assert_eq!(config.build.output_dir, "out");
        assert_eq!(config.build.public_dir, "public");
        assert_eq!(config.feed.limit, 15);
        assert_eq!(config.metrics.owner, "example");
        assert_eq!(config.metrics.history, 5);
        assert!(config.metrics.enabled);
        assert!(config.contributing_is_remote());
    }

    #[test]
    fn test_config_defaults() {
        let (_dir, config_path) = write_config(
            r#"
[site]
title = "Minimal Site"
origin = "https://example.com"
"#,
        );

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.build.content_dir, "content");
        assert_eq!(config.build.output_dir, "dist");
        assert_eq!(config.feed.limit, 20);
        assert_eq!(config.metrics.api_url, "https://api.github.com");
        assert!(!config.contributing_is_remote());
    }

    #[test]
    fn test_apply_overrides() {
        let (_dir, config_path) = write_config(&create_test_config());
        let mut config: Config =
            toml::from_str(&std::fs::read_to_string(&config_path).unwrap()).unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BASE_PATH, "/preview"),
            (ENV_ORIGIN, "https://preview.example.com"),
            (ENV_TOKEN, "ghp_secret"),
        ]);
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.site.base_path, "/preview");
        assert_eq!(config.site.origin, "https://preview.example.com");
        assert_eq!(
            config.metrics.token.as_ref().map(Secret::expose),
            Some("ghp_secret")
        );
        assert!(!format!("{config:?}").contains("ghp_secret"));
    }

    #[test]
    fn test_validation_trims_trailing_slashes() {
        let (_dir, config_path) = write_config(
            r#"
[site]
title = "Test"
origin = "https://example.com/"
base_path = "/docs/"
"#,
        );
        let mut config: Config =
            toml::from_str(&std::fs::read_to_string(&config_path).unwrap()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.site.origin, "https://example.com");
        assert_eq!(config.site.base_path, "/docs");
    }

    #[test]
    fn test_validation_rejects_relative_base_path() {
        let mut config: Config = toml::from_str(
            r#"
[site]
title = "Test"
origin = "https://example.com"
base_path = "docs"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_path"));
    }

    #[test]
    fn test_config_validation_empty_title() {
        let mut config: Config = toml::from_str(
            r#"
[site]
title = ""
origin = "https://example.com"
"#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("title cannot be empty"));
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/site.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_resolver_uses_site_settings() {
        let mut config: Config = toml::from_str(&create_test_config()).unwrap();
        config.validate().unwrap();

        let resolver = config.resolver();
        assert_eq!(resolver.href("posts/blog/hello.md"), "/site/blog/hello");
    }
}
