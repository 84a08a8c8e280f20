//! Build orchestration.
//!
//! Coordinates the full site build process.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
    time::Instant,
};

use rayon::prelude::*;
use sitekit_core::{Config, PathResolver};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    assets::{AssetError, copy_public},
    collector::{CollectorError, PostCollection},
    feed::{FeedError, FeedGenerator},
    metrics::{GithubMetrics, MetricsError, MetricsSource},
    pages::{PageJob, SiteData, render_page},
    render::RenderError,
    sitemap::{self, SitemapError},
    styles::StyleRegistry,
};

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Posts could not be loaded.
    #[error("collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Two pages would be written to the same file.
    #[error("{first} and {second} both write {path}")]
    OutputConflict {
        path: PathBuf,
        first: String,
        second: String,
    },

    /// Feed generation error.
    #[error("feed error: {0}")]
    Feed(#[from] FeedError),

    /// Sitemap generation error.
    #[error("sitemap error: {0}")]
    Sitemap(#[from] SitemapError),

    /// Asset error.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),

    /// Metrics client could not be created.
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// One or more pages failed to render or write.
    #[error("{}", PageFailures(.failed))]
    PagesFailed {
        /// Page label and error message for each failure.
        failed: Vec<(String, String)>,
    },
}

struct PageFailures<'a>(&'a [(String, String)]);

impl fmt::Display for PageFailures<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} page(s) failed to build", self.0.len())?;
        for (page, message) in self.0 {
            write!(f, "\n  {page}: {message}")?;
        }
        Ok(())
    }
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of HTML pages written.
    pub pages: usize,

    /// Number of posts loaded.
    pub posts: usize,

    /// Number of feed files written.
    pub feeds: usize,

    /// Number of public files copied.
    pub assets: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Where conformance data comes from.
enum Metrics {
    /// Derived from the configuration.
    Configured,
    /// Supplied by the caller.
    Injected(Box<dyn MetricsSource>),
}

/// Site builder that orchestrates the build process.
pub struct Builder {
    config: Config,
    resolver: PathResolver,
    styles: StyleRegistry,
    metrics: Metrics,
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .field("styles", &self.styles)
            .finish_non_exhaustive()
    }
}

impl Builder {
    /// Create a builder for `config` with the built-in style modules.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let resolver = config.resolver();
        Self {
            config,
            resolver,
            styles: StyleRegistry::new(),
            metrics: Metrics::Configured,
        }
    }

    /// Use a custom style registry.
    #[must_use]
    pub fn with_styles(mut self, styles: StyleRegistry) -> Self {
        self.styles = styles;
        self
    }

    /// Use `source` for conformance data instead of the configured repository.
    ///
    /// Ignored when metrics are disabled.
    #[must_use]
    pub fn with_metrics(mut self, source: impl MetricsSource + 'static) -> Self {
        self.metrics = Metrics::Injected(Box::new(source));
        self
    }

    /// Path resolver for this build.
    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Style registry shared by all pages of this build.
    #[must_use]
    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    /// Execute the full build process.
    pub fn build(&self) -> Result<BuildStats> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        info!(
            content = %self.resolver.content_root().display(),
            output = %self.resolver.output_root().display(),
            "starting build"
        );

        // A broken post aborts the build before the output is touched.
        let posts = PostCollection::load(self.resolver.content_root().join("blog"))?;
        stats.posts = posts.len();

        let configured;
        let metrics: Option<&dyn MetricsSource> = match (&self.metrics, self.config.metrics.enabled) {
            (_, false) => None,
            (Metrics::Injected(source), true) => Some(source.as_ref()),
            (Metrics::Configured, true) => {
                configured = GithubMetrics::new(self.config.metrics.clone())?;
                Some(&configured)
            }
        };

        let data = SiteData {
            config: &self.config,
            posts: &posts,
            metrics,
        };

        let jobs = PageJob::all(&data);
        self.check_outputs(&jobs)?;

        self.clean_output()?;

        let failed = self.generate_pages(&jobs, &data);
        stats.pages = jobs.len() - failed.len();

        stats.feeds = FeedGenerator::new(&self.config, &self.resolver).write(&posts)?;
        sitemap::write(&jobs, &self.resolver)?;
        stats.assets = copy_public(Path::new(&self.config.build.public_dir), self.resolver.output_root())?;

        stats.duration_ms = start.elapsed().as_millis() as u64;

        if !failed.is_empty() {
            return Err(BuildError::PagesFailed { failed });
        }

        info!(
            pages = stats.pages,
            posts = stats.posts,
            feeds = stats.feeds,
            assets = stats.assets,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Fail when two jobs map to the same output file.
    fn check_outputs(&self, jobs: &[PageJob<'_>]) -> Result<()> {
        let mut seen: HashMap<PathBuf, String> = HashMap::with_capacity(jobs.len());
        for job in jobs {
            let path = self.resolver.output_path(job.logical(&self.resolver), None);
            if let Some(first) = seen.insert(path.clone(), job.label()) {
                return Err(BuildError::OutputConflict {
                    path,
                    first,
                    second: job.label(),
                });
            }
        }
        Ok(())
    }

    /// Clean the output directory.
    fn clean_output(&self) -> Result<()> {
        let output = self.resolver.output_root();
        if output.exists() {
            debug!(dir = %output.display(), "cleaning output directory");
            fs::remove_dir_all(output)?;
        }
        fs::create_dir_all(output)?;
        Ok(())
    }

    /// Render and write every page in parallel. Returns the failures.
    fn generate_pages(&self, jobs: &[PageJob<'_>], data: &SiteData<'_>) -> Vec<(String, String)> {
        info!(count = jobs.len(), "generating HTML pages");

        jobs.par_iter()
            .filter_map(|job| match self.write_page(job, data) {
                Ok(()) => None,
                Err(e) => {
                    error!(page = %job.label(), error = %e, "failed to build page");
                    Some((job.label(), e.to_string()))
                }
            })
            .collect()
    }

    fn write_page(&self, job: &PageJob<'_>, data: &SiteData<'_>) -> std::result::Result<(), RenderError> {
        let html = render_page(job, data, &self.resolver, &self.styles)?;
        let output_path = self.resolver.output_path(job.logical(&self.resolver), None);

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;

        debug!(path = %output_path.display(), "wrote page");
        Ok(())
    }
}
