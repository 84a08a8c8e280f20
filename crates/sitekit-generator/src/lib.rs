//! sitekit Generator Library
//!
//! Page rendering, feeds and build orchestration for the project website.
//!
//! # Modules
//!
//! - [`collector`] - File walking and post loading
//! - [`styles`] - CSS module registry shared across page builds
//! - [`node`] - Minimal HTML tree used by the page renderers
//! - [`template`] - Document shell with variable interpolation
//! - [`render`] - Per-page render context
//! - [`components`] - Layout, bylines and post cards
//! - [`pages`] - Home, blog, talks, contributing and conformance pages
//! - [`metrics`] - test262 conformance history
//! - [`feed`] - RSS, Atom and JSON feeds
//! - [`sitemap`] - XML sitemap generation
//! - [`assets`] - Public file copying
//! - [`build`] - Build orchestration

pub mod assets;
pub mod build;
pub mod collector;
pub mod components;
pub mod feed;
pub mod metrics;
pub mod node;
pub mod pages;
pub mod render;
pub mod sitemap;
pub mod styles;
pub mod template;

pub use build::{BuildError, BuildStats, Builder};
pub use collector::{FileWalker, PostCollection, PostLoader};
pub use feed::{FeedGenerator, Feeds};
pub use metrics::{GithubMetrics, MetricsSource, StaticMetrics};
pub use pages::{PageJob, SiteData, render_page};
pub use render::RenderContext;
pub use styles::StyleRegistry;
pub use template::{Template, TemplateContext};
