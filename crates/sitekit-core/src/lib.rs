//! sitekit Core Library
//!
//! Configuration, content data model, front matter parsing and path resolution
//! shared by the sitekit parser, generator and CLI.

pub mod config;
pub mod content;
pub mod error;
pub mod frontmatter;
pub mod paths;

pub use config::Config;
pub use content::{Author, MetricsSnapshot, PostRecord, ResultCounts, Talk, TalkMedia};
pub use error::{CoreError, Result};
pub use frontmatter::PostMeta;
pub use paths::PathResolver;
