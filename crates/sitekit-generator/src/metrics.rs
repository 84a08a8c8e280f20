//! test262 conformance history.
//!
//! Results are published as a JSON document in a GitHub repository, one
//! commit per run. [`GithubMetrics`] lists the commits that touched the
//! document and fetches the document at each of them.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, de::DeserializeOwned};
use sitekit_core::{MetricsSnapshot, ResultCounts, config::MetricsConfig};
use thiserror::Error;
use tracing::{debug, info};

const TIMEOUT_SECONDS: u64 = 30;
const USER_AGENT: &str = concat!("sitekit/", env!("CARGO_PKG_VERSION"));

/// Metrics fetch errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Request failed or returned an error status.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not the expected JSON.
    #[error("invalid response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Commit carried an unparseable date.
    #[error("invalid commit date {0:?}")]
    Date(String),
}

/// Result type for metrics operations.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Source of conformance snapshots.
pub trait MetricsSource: Send + Sync {
    /// Snapshots ordered by commit date, oldest first.
    fn fetch(&self) -> Result<Vec<MetricsSnapshot>>;
}

/// Pre-fetched snapshots.
#[derive(Debug, Clone, Default)]
pub struct StaticMetrics {
    snapshots: Vec<MetricsSnapshot>,
}

impl StaticMetrics {
    /// Wrap snapshots, sorting them oldest first.
    #[must_use]
    pub fn new(mut snapshots: Vec<MetricsSnapshot>) -> Self {
        snapshots.sort_by_key(|s| s.date);
        Self { snapshots }
    }
}

impl MetricsSource for StaticMetrics {
    fn fetch(&self) -> Result<Vec<MetricsSnapshot>> {
        Ok(self.snapshots.clone())
    }
}

/// Commit entry from the commits listing.
#[derive(Debug, Deserialize)]
struct CommitEntry {
    sha: String,
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
    committer: CommitSignature,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: String,
}

/// Results document stored at each commit.
#[derive(Debug, Deserialize)]
struct ResultsDocument {
    total: u64,
    #[serde(flatten)]
    counts: ResultCounts,
}

/// Commit metadata needed for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CommitInfo {
    sha: String,
    message: String,
    date: DateTime<Utc>,
}

/// Fetches conformance history from GitHub.
#[derive(Debug)]
pub struct GithubMetrics {
    http_client: reqwest::blocking::Client,
    config: MetricsConfig,
}

impl GithubMetrics {
    /// Create a client for the configured repository.
    pub fn new(config: MetricsConfig) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECONDS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|source| MetricsError::Http {
                url: config.api_url.clone(),
                source,
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn commits_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/commits?path={}&per_page={}",
            self.config.api_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            self.config.path,
            self.config.history
        )
    }

    fn results_url(&self, sha: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.config.raw_url.trim_end_matches('/'),
            self.config.owner,
            self.config.repo,
            sha,
            self.config.path.trim_start_matches('/')
        )
    }

    fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "fetching");
        let mut request = self.http_client.get(url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token.expose());
        }

        let http_err = |source: reqwest::Error| MetricsError::Http {
            url: url.to_string(),
            source,
        };
        let body = request
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(http_err)?;

        serde_json::from_str(&body).map_err(|source| MetricsError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl MetricsSource for GithubMetrics {
    fn fetch(&self) -> Result<Vec<MetricsSnapshot>> {
        let entries: Vec<CommitEntry> = self.fetch_json(&self.commits_url())?;
        let commits = entries
            .into_iter()
            .map(commit_info)
            .collect::<Result<Vec<_>>>()?;
        info!(commits = commits.len(), "fetching conformance results");

        let mut snapshots = commits
            .into_par_iter()
            .map(|commit| {
                let doc: ResultsDocument = self.fetch_json(&self.results_url(&commit.sha))?;
                Ok(snapshot(commit, doc))
            })
            .collect::<Result<Vec<_>>>()?;

        snapshots.sort_by_key(|s| s.date);
        Ok(snapshots)
    }
}

fn commit_info(entry: CommitEntry) -> Result<CommitInfo> {
    let date = DateTime::parse_from_rfc3339(&entry.commit.committer.date)
        .map_err(|_| MetricsError::Date(entry.commit.committer.date.clone()))?
        .with_timezone(&Utc);
    let message = entry
        .commit
        .message
        .lines()
        .next()
        .unwrap_or_default()
        .to_string();

    Ok(CommitInfo {
        sha: entry.sha,
        message,
        date,
    })
}

fn snapshot(commit: CommitInfo, doc: ResultsDocument) -> MetricsSnapshot {
    MetricsSnapshot {
        commit: commit.sha,
        message: commit.message,
        date: commit.date,
        counts: doc.counts,
        total: doc.total,
    }
}
