//! Content types: posts, talks and conformance snapshots.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{CoreError, Result},
    frontmatter::{PostMeta, calendar_date, parse_post},
};

/// A post author or talk speaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Display name.
    pub name: String,

    /// Profile link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Author {
    /// Create an author without a profile link.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }

    /// Attach a profile link.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A blog post loaded from a Markdown file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Logical path of the source file, e.g. `content/blog/hello.md`.
    pub id: PathBuf,

    /// Markdown body without the front matter block.
    pub body: String,

    /// Parsed metadata.
    pub meta: PostMeta,
}

impl PostRecord {
    /// Parse a post from its source text.
    pub fn parse(id: impl Into<PathBuf>, content: &str) -> Result<Self> {
        let id = id.into();
        let (meta, body) = parse_post(content, &id)?;
        Ok(Self { id, body, meta })
    }

    /// Publication date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.meta.date
    }

    /// Publication date at midnight UTC, for feeds.
    #[must_use]
    pub fn published_at(&self) -> DateTime<Utc> {
        self.meta.date.and_time(NaiveTime::default()).and_utc()
    }
}

/// A conference talk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    /// Talk title.
    pub title: String,

    /// Event the talk was given at.
    pub event: String,

    /// Date of the talk.
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,

    /// Short abstract.
    #[serde(default)]
    pub description: String,

    /// Speakers in display order.
    #[serde(default)]
    pub speakers: Vec<Author>,

    /// How the talk can be watched.
    pub media: TalkMedia,
}

/// Recording of a talk: an embeddable video or a plain link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TalkMedia {
    /// Video rendered in an iframe.
    Video {
        /// URL suitable for an iframe `src`.
        embed_url: String,
    },
    /// External page with an optional preview image.
    Link {
        /// Target URL.
        url: String,
        /// Preview image shown on the card.
        #[serde(default)]
        image: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct TalksFile {
    #[serde(default)]
    talk: Vec<Talk>,
}

/// Load talks from a TOML file of `[[talk]]` tables, newest first.
///
/// A missing file yields no talks.
pub fn load_talks(path: &Path) -> Result<Vec<Talk>> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no talks file");
        return Ok(Vec::new());
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| CoreError::data(path, e.to_string()))?;
    let file: TalksFile =
        toml::from_str(&content).map_err(|e| CoreError::data(path, e.to_string()))?;

    let mut talks = file.talk;
    talks.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));
    Ok(talks)
}

/// test262 result counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCounts {
    #[serde(default)]
    pub pass: u64,
    #[serde(default)]
    pub fail: u64,
    #[serde(default)]
    pub crash: u64,
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub timeout: u64,
    #[serde(default)]
    pub unresolved: u64,
}

impl ResultCounts {
    /// Outcome names paired with counts, in chart order.
    #[must_use]
    pub fn categories(&self) -> [(&'static str, u64); 6] {
        [
            ("pass", self.pass),
            ("fail", self.fail),
            ("crash", self.crash),
            ("skip", self.skip),
            ("timeout", self.timeout),
            ("unresolved", self.unresolved),
        ]
    }
}

/// test262 results at one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Commit hash.
    pub commit: String,

    /// First line of the commit message.
    pub message: String,

    /// Commit date.
    pub date: DateTime<Utc>,

    /// Results by outcome.
    pub counts: ResultCounts,

    /// Total number of tests.
    pub total: u64,
}

impl MetricsSnapshot {
    /// Passing share in percent.
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.counts.pass as f64 * 100.0 / self.total as f64
        }
    }
}
