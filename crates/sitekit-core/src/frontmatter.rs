//! Front matter parsing for Markdown posts.
//!
//! Posts open with a YAML block between two `---` lines:
//!
//! ```markdown
//! ---
//! title: "Boa release v0.19"
//! description: "Highlights of the release"
//! date: 2024-07-11
//! authors:
//!   - name: Boa Developers
//!     url: https://github.com/boa-dev
//! ---
//!
//! Body text.
//! ```

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    content::Author,
    error::{CoreError, Result},
};

/// Front matter delimiter line.
pub const DELIMITER: &str = "---";

/// Metadata block of a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMeta {
    /// Post title (required).
    pub title: String,

    /// Summary shown in listings, feeds and meta tags (required).
    pub description: String,

    /// Publication date as a pure calendar date (required).
    #[serde(with = "calendar_date")]
    pub date: NaiveDate,

    /// Authors in display order.
    #[serde(default)]
    pub authors: Vec<Author>,
}

/// Split content into the raw front matter block and the body.
///
/// Returns `None` when the content does not open with a delimited block.
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let content = content.trim_start_matches('\u{feff}');
    let rest = content
        .strip_prefix(DELIMITER)?
        .strip_prefix('\n')
        .or_else(|| content.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let frontmatter = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\r', '\n']);
            return Some((frontmatter, body));
        }
        offset += line.len();
    }

    None
}

/// Parse a post into its metadata and Markdown body.
///
/// Any problem is reported as a front matter error naming `path`.
pub fn parse_post(content: &str, path: &Path) -> Result<(PostMeta, String)> {
    let Some((raw, body)) = split_frontmatter(content) else {
        return Err(CoreError::frontmatter(
            path,
            "missing front matter block delimited by `---`",
        ));
    };

    let meta: PostMeta =
        serde_yaml::from_str(raw).map_err(|e| CoreError::frontmatter(path, e.to_string()))?;
    meta.validate(path)?;

    Ok((meta, body.to_string()))
}

impl PostMeta {
    /// Reject metadata that parsed but carries empty required values.
    pub fn validate(&self, path: &Path) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(CoreError::frontmatter(path, "title is required"));
        }
        if let Some(author) = self.authors.iter().find(|a| a.name.trim().is_empty()) {
            return Err(CoreError::frontmatter(
                path,
                format!("author name is required (url: {:?})", author.url),
            ));
        }
        Ok(())
    }
}

/// Parse a date given as `YYYY-MM-DD`, an RFC 3339 timestamp, or
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC). Timestamps keep their UTC date.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc).date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Serde adapter storing a [`NaiveDate`] as `YYYY-MM-DD`.
pub mod calendar_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw).ok_or_else(|| {
            D::Error::custom(format!(
                "invalid date `{raw}`: expected YYYY-MM-DD or an RFC 3339 timestamp"
            ))
        })
    }
}
