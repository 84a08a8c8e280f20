//! XML sitemap generation.

use std::fmt::Write;

use chrono::NaiveDate;
use sitekit_core::PathResolver;
use thiserror::Error;
use tracing::debug;

use crate::pages::PageJob;

/// Sitemap generation errors.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sitemap operations.
pub type Result<T> = std::result::Result<T, SitemapError>;

/// Change frequency for sitemap entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ChangeFreq {
    fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    /// Absolute URL.
    pub loc: String,

    /// Last modification date.
    pub lastmod: Option<NaiveDate>,

    /// Change frequency.
    pub changefreq: ChangeFreq,

    /// Priority (0.0 to 1.0).
    pub priority: f32,
}

impl SitemapUrl {
    /// Entry for a page of the site.
    #[must_use]
    pub fn for_page(job: &PageJob<'_>, resolver: &PathResolver) -> Self {
        let (lastmod, changefreq, priority) = match job {
            PageJob::Home => (None, ChangeFreq::Daily, 1.0),
            PageJob::BlogIndex => (None, ChangeFreq::Weekly, 0.9),
            PageJob::Post(post) => (Some(post.date()), ChangeFreq::Monthly, 0.8),
            PageJob::Conformance => (None, ChangeFreq::Daily, 0.6),
            PageJob::Talks | PageJob::Contributing => (None, ChangeFreq::Monthly, 0.5),
        };

        Self {
            loc: resolver.absolute_url(job.logical(resolver)),
            lastmod,
            changefreq,
            priority,
        }
    }
}

/// Render a `urlset` document.
#[must_use]
pub fn generate(urls: &[SitemapUrl]) -> String {
    debug!(count = urls.len(), "generating sitemap");

    let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
    xml.push('\n');

    for url in urls {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape_xml(&url.loc));
        if let Some(lastmod) = url.lastmod {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", lastmod.format("%Y-%m-%d"));
        }
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", url.changefreq.as_str());
        let _ = writeln!(xml, "    <priority>{:.1}</priority>", url.priority);
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Write `sitemap.xml` for `jobs` under the output root.
pub fn write(jobs: &[PageJob<'_>], resolver: &PathResolver) -> Result<()> {
    let urls: Vec<_> = jobs
        .iter()
        .map(|job| SitemapUrl::for_page(job, resolver))
        .collect();
    let path = resolver.output_root().join("sitemap.xml");
    std::fs::create_dir_all(resolver.output_root())?;
    std::fs::write(&path, generate(&urls))?;
    debug!(path = %path.display(), "sitemap written");
    Ok(())
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use sitekit_core::PostRecord;

    use super::*;

    #[test]
    fn test_generate_sitemap() {
        let resolver = PathResolver::new("content", "dist", "", "https://example.com");
        let post = PostRecord::parse(
            "content/blog/hello.md",
            "---\ntitle: Hello\ndescription: d\ndate: 2024-05-06\n---\n",
        )
        .unwrap();
        let urls: Vec<_> = [PageJob::Home, PageJob::BlogIndex, PageJob::Post(&post)]
            .iter()
            .map(|job| SitemapUrl::for_page(job, &resolver))
            .collect();

        let xml = generate(&urls);

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("<loc>https://example.com/</loc>"));
        assert!(xml.contains("<loc>https://example.com/blog/</loc>"));
        assert!(xml.contains("<loc>https://example.com/blog/hello</loc>"));
        assert!(xml.contains("<lastmod>2024-05-06</lastmod>"));
        assert!(xml.contains("<priority>1.0</priority>"));
        assert!(xml.contains("<changefreq>monthly</changefreq>"));
        assert_eq!(xml.matches("<url>").count(), 3);
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a&b<c>\"d'"), "a&amp;b&lt;c&gt;&quot;d&apos;");

        let xml = generate(&[SitemapUrl {
            loc: "https://example.com/?a=1&b=2".to_string(),
            lastmod: None,
            changefreq: ChangeFreq::Yearly,
            priority: 0.5,
        }]);
        assert!(xml.contains("<loc>https://example.com/?a=1&amp;b=2</loc>"));
        assert!(!xml.contains("<lastmod>"));
    }

    #[test]
    fn test_write_sitemap() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = PathResolver::new("content", dir.path(), "", "https://example.com");

        write(&[PageJob::Home, PageJob::Talks], &resolver).unwrap();

        let xml = std::fs::read_to_string(dir.path().join("sitemap.xml")).unwrap();
        assert!(xml.contains("<loc>https://example.com/talks</loc>"));
    }
}
