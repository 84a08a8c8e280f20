//! Blog feeds: RSS 2.0, Atom and JSON Feed 1.1.

use atom_syndication::{Entry, Feed, Link, Person, Text};
use chrono::{DateTime, Utc};
use rss::{ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use serde::Serialize;
use sitekit_core::{Config, PathResolver, PostRecord};
use sitekit_parser::MarkdownRenderer;
use thiserror::Error;
use tracing::debug;

use crate::{
    collector::PostCollection,
    template::{FEED_ATOM, FEED_JSON, FEED_RSS},
};

/// JSON Feed version URL.
const JSON_FEED_VERSION: &str = "https://jsonfeed.org/version/1.1";

/// Feed generation errors.
#[derive(Debug, Error)]
pub enum FeedError {
    /// JSON serialization failed.
    #[error("JSON feed error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

/// The three serialized feeds.
#[derive(Debug, Clone)]
pub struct Feeds {
    /// RSS 2.0 XML.
    pub rss: String,
    /// Atom XML.
    pub atom: String,
    /// JSON Feed document.
    pub json: String,
}

#[derive(Debug, Serialize)]
struct JsonFeed<'a> {
    version: &'static str,
    title: &'a str,
    home_page_url: String,
    feed_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    items: Vec<JsonFeedItem<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonFeedItem<'a> {
    id: String,
    url: String,
    title: &'a str,
    summary: &'a str,
    content_html: String,
    date_published: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    authors: Vec<JsonFeedAuthor<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonFeedAuthor<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

/// Builds feeds from the post collection.
#[derive(Debug)]
pub struct FeedGenerator<'a> {
    config: &'a Config,
    resolver: &'a PathResolver,
}

impl<'a> FeedGenerator<'a> {
    /// Create a generator.
    #[must_use]
    pub fn new(config: &'a Config, resolver: &'a PathResolver) -> Self {
        Self { config, resolver }
    }

    fn posts<'p>(&self, posts: &'p PostCollection) -> &'p [PostRecord] {
        posts.latest(self.config.feed.limit)
    }

    fn blog_url(&self) -> String {
        self.resolver
            .absolute_url(self.resolver.logical("blog/index"))
    }

    fn description(&self) -> &str {
        self.config
            .site
            .description
            .as_deref()
            .unwrap_or(&self.config.site.title)
    }

    /// Newest post date, or the epoch for an empty blog.
    fn updated(posts: &[PostRecord]) -> DateTime<Utc> {
        posts
            .first()
            .map_or(DateTime::<Utc>::default(), PostRecord::published_at)
    }

    /// Generate all three feeds.
    pub fn generate(&self, posts: &PostCollection) -> Result<Feeds> {
        Ok(Feeds {
            rss: self.rss(posts),
            atom: self.atom(posts),
            json: self.json(posts)?,
        })
    }

    /// RSS 2.0 channel.
    #[must_use]
    pub fn rss(&self, posts: &PostCollection) -> String {
        let posts = self.posts(posts);
        debug!(count = posts.len(), limit = self.config.feed.limit, "generating RSS feed");

        let items: Vec<Item> = posts.iter().map(|post| self.rss_item(post)).collect();

        let channel = ChannelBuilder::default()
            .title(self.config.site.title.as_str())
            .link(self.blog_url())
            .description(self.description())
            .language(Some("en".to_string()))
            .last_build_date(Some(Self::updated(posts).to_rfc2822()))
            .items(items)
            .build();

        channel.to_string()
    }

    fn rss_item(&self, post: &PostRecord) -> Item {
        let url = self.resolver.absolute_url(&post.id);
        let guid = GuidBuilder::default().value(url.as_str()).permalink(true).build();

        let mut builder = ItemBuilder::default();
        builder.title(Some(post.meta.title.clone()));
        builder.link(Some(url));
        builder.guid(Some(guid));
        builder.pub_date(Some(post.published_at().to_rfc2822()));
        builder.description(Some(post.meta.description.clone()));

        if !post.meta.authors.is_empty() {
            let names: Vec<_> = post.meta.authors.iter().map(|a| a.name.as_str()).collect();
            builder.author(Some(names.join(", ")));
        }

        builder.build()
    }

    /// Atom feed.
    #[must_use]
    pub fn atom(&self, posts: &PostCollection) -> String {
        let posts = self.posts(posts);
        debug!(count = posts.len(), "generating Atom feed");

        let mut feed = Feed::default();
        feed.set_title(self.config.site.title.as_str());
        feed.set_subtitle(Text::plain(self.description()));
        feed.set_id(self.blog_url());
        feed.set_updated(Self::updated(posts));
        feed.set_links(vec![
            Link {
                href: self.resolver.asset_url(FEED_ATOM),
                rel: "self".to_string(),
                mime_type: Some("application/atom+xml".to_string()),
                ..Link::default()
            },
            Link {
                href: self.blog_url(),
                rel: "alternate".to_string(),
                mime_type: Some("text/html".to_string()),
                ..Link::default()
            },
        ]);
        if let Some(author) = &self.config.site.author {
            feed.set_authors(vec![Person {
                name: author.clone(),
                ..Person::default()
            }]);
        }

        let entries: Vec<Entry> = posts.iter().map(|post| self.atom_entry(post)).collect();
        feed.set_entries(entries);
        feed.to_string()
    }

    fn atom_entry(&self, post: &PostRecord) -> Entry {
        let url = self.resolver.absolute_url(&post.id);
        let published = post.published_at();

        let mut entry = Entry::default();
        entry.set_title(post.meta.title.as_str());
        entry.set_id(url.clone());
        entry.set_links(vec![Link {
            href: url,
            rel: "alternate".to_string(),
            mime_type: Some("text/html".to_string()),
            ..Link::default()
        }]);
        entry.set_summary(Text::plain(post.meta.description.as_str()));
        entry.set_published(Some(published.into()));
        entry.set_updated(published);
        entry.set_authors(
            post.meta
                .authors
                .iter()
                .map(|author| Person {
                    name: author.name.clone(),
                    uri: author.url.clone(),
                    ..Person::default()
                })
                .collect::<Vec<_>>(),
        );
        entry
    }

    /// JSON Feed 1.1 document.
    pub fn json(&self, posts: &PostCollection) -> Result<String> {
        let posts = self.posts(posts);
        debug!(count = posts.len(), "generating JSON feed");
        let renderer = MarkdownRenderer::new();

        let items = posts
            .iter()
            .map(|post| {
                let url = self.resolver.absolute_url(&post.id);
                JsonFeedItem {
                    id: url.clone(),
                    url,
                    title: &post.meta.title,
                    summary: &post.meta.description,
                    content_html: renderer.render_html(&post.body),
                    date_published: post.published_at().to_rfc3339(),
                    authors: post
                        .meta
                        .authors
                        .iter()
                        .map(|a| JsonFeedAuthor {
                            name: &a.name,
                            url: a.url.as_deref(),
                        })
                        .collect(),
                }
            })
            .collect();

        let feed = JsonFeed {
            version: JSON_FEED_VERSION,
            title: &self.config.site.title,
            home_page_url: self.blog_url(),
            feed_url: self.resolver.asset_url(FEED_JSON),
            description: self.config.site.description.as_deref(),
            items,
        };

        Ok(serde_json::to_string_pretty(&feed)?)
    }

    /// Write the feeds under the output root.
    pub fn write(&self, posts: &PostCollection) -> Result<usize> {
        let feeds = self.generate(posts)?;
        let out = self.resolver.output_root();

        for (path, body) in [(FEED_RSS, &feeds.rss), (FEED_ATOM, &feeds.atom), (FEED_JSON, &feeds.json)] {
            let target = out.join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, body)?;
            debug!(path = %target.display(), "feed written");
        }

        Ok(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;

    fn posts() -> PostCollection {
        PostCollection::from_posts(vec![
            PostRecord::parse(
                "content/blog/first.md",
                "---\ntitle: First & Best\ndescription: The first\ndate: 2024-01-01\nauthors: [{name: Ann, url: 'https://ann.dev'}]\n---\nHello *there*\n",
            )
            .unwrap(),
            PostRecord::parse(
                "content/blog/second.md",
                "---\ntitle: Second\ndescription: The second\ndate: 2024-02-01\n---\nMore\n",
            )
            .unwrap(),
        ])
    }

    #[test]
    fn test_rss() {
        let config = test_config();
        let resolver = config.resolver();
        let xml = FeedGenerator::new(&config, &resolver).rss(&posts());

        assert!(xml.contains("<title>Test Site</title>"));
        assert!(xml.contains("<link>https://example.com/blog/</link>"));
        assert!(xml.contains("<link>https://example.com/blog/first</link>"));
        assert!(xml.contains("First &amp; Best"));
        assert!(xml.contains("Mon, 1 Jan 2024 00:00:00 +0000"));
        assert!(xml.find("Second").unwrap() < xml.find("First").unwrap());
    }

    #[test]
    fn test_feed_limit() {
        let mut config = test_config();
        config.feed.limit = 1;
        let resolver = config.resolver();
        let xml = FeedGenerator::new(&config, &resolver).rss(&posts());

        assert!(xml.contains("Second"));
        assert!(!xml.contains("First"));
    }

    #[test]
    fn test_atom() {
        let config = test_config();
        let resolver = config.resolver();
        let xml = FeedGenerator::new(&config, &resolver).atom(&posts());

        assert!(xml.contains("<feed"));
        assert!(xml.contains("<id>https://example.com/blog/first</id>"));
        assert!(xml.contains("2024-02-01T00:00:00+00:00"));
        assert!(xml.contains("<name>Ann</name>"));
        assert!(xml.contains("href=\"https://example.com/blog/feed.atom\""));
    }

    #[test]
    fn test_atom_entry_author() {
        let config = test_config();
        let resolver = config.resolver();
        let entry = FeedGenerator::new(&config, &resolver).atom_entry(posts().iter().nth(1).unwrap());

        let author = &entry.authors()[0];
        assert_eq!(author.name(), "Ann");
        assert_eq!(author.uri(), Some("https://ann.dev"));
        assert_eq!(author.email(), None);
    }

    #[test]
    fn test_json_feed() {
        let config = test_config();
        let resolver = config.resolver();
        let json = FeedGenerator::new(&config, &resolver).json(&posts()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], JSON_FEED_VERSION);
        assert_eq!(value["feed_url"], "https://example.com/blog/feed.json");
        assert_eq!(value["items"][0]["title"], "Second");
        assert_eq!(value["items"][1]["url"], "https://example.com/blog/first");
        assert_eq!(value["items"][1]["date_published"], "2024-01-01T00:00:00+00:00");
        assert_eq!(value["items"][1]["authors"][0]["url"], "https://ann.dev");
        assert!(value["items"][1]["content_html"].as_str().unwrap().contains("<em>there</em>"));
        assert!(value["items"][0].get("authors").is_none());
    }

    #[test]
    fn test_empty_blog() {
        let config = test_config();
        let resolver = config.resolver();
        let feeds = FeedGenerator::new(&config, &resolver)
            .generate(&PostCollection::default())
            .unwrap();

        assert!(feeds.rss.contains("<channel>"));
        assert!(feeds.atom.contains("1970-01-01T00:00:00+00:00"));
        assert!(feeds.json.contains("\"items\": []"));
    }

    #[test]
    fn test_write_feeds() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.build.output_dir = dir.path().display().to_string();
        let resolver = config.resolver();

        let written = FeedGenerator::new(&config, &resolver).write(&posts()).unwrap();

        assert_eq!(written, 3);
        assert!(dir.path().join("blog/feed.rss").exists());
        assert!(dir.path().join("blog/feed.atom").exists());
        assert!(dir.path().join("blog/feed.json").exists());
    }
}
