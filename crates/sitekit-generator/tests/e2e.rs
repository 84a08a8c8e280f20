//! End-to-end tests for sitekit.
//!
//! These tests build small sites in temporary directories and check the
//! generated files.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{TimeZone, Utc};
use sitekit_core::{
    Config, MetricsSnapshot, ResultCounts,
    config::{BuildConfig, ContributingConfig, FeedConfig, MetricsConfig, SiteConfig},
};
use sitekit_generator::{BuildError, Builder, StaticMetrics};

struct TestSite {
    dir: tempfile::TempDir,
}

impl TestSite {
    fn new() -> Self {
        let site = Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        };
        site.write("content/contributing.md", "# Contributing\n\nOpen a pull request.\n");
        site
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(path, content).expect("write file");
    }

    fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).expect("read output")
    }

    fn config(&self) -> Config {
        let dir = |name: &str| self.path(name).display().to_string();
        Config {
            site: SiteConfig {
                title: "Engine".to_string(),
                origin: "https://engine.example".to_string(),
                base_path: String::new(),
                description: Some("A JavaScript engine".to_string()),
                author: None,
                repository: Some("https://github.com/example/engine".to_string()),
            },
            build: BuildConfig {
                content_dir: dir("content"),
                output_dir: dir("dist"),
                public_dir: dir("public"),
            },
            feed: FeedConfig::default(),
            metrics: MetricsConfig {
                enabled: false,
                ..MetricsConfig::default()
            },
            contributing: ContributingConfig {
                source: dir("content/contributing.md"),
            },
        }
    }
}

#[test]
fn test_blog_index_and_feed() {
    let site = TestSite::new();
    site.write(
        "content/blog/t.md",
        "---\ntitle: T\ndescription: A post\ndate: 2024-01-01\n---\n\nBody text.\n",
    );

    Builder::new(site.config()).build().expect("build succeeds");

    let index = site.read("dist/blog/index.html");
    assert!(index.contains(">T<"));
    assert!(index.contains(r#"datetime="2024-01-01""#));

    let rss = site.read("dist/blog/feed.rss");
    assert!(rss.contains("<title>T</title>"));
    assert!(rss.contains("https://engine.example/blog/t"));

    let json = site.read("dist/blog/feed.json");
    assert!(json.contains("\"title\": \"T\""));

    let sitemap = site.read("dist/sitemap.xml");
    assert!(sitemap.contains("<loc>https://engine.example/blog/t</loc>"));
}

#[test]
fn test_missing_title_fails_without_listing() {
    let site = TestSite::new();
    site.write(
        "content/blog/ok.md",
        "---\ntitle: Fine\ndescription: d\ndate: 2024-01-02\n---\n",
    );
    site.write("content/blog/broken.md", "---\ndescription: d\ndate: 2024-01-01\n---\n");

    let err = Builder::new(site.config()).build().expect_err("build fails");

    assert!(matches!(err, BuildError::Collector(_)));
    assert!(err.to_string().contains("broken.md"));
    assert!(!site.path("dist/blog/index.html").exists());
}

#[test]
fn test_site_without_blog_directory() {
    let site = TestSite::new();

    let stats = Builder::new(site.config()).build().expect("build succeeds");

    assert_eq!(stats.posts, 0);
    assert!(site.path("dist/index.html").exists());
    assert!(site.read("dist/blog/feed.rss").contains("<channel>"));
}

#[test]
fn test_blog_index_post_conflicts() {
    let site = TestSite::new();
    site.write(
        "content/blog/index.md",
        "---\ntitle: Index post\ndescription: d\ndate: 2024-01-01\n---\nShadow.\n",
    );

    let err = Builder::new(site.config()).build().expect_err("build fails");

    let message = err.to_string();
    assert!(matches!(err, BuildError::OutputConflict { .. }));
    assert!(message.contains("blog index"));
    assert!(message.contains("index.md"));
    assert!(!site.path("dist/blog/index.html").exists());
}

#[test]
fn test_malformed_talks_only_fails_talks_page() {
    let site = TestSite::new();
    site.write("content/talks.toml", "[[talk]\n");
    site.write(
        "content/blog/t.md",
        "---\ntitle: T\ndescription: A post\ndate: 2024-01-01\n---\n",
    );

    let err = Builder::new(site.config()).build().expect_err("build fails");

    match err {
        BuildError::PagesFailed { failed } => {
            let pages: Vec<_> = failed.iter().map(|(page, _)| page.as_str()).collect();
            assert_eq!(pages, vec!["talks"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(site.read("dist/blog/index.html").contains(">T<"));
    assert!(site.path("dist/blog/t.html").exists());
    assert!(site.path("dist/sitemap.xml").exists());
}

#[test]
fn test_posts_sorted_newest_first() {
    let site = TestSite::new();
    for (name, date) in [("old", "2023-05-01"), ("new", "2024-05-01"), ("mid", "2023-12-01")] {
        site.write(
            &format!("content/blog/{name}.md"),
            &format!("---\ntitle: Post {name}\ndescription: d\ndate: {date}\n---\n"),
        );
    }

    Builder::new(site.config()).build().expect("build succeeds");

    let index = site.read("dist/blog/index.html");
    let position = |title: &str| index.find(title).expect("title listed");
    assert!(position("Post new") < position("Post mid"));
    assert!(position("Post mid") < position("Post old"));
}

#[test]
fn test_conformance_page_and_styles() {
    let site = TestSite::new();
    let mut config = site.config();
    config.metrics.enabled = true;
    let snapshot = MetricsSnapshot {
        commit: "feedface00".to_string(),
        message: "Nightly run".to_string(),
        date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        counts: ResultCounts {
            pass: 3,
            fail: 1,
            ..ResultCounts::default()
        },
        total: 4,
    };

    Builder::new(config)
        .with_metrics(StaticMetrics::new(vec![snapshot]))
        .build()
        .expect("build succeeds");

    let page = site.read("dist/conformance.html");
    assert!(page.contains("75.00%"));
    assert!(page.contains("feedfac"));
    assert!(page.contains("<style>"));

    let home = site.read("dist/index.html");
    assert!(home.contains(r#"href="/conformance""#));
}

#[test]
fn test_base_path_prefixes_links() {
    let site = TestSite::new();
    let mut config = site.config();
    config.site.base_path = "/engine".to_string();

    Builder::new(config).build().expect("build succeeds");

    let home = site.read("dist/index.html");
    assert!(home.contains(r#"href="/engine/blog/""#));
    assert!(home.contains(r#"href="/engine/style.css""#));
}

#[test]
fn test_sample_site_config_loads() {
    let config_path = Path::new("../../site.toml");
    if !config_path.exists() {
        // Skip if running from different working directory
        return;
    }

    let config = Config::load(config_path).expect("Config should load");
    assert!(!config.site.title.is_empty());
    assert_eq!(config.build.content_dir, "content");
}
