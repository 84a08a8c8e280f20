//! Page definitions.
//!
//! Every page of the site is a [`PageJob`]. A job knows its logical path and
//! renders its body; [`render_page`] wraps the body in the shared layout and
//! the document shell.

mod blog;
mod conformance;
mod contributing;
mod home;
mod talks;

use std::path::PathBuf;

use sitekit_core::{Config, PathResolver, PostRecord};
use tracing::debug;

pub use conformance::chart;
pub use contributing::load_contributing;

use crate::{
    collector::PostCollection,
    components::layout,
    metrics::MetricsSource,
    node::Node,
    render::{RenderContext, Result},
    styles::StyleRegistry,
    template::Document,
};

/// Build-wide inputs shared by all pages.
#[derive(Clone, Copy)]
pub struct SiteData<'a> {
    /// Site configuration.
    pub config: &'a Config,
    /// All posts, newest first.
    pub posts: &'a PostCollection,
    /// Conformance data source; `None` when metrics are disabled.
    pub metrics: Option<&'a dyn MetricsSource>,
}

/// One page to build.
#[derive(Debug, Clone, Copy)]
pub enum PageJob<'a> {
    /// Landing page.
    Home,
    /// List of all posts.
    BlogIndex,
    /// A single post.
    Post(&'a PostRecord),
    /// Conference talks.
    Talks,
    /// Contributing guide.
    Contributing,
    /// test262 conformance chart.
    Conformance,
}

/// Rendered body plus head metadata.
#[derive(Debug)]
pub struct PageContent {
    /// Page title.
    pub title: String,
    /// Meta description.
    pub description: String,
    /// Open Graph type.
    pub og_type: &'static str,
    /// Author names for the head.
    pub author: Option<String>,
    /// Body inside the layout.
    pub body: Node,
}

impl PageContent {
    fn website(title: impl Into<String>, description: impl Into<String>, body: Node) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            og_type: "website",
            author: None,
            body,
        }
    }
}

impl<'a> PageJob<'a> {
    /// Jobs for every page of the site.
    #[must_use]
    pub fn all(data: &SiteData<'a>) -> Vec<Self> {
        let mut jobs = vec![Self::Home, Self::BlogIndex, Self::Talks, Self::Contributing];
        if data.metrics.is_some() {
            jobs.push(Self::Conformance);
        }
        jobs.extend(data.posts.iter().map(Self::Post));
        jobs
    }

    /// Logical path of the page.
    #[must_use]
    pub fn logical(&self, resolver: &PathResolver) -> PathBuf {
        match self {
            Self::Home => resolver.logical("index"),
            Self::BlogIndex => resolver.logical("blog/index"),
            Self::Post(post) => post.id.clone(),
            Self::Talks => resolver.logical("talks"),
            Self::Contributing => resolver.logical("contributing"),
            Self::Conformance => resolver.logical("conformance"),
        }
    }

    /// Short label for logs and error reports.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Home => "home".to_string(),
            Self::BlogIndex => "blog index".to_string(),
            Self::Post(post) => format!("post {}", post.id.display()),
            Self::Talks => "talks".to_string(),
            Self::Contributing => "contributing".to_string(),
            Self::Conformance => "conformance".to_string(),
        }
    }

    /// Render the page body.
    pub fn content(&self, ctx: &mut RenderContext<'_>, data: &SiteData<'_>) -> Result<PageContent> {
        match self {
            Self::Home => home::render(ctx, data),
            Self::BlogIndex => blog::render_index(ctx, data),
            Self::Post(post) => blog::render_post(ctx, post),
            Self::Talks => talks::render(ctx),
            Self::Contributing => contributing::render(ctx, data),
            Self::Conformance => conformance::render(ctx, data),
        }
    }
}

/// Render a complete HTML document for `job`.
pub fn render_page(
    job: &PageJob<'_>,
    data: &SiteData<'_>,
    resolver: &PathResolver,
    styles: &StyleRegistry,
) -> Result<String> {
    let mut ctx = RenderContext::new(data.config, resolver, styles);
    let content = job.content(&mut ctx, data)?;
    let body = layout(&mut ctx, content.body)?;
    debug!(page = %job.label(), styles = ?ctx.used_styles(), "page rendered");

    let logical = job.logical(resolver);
    let description = if content.description.is_empty() {
        data.config.site.description.clone().unwrap_or_default()
    } else {
        content.description
    };

    let document = Document {
        title: &content.title,
        description: &description,
        og_type: content.og_type,
        url: resolver.absolute_url(&logical),
        canonical: true,
        author: content.author.or_else(|| data.config.site.author.clone()),
        styles: ctx.stylesheet(),
        body: body.render(),
    };

    Ok(document.render(&data.config.site.title, resolver)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metrics::StaticMetrics, test_support::test_config};

    #[test]
    fn test_job_paths() {
        let config = test_config();
        let resolver = config.resolver();

        assert_eq!(
            resolver.output_path(PageJob::Home.logical(&resolver), None),
            PathBuf::from("dist/index.html")
        );
        assert_eq!(
            resolver.output_path(PageJob::BlogIndex.logical(&resolver), None),
            PathBuf::from("dist/blog/index.html")
        );
        assert_eq!(resolver.href(PageJob::Talks.logical(&resolver)), "/talks");
    }

    #[test]
    fn test_all_jobs() {
        let config = test_config();
        let posts = PostCollection::from_posts(vec![
            PostRecord::parse(
                "content/blog/a.md",
                "---\ntitle: A\ndescription: d\ndate: 2024-01-01\n---\n",
            )
            .unwrap(),
        ]);
        let metrics = StaticMetrics::new(Vec::new());

        let without = SiteData {
            config: &config,
            posts: &posts,
            metrics: None,
        };
        assert_eq!(PageJob::all(&without).len(), 5);

        let with = SiteData {
            metrics: Some(&metrics),
            ..without
        };
        let jobs = PageJob::all(&with);
        assert_eq!(jobs.len(), 6);
        assert!(jobs.iter().any(|job| matches!(job, PageJob::Conformance)));
    }

    #[test]
    fn test_styles_inlined_per_page() {
        let config = test_config();
        let resolver = config.resolver();
        let styles = StyleRegistry::new();
        let posts = PostCollection::default();
        let data = SiteData {
            config: &config,
            posts: &posts,
            metrics: None,
        };

        let talks_html = render_page(&PageJob::Talks, &data, &resolver, &styles).unwrap();
        let blog_html = render_page(&PageJob::BlogIndex, &data, &resolver, &styles).unwrap();

        let layout_page = styles.register("layout.module.css").unwrap()["page"].clone();
        let blog_list = styles.register("blog.module.css").unwrap()["list"].clone();

        assert!(talks_html.contains(&format!(".{layout_page}")));
        assert!(!talks_html.contains(&format!(".{blog_list}")));
        assert!(blog_html.contains(&format!(".{blog_list}")));
    }
}
