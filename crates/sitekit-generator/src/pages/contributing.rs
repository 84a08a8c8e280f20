//! Contributing guide, rendered from a local file or a remote Markdown document.

use std::{fs, path::Path, time::Duration};

use sitekit_core::Config;
use sitekit_parser::MarkdownRenderer;
use tracing::info;

use super::{PageContent, SiteData};
use crate::{
    node::{el, raw},
    render::{RenderContext, RenderError, Result},
};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Read the contributing guide's Markdown from its configured source.
///
/// Returns the Markdown and, for remote sources, the base URL relative links
/// resolve against.
pub fn load_contributing(config: &Config) -> Result<(String, Option<String>)> {
    let source = config.contributing.source.as_str();

    if config.contributing_is_remote() {
        info!(url = source, "fetching contributing guide");
        let markdown = reqwest::blocking::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("sitekit/", env!("CARGO_PKG_VERSION")))
            .build()
            .and_then(|client| client.get(source).send())
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(|source_err| RenderError::Fetch {
                url: source.to_string(),
                source: source_err,
            })?;
        let base = source.rsplit_once('/').map(|(dir, _)| dir.to_string());
        return Ok((markdown, base));
    }

    let markdown = fs::read_to_string(source).map_err(|e| RenderError::Read {
        path: Path::new(source).to_path_buf(),
        source: e,
    })?;
    Ok((markdown, None))
}

pub(super) fn render(ctx: &mut RenderContext<'_>, _data: &SiteData<'_>) -> Result<PageContent> {
    let prose = ctx.classes("prose.module.css")?;
    let post = ctx.classes("post.module.css")?;

    let (markdown, link_base) = load_contributing(ctx.config())?;
    let renderer = match link_base {
        Some(base) => MarkdownRenderer::new().with_link_base(base),
        None => MarkdownRenderer::new(),
    };
    let rendered = renderer.render(&markdown);

    let body = el("article")
        .class(post.get("article"))
        .child(el("div").class(prose.get("prose")).child(raw(rendered.html)));

    let title = rendered
        .headings
        .iter()
        .find(|h| h.level == 1)
        .map_or_else(|| "Contributing".to_string(), |h| h.text.clone());

    Ok(PageContent::website(
        title,
        format!("How to contribute to {}", ctx.site().title),
        body.into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collector::PostCollection, styles::StyleRegistry, test_support::test_config};

    #[test]
    fn test_local_guide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CONTRIBUTING.md");
        fs::write(&path, "# How to help\n\nOpen a *pull request*.\n").unwrap();

        let mut config = test_config();
        config.contributing.source = path.display().to_string();
        let resolver = config.resolver();
        let styles = StyleRegistry::new();
        let posts = PostCollection::default();
        let data = SiteData {
            config: &config,
            posts: &posts,
            metrics: None,
        };
        let mut ctx = RenderContext::new(&config, &resolver, &styles);

        let content = render(&mut ctx, &data).unwrap();
        let html = content.body.render();

        assert_eq!(content.title, "How to help");
        assert!(html.contains("<em>pull request</em>"));
    }

    #[test]
    fn test_missing_local_guide() {
        let mut config = test_config();
        config.contributing.source = "/nonexistent/CONTRIBUTING.md".to_string();

        let err = load_contributing(&config).unwrap_err();
        assert!(matches!(err, RenderError::Read { .. }));
        assert!(err.to_string().contains("CONTRIBUTING.md"));
    }
}
