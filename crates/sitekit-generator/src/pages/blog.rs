//! Blog index and post pages.

use sitekit_core::PostRecord;
use sitekit_parser::MarkdownRenderer;

use super::{PageContent, SiteData};
use crate::{
    components::{byline, post_card},
    node::{el, raw},
    render::{RenderContext, Result},
};

pub(super) fn render_index(ctx: &mut RenderContext<'_>, data: &SiteData<'_>) -> Result<PageContent> {
    let css = ctx.classes("blog.module.css")?;

    let mut cards = Vec::with_capacity(data.posts.len());
    for post in data.posts {
        cards.push(post_card(ctx, post)?);
    }

    let list = if cards.is_empty() {
        el("p").text("No posts yet.")
    } else {
        el("ul").class(css.get("list")).children(cards)
    };

    let body = el("section")
        .child(el("h1").class(css.get("heading")).text("Blog"))
        .child(list);

    Ok(PageContent::website(
        "Blog",
        format!("News and articles from {}", ctx.site().title),
        body.into(),
    ))
}

pub(super) fn render_post(ctx: &mut RenderContext<'_>, post: &PostRecord) -> Result<PageContent> {
    let css = ctx.classes("post.module.css")?;
    let prose = ctx.classes("prose.module.css")?;
    let meta = &post.meta;

    let html = MarkdownRenderer::new().render_html(&post.body);
    let byline = byline(ctx, post.date(), &meta.authors)?;
    let resolver = ctx.resolver();

    let body = el("article")
        .class(css.get("article"))
        .child(
            el("header")
                .class(css.get("header"))
                .child(el("h1").class(css.get("title")).text(meta.title.as_str()))
                .child(el("div").class(css.get("meta")).child(byline)),
        )
        .child(el("div").class(prose.get("prose")).child(raw(html)))
        .child(
            el("a")
                .class(css.get("back"))
                .attr("href", resolver.href(resolver.logical("blog/index")))
                .text("Back to the blog"),
        );

    let authors = meta
        .authors
        .iter()
        .map(|a| a.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(PageContent {
        title: meta.title.clone(),
        description: meta.description.clone(),
        og_type: "article",
        author: (!authors.is_empty()).then_some(authors),
        body: body.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collector::PostCollection, styles::StyleRegistry, test_support::test_config};

    fn post(name: &str, title: &str, date: &str, authors: &str) -> PostRecord {
        PostRecord::parse(
            format!("content/blog/{name}.md"),
            &format!(
                "---\ntitle: {title}\ndescription: About {title}\ndate: {date}\nauthors: {authors}\n---\n# Heading\n\nSome *text*.\n"
            ),
        )
        .unwrap()
    }

    #[test]
    fn test_index_lists_posts_newest_first() {
        let config = test_config();
        let resolver = config.resolver();
        let styles = StyleRegistry::new();
        let posts = PostCollection::from_posts(vec![
            post("old", "Old", "2023-01-01", "[]"),
            post("new", "New", "2024-02-03", "[{name: Ann}]"),
        ]);
        let data = SiteData {
            config: &config,
            posts: &posts,
            metrics: None,
        };
        let mut ctx = RenderContext::new(&config, &resolver, &styles);

        let html = render_index(&mut ctx, &data).unwrap().body.render();

        let new = html.find(">New</a>").unwrap();
        let old = html.find(">Old</a>").unwrap();
        assert!(new < old);
        assert!(html.contains("href=\"/blog/new\""));
        assert!(html.contains(r#"<time datetime="2024-02-03">February 3, 2024</time>"#));
        assert!(html.contains("About New"));
        assert!(html.contains(">Ann</span>"));
    }

    #[test]
    fn test_index_without_posts() {
        let config = test_config();
        let resolver = config.resolver();
        let styles = StyleRegistry::new();
        let posts = PostCollection::default();
        let data = SiteData {
            config: &config,
            posts: &posts,
            metrics: None,
        };
        let mut ctx = RenderContext::new(&config, &resolver, &styles);

        let html = render_index(&mut ctx, &data).unwrap().body.render();
        assert!(html.contains("No posts yet."));
    }

    #[test]
    fn test_post_page() {
        let config = test_config();
        let resolver = config.resolver();
        let styles = StyleRegistry::new();
        let mut ctx = RenderContext::new(&config, &resolver, &styles);

        let content = render_post(
            &mut ctx,
            &post("hello", "Hello", "2024-01-01", "[{name: Ann, url: 'https://ann.dev'}, {name: Bob}]"),
        )
        .unwrap();
        let html = content.body.render();

        assert_eq!(content.title, "Hello");
        assert_eq!(content.og_type, "article");
        assert_eq!(content.author.as_deref(), Some("Ann, Bob"));
        assert!(html.contains("<h1 id=\"heading\">Heading</h1>"));
        assert!(html.contains("<em>text</em>"));
        assert!(html.contains("href=\"https://ann.dev\""));
        assert!(ctx.used_styles().iter().any(|s| s == "prose.module.css"));
    }
}
