//! Shared page components.

use chrono::NaiveDate;
use sitekit_core::{Author, PostRecord};

use crate::{
    node::{Node, el, fragment, text},
    render::{RenderContext, Result},
    template::{FEED_ATOM, FEED_JSON, FEED_RSS},
};

/// Navigation entries: label and logical path relative to the content root.
const NAV: &[(&str, &str)] = &[
    ("Blog", "blog/index"),
    ("Talks", "talks"),
    ("Contributing", "contributing"),
    ("Conformance", "conformance"),
];

/// Wrap a page body in the site header, navigation and footer.
pub fn layout(ctx: &mut RenderContext<'_>, body: Node) -> Result<Node> {
    let css = ctx.classes("layout.module.css")?;
    let resolver = ctx.resolver();
    let site = ctx.site();
    let metrics_enabled = ctx.config().metrics.enabled;

    let links = NAV
        .iter()
        .filter(|(_, path)| metrics_enabled || *path != "conformance")
        .map(|(label, path)| {
            el("a")
                .class(css.get("navLink"))
                .attr("href", resolver.href(resolver.logical(path)))
                .text(*label)
        });

    let mut nav = el("nav").class(css.get("nav")).children(links);
    if let Some(repo) = &site.repository {
        nav = nav.child(
            el("a")
                .class(css.get("navLink"))
                .attr("href", repo.as_str())
                .text("GitHub"),
        );
    }

    let header = el("header")
        .class(css.get("header"))
        .child(
            el("a")
                .class(css.get("brand"))
                .attr("href", resolver.href(resolver.logical("index")))
                .text(site.title.as_str()),
        )
        .child(nav);

    let feeds = [("RSS", FEED_RSS), ("Atom", FEED_ATOM), ("JSON Feed", FEED_JSON)]
        .into_iter()
        .map(|(label, path)| el("li").child(el("a").attr("href", resolver.asset_href(path)).text(label)));

    let footer = el("footer")
        .class(css.get("footer"))
        .child(el("ul").class(css.get("footerLinks")).children(feeds));

    Ok(el("div")
        .class(css.get("page"))
        .child(header)
        .child(el("main").class(css.get("main")).child(body))
        .child(footer)
        .into())
}

/// Authors as a comma-separated list of names, linked when a URL is known.
pub fn author_list(ctx: &mut RenderContext<'_>, authors: &[Author]) -> Result<Node> {
    let css = ctx.classes("authors.module.css")?;

    let mut items = Vec::with_capacity(authors.len() * 2);
    for (i, author) in authors.iter().enumerate() {
        if i > 0 {
            items.push(text(", "));
        }
        let item = match &author.url {
            Some(url) => el("a").attr("href", url.as_str()),
            None => el("span"),
        };
        items.push(item.class(css.get("author")).text(author.name.as_str()).into());
    }

    Ok(el("span").class(css.get("authors")).children(items).into())
}

/// `<time>` element with a machine-readable date and a long display form.
#[must_use]
pub fn date_time(date: NaiveDate) -> Node {
    el("time")
        .attr("datetime", date.format("%Y-%m-%d").to_string())
        .text(date.format("%B %-d, %Y").to_string())
        .into()
}

/// Byline: date followed by the authors, if any.
pub fn byline(ctx: &mut RenderContext<'_>, date: NaiveDate, authors: &[Author]) -> Result<Node> {
    let mut nodes = vec![date_time(date)];
    if !authors.is_empty() {
        nodes.push(text(" by "));
        nodes.push(author_list(ctx, authors)?);
    }
    Ok(fragment(nodes))
}

/// Summary card linking to a post.
pub fn post_card(ctx: &mut RenderContext<'_>, post: &PostRecord) -> Result<Node> {
    let css = ctx.classes("blog.module.css")?;
    let href = ctx.resolver().href(&post.id);
    let byline = byline(ctx, post.date(), &post.meta.authors)?;

    Ok(el("li")
        .class(css.get("item"))
        .child(
            el("article")
                .child(
                    el("h2")
                        .class(css.get("title"))
                        .child(el("a").attr("href", href).text(post.meta.title.as_str())),
                )
                .child(el("div").class(css.get("meta")).child(byline))
                .child(
                    el("p")
                        .class(css.get("description"))
                        .text(post.meta.description.as_str()),
                ),
        )
        .into())
}
