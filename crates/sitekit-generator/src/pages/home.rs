//! Landing page.

use super::{PageContent, SiteData};
use crate::{
    components::post_card,
    node::{el, text},
    render::{RenderContext, Result},
};

/// Number of posts previewed on the landing page.
const LATEST_POSTS: usize = 3;

const FEATURES: &[(&str, &str)] = &[
    (
        "Written in Rust",
        "Memory safety and predictable performance, embeddable in any Rust application.",
    ),
    (
        "Standards conformance",
        "Tracked against the official test262 suite on every commit.",
    ),
    (
        "Open development",
        "Planning, reviews and releases happen in the open. Contributions are welcome.",
    ),
];

pub(super) fn render(ctx: &mut RenderContext<'_>, data: &SiteData<'_>) -> Result<PageContent> {
    let css = ctx.classes("home.module.css")?;
    let resolver = ctx.resolver();
    let site = ctx.site();
    let tagline = site.description.clone().unwrap_or_default();

    let mut actions = el("div").class(css.get("actions")).child(
        el("a")
            .class(css.get("primary"))
            .attr("href", resolver.href(resolver.logical("contributing")))
            .text("Get involved"),
    );
    if let Some(repo) = &site.repository {
        actions = actions.child(
            el("a")
                .class(css.get("button"))
                .attr("href", repo.as_str())
                .text("Source code"),
        );
    }

    let hero = el("section")
        .class(css.get("hero"))
        .child(el("h1").text(site.title.as_str()))
        .child(el("p").class(css.get("tagline")).text(tagline.as_str()))
        .child(actions);

    let features = el("ul")
        .class(css.get("features"))
        .children(FEATURES.iter().map(|(title, body)| {
            el("li")
                .class(css.get("feature"))
                .child(el("h3").text(*title))
                .child(el("p").text(*body))
        }));

    let latest = data.posts.latest(LATEST_POSTS);
    let mut cards = Vec::with_capacity(latest.len());
    for post in latest {
        cards.push(post_card(ctx, post)?);
    }
    let blog_css = ctx.classes("blog.module.css")?;

    let mut recent = el("section")
        .class(css.get("latest"))
        .child(el("h2").text("Latest posts"));
    recent = if cards.is_empty() {
        recent.child(el("p").child(text("No posts yet.")))
    } else {
        recent
            .child(el("ul").class(blog_css.get("list")).children(cards))
            .child(
                el("a")
                    .attr("href", resolver.href(resolver.logical("blog/index")))
                    .text("All posts"),
            )
    };

    let body = el("div").child(hero).child(features).child(recent);
    Ok(PageContent::website(site.title.as_str(), tagline, body.into()))
}
