//! Conference talks.

use sitekit_core::{Talk, TalkMedia, content::load_talks};

use super::PageContent;
use crate::{
    components::{author_list, date_time},
    node::{Node, el, text},
    render::{Classes, RenderContext, Result},
};

/// Talks data file, relative to the content root.
pub(super) const TALKS_FILE: &str = "talks.toml";

pub(super) fn render(ctx: &mut RenderContext<'_>) -> Result<PageContent> {
    let talks = load_talks(&ctx.resolver().logical(TALKS_FILE))?;
    let css = ctx.classes("talks.module.css")?;

    let mut cards = Vec::with_capacity(talks.len());
    for talk in &talks {
        cards.push(talk_card(ctx, &css, talk)?);
    }

    let list: Node = if cards.is_empty() {
        el("p").text("No talks yet.").into()
    } else {
        el("ul").class(css.get("grid")).children(cards).into()
    };

    let body = el("section").child(el("h1").text("Talks")).child(list);
    Ok(PageContent::website(
        "Talks",
        "Conference talks and presentations",
        body.into(),
    ))
}

fn talk_card(ctx: &mut RenderContext<'_>, css: &Classes, talk: &Talk) -> Result<Node> {
    let media: Node = match &talk.media {
        TalkMedia::Video { embed_url } => el("div")
            .class(css.get("video"))
            .child(
                el("iframe")
                    .class(css.get("frame"))
                    .attr("src", embed_url.as_str())
                    .attr("title", talk.title.as_str())
                    .attr("loading", "lazy")
                    .attr("allowfullscreen", ""),
            )
            .into(),
        TalkMedia::Link { url, image } => {
            let inner: Node = match image {
                Some(src) => el("img")
                    .class(css.get("image"))
                    .attr("src", src.as_str())
                    .attr("alt", talk.title.as_str())
                    .attr("loading", "lazy")
                    .into(),
                None => text("Watch"),
            };
            el("a")
                .class(css.get("media"))
                .attr("href", url.as_str())
                .child(inner)
                .into()
        }
    };

    let mut meta = el("p")
        .class(css.get("event"))
        .text(format!("{}, ", talk.event))
        .child(date_time(talk.date));
    if !talk.speakers.is_empty() {
        meta = meta.text(" by ").child(author_list(ctx, &talk.speakers)?);
    }

    let mut info = el("div")
        .class(css.get("body"))
        .child(el("h2").class(css.get("title")).text(talk.title.as_str()))
        .child(meta);
    if !talk.description.is_empty() {
        info = info.child(
            el("p")
                .class(css.get("description"))
                .text(talk.description.as_str()),
        );
    }

    Ok(el("li").class(css.get("card")).child(media).child(info).into())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use sitekit_core::{Config, CoreError};

    use super::*;
    use crate::{render::RenderError, styles::StyleRegistry, test_support::test_config};

    fn render_with(talks_toml: Option<&str>) -> Result<String> {
        let dir = tempfile::tempdir().unwrap();
        if let Some(content) = talks_toml {
            fs::write(dir.path().join(TALKS_FILE), content).unwrap();
        }
        let mut config: Config = test_config();
        config.build.content_dir = dir.path().display().to_string();
        let resolver = config.resolver();
        let styles = StyleRegistry::new();
        let mut ctx = RenderContext::new(&config, &resolver, &styles);

        render(&mut ctx).map(|page| page.body.render())
    }

    #[test]
    fn test_video_and_link_cards() {
        let html = render_with(Some(
            r#"
[[talk]]
title = "Engines"
event = "RustConf"
date = "2023-09-12"
speakers = [{ name = "Ann" }, { name = "Bob" }]
media = { kind = "video", embed_url = "https://www.youtube.com/embed/abc" }

[[talk]]
title = "Slides"
event = "RustConf"
date = "2023-09-12"
speakers = [{ name = "Ann" }, { name = "Bob" }]
media = { kind = "link", url = "https://example.com/slides", image = "https://example.com/cover.png" }
"#,
        ))
        .unwrap();

        assert_eq!(html.matches("<iframe").count(), 1);
        assert!(html.contains("src=\"https://www.youtube.com/embed/abc\""));
        assert!(html.contains("href=\"https://example.com/slides\""));
        assert!(html.contains("<img"));
        assert!(html.contains("RustConf, <time datetime=\"2023-09-12\">"));
        assert!(html.contains(">Ann</span>, <span"));
    }

    #[test]
    fn test_no_talks_file() {
        let html = render_with(None).unwrap();
        assert!(html.contains("No talks yet."));
    }

    #[test]
    fn test_malformed_talks_file() {
        let err = render_with(Some("[[talk]]\ntitle = \"Missing fields\"\n")).unwrap_err();
        assert!(matches!(err, RenderError::Content(CoreError::Data { .. })));
        assert!(err.to_string().contains("talks.toml"));
    }
}
