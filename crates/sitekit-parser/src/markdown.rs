//! Markdown renderer using pulldown-cmark.
//!
//! Headings receive anchor ids and are collected for tables of contents.
//! Relative links can be rebased, which matters for documents fetched from a
//! repository and rendered on the site.

use std::collections::HashMap;

use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};

/// A heading found while rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level (1-6).
    pub level: u8,

    /// Heading text.
    pub text: String,

    /// Anchor id set on the heading element.
    pub id: String,
}

/// Output of a Markdown render.
#[derive(Debug, Clone, Default)]
pub struct RenderedMarkdown {
    /// HTML fragment.
    pub html: String,

    /// Headings in document order.
    pub headings: Vec<Heading>,
}

/// Markdown to HTML renderer.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    link_base: Option<String>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with GitHub-flavoured extensions enabled.
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            options,
            link_base: None,
        }
    }

    /// Resolve relative link and image targets against `base`.
    #[must_use]
    pub fn with_link_base(mut self, base: impl Into<String>) -> Self {
        self.link_base = Some(base.into());
        self
    }

    /// Render Markdown to HTML. Raw HTML in the source is passed through.
    pub fn render(&self, markdown: &str) -> RenderedMarkdown {
        let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, self.options).collect();
        let mut headings = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for i in 0..events.len() {
            if matches!(events[i], Event::Start(Tag::Heading { .. })) {
                let text = heading_text(&events[i + 1..]);
                if let Event::Start(Tag::Heading { level, id, .. }) = &mut events[i] {
                    let anchor = match id {
                        Some(existing) => existing.to_string(),
                        None => unique_anchor(&mut seen, &text),
                    };
                    *id = Some(CowStr::from(anchor.clone()));
                    headings.push(Heading {
                        level: *level as u8,
                        text,
                        id: anchor,
                    });
                }
            } else if let Some(base) = &self.link_base
                && let Event::Start(Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. }) =
                    &mut events[i]
                && is_relative(dest_url)
            {
                *dest_url = CowStr::from(rebase(base, dest_url));
            }
        }

        let mut html_out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_out, events.into_iter());

        RenderedMarkdown {
            html: html_out,
            headings,
        }
    }

    /// Render Markdown and return only the HTML.
    pub fn render_html(&self, markdown: &str) -> String {
        self.render(markdown).html
    }
}

fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

fn unique_anchor(seen: &mut HashMap<String, usize>, text: &str) -> String {
    let base = slugify(text);
    let base = if base.is_empty() {
        "section".to_string()
    } else {
        base
    };
    let count = seen.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count == 1 {
        base
    } else {
        format!("{base}-{}", *count - 1)
    }
}

fn is_relative(link: &str) -> bool {
    !(link.is_empty()
        || link.starts_with('#')
        || link.starts_with('/')
        || link.starts_with("mailto:")
        || link.contains("://"))
}

fn rebase(base: &str, link: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        link.trim_start_matches("./")
    )
}

/// Convert text to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_paragraph() {
        let html = MarkdownRenderer::new().render_html("Hello *world*");
        assert_eq!(html.trim(), "<p>Hello <em>world</em></p>");
    }

    #[test]
    fn test_heading_ids() {
        let rendered = MarkdownRenderer::new().render("# Getting Started\n\n## Build & Test\n");

        assert!(rendered.html.contains(r#"<h1 id="getting-started">"#));
        assert!(rendered.html.contains(r#"<h2 id="build-test">"#));
        assert_eq!(rendered.headings.len(), 2);
        assert_eq!(rendered.headings[0].level, 1);
        assert_eq!(rendered.headings[1].text, "Build & Test");
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let rendered = MarkdownRenderer::new().render("## Usage\n\n## Usage\n");
        assert_eq!(rendered.headings[0].id, "usage");
        assert_eq!(rendered.headings[1].id, "usage-1");
    }

    #[test]
    fn test_explicit_heading_id() {
        let rendered = MarkdownRenderer::new().render("## Setup {#install}\n");
        assert_eq!(rendered.headings[0].id, "install");
        assert!(rendered.html.contains(r#"id="install""#));
    }

    #[test]
    fn test_link_rebase() {
        let renderer =
            MarkdownRenderer::new().with_link_base("https://github.com/org/repo/blob/main");
        let html = renderer.render_html(
            "[docs](./docs/README.md) [anchor](#top) [abs](https://example.com) [root](/x)",
        );

        assert!(html.contains(r#"href="https://github.com/org/repo/blob/main/docs/README.md""#));
        assert!(html.contains(r##"href="#top""##));
        assert!(html.contains(r#"href="https://example.com""#));
        assert!(html.contains(r#"href="/x""#));
    }

    #[test]
    fn test_links_untouched_without_base() {
        let html = MarkdownRenderer::new().render_html("[docs](docs/README.md)");
        assert!(html.contains(r#"href="docs/README.md""#));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let html = MarkdownRenderer::new().render_html("<div class=\"note\">hi</div>\n");
        assert!(html.contains("<div class=\"note\">hi</div>"));
    }

    #[test]
    fn test_table_rendering() {
        let html = MarkdownRenderer::new().render_html(
            "| Header 1 | Header 2 |\n|----------|----------|\n| Cell 1   | Cell 2   |",
        );
        assert!(html.contains("<table>"));
        assert!(html.contains("<thead>"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Test 123 Post"), "test-123-post");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("Special!@#Chars"), "specialchars");
    }
}
