//! Document shell template.
//!
//! Pages render their body as a markup tree; the surrounding `<html>` and
//! `<head>` come from a small string template with `{{ variable }}` and
//! `{{ variable? }}` placeholders.

use std::collections::HashMap;

use sitekit_core::PathResolver;
use thiserror::Error;

use crate::node::escape_html;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Template variables. Values are inserted verbatim.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }
}

/// A parsed template: literal text interleaved with placeholders.
#[derive(Debug, Clone)]
pub struct Template {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Var { name: String, optional: bool },
}

impl Template {
    /// Split `source` into text and `{{ name }}` / `{{ name? }}` placeholders.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some((text, tail)) = rest.split_once("{{") {
            let (tag, after) = tail.split_once("}}").ok_or_else(|| {
                TemplateError::InvalidSyntax(format!("unclosed {{{{ before {:?}", truncate(tail)))
            })?;

            let tag = tag.trim();
            let (name, optional) = tag
                .strip_suffix('?')
                .map_or((tag, false), |name| (name.trim_end(), true));
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(TemplateError::InvalidSyntax(format!(
                    "bad placeholder {{{{ {tag} }}}}"
                )));
            }

            if !text.is_empty() {
                segments.push(Segment::Text(text.to_string()));
            }
            segments.push(Segment::Var {
                name: name.to_string(),
                optional,
            });
            rest = after;
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Self { segments })
    }

    /// Fill every placeholder from `context`. Values are inserted as is.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Var { name, optional } => match context.get(name) {
                    Some(value) => out.push_str(value),
                    None if *optional => {}
                    None => return Err(TemplateError::MissingVariable(name.clone())),
                },
            }
        }
        Ok(out)
    }
}

fn truncate(s: &str) -> &str {
    s.char_indices().nth(16).map_or(s, |(i, _)| &s[..i])
}

/// The HTML document every page is wrapped in.
pub const DOCUMENT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{ title }}</title>
<meta name="description" content="{{ description }}">
{{ author_meta? }}<meta property="og:title" content="{{ title }}">
<meta property="og:description" content="{{ description }}">
<meta property="og:type" content="{{ og_type }}">
<meta property="og:url" content="{{ url }}">
<meta property="og:site_name" content="{{ site_title }}">
{{ canonical? }}<link rel="stylesheet" href="{{ stylesheet }}">
<link rel="icon" href="{{ favicon }}">
<link rel="alternate" type="application/rss+xml" title="{{ site_title }} (RSS)" href="{{ feed_rss }}">
<link rel="alternate" type="application/atom+xml" title="{{ site_title }} (Atom)" href="{{ feed_atom }}">
<link rel="alternate" type="application/feed+json" title="{{ site_title }} (JSON Feed)" href="{{ feed_json }}">
<style>{{ styles }}</style>
</head>
<body>
{{ body }}
</body>
</html>
"#;

/// Site-relative paths of the generated feeds.
pub const FEED_RSS: &str = "blog/feed.rss";
/// Atom feed path.
pub const FEED_ATOM: &str = "blog/feed.atom";
/// JSON Feed path.
pub const FEED_JSON: &str = "blog/feed.json";

/// Head metadata and body of one page.
#[derive(Debug, Clone)]
pub struct Document<'a> {
    /// Page title; the site title is appended unless they are equal.
    pub title: &'a str,
    /// Meta description.
    pub description: &'a str,
    /// `og:type`, `website` or `article`.
    pub og_type: &'a str,
    /// Absolute URL of the page.
    pub url: String,
    /// Emit a canonical link to `url`.
    pub canonical: bool,
    /// Author names for the author meta tag.
    pub author: Option<String>,
    /// Inlined CSS.
    pub styles: String,
    /// Rendered body HTML.
    pub body: String,
}

impl Document<'_> {
    /// Render the full HTML document.
    pub fn render(&self, site_title: &str, resolver: &PathResolver) -> Result<String> {
        let title = if self.title.is_empty() || self.title == site_title {
            site_title.to_string()
        } else {
            format!("{} | {site_title}", self.title)
        };

        let mut ctx = TemplateContext::new()
            .with_var("title", escape_html(&title))
            .with_var("description", escape_html(self.description))
            .with_var("og_type", self.og_type)
            .with_var("url", escape_html(&self.url))
            .with_var("site_title", escape_html(site_title))
            .with_var("stylesheet", escape_html(&resolver.asset_href("style.css")))
            .with_var("favicon", escape_html(&resolver.asset_href("favicon.ico")))
            .with_var("feed_rss", escape_html(&resolver.asset_href(FEED_RSS)))
            .with_var("feed_atom", escape_html(&resolver.asset_href(FEED_ATOM)))
            .with_var("feed_json", escape_html(&resolver.asset_href(FEED_JSON)))
            .with_var("styles", self.styles.as_str())
            .with_var("body", self.body.as_str());

        if self.canonical {
            ctx.insert(
                "canonical",
                format!("<link rel=\"canonical\" href=\"{}\">\n", escape_html(&self.url)),
            );
        }
        if let Some(author) = self.author.as_deref().filter(|a| !a.is_empty()) {
            ctx.insert(
                "author_meta",
                format!("<meta name=\"author\" content=\"{}\">\n", escape_html(author)),
            );
        }

        Template::parse(DOCUMENT_TEMPLATE)?.render(&ctx)
    }
}
