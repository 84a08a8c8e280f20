//! sitekit Parser Library
//!
//! Text-in, text-out transforms used while rendering pages: Markdown to HTML
//! and CSS modules to scoped CSS plus a class-name map.

pub mod css;
pub mod markdown;

pub use css::{ClassMap, CssError, CssModule, CssModuleTransform, StyleTransform};
pub use markdown::{Heading, MarkdownRenderer, RenderedMarkdown, slugify};
