//! Mapping of logical content paths to output files, links and absolute URLs.
//!
//! A logical path names a page by its place in the content tree, e.g.
//! `content/blog/hello.md`. Pages without a source file use a virtual path in
//! the same tree (`content/talks`).

use std::path::{Component, Path, PathBuf};

/// Resolves logical content paths against a fixed site layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    content_root: PathBuf,
    output_root: PathBuf,
    base_path: String,
    origin: String,
}

/// Whether `link` points outside the site and must not be rewritten.
#[must_use]
pub fn is_external(link: &str) -> bool {
    link.starts_with("//") || link.starts_with("mailto:") || link.contains("://")
}

impl PathResolver {
    /// Create a resolver. Trailing slashes on the base path and origin are dropped.
    pub fn new(
        content_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        base_path: &str,
        origin: &str,
    ) -> Self {
        Self {
            content_root: content_root.into(),
            output_root: output_root.into(),
            base_path: base_path.trim_end_matches('/').to_string(),
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    /// Root of the source content tree.
    #[must_use]
    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    /// Root of the generated site.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Base path prefix for internal links ("" when served from the origin root).
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Logical path for a page route relative to the content root.
    #[must_use]
    pub fn logical(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.content_root.join(relative)
    }

    /// File the page is written to: content root swapped for the output root,
    /// extension replaced by `html` or `ext`.
    #[must_use]
    pub fn output_path(&self, logical: impl AsRef<Path>, ext: Option<&str>) -> PathBuf {
        let mut out = self.output_root.join(self.relative(logical.as_ref()));
        out.set_extension(ext.unwrap_or("html"));
        out
    }

    /// Site-relative link: base path plus the extension-less route.
    #[must_use]
    pub fn href(&self, logical: impl AsRef<Path>) -> String {
        let logical = logical.as_ref();
        if let Some(link) = external(logical) {
            return link;
        }
        format!("{}{}", self.base_path, self.route(logical))
    }

    /// Absolute URL: origin plus the extension-less route.
    #[must_use]
    pub fn absolute_url(&self, logical: impl AsRef<Path>) -> String {
        let logical = logical.as_ref();
        if let Some(link) = external(logical) {
            return link;
        }
        format!("{}{}", self.origin, self.route(logical))
    }

    /// Link to a file copied from the public directory (e.g. `/style.css`).
    #[must_use]
    pub fn asset_href(&self, asset: &str) -> String {
        if is_external(asset) {
            return asset.to_string();
        }
        format!("{}/{}", self.base_path, asset.trim_start_matches('/'))
    }

    /// Absolute URL of a file copied from the public directory.
    #[must_use]
    pub fn asset_url(&self, asset: &str) -> String {
        if is_external(asset) {
            return asset.to_string();
        }
        format!("{}/{}", self.origin, asset.trim_start_matches('/'))
    }

    fn relative<'a>(&self, logical: &'a Path) -> &'a Path {
        logical.strip_prefix(&self.content_root).unwrap_or(logical)
    }

    /// Route beginning with `/`; a trailing `index` segment becomes a directory URL.
    fn route(&self, logical: &Path) -> String {
        let relative = self.relative(logical).with_extension("");
        let segments: Vec<_> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        match segments.split_last() {
            None => "/".to_string(),
            Some((last, [])) if last == "index" => "/".to_string(),
            Some((last, dirs)) if last == "index" => format!("/{}/", dirs.join("/")),
            Some(_) => format!("/{}", segments.join("/")),
        }
    }
}

fn external(logical: &Path) -> Option<String> {
    let link = logical.to_str()?;
    is_external(link).then(|| link.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(base_path: &str) -> PathResolver {
        PathResolver::new("content", "dist", base_path, "https://example.com")
    }

    #[test]
    fn test_output_path() {
        let r = resolver("");
        assert_eq!(
            r.output_path("content/blog/hello.md", None),
            PathBuf::from("dist/blog/hello.html")
        );
        assert_eq!(
            r.output_path("content/index", None),
            PathBuf::from("dist/index.html")
        );
        assert_eq!(
            r.output_path("content/blog/feed", Some("rss")),
            PathBuf::from("dist/blog/feed.rss")
        );
    }

    #[test]
    fn test_output_path_round_trips_to_logical() {
        let r = resolver("/site");
        for logical in [
            "content/blog/hello.md",
            "content/blog/2024/release-0.19.md",
            "content/talks.md",
        ] {
            let out = r.output_path(logical, None);
            let back = Path::new("content")
                .join(out.strip_prefix("dist").unwrap())
                .with_extension("md");
            assert_eq!(back, PathBuf::from(logical));
        }
    }

    #[test]
    fn test_href() {
        let r = resolver("");
        assert_eq!(r.href("content/blog/hello.md"), "/blog/hello");
        assert_eq!(r.href("content/index"), "/");
        assert_eq!(r.href("content/blog/index"), "/blog/");
        assert_eq!(r.href("content/talks"), "/talks");
    }

    #[test]
    fn test_href_with_base_path() {
        let r = resolver("/site/");
        assert_eq!(r.base_path(), "/site");
        assert_eq!(r.href("content/blog/hello.md"), "/site/blog/hello");
        assert_eq!(r.href("content/index"), "/site/");
    }

    #[test]
    fn test_absolute_url_uses_origin() {
        let r = resolver("/site");
        assert_eq!(
            r.absolute_url("content/blog/hello.md"),
            "https://example.com/blog/hello"
        );
    }

    #[test]
    fn test_external_links_unchanged() {
        let r = resolver("/site");
        let link = "https://other.example.org/post.md";
        assert_eq!(r.href(link), link);
        assert_eq!(r.absolute_url(link), link);
        assert_eq!(r.asset_href("//cdn.example.com/x.css"), "//cdn.example.com/x.css");
    }

    #[test]
    fn test_asset_href() {
        assert_eq!(resolver("").asset_href("/style.css"), "/style.css");
        assert_eq!(resolver("/site").asset_href("favicon.ico"), "/site/favicon.ico");
        assert_eq!(
            resolver("").asset_url("/images/logo.png"),
            "https://example.com/images/logo.png"
        );
    }

    #[test]
    fn test_logical() {
        let r = resolver("");
        assert_eq!(r.logical("blog/index"), PathBuf::from("content/blog/index"));
    }
}
