//! Static preview server for the generated site

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::{
    Router,
    extract::{Request, State},
    middleware,
};
use tower_http::services::ServeDir;

/// Create the preview router serving `output_dir`.
///
/// Pages are written as `talks.html` but linked as `/talks`, so extension-less
/// requests are mapped to the matching `.html` file when one exists.
pub fn create_router(output_dir: &Path) -> Router {
    let root = Arc::new(output_dir.to_path_buf());
    Router::new()
        .fallback_service(ServeDir::new(output_dir))
        .layer(middleware::map_request_with_state(root, clean_urls))
}

async fn clean_urls(State(root): State<Arc<PathBuf>>, mut request: Request) -> Request {
    if let Some(path) = html_path(&root, request.uri().path()) {
        let target = match request.uri().query() {
            Some(query) => format!("{path}?{query}"),
            None => path,
        };
        if let Ok(uri) = target.parse() {
            tracing::trace!(uri = %uri, "serving page");
            *request.uri_mut() = uri;
        }
    }
    request
}

/// `{path}.html` when `path` has no extension and that file exists under `root`.
fn html_path(root: &Path, path: &str) -> Option<String> {
    let last = path.rsplit('/').next()?;
    if last.is_empty() || last.contains('.') {
        return None;
    }

    let candidate = format!("{path}.html");
    root.join(candidate.trim_start_matches('/'))
        .is_file()
        .then_some(candidate)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_html_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blog")).unwrap();
        fs::write(dir.path().join("talks.html"), "").unwrap();
        fs::write(dir.path().join("blog/hello.html"), "").unwrap();

        assert_eq!(html_path(dir.path(), "/talks"), Some("/talks.html".to_string()));
        assert_eq!(
            html_path(dir.path(), "/blog/hello"),
            Some("/blog/hello.html".to_string())
        );
        assert_eq!(html_path(dir.path(), "/blog/"), None);
        assert_eq!(html_path(dir.path(), "/style.css"), None);
        assert_eq!(html_path(dir.path(), "/missing"), None);
    }
}
