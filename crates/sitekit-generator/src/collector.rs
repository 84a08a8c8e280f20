//! Content discovery and post loading.
//!
//! [`FileWalker`] lazily lists the files under a directory; [`PostLoader`]
//! turns the Markdown files among them into [`PostRecord`]s; and
//! [`PostCollection`] is the sorted, immutable set shared by every page.

use std::{
    fs,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use sitekit_core::{CoreError, PostRecord};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// File extensions treated as posts.
const POST_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Content collection errors.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// A file or directory could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal error.
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A post failed to parse.
    #[error(transparent)]
    Post(#[from] CoreError),
}

/// Result type for collector operations.
pub type Result<T> = std::result::Result<T, CollectorError>;

/// Lazy recursive file listing, skipping hidden files and directories.
#[derive(Debug, Clone)]
pub struct FileWalker {
    root: PathBuf,
}

impl FileWalker {
    /// Create a walker rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a fresh traversal.
    ///
    /// Fails up front when the root is missing or not a directory; errors on
    /// entries below it are yielded in sequence.
    pub fn walk(&self) -> Result<impl Iterator<Item = Result<PathBuf>> + use<>> {
        let metadata = fs::metadata(&self.root).map_err(|source| self.io_error(source))?;
        if !metadata.is_dir() {
            return Err(self.io_error(std::io::ErrorKind::NotADirectory.into()));
        }

        let root = self.root.clone();
        let iter = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(_) => None,
                Err(source) => Some(Err(CollectorError::Walk {
                    path: source.path().map_or_else(|| root.clone(), Path::to_path_buf),
                    source,
                })),
            });

        Ok(iter)
    }

    fn io_error(&self, source: std::io::Error) -> CollectorError {
        CollectorError::Io {
            path: self.root.clone(),
            source,
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_post_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| POST_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Loads posts from a directory of Markdown files.
#[derive(Debug, Clone)]
pub struct PostLoader {
    walker: FileWalker,
}

impl PostLoader {
    /// Create a loader for posts under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            walker: FileWalker::new(root),
        }
    }

    /// Paths of all post files, in traversal order.
    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        self.post_files()?.collect()
    }

    /// Lazily parse posts one at a time.
    pub fn posts(&self) -> Result<impl Iterator<Item = Result<PostRecord>> + use<>> {
        Ok(self
            .post_files()?
            .map(|entry| entry.and_then(|path| load_post(&path))))
    }

    /// Post files under the root; walk errors are passed through.
    fn post_files(&self) -> Result<impl Iterator<Item = Result<PathBuf>> + use<>> {
        Ok(self
            .walker
            .walk()?
            .filter(|entry| entry.as_ref().map_or(true, |path| is_post_file(path))))
    }
}

/// Read and parse one post file.
pub fn load_post(path: &Path) -> Result<PostRecord> {
    debug!(path = %path.display(), "loading post");
    let content = fs::read_to_string(path).map_err(|source| CollectorError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(PostRecord::parse(path, &content)?)
}

/// All posts of a build, newest first.
#[derive(Debug, Clone, Default)]
pub struct PostCollection {
    posts: Vec<PostRecord>,
}

impl PostCollection {
    /// Load every post under `root`, parsing in parallel.
    ///
    /// A missing `root` means a site without posts. The first broken post
    /// aborts loading; the error names its file.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let loader = PostLoader::new(root);
        let dir = loader.walker.root();
        if !dir.exists() {
            debug!(dir = %dir.display(), "no post directory");
            return Ok(Self::default());
        }
        info!(dir = %dir.display(), "loading posts");

        let paths = loader.paths()?;
        let posts = paths
            .par_iter()
            .map(|path| load_post(path))
            .collect::<Result<Vec<_>>>()?;

        let collection = Self::from_posts(posts);
        info!(count = collection.len(), "posts loaded");
        Ok(collection)
    }

    /// Build a collection from already parsed posts.
    #[must_use]
    pub fn from_posts(mut posts: Vec<PostRecord>) -> Self {
        posts.sort_by(|a, b| b.date().cmp(&a.date()).then_with(|| a.id.cmp(&b.id)));
        Self { posts }
    }

    /// Posts newest first.
    pub fn iter(&self) -> std::slice::Iter<'_, PostRecord> {
        self.posts.iter()
    }

    /// The `n` newest posts.
    #[must_use]
    pub fn latest(&self, n: usize) -> &[PostRecord] {
        &self.posts[..n.min(self.posts.len())]
    }

    /// Look up a post by its logical path.
    #[must_use]
    pub fn get(&self, id: &Path) -> Option<&PostRecord> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Number of posts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether there are no posts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

impl<'a> IntoIterator for &'a PostCollection {
    type Item = &'a PostRecord;
    type IntoIter = std::slice::Iter<'a, PostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
