//! Component style registry.
//!
//! Each component owns a CSS module embedded in the binary. Rendering a
//! component registers its module, which transforms the source once and hands
//! back the class map; pages then inline the CSS of the modules they touched.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;
use sitekit_parser::{ClassMap, CssError, CssModuleTransform, StyleTransform};
use thiserror::Error;
use tracing::debug;

/// Style modules shipped with the generator.
pub const BUILTIN_MODULES: &[(&str, &str)] = &[
    ("layout.module.css", include_str!("../styles/layout.module.css")),
    ("home.module.css", include_str!("../styles/home.module.css")),
    ("blog.module.css", include_str!("../styles/blog.module.css")),
    ("post.module.css", include_str!("../styles/post.module.css")),
    ("authors.module.css", include_str!("../styles/authors.module.css")),
    ("talks.module.css", include_str!("../styles/talks.module.css")),
    ("prose.module.css", include_str!("../styles/prose.module.css")),
    ("conformance.module.css", include_str!("../styles/conformance.module.css")),
];

/// Style registry errors.
#[derive(Debug, Error)]
pub enum StyleError {
    /// No source registered under this id.
    #[error("unknown style module: {0}")]
    UnknownModule(String),

    /// The module source could not be transformed.
    #[error(transparent)]
    Css(#[from] CssError),
}

/// Result type for style operations.
pub type Result<T> = std::result::Result<T, StyleError>;

/// Transformed CSS and class map of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleEntry {
    /// Scoped CSS.
    pub css: String,

    /// Logical class to generated class string.
    pub classes: ClassMap,
}

#[derive(Debug, Default)]
struct Cache {
    entries: HashMap<String, StyleEntry>,
    order: Vec<String>,
}

/// Thread-safe cache of transformed style modules.
pub struct StyleRegistry {
    sources: BTreeMap<String, String>,
    transform: Box<dyn StyleTransform>,
    cache: Mutex<Cache>,
}

impl std::fmt::Debug for StyleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleRegistry")
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("registered", &self.cache.lock().order)
            .finish()
    }
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    /// Registry over the built-in modules with the CSS-module transform.
    #[must_use]
    pub fn new() -> Self {
        Self::empty().with_sources(
            BUILTIN_MODULES
                .iter()
                .map(|(id, source)| ((*id).to_string(), (*source).to_string())),
        )
    }

    /// Registry with no sources.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sources: BTreeMap::new(),
            transform: Box::new(CssModuleTransform),
            cache: Mutex::new(Cache::default()),
        }
    }

    /// Add or replace module sources.
    #[must_use]
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = (String, String)>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Use a different transform.
    #[must_use]
    pub fn with_transform(mut self, transform: impl StyleTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    /// Register a module and return its class map.
    ///
    /// The source is transformed on first registration only.
    pub fn register(&self, module_id: &str) -> Result<ClassMap> {
        let mut cache = self.cache.lock();
        if let Some(entry) = cache.entries.get(module_id) {
            return Ok(entry.classes.clone());
        }

        let source = self
            .sources
            .get(module_id)
            .ok_or_else(|| StyleError::UnknownModule(module_id.to_string()))?;
        let module = self.transform.transform(module_id, source)?;
        debug!(module = module_id, classes = module.classes.len(), "style module registered");

        let classes = module.classes.clone();
        cache.entries.insert(
            module_id.to_string(),
            StyleEntry {
                css: module.css,
                classes: module.classes,
            },
        );
        cache.order.push(module_id.to_string());
        Ok(classes)
    }

    /// Cached entry for a registered module.
    #[must_use]
    pub fn entry(&self, module_id: &str) -> Option<StyleEntry> {
        self.cache.lock().entries.get(module_id).cloned()
    }

    /// CSS of the given registered modules, concatenated in the given order.
    ///
    /// Unregistered ids are skipped.
    #[must_use]
    pub fn stylesheet<S: AsRef<str>>(&self, module_ids: &[S]) -> String {
        let cache = self.cache.lock();
        module_ids
            .iter()
            .filter_map(|id| cache.entries.get(id.as_ref()))
            .map(|entry| entry.css.as_str())
            .collect()
    }

    /// CSS of every registered module in first-registration order.
    #[must_use]
    pub fn stylesheet_all(&self) -> String {
        let cache = self.cache.lock();
        cache
            .order
            .iter()
            .filter_map(|id| cache.entries.get(id))
            .map(|entry| entry.css.as_str())
            .collect()
    }

    /// Number of registered modules.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.cache.lock().order.len()
    }
}
