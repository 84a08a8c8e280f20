//! CSS-module transform.
//!
//! Class selectors in a module are renamed to `{stem}_{class}__{hash}` so
//! components cannot collide. `composes: a b;` declarations are removed from
//! the output and folded into the class map, so `classes["button"]` may read
//! `button_button__1a2b3c4d button_base__1a2b3c4d`. `:global(...)` selectors and
//! `composes: x from global` names are left untouched.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::LazyLock,
};

use regex::Regex;
use thiserror::Error;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex"));

/// At-rules whose blocks hold no style rules and are copied verbatim.
const OPAQUE_AT_RULES: &[&str] = &["@keyframes", "@font-face", "@page", "@property", "@counter-style"];

/// CSS transform errors.
#[derive(Debug, Error)]
pub enum CssError {
    /// Braces do not balance.
    #[error("unbalanced braces in {module}")]
    Unbalanced { module: String },

    /// `composes` outside a class rule or from another module.
    #[error("unsupported composes in {module}: {declaration}")]
    Composes { module: String, declaration: String },
}

/// Result type for CSS operations.
pub type Result<T> = std::result::Result<T, CssError>;

/// Logical class name to generated class string.
pub type ClassMap = BTreeMap<String, String>;

/// Transformed stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssModule {
    /// Scoped CSS text.
    pub css: String,

    /// Class map including composed classes.
    pub classes: ClassMap,
}

/// Turns a style module's source into scoped CSS.
pub trait StyleTransform: Send + Sync {
    /// Transform `source`, identified by `module_id`.
    fn transform(&self, module_id: &str, source: &str) -> Result<CssModule>;
}

/// Built-in CSS-module scoper.
#[derive(Debug, Clone, Copy, Default)]
pub struct CssModuleTransform;

impl StyleTransform for CssModuleTransform {
    fn transform(&self, module_id: &str, source: &str) -> Result<CssModule> {
        Scoper::new(module_id).run(&COMMENT.replace_all(source, ""))
    }
}

enum Block {
    /// Style rule; holds the local classes its selector defines.
    Rule(Vec<String>),
    /// Conditional group such as `@media`, containing style rules.
    Group,
    /// Block copied as-is.
    Opaque,
}

struct Scoper<'a> {
    module_id: &'a str,
    stem: String,
    hash: String,
    css: String,
    locals: BTreeMap<String, String>,
    composes: BTreeMap<String, BTreeSet<String>>,
}

impl<'a> Scoper<'a> {
    fn new(module_id: &'a str) -> Self {
        Self {
            module_id,
            stem: module_stem(module_id),
            hash: short_hash(module_id),
            css: String::new(),
            locals: BTreeMap::new(),
            composes: BTreeMap::new(),
        }
    }

    fn run(mut self, source: &str) -> Result<CssModule> {
        let mut stack: Vec<Block> = Vec::new();
        let mut buf = String::new();

        for ch in source.chars() {
            match ch {
                '{' => {
                    let block = match stack.last() {
                        Some(Block::Opaque) => {
                            self.css.push_str(&buf);
                            self.css.push('{');
                            Block::Opaque
                        }
                        _ => self.open(buf.trim()),
                    };
                    stack.push(block);
                    buf.clear();
                }
                '}' => {
                    match stack.pop() {
                        None => return Err(self.unbalanced()),
                        Some(Block::Rule(classes)) => {
                            self.declaration(buf.trim(), &classes)?;
                            self.css.push_str("}\n");
                        }
                        Some(Block::Group) => self.css.push_str("}\n"),
                        Some(Block::Opaque) => {
                            self.css.push_str(&buf);
                            self.css.push('}');
                            if stack.is_empty() {
                                self.css.push('\n');
                            }
                        }
                    }
                    buf.clear();
                }
                ';' => {
                    match stack.last() {
                        Some(Block::Rule(classes)) => {
                            let classes = classes.clone();
                            self.declaration(buf.trim(), &classes)?;
                        }
                        Some(Block::Opaque) => {
                            self.css.push_str(&buf);
                            self.css.push(';');
                        }
                        Some(Block::Group) | None => {
                            self.css.push_str(buf.trim());
                            self.css.push_str(";\n");
                        }
                    }
                    buf.clear();
                }
                _ => buf.push(ch),
            }
        }

        if !stack.is_empty() || !buf.trim().is_empty() {
            return Err(self.unbalanced());
        }

        let classes = self
            .locals
            .iter()
            .map(|(local, generated)| {
                let mut value = generated.clone();
                for extra in self.composes.get(local).into_iter().flatten() {
                    value.push(' ');
                    value.push_str(extra);
                }
                (local.clone(), value)
            })
            .collect();

        Ok(CssModule {
            css: self.css,
            classes,
        })
    }

    /// Emit the prelude of a block and decide its kind.
    fn open(&mut self, prelude: &str) -> Block {
        if prelude.starts_with('@') {
            self.css.push_str(prelude);
            self.css.push_str(" {\n");
            let name = prelude.split_whitespace().next().unwrap_or(prelude);
            let opaque = OPAQUE_AT_RULES
                .iter()
                .any(|rule| name.trim_start_matches("@-webkit-") == rule.trim_start_matches('@') || name == *rule);
            if opaque { Block::Opaque } else { Block::Group }
        } else {
            let (selector, classes) = self.scope_selector(prelude);
            self.css.push_str(&selector);
            self.css.push_str(" {\n");
            Block::Rule(classes)
        }
    }

    /// Handle one declaration inside a style rule.
    fn declaration(&mut self, decl: &str, classes: &[String]) -> Result<()> {
        if decl.is_empty() {
            return Ok(());
        }

        let Some(value) = decl
            .split_once(':')
            .filter(|(property, _)| property.trim() == "composes")
            .map(|(_, value)| value.trim())
        else {
            self.css.push_str("  ");
            self.css.push_str(decl);
            self.css.push_str(";\n");
            return Ok(());
        };

        if classes.is_empty() {
            return Err(self.composes_error(decl));
        }

        let (names, global) = match value.rsplit_once(" from ") {
            None => (value, false),
            Some((names, "global")) => (names, true),
            Some(_) => return Err(self.composes_error(decl)),
        };

        for name in names.split_whitespace() {
            let composed = if global {
                name.to_string()
            } else {
                self.local(name)
            };
            for class in classes {
                self.composes
                    .entry(class.clone())
                    .or_default()
                    .insert(composed.clone());
            }
        }

        Ok(())
    }

    /// Rename local class selectors, leaving `:global(...)` and attribute
    /// selector contents alone.
    fn scope_selector(&mut self, selector: &str) -> (String, Vec<String>) {
        let chars: Vec<char> = selector.chars().collect();
        let mut out = String::with_capacity(selector.len() * 2);
        let mut classes = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let ch = chars[i];
            if ch == '[' {
                let end = find_closing(&chars, i, '[', ']');
                out.extend(&chars[i..end]);
                i = end;
            } else if ch == ':' && starts_with(&chars[i..], ":global(") {
                let open = i + ":global".len();
                let end = find_closing(&chars, open, '(', ')');
                let inner_end = end.saturating_sub(1).max(open + 1);
                out.extend(&chars[open + 1..inner_end]);
                i = end;
            } else if ch == '.' && chars.get(i + 1).is_some_and(|c| is_ident_start(*c)) {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && is_ident_char(chars[end]) {
                    end += 1;
                }
                let local: String = chars[start..end].iter().collect();
                out.push('.');
                out.push_str(&self.local(&local));
                if !classes.contains(&local) {
                    classes.push(local);
                }
                i = end;
            } else {
                out.push(ch);
                i += 1;
            }
        }

        (out, classes)
    }

    /// Generated name for a local class, recording it in the map.
    fn local(&mut self, name: &str) -> String {
        self.locals
            .entry(name.to_string())
            .or_insert_with(|| format!("{}_{}__{}", self.stem, name, self.hash))
            .clone()
    }

    fn unbalanced(&self) -> CssError {
        CssError::Unbalanced {
            module: self.module_id.to_string(),
        }
    }

    fn composes_error(&self, decl: &str) -> CssError {
        CssError::Composes {
            module: self.module_id.to_string(),
            declaration: decl.to_string(),
        }
    }
}

/// Index just past the bracket matching the one at `start`.
fn find_closing(chars: &[char], start: usize, open: char, close: char) -> usize {
    let mut depth = 0usize;
    for (offset, c) in chars[start..].iter().enumerate() {
        if *c == open {
            depth += 1;
        } else if *c == close {
            depth -= 1;
            if depth == 0 {
                return start + offset + 1;
            }
        }
    }
    chars.len()
}

fn starts_with(chars: &[char], prefix: &str) -> bool {
    prefix.chars().enumerate().all(|(i, p)| chars.get(i) == Some(&p))
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}

/// File stem of a module id, without `.module.css`, safe for class names.
fn module_stem(module_id: &str) -> String {
    let file = module_id.rsplit(['/', '\\']).next().unwrap_or(module_id);
    let stem = file
        .strip_suffix(".module.css")
        .or_else(|| file.strip_suffix(".css"))
        .unwrap_or(file);
    stem.chars()
        .map(|c| if is_ident_char(c) { c } else { '_' })
        .collect()
}

/// Eight hex digits of the FNV-1a hash of the module id.
fn short_hash(module_id: &str) -> String {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in module_id.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("{hash:016x}")[..8].to_string()
}
