//! # Documentation Extraction
//!
//! Recovers the documentation written on configuration struct fields so
//! derived schemas can carry it as `description`.
//!
//! ## Index
//!
//! On the first lookup against a module, every source file the
//! [`SourceLocator`] returns for it is parsed with `syn` and every
//! named-field `struct` (including those inside inline `mod` blocks) is
//! indexed into a [`CommentIndex`] keyed by `(type name, field name)`.
//! Later lookups against the module are map reads.
//!
//! ## Precedence
//!
//! A field's doc comment (`///` lines or a `/** */` block above it) wins.
//! When there is none, a plain `//` comment trailing the field on the line
//! where its type ends is used instead:
//!
//! ```text
//! /// Address to bind.            <- used
//! endpoint: String, // ignored
//! max_conns: u32,   // used, nothing above
//! ```
//!
//! Comment text is cleaned: delimiters stripped, lines trimmed, blank lines
//! dropped, remaining lines joined with single spaces.
//!
//! ## Failure
//!
//! Lookup is best-effort. A module whose source cannot be located or
//! parsed gets an empty index, cached like any other, so the locator is
//! asked at most once per module.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use proc_macro2::LineColumn;
use syn::ext::IdentExt;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, ExprLit, Fields, Item, Lit, Meta};

use crate::graph::ModuleId;
use crate::locator::SourceLocator;

/// Field documentation for the structs of one module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentIndex {
    entries: HashMap<(String, String), String>,
}

impl CommentIndex {
    /// Index the structs declared in one source file.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `source` is not valid Rust.
    pub fn from_source(source: &str) -> Result<Self, syn::Error> {
        let mut index = Self::default();
        index.add_source(source)?;
        Ok(index)
    }

    /// Index another source file of the same module.
    pub fn add_source(&mut self, source: &str) -> Result<(), syn::Error> {
        let file = syn::parse_file(source)?;
        let lines: Vec<&str> = source.lines().collect();
        self.index_items(&file.items, &lines);
        Ok(())
    }

    fn index_items(&mut self, items: &[Item], lines: &[&str]) {
        for item in items {
            match item {
                Item::Struct(item) => {
                    let Fields::Named(named) = &item.fields else {
                        continue;
                    };
                    let type_name = item.ident.unraw().to_string();
                    for field in &named.named {
                        let Some(ident) = &field.ident else {
                            continue;
                        };
                        let comment = doc_comment(&field.attrs)
                            .or_else(|| trailing_comment(lines, field.ty.span().end()));
                        if let Some(comment) = comment {
                            self.insert(&type_name, &ident.unraw().to_string(), comment);
                        }
                    }
                }
                Item::Mod(module) => {
                    if let Some((_, items)) = &module.content {
                        self.index_items(items, lines);
                    }
                }
                _ => {}
            }
        }
    }

    /// Record documentation for a field. Later entries replace earlier ones.
    pub fn insert(&mut self, type_name: &str, field_name: &str, comment: String) {
        self.entries
            .insert((type_name.to_string(), field_name.to_string()), comment);
    }

    /// Documentation for `type_name.field_name`.
    pub fn get(&self, type_name: &str, field_name: &str) -> Option<&str> {
        self.entries
            .get(&(type_name.to_string(), field_name.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Joined text of the `#[doc = "..."]` attributes `///` comments desugar to.
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let parts: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .collect();
    let cleaned = clean_comment(&parts.join("\n"));
    (!cleaned.is_empty()).then_some(cleaned)
}

/// A `//` comment following the field on the line where its type ends.
fn trailing_comment(lines: &[&str], end: LineColumn) -> Option<String> {
    let line = lines.get(end.line.checked_sub(1)?)?;
    let rest: String = line.chars().skip(end.column).collect();
    let rest = rest.trim_start().trim_start_matches(',').trim_start();
    if !rest.starts_with("//") || rest.starts_with("///") || rest.starts_with("//!") {
        return None;
    }
    let cleaned = clean_comment(rest);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Strip comment delimiters and collapse the text onto one line.
pub fn clean_comment(comment: &str) -> String {
    comment
        .lines()
        .map(|line| {
            let line = line.trim();
            let line = line.strip_prefix("//").unwrap_or(line);
            let line = line.strip_prefix("/*").unwrap_or(line);
            let line = line.strip_suffix("*/").unwrap_or(line).trim();
            // Continuation star of a block comment.
            match line.strip_prefix('*') {
                Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim(),
                _ => line,
            }
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lazily built, cached field documentation per module.
#[derive(Debug)]
pub struct DocExtractor {
    locator: Arc<dyn SourceLocator>,
    cache: RwLock<HashMap<ModuleId, Arc<CommentIndex>>>,
}

impl DocExtractor {
    pub fn new(locator: Arc<dyn SourceLocator>) -> Self {
        Self {
            locator,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Documentation for field `field_name` of struct `type_name` declared
    /// in `module`, or `None`.
    pub fn lookup(&self, module: &ModuleId, type_name: &str, field_name: &str) -> Option<String> {
        self.index(module)
            .get(type_name, field_name)
            .map(str::to_string)
    }

    /// The comment index of `module`, building it on first use.
    ///
    /// Two threads racing on the same unindexed module may both build it;
    /// the first insert wins and both observe the same `Arc` afterwards.
    pub fn index(&self, module: &ModuleId) -> Arc<CommentIndex> {
        if let Some(index) = self.cache.read().get(module) {
            return Arc::clone(index);
        }
        let built = Arc::new(self.build(module));
        let mut cache = self.cache.write();
        Arc::clone(cache.entry(module.clone()).or_insert(built))
    }

    /// Number of modules indexed so far.
    pub fn indexed_modules(&self) -> usize {
        self.cache.read().len()
    }

    fn build(&self, module: &ModuleId) -> CommentIndex {
        let sources = match self.locator.sources(module) {
            Ok(sources) => sources,
            Err(e) => {
                tracing::debug!(module = %module, error = %e, "no source for documentation lookup");
                return CommentIndex::default();
            }
        };

        let mut index = CommentIndex::default();
        for (i, source) in sources.iter().enumerate() {
            if let Err(e) = index.add_source(source) {
                tracing::debug!(module = %module, file = i, error = %e, "skipping unparseable source file");
            }
        }
        tracing::debug!(module = %module, fields = index.len(), "indexed field documentation");
        index
    }
}
