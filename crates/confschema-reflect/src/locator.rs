//! # Module Source Locators
//!
//! Documentation extraction needs the source text of the module declaring
//! a type. Finding it is delegated to a [`SourceLocator`] so the extractor
//! can run against canned text in tests and against real crates on disk in
//! generators.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::graph::ModuleId;

/// Resolves a module to the source text of the files that declare it.
pub trait SourceLocator: Send + Sync + fmt::Debug {
    /// Source texts for `module`. A module may span several files.
    ///
    /// # Errors
    ///
    /// `SourceError` when no source is available. Callers treat this as
    /// "no documentation", never as a failure.
    fn sources(&self, module: &ModuleId) -> Result<Vec<String>, SourceError>;
}

/// Serves source text registered up front.
#[derive(Debug, Clone, Default)]
pub struct StaticSourceLocator {
    sources: HashMap<ModuleId, Vec<String>>,
}

impl StaticSourceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `source` for `module`, builder style.
    pub fn with_source(mut self, module: impl Into<ModuleId>, source: impl Into<String>) -> Self {
        self.insert(module, source);
        self
    }

    /// Register another source file for `module`.
    pub fn insert(&mut self, module: impl Into<ModuleId>, source: impl Into<String>) {
        self.sources.entry(module.into()).or_default().push(source.into());
    }
}

impl SourceLocator for StaticSourceLocator {
    fn sources(&self, module: &ModuleId) -> Result<Vec<String>, SourceError> {
        self.sources
            .get(module)
            .cloned()
            .ok_or_else(|| SourceError::Unresolvable {
                module: module.to_string(),
                reason: "no source registered".to_string(),
            })
    }
}

/// Resolves modules of registered crates to files under their `src/`
/// directory, following the compiler's module file layout:
///
/// - `mycrate` → `src/lib.rs` or `src/main.rs`
/// - `mycrate::config::grpc` → `src/config/grpc.rs` or `src/config/grpc/mod.rs`
///
/// Standard library modules and unregistered crates are unresolvable.
/// Modules declared inline (`mod x { ... }`) are found by indexing the
/// enclosing file, which the extractor does on its own.
#[derive(Debug, Clone, Default)]
pub struct CrateSourceLocator {
    crates: HashMap<String, PathBuf>,
}

impl CrateSourceLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a crate's source directory. Dashes in the crate name are
    /// normalized to underscores, as in paths.
    pub fn with_crate(mut self, crate_name: &str, src_dir: impl Into<PathBuf>) -> Self {
        self.crates.insert(crate_name.replace('-', "_"), src_dir.into());
        self
    }

    /// Candidate files for `module`, most specific first.
    fn candidates(&self, module: &ModuleId) -> Result<Vec<PathBuf>, SourceError> {
        let unresolvable = |reason: &str| SourceError::Unresolvable {
            module: module.to_string(),
            reason: reason.to_string(),
        };

        if module.is_builtin() {
            return Err(unresolvable("standard library sources are not indexed"));
        }
        let src = self
            .crates
            .get(module.crate_name())
            .ok_or_else(|| unresolvable("crate is not registered"))?;

        let segments: Vec<&str> = module.submodules().collect();
        let Some((last, parents)) = segments.split_last() else {
            return Ok(vec![src.join("lib.rs"), src.join("main.rs")]);
        };
        let dir = parents.iter().fold(src.to_path_buf(), |dir, s| dir.join(s));
        Ok(vec![dir.join(format!("{last}.rs")), dir.join(last).join("mod.rs")])
    }
}

fn read_source(path: &Path) -> Result<String, SourceError> {
    std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })
}

impl SourceLocator for CrateSourceLocator {
    fn sources(&self, module: &ModuleId) -> Result<Vec<String>, SourceError> {
        let candidates = self.candidates(module)?;
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => Ok(vec![read_source(path)?]),
            None => Err(SourceError::Unresolvable {
                module: module.to_string(),
                reason: format!(
                    "none of {} exist",
                    candidates
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_locator_accumulates_files() {
        let mut locator = StaticSourceLocator::new().with_source("a::b", "struct A;");
        locator.insert("a::b", "struct B;");
        assert_eq!(locator.sources(&ModuleId::new("a::b")).unwrap().len(), 2);
        assert!(locator.sources(&ModuleId::new("a::c")).is_err());
    }

    #[test]
    fn test_crate_locator_resolves_layouts() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path();
        std::fs::write(src.join("lib.rs"), "pub mod config;").unwrap();
        std::fs::create_dir_all(src.join("config").join("grpc")).unwrap();
        std::fs::write(src.join("config.rs"), "pub struct Config;").unwrap();
        std::fs::write(src.join("config").join("grpc").join("mod.rs"), "pub struct Grpc;").unwrap();

        let locator = CrateSourceLocator::new().with_crate("my-receiver", src);
        let root = locator.sources(&ModuleId::new("my_receiver")).unwrap();
        assert_eq!(root, vec!["pub mod config;".to_string()]);

        let config = locator.sources(&ModuleId::new("my_receiver::config")).unwrap();
        assert_eq!(config, vec!["pub struct Config;".to_string()]);

        let grpc = locator.sources(&ModuleId::new("my_receiver::config::grpc")).unwrap();
        assert_eq!(grpc, vec!["pub struct Grpc;".to_string()]);
    }

    #[test]
    fn test_crate_locator_rejects_builtin_and_unknown() {
        let locator = CrateSourceLocator::new().with_crate("mine", "/nonexistent");
        assert!(matches!(
            locator.sources(&ModuleId::new("std::time")),
            Err(SourceError::Unresolvable { .. })
        ));
        assert!(matches!(
            locator.sources(&ModuleId::new("theirs::config")),
            Err(SourceError::Unresolvable { .. })
        ));
        assert!(matches!(
            locator.sources(&ModuleId::new("mine::missing")),
            Err(SourceError::Unresolvable { .. })
        ));
    }
}
