//! Loader type definitions.

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use thiserror::Error;

use crate::catalog::ParseError;
use crate::config::MatcherError;
use crate::store::{
    CatalogHandle,
    LoadedCatalog,
};
use crate::types::normalize_locale;

/// Failure to load one catalog file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    /// The blocking parse task panicked or was cancelled.
    #[error("Loading {} did not complete: {message}", path.display())]
    Task { path: PathBuf, message: String },
}

impl LoadError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::Task { path, .. } => path,
        }
    }
}

/// Failure of the workspace scan itself.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(transparent)]
    Pattern(#[from] MatcherError),

    #[error("Workspace root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// A catalog and the file it came from.
#[derive(Debug, Clone)]
pub struct CatalogFile {
    pub path: PathBuf,
    pub catalog: Arc<LoadedCatalog>,
}

/// Catalogs of a workspace keyed by normalized language.
#[derive(Debug, Default)]
pub struct CatalogSet {
    /// normalized language -> catalog
    catalogs: BTreeMap<String, CatalogFile>,
    /// Files that could not be loaded.
    failures: Vec<LoadError>,
}

impl CatalogSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog. A second file for the same language is ignored with a warning.
    pub fn insert(&mut self, file: CatalogFile) {
        let language = normalize_locale(file.catalog.language());
        if let Some(existing) = self.catalogs.get(&language) {
            tracing::warn!(
                language,
                kept = %existing.path.display(),
                ignored = %file.path.display(),
                "Several catalogs for one language"
            );
            return;
        }
        self.catalogs.insert(language, file);
    }

    pub fn push_failure(&mut self, error: LoadError) {
        self.failures.push(error);
    }

    /// Catalog for `language`; `pt-BR` and `pt_BR` are the same language.
    #[must_use]
    pub fn get(&self, language: &str) -> Option<&CatalogFile> {
        self.catalogs.get(&normalize_locale(language))
    }

    /// Makes the catalog for `language` the active one of `handle`.
    ///
    /// Returns false, leaving `handle` untouched, when no such catalog was loaded.
    pub fn activate(&self, language: &str, handle: &CatalogHandle) -> bool {
        let Some(file) = self.get(language) else {
            tracing::warn!(language, "No catalog for language");
            return false;
        };
        handle.replace_arc(Arc::clone(&file.catalog));
        true
    }

    /// Normalized languages, sorted.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.catalogs.keys().map(String::as_str)
    }

    /// Catalogs sorted by language.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogFile> {
        self.catalogs.values()
    }

    #[must_use]
    pub fn failures(&self) -> &[LoadError] {
        &self.failures
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.catalogs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }
}
