//! Glob matching for catalog file discovery.

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};

use super::CatalogFilesConfig;

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid include pattern '{pattern}': {source}")]
    InvalidIncludePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid exclude pattern '{pattern}': {source}")]
    InvalidExcludePattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// Decides which files under a workspace are catalogs.
#[derive(Debug, Clone)]
pub struct CatalogFileMatcher {
    /// Patterns are matched against paths relative to this directory.
    workspace_root: PathBuf,
    /// `catalogFiles.includePatterns`
    include_set: GlobSet,
    /// `catalogFiles.excludePatterns`
    exclude_set: GlobSet,
}

impl CatalogFileMatcher {
    /// Compiles the patterns of `config`.
    ///
    /// # Errors
    /// The first pattern that is not a valid glob.
    pub fn new(workspace_root: PathBuf, config: &CatalogFilesConfig) -> Result<Self, MatcherError> {
        let include_set = Self::build_glob_set(&config.include_patterns, |pattern, source| {
            MatcherError::InvalidIncludePattern { pattern, source }
        })?;

        let exclude_set = Self::build_glob_set(&config.exclude_patterns, |pattern, source| {
            MatcherError::InvalidExcludePattern { pattern, source }
        })?;

        Ok(Self { workspace_root, include_set, exclude_set })
    }

    /// Builds one set from `patterns`, mapping glob errors with `make_error`.
    fn build_glob_set<F>(patterns: &[String], make_error: F) -> Result<GlobSet, MatcherError>
    where
        F: Fn(String, globset::Error) -> MatcherError,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| make_error(pattern.clone(), e))?;
            builder.add(glob);
        }
        Ok(builder.build()?)
    }

    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Returns true if the absolute path, taken relative to the workspace root,
    /// is a catalog file.
    #[must_use]
    pub fn is_catalog_file(&self, absolute_path: &Path) -> bool {
        absolute_path
            .strip_prefix(&self.workspace_root)
            .is_ok_and(|relative_path| self.is_catalog_file_relative(relative_path))
    }

    /// Returns true if the path matches an include pattern and no exclude pattern.
    #[must_use]
    pub fn is_catalog_file_relative(&self, relative_path: &Path) -> bool {
        self.include_set.is_match(relative_path) && !self.exclude_set.is_match(relative_path)
    }
}
