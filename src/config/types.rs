use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::interpolate::InterpolationMode;
use crate::resolver::{
    ResolverSettings,
    UnfinishedPolicy,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "catalogFiles.includePatterns[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbered list, one error per line.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Contents of `.ts-catalog.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    pub catalog_files: CatalogFilesConfig,

    /// Language the source texts are written in. Loaded catalogs without a
    /// `sourcelanguage` attribute get this one.
    pub source_language: String,

    pub unfinished: UnfinishedPolicy,
    pub interpolation: InterpolationMode,

    pub loading: LoadingConfig,
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogFilesConfig {
    /// Globs relative to the workspace root.
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
}

impl Default for CatalogFilesConfig {
    fn default() -> Self {
        Self {
            include_patterns: vec![
                "**/languages/*.ts".to_string(),
                "**/translations/*.ts".to_string(),
            ],
            exclude_patterns: vec!["node_modules/**".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadingConfig {
    /// Parallel catalog loads.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

/// Severity of a catalog diagnostic. `Off` disables the check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Off,
    Info,
    Warning,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosticsConfig {
    /// Messages still marked `type="unfinished"`.
    pub unfinished: Severity,
    /// The same key defined twice.
    pub duplicate_keys: Severity,
    /// Plural messages whose form count differs from the locale's.
    pub plural_forms: Severity,
    /// Translations using different `%N` placeholders than their source.
    pub placeholders: Severity,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            unfinished: Severity::Warning,
            duplicate_keys: Severity::Warning,
            plural_forms: Severity::Error,
            placeholders: Severity::Warning,
        }
    }
}

impl EngineSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern
    /// - Zero loading threads
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.catalog_files.include_patterns.is_empty() {
            errors.push(ValidationError::new(
                "catalogFiles.includePatterns",
                "At least one pattern is required. Example: [\"**/languages/*.ts\"]",
            ));
        }

        for (index, pattern) in self.catalog_files.include_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("catalogFiles.includePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        for (index, pattern) in self.catalog_files.exclude_patterns.iter().enumerate() {
            if let Err(e) = globset::Glob::new(pattern) {
                errors.push(ValidationError::new(
                    format!("catalogFiles.excludePatterns[{index}]"),
                    format!("Invalid glob pattern '{pattern}': {e}"),
                ));
            }
        }

        if self.source_language.trim().is_empty() {
            errors.push(ValidationError::new(
                "sourceLanguage",
                "The source language cannot be empty. Example: \"en\"",
            ));
        }

        if self.loading.num_threads == Some(0) {
            errors.push(ValidationError::new(
                "loading.numThreads",
                "Must be at least 1. Remove this field to use 80% of CPU cores",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Settings for [`crate::resolver::Resolver`].
    #[must_use]
    pub const fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings { unfinished: self.unfinished, interpolation: self.interpolation }
    }

    /// Number of catalogs loaded in parallel.
    #[must_use]
    pub fn num_threads(&self) -> usize {
        self.loading.num_threads.unwrap_or_else(|| (num_cpus::get() * 4 / 5).max(1))
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            catalog_files: CatalogFilesConfig::default(),
            source_language: "en".to_string(),
            unfinished: UnfinishedPolicy::default(),
            interpolation: InterpolationMode::default(),
            loading: LoadingConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
        }
    }
}
