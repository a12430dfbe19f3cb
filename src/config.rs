//! Workspace configuration (`.ts-catalog.json`).
/// Config file loader
mod loader;
/// Configuration manager
mod manager;
/// Catalog file pattern matcher
mod matcher;
/// Configuration types and settings
mod types;

pub use loader::CONFIG_FILE_NAME;
pub use manager::ConfigManager;
pub use matcher::{
    CatalogFileMatcher,
    MatcherError,
};
pub use types::{
    CatalogFilesConfig,
    ConfigError,
    DiagnosticsConfig,
    EngineSettings,
    LoadingConfig,
    Severity,
    ValidationError,
};
