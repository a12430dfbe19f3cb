//! Workspace catalog discovery and loading.
/// Loader type definitions
mod types;
/// File discovery and concurrent loading
mod workspace;

pub use types::{
    CatalogFile,
    CatalogSet,
    LoadError,
    LoaderError,
};
pub use workspace::{
    detect_language,
    find_catalog_files,
    load_catalog_file,
    load_workspace,
};
