//! ts-catalog
//!
//! Qt Linguist TS 翻訳カタログの読み込み・検索・複数形選択・プレースホルダー置換を行うエンジン

pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod index;
pub mod interpolate;
pub mod loader;
pub mod plural;
pub mod resolver;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use catalog::{
    Catalog,
    Message,
    MessageStatus,
    ParseError,
    Translation,
};
pub use interpolate::{
    InterpolationMode,
    Interpolator,
};
pub use plural::{
    PluralRule,
    select_form,
};
pub use resolver::{
    MessageRequest,
    ResolveError,
    Resolver,
    ResolverSettings,
};
pub use store::{
    CatalogHandle,
    LoadedCatalog,
};
