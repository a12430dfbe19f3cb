//! Loaded catalogs and the swappable active-catalog handle.

use std::sync::{
    Arc,
    LazyLock,
    PoisonError,
    RwLock,
};

use crate::catalog::{
    self,
    Catalog,
    Message,
    ParseError,
};
use crate::index::MessageIndex;
use crate::plural::PluralRule;

/// A parsed catalog together with everything derived from it at load time.
///
/// Immutable once built; share it through an [`Arc`].
#[derive(Debug)]
pub struct LoadedCatalog {
    /// Parsed catalog.
    catalog: Catalog,
    /// Built from `catalog`, positions refer into it.
    index: MessageIndex,
    /// Plural rule of `catalog.language`.
    plural_rule: PluralRule,
}

impl LoadedCatalog {
    /// Indexes `catalog` and looks up its plural rule.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let index = MessageIndex::build(&catalog);
        let plural_rule = PluralRule::for_locale_or_default(&catalog.language);
        tracing::debug!(
            language = %catalog.language,
            messages = catalog.message_count(),
            ?plural_rule,
            "Loaded catalog"
        );
        Self { catalog, index, plural_rule }
    }

    /// Parses TS bytes and builds the index.
    ///
    /// # Errors
    /// Any [`ParseError`] from the parser. Nothing is built in that case.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParseError> {
        catalog::parse(bytes).map(Self::new)
    }

    /// A catalog with no messages; every lookup falls back to the source text.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Catalog::default())
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn index(&self) -> &MessageIndex {
        &self.index
    }

    #[must_use]
    pub const fn plural_rule(&self) -> PluralRule {
        self.plural_rule
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.catalog.language
    }

    /// Finds a message by `(context, source, disambiguator)`.
    #[must_use]
    pub fn lookup(
        &self,
        context: &str,
        source: &str,
        disambiguator: Option<&str>,
    ) -> Option<&Message> {
        let position = self.index.find(context, source, disambiguator)?;
        self.catalog.message(position).map(|(_, message)| message)
    }

    /// Finds a message by its id.
    #[must_use]
    pub fn lookup_id(&self, id: &str) -> Option<&Message> {
        let position = self.index.find_id(id)?;
        self.catalog.message(position).map(|(_, message)| message)
    }
}

impl Default for LoadedCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

/// Holder of the currently active catalog.
///
/// Readers take a snapshot with [`CatalogHandle::current`] and keep using it
/// for as long as they like; a swap never mutates a catalog someone holds.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    /// Active catalog.
    current: RwLock<Arc<LoadedCatalog>>,
}

impl CatalogHandle {
    #[must_use]
    pub fn new(catalog: LoadedCatalog) -> Self {
        Self { current: RwLock::new(Arc::new(catalog)) }
    }

    /// Snapshot of the active catalog.
    #[must_use]
    pub fn current(&self) -> Arc<LoadedCatalog> {
        // The lock only guards a pointer swap, so a poisoned lock still holds a valid Arc.
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Makes `catalog` active and returns the previous one.
    pub fn replace(&self, catalog: LoadedCatalog) -> Arc<LoadedCatalog> {
        self.replace_arc(Arc::new(catalog))
    }

    /// Like [`CatalogHandle::replace`] for an already shared catalog.
    pub fn replace_arc(&self, catalog: Arc<LoadedCatalog>) -> Arc<LoadedCatalog> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(from = %current.language(), to = %catalog.language(), "Switching catalog");
        std::mem::replace(&mut *current, catalog)
    }

    /// Parses `bytes` and, only on success, makes the result active.
    ///
    /// On error the previously active catalog stays in place.
    ///
    /// # Errors
    /// The [`ParseError`] of the rejected input.
    pub fn load(&self, bytes: &[u8]) -> Result<Arc<LoadedCatalog>, ParseError> {
        let loaded = match LoadedCatalog::from_bytes(bytes) {
            Ok(loaded) => Arc::new(loaded),
            Err(error) => {
                tracing::warn!(%error, "Rejected catalog, keeping the active one");
                return Err(error);
            }
        };
        self.replace_arc(Arc::clone(&loaded));
        Ok(loaded)
    }
}

/// Process-wide catalog handle, starting out empty.
static ACTIVE: LazyLock<CatalogHandle> = LazyLock::new(CatalogHandle::default);

/// The process-wide handle, for callers that do not thread a catalog through.
#[must_use]
pub fn active() -> &'static CatalogHandle {
    &ACTIVE
}
