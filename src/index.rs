//! Message lookup table built once per catalog load.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use serde::Serialize;

use crate::catalog::{
    Catalog,
    Message,
    MessageRef,
};

/// Identity of a message: `(context, source, disambiguator)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MessageKey {
    pub context: String,
    pub source: String,
    pub disambiguator: Option<String>,
}

impl MessageKey {
    #[must_use]
    pub fn new(context: &str, message: &Message) -> Self {
        Self {
            context: context.to_string(),
            source: message.source.clone(),
            disambiguator: normalize_disambiguator(message.disambiguator.as_deref())
                .map(str::to_string),
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{:?}", self.context, self.source)?;
        if let Some(disambiguator) = &self.disambiguator {
            write!(f, " ({disambiguator})")?;
        }
        Ok(())
    }
}

/// Key under which a duplicate was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum IndexKey {
    Message(MessageKey),
    Id(String),
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(key) => key.fmt(f),
            Self::Id(id) => write!(f, "id {id:?}"),
        }
    }
}

/// A key that appeared more than once. The later entry won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub key: IndexKey,
    pub replaced: MessageRef,
    pub winner: MessageRef,
}

/// Messages sharing one source text inside a context.
#[derive(Debug, Default)]
struct SourceEntry {
    /// Entry without a disambiguator.
    plain: Option<MessageRef>,
    /// Entries keyed by disambiguator.
    disambiguated: HashMap<String, MessageRef>,
}

/// Hash index over a [`Catalog`].
///
/// Maps are nested (`context -> source -> disambiguator`) so lookups work on
/// borrowed strings. Duplicate keys resolve to the last entry in document
/// order and are recorded in [`MessageIndex::duplicates`]; merge tooling
/// occasionally produces them and a UI string table should still load.
///
/// An empty disambiguator is the same key as no disambiguator.
#[derive(Debug, Default)]
pub struct MessageIndex {
    /// context -> source -> entry
    contexts: HashMap<String, HashMap<String, SourceEntry>>,
    /// `id` attribute -> message
    ids: HashMap<String, MessageRef>,
    /// Keys seen more than once, in document order.
    duplicates: Vec<DuplicateKey>,
    /// Distinct keys in `contexts`.
    len: usize,
}

impl MessageIndex {
    /// Index every message of the catalog.
    #[must_use]
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = Self::default();

        for (position, context, message) in catalog.messages() {
            index.insert(position, &context.name, message);
        }

        tracing::debug!(
            keys = index.len,
            ids = index.ids.len(),
            duplicates = index.duplicates.len(),
            "Built message index"
        );
        index
    }

    /// Adds one message, replacing any earlier entry with the same key.
    fn insert(&mut self, position: MessageRef, context: &str, message: &Message) {
        let entry = self
            .contexts
            .entry(context.to_string())
            .or_default()
            .entry(message.source.clone())
            .or_default();

        let replaced = match normalize_disambiguator(message.disambiguator.as_deref()) {
            None => entry.plain.replace(position),
            Some(disambiguator) => entry.disambiguated.insert(disambiguator.to_string(), position),
        };

        match replaced {
            Some(replaced) => {
                let key = MessageKey::new(context, message);
                tracing::warn!(%key, ?replaced, winner = ?position, "Duplicate message key, last entry wins");
                self.duplicates.push(DuplicateKey {
                    key: IndexKey::Message(key),
                    replaced,
                    winner: position,
                });
            }
            None => self.len += 1,
        }

        if let Some(id) = message.id.as_deref().filter(|id| !id.is_empty()) {
            match self.ids.entry(id.to_string()) {
                Entry::Occupied(mut occupied) => {
                    let replaced = occupied.insert(position);
                    tracing::warn!(id, ?replaced, winner = ?position, "Duplicate message id, last entry wins");
                    self.duplicates.push(DuplicateKey {
                        key: IndexKey::Id(id.to_string()),
                        replaced,
                        winner: position,
                    });
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(position);
                }
            }
        }
    }

    /// Look up a message by its identity key.
    #[must_use]
    pub fn find(
        &self,
        context: &str,
        source: &str,
        disambiguator: Option<&str>,
    ) -> Option<MessageRef> {
        let entry = self.contexts.get(context)?.get(source)?;
        match normalize_disambiguator(disambiguator) {
            None => entry.plain,
            Some(disambiguator) => entry.disambiguated.get(disambiguator).copied(),
        }
    }

    /// Look up a message by its `id` attribute.
    #[must_use]
    pub fn find_id(&self, id: &str) -> Option<MessageRef> {
        self.ids.get(id).copied()
    }

    /// Keys that occurred more than once, in document order.
    #[must_use]
    pub fn duplicates(&self) -> &[DuplicateKey] {
        &self.duplicates
    }

    /// Number of distinct `(context, source, disambiguator)` keys.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Empty disambiguators count as absent.
fn normalize_disambiguator(disambiguator: Option<&str>) -> Option<&str> {
    disambiguator.filter(|value| !value.is_empty())
}
