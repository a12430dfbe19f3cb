//! In-memory representation of a TS catalog.

use std::fmt;

use serde::Serialize;

use crate::types::Location;

/// Translation state of a message, taken from `<translation type="...">`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// No `type` attribute: the translation is final.
    #[default]
    Translated,
    /// `type="unfinished"`: flagged incomplete by the catalog tooling.
    Unfinished,
    /// `type="obsolete"`: the source string no longer exists in the application.
    Obsolete,
    /// `type="vanished"`: newer spelling of obsolete.
    Vanished,
}

impl MessageStatus {
    /// Parses the `type` attribute value. Unknown values are treated as translated.
    #[must_use]
    pub fn from_type_attribute(value: &str) -> Self {
        match value {
            "unfinished" => Self::Unfinished,
            "obsolete" => Self::Obsolete,
            "vanished" => Self::Vanished,
            other => {
                if !other.is_empty() {
                    tracing::debug!(value = other, "Unknown translation type, treating as translated");
                }
                Self::Translated
            }
        }
    }

    /// Value written back to the `type` attribute, `None` for translated messages.
    #[must_use]
    pub const fn type_attribute(self) -> Option<&'static str> {
        match self {
            Self::Translated => None,
            Self::Unfinished => Some("unfinished"),
            Self::Obsolete => Some("obsolete"),
            Self::Vanished => Some("vanished"),
        }
    }

    /// Obsolete and vanished messages are never shown to the user.
    #[must_use]
    pub const fn is_retired(self) -> bool {
        matches!(self, Self::Obsolete | Self::Vanished)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_attribute().unwrap_or("translated"))
    }
}

/// Translated text of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "text")]
pub enum Translation {
    /// A single translated string.
    Single(String),
    /// Plural variants ordered by plural-form rank of the catalog's locale.
    Plural(Vec<String>),
}

impl Default for Translation {
    fn default() -> Self {
        Self::Single(String::new())
    }
}

impl Translation {
    #[must_use]
    pub const fn is_plural(&self) -> bool {
        matches!(self, Self::Plural(_))
    }

    /// Number of variants (1 for a single translation).
    #[must_use]
    pub fn variant_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Plural(forms) => forms.len(),
        }
    }

    /// Iterates over every variant text.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::Single(text) => std::slice::from_ref(text),
            Self::Plural(forms) => forms,
        };
        slice.iter().map(String::as_str)
    }

    /// True when every variant is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants().all(str::is_empty)
    }
}

/// The atomic translatable unit.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Untranslated text, part of the lookup key.
    pub source: String,

    /// `<comment>` distinguishing identical sources in one context.
    pub disambiguator: Option<String>,

    /// Optional stable identifier (`<message id="...">`).
    pub id: Option<String>,

    pub translation: Translation,
    pub status: MessageStatus,

    /// Advisory source references, never used for lookup.
    pub locations: Vec<Location>,

    /// `<oldsource>`: previous source text kept by the extraction tooling.
    pub old_source: Option<String>,

    /// `<extracomment>`: developer note for translators.
    pub extra_comment: Option<String>,

    /// `<translatorcomment>`: translator's own note.
    pub translator_comment: Option<String>,
}

impl Message {
    /// Creates a translated, non-plural message.
    #[must_use]
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: Translation::Single(translation.into()),
            ..Self::default()
        }
    }

    /// Creates a translated plural message.
    #[must_use]
    pub fn plural(source: impl Into<String>, forms: Vec<String>) -> Self {
        Self { source: source.into(), translation: Translation::Plural(forms), ..Self::default() }
    }

    #[must_use]
    pub fn with_disambiguator(mut self, disambiguator: impl Into<String>) -> Self {
        self.disambiguator = Some(disambiguator.into());
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub const fn is_plural(&self) -> bool {
        self.translation.is_plural()
    }
}

/// A named group of messages, typically one dialog or widget class.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Context {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Context {
    #[must_use]
    pub fn new(name: impl Into<String>, messages: Vec<Message>) -> Self {
        Self { name: name.into(), messages }
    }
}

/// All messages of one locale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Target locale (`language` attribute). Empty when the file does not declare one.
    pub language: String,

    /// Locale of the source texts (`sourcelanguage` attribute).
    pub source_language: Option<String>,

    /// TS format version (`version` attribute).
    pub version: Option<String>,

    pub contexts: Vec<Context>,
}

/// Position of a message inside a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MessageRef {
    pub context: usize,
    pub message: usize,
}

impl Catalog {
    /// Creates an empty catalog for the given locale.
    #[must_use]
    pub fn empty(language: impl Into<String>) -> Self {
        Self { language: language.into(), ..Self::default() }
    }

    /// Resolves a [`MessageRef`] produced by an index over this catalog.
    #[must_use]
    pub fn message(&self, position: MessageRef) -> Option<(&Context, &Message)> {
        let context = self.contexts.get(position.context)?;
        let message = context.messages.get(position.message)?;
        Some((context, message))
    }

    /// Iterates over every message with its context and position, in document order.
    pub fn messages(&self) -> impl Iterator<Item = (MessageRef, &Context, &Message)> {
        self.contexts.iter().enumerate().flat_map(|(context_index, context)| {
            context.messages.iter().enumerate().map(move |(message_index, message)| {
                (MessageRef { context: context_index, message: message_index }, context, message)
            })
        })
    }

    /// Total number of messages across all contexts.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|context| context.messages.len()).sum()
    }
}
