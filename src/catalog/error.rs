use thiserror::Error;

/// Reason a catalog could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Not well-formed XML, or TS elements nested incorrectly.
    #[error("malformed catalog: {0}")]
    Malformed(String),

    /// A `numerus="yes"` message without any `<numerusform>`.
    #[error("plural message '{source_text}' in context '{context}' has no plural forms")]
    MissingPluralForms { context: String, source_text: String },
}

/// Fatal error while loading a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} (at byte {offset})")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset into the input where the problem was detected.
    pub offset: u64,
}

impl ParseError {
    #[must_use]
    pub fn malformed(reason: impl Into<String>, offset: u64) -> Self {
        Self { kind: ParseErrorKind::Malformed(reason.into()), offset }
    }

    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self.kind, ParseErrorKind::Malformed(_))
    }
}
