//! Core types used throughout the project.

use std::fmt;

use serde::Serialize;

/// A source reference attached to a message (`<location filename=".." line=".."/>`).
///
/// Only tooling reads these; lookups never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    pub filename: String,
    /// 1-indexed line, `None` when the catalog gives no line.
    pub line: Option<u32>,
}

impl Location {
    #[must_use]
    pub fn new(filename: impl Into<String>, line: Option<u32>) -> Self {
        Self { filename: filename.into(), line }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{line}", self.filename),
            None => f.write_str(&self.filename),
        }
    }
}

/// Normalize a locale identifier (lowercase, `-` replaced with `_`).
///
/// `pt-BR`, `pt_BR` and `PT_br` all normalize to `pt_br`.
#[must_use]
pub fn normalize_locale(locale: &str) -> String {
    locale.trim().to_lowercase().replace('-', "_")
}

/// Primary language subtag of a locale identifier (`zh_TW` -> `zh`).
#[must_use]
pub fn primary_language(locale: &str) -> &str {
    locale.split(['_', '-', '.', '@']).next().unwrap_or(locale)
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::plain("fr", "fr")]
    #[case::hyphen("pt-BR", "pt_br")]
    #[case::underscore("zh_TW", "zh_tw")]
    #[case::padded(" ja_JP ", "ja_jp")]
    fn test_normalize_locale(#[case] input: &str, #[case] expected: &str) {
        assert_that!(normalize_locale(input), eq(expected));
    }

    #[rstest]
    #[case::plain("da", "da")]
    #[case::region("zh_TW", "zh")]
    #[case::hyphen("pt-PT", "pt")]
    #[case::codeset("de_DE.UTF-8", "de")]
    fn test_primary_language(#[case] input: &str, #[case] expected: &str) {
        assert_that!(primary_language(input), eq(expected));
    }

    #[rstest]
    #[case::with_line(Location::new("main.cpp", Some(2214)), "main.cpp:2214")]
    #[case::without_line(Location::new("aboutdialog.ui", None), "aboutdialog.ui")]
    fn test_location_display(#[case] location: Location, #[case] expected: &str) {
        assert_that!(location.to_string(), eq(expected));
    }
}
