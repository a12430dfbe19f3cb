//! Catalog quality checks, meant to run at build time.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::catalog::{
    Catalog,
    Context,
    Message,
    MessageRef,
    MessageStatus,
};
use crate::config::{
    DiagnosticsConfig,
    Severity,
};
use crate::index::{
    DuplicateKey,
    IndexKey,
};
use crate::interpolate::placeholders;
use crate::store::LoadedCatalog;
use crate::types::Location;

/// What a diagnostic is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum DiagnosticKind {
    /// Still marked `type="unfinished"`.
    Unfinished,
    /// Defined more than once; `replaced` lost to the reported message.
    DuplicateKey { key: IndexKey, replaced: MessageRef },
    /// Number of `<numerusform>` variants differs from the locale's plural form count.
    PluralFormCount { expected: usize, found: usize },
    /// A translation variant uses other `%N` placeholders than the source.
    #[serde(rename_all = "camelCase")]
    PlaceholderMismatch { variant: usize, missing: Vec<usize>, unexpected: Vec<usize> },
}

impl DiagnosticKind {
    /// Short machine-friendly name.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unfinished => "unfinished",
            Self::DuplicateKey { .. } => "duplicate-key",
            Self::PluralFormCount { .. } => "plural-form-count",
            Self::PlaceholderMismatch { .. } => "placeholder-mismatch",
        }
    }
}

/// One finding about one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub position: MessageRef,
    pub context: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disambiguator: Option<String>,
    /// First `<location>` of the message, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Human readable description.
    pub message: String,
}

impl Diagnostic {
    /// Builds a diagnostic pointing at `message`.
    fn new(
        severity: Severity,
        kind: DiagnosticKind,
        position: MessageRef,
        context: &Context,
        message: &Message,
        text: String,
    ) -> Self {
        Self {
            severity,
            kind,
            position,
            context: context.name.clone(),
            source: message.source.clone(),
            disambiguator: message.disambiguator.clone(),
            location: message.locations.first().cloned(),
            message: text,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(location) = &self.location {
            write!(f, " {location}")?;
        }
        write!(f, " [{}] {}: {}", self.kind.code(), self.context, self.message)
    }
}

/// Messages still marked unfinished, in document order.
pub fn unfinished_messages(
    catalog: &Catalog,
) -> impl Iterator<Item = (MessageRef, &Context, &Message)> {
    catalog.messages().filter(|(_, _, message)| message.status == MessageStatus::Unfinished)
}

/// Keys defined more than once, as recorded while indexing.
#[must_use]
pub fn duplicate_keys(loaded: &LoadedCatalog) -> &[DuplicateKey] {
    loaded.index().duplicates()
}

/// Runs every check enabled in `config`.
///
/// Retired (obsolete, vanished) messages are never reported except as
/// duplicates.
#[must_use]
pub fn collect_diagnostics(loaded: &LoadedCatalog, config: &DiagnosticsConfig) -> Vec<Diagnostic> {
    let catalog = loaded.catalog();
    let mut diagnostics = Vec::new();

    if config.unfinished.is_enabled() {
        diagnostics.extend(unfinished_messages(catalog).map(|(position, context, message)| {
            Diagnostic::new(
                config.unfinished,
                DiagnosticKind::Unfinished,
                position,
                context,
                message,
                format!("'{}' is not translated yet", message.source),
            )
        }));
    }

    for (position, context, message) in catalog.messages() {
        if message.status.is_retired() {
            continue;
        }

        if config.plural_forms.is_enabled() && message.is_plural() {
            let expected = loaded.plural_rule().form_count();
            let found = message.translation.variant_count();
            if expected != found {
                diagnostics.push(Diagnostic::new(
                    config.plural_forms,
                    DiagnosticKind::PluralFormCount { expected, found },
                    position,
                    context,
                    message,
                    format!(
                        "'{}' has {found} plural form(s), '{}' needs {expected}",
                        message.source,
                        loaded.language()
                    ),
                ));
            }
        }

        if config.placeholders.is_enabled()
            && let Some(kind) = placeholder_mismatch(message)
        {
            diagnostics.push(Diagnostic::new(
                config.placeholders,
                kind,
                position,
                context,
                message,
                format!("placeholders of '{}' differ from the translation", message.source),
            ));
        }
    }

    if config.duplicate_keys.is_enabled() {
        for duplicate in duplicate_keys(loaded) {
            let Some((context, message)) = catalog.message(duplicate.winner) else {
                continue;
            };
            diagnostics.push(Diagnostic::new(
                config.duplicate_keys,
                DiagnosticKind::DuplicateKey {
                    key: duplicate.key.clone(),
                    replaced: duplicate.replaced,
                },
                duplicate.winner,
                context,
                message,
                format!("{} is defined more than once, the last definition wins", duplicate.key),
            ));
        }
    }

    tracing::debug!(language = %loaded.language(), count = diagnostics.len(), "Collected diagnostics");
    diagnostics
}

/// First non-empty variant whose placeholders differ from the source's.
fn placeholder_mismatch(message: &Message) -> Option<DiagnosticKind> {
    let expected = placeholders(&message.source);

    message.translation.variants().enumerate().filter(|(_, text)| !text.is_empty()).find_map(
        |(variant, text)| {
            let found = placeholders(text);
            if found == expected {
                return None;
            }
            Some(DiagnosticKind::PlaceholderMismatch {
                variant,
                missing: difference(&expected, &found),
                unexpected: difference(&found, &expected),
            })
        },
    )
}

/// Elements of `a` not in `b`, ascending.
fn difference(a: &BTreeSet<usize>, b: &BTreeSet<usize>) -> Vec<usize> {
    a.difference(b).copied().collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::{
        fixture,
        rstest,
    };

    use super::*;
    use crate::test_utils::loaded_catalog;

    #[fixture]
    fn russian() -> LoadedCatalog {
        let mut located = Message::new("Draft", "").with_status(MessageStatus::Unfinished);
        located.locations = vec![Location::new("src/main.cpp", Some(12))];

        loaded_catalog(
            "ru",
            vec![Context::new(
                "GMainWindow",
                vec![
                    located,
                    Message::plural("%n file(s)", vec!["%n файл".to_string(), "%n файла".to_string()]),
                    Message::new("%1 of %2", "%2 из %3"),
                    Message::new("Speed: %1", "Скорость: %1"),
                    Message::new("Old %1", "Старый").with_status(MessageStatus::Obsolete),
                    Message::new("Cancel", "Отмена"),
                    Message::new("Cancel", "Отменить"),
                ],
            )],
        )
    }

    #[rstest]
    #[googletest::test]
    fn test_collect_diagnostics(russian: LoadedCatalog) {
        let diagnostics = collect_diagnostics(&russian, &DiagnosticsConfig::default());

        let kinds: Vec<&str> = diagnostics.iter().map(|d| d.kind.code()).collect();
        assert_eq!(
            kinds,
            vec!["unfinished", "plural-form-count", "placeholder-mismatch", "duplicate-key"]
        );

        expect_that!(diagnostics[0].severity, eq(Severity::Warning));
        expect_that!(diagnostics[0].location, some(eq(&Location::new("src/main.cpp", Some(12)))));
        expect_that!(
            diagnostics[1].kind,
            eq(&DiagnosticKind::PluralFormCount { expected: 3, found: 2 })
        );
        expect_that!(diagnostics[1].severity, eq(Severity::Error));
        expect_that!(
            diagnostics[2].kind,
            eq(&DiagnosticKind::PlaceholderMismatch { variant: 0, missing: vec![1], unexpected: vec![3] })
        );
        expect_that!(diagnostics[3].position, eq(MessageRef { context: 0, message: 6 }));
    }

    #[rstest]
    #[googletest::test]
    fn test_disabled_checks(russian: LoadedCatalog) {
        let config = DiagnosticsConfig {
            unfinished: Severity::Off,
            duplicate_keys: Severity::Off,
            plural_forms: Severity::Off,
            placeholders: Severity::Info,
        };

        let diagnostics = collect_diagnostics(&russian, &config);

        expect_that!(diagnostics.len(), eq(1));
        expect_that!(diagnostics[0].severity, eq(Severity::Info));
    }

    #[rstest]
    #[googletest::test]
    fn test_unfinished_messages_and_duplicates(russian: LoadedCatalog) {
        let sources: Vec<&str> =
            unfinished_messages(russian.catalog()).map(|(_, _, m)| m.source.as_str()).collect();

        assert_eq!(sources, vec!["Draft"]);
        expect_that!(duplicate_keys(&russian).len(), eq(1));
    }

    #[rstest]
    #[googletest::test]
    fn test_diagnostic_display_and_json(russian: LoadedCatalog) {
        let diagnostics = collect_diagnostics(&russian, &DiagnosticsConfig::default());

        expect_that!(
            diagnostics[0].to_string(),
            eq("warning src/main.cpp:12 [unfinished] GMainWindow: 'Draft' is not translated yet")
        );

        let json = serde_json::to_value(&diagnostics[1]).unwrap();
        expect_that!(json["severity"], eq(&serde_json::json!("error")));
        expect_that!(json["kind"]["type"], eq(&serde_json::json!("pluralFormCount")));
        expect_that!(json["kind"]["expected"], eq(&serde_json::json!(3)));
        expect_that!(json.get("disambiguator"), none());
    }
}
