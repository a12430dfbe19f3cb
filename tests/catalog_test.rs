//! 公開 API を通したカタログの読み込み・解決のテスト

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(missing_docs)]

use googletest::prelude::*;
use pretty_assertions::assert_eq;
use rstest::{
    fixture,
    rstest,
};
use ts_catalog::catalog::{
    self,
    MessageStatus,
};
use ts_catalog::types::Location;
use ts_catalog::{
    LoadedCatalog,
    MessageRequest,
    ResolveError,
    Resolver,
};

const FR_SAMPLE: &str = include_str!("fixtures/fr_sample.ts");

#[fixture]
fn french() -> LoadedCatalog {
    LoadedCatalog::from_bytes(FR_SAMPLE.as_bytes()).unwrap()
}

fn resolve(catalog: &LoadedCatalog, request: &MessageRequest<'_>) -> Result<String, ResolveError> {
    Resolver::default().resolve(catalog, request)
}

#[rstest]
fn test_fixture_is_parsed(french: LoadedCatalog) {
    let catalog = french.catalog();

    assert_eq!(catalog.language, "fr");
    assert_eq!(catalog.source_language.as_deref(), Some("en_US"));
    assert_eq!(catalog.contexts.len(), 2);
    assert_eq!(catalog.message_count(), 9);

    let cancel = french.lookup("GMainWindow", "Cancel", None).unwrap();
    assert_eq!(
        cancel.locations,
        vec![
            Location::new("../../src/yuzu/main.cpp", Some(1430)),
            Location::new("../../src/yuzu/main.cpp", Some(1442)),
        ]
    );
}

#[rstest]
#[case::translated("GMainWindow", "Cancel", None, "Annuler")]
#[case::other_context("ConfigureDialog", "Cancel", None, "Abandonner")]
#[case::unknown_context("AboutDialog", "Cancel", None, "Cancel")]
#[case::unfinished("GMainWindow", "Start", None, "Start")]
#[case::obsolete("GMainWindow", "Fullscreen", None, "Fullscreen")]
#[case::escaped("GMainWindow", "&Quit", None, "&Quitter")]
#[case::disambiguated("GMainWindow", "%1%", Some("Speed percentage"), "%1 pour cent")]
fn test_resolve_template(
    french: LoadedCatalog,
    #[case] context: &str,
    #[case] source: &str,
    #[case] disambiguator: Option<&str>,
    #[case] expected: &str,
) {
    let mut request = MessageRequest::new(context, source);
    if let Some(disambiguator) = disambiguator {
        request = request.disambiguator(disambiguator);
    }

    assert_eq!(Resolver::default().template(&french, &request).unwrap(), expected);
}

#[rstest]
fn test_disambiguators_select_different_translations(french: LoadedCatalog) {
    let args = ["50"];
    let volume = MessageRequest::new("GMainWindow", "%1%")
        .disambiguator("Volume percentage (e.g. 50%)")
        .args(&args);
    let speed = MessageRequest::new("GMainWindow", "%1%").disambiguator("Speed percentage").args(&args);
    let plain = MessageRequest::new("GMainWindow", "%1%").args(&args);

    assert_eq!(resolve(&french, &volume).unwrap(), "50 %");
    assert_eq!(resolve(&french, &speed).unwrap(), "50 pour cent");
    assert_eq!(resolve(&french, &plain).unwrap(), "50%");
}

#[rstest]
#[case(0, "0 fichier restant")]
#[case(1, "1 fichier restant")]
#[case(2, "2 fichiers restants")]
#[case(1000, "1000 fichiers restants")]
fn test_plural_resolution(french: LoadedCatalog, #[case] count: u64, #[case] expected: &str) {
    let request = MessageRequest::new("GMainWindow", "%n file(s) remaining").count(count);

    assert_eq!(resolve(&french, &request).unwrap(), expected);
}

#[rstest]
fn test_placeholders_and_idempotence(french: LoadedCatalog) {
    let args = ["3", "10"];
    let request = MessageRequest::new("GMainWindow", "Loading %1 of %2").args(&args);

    let first = resolve(&french, &request).unwrap();
    let second = resolve(&french, &request).unwrap();

    assert_eq!(first, "Chargement 3 sur 10");
    assert_eq!(first, second);
}

#[rstest]
#[googletest::test]
fn test_argument_errors(french: LoadedCatalog) {
    let missing_count = MessageRequest::new("GMainWindow", "%n file(s) remaining");
    let too_few = MessageRequest::new("GMainWindow", "Loading %1 of %2").args(&["3"]);

    expect_that!(
        resolve(&french, &missing_count),
        err(displays_as(contains_substring("needs a count")))
    );
    expect_that!(resolve(&french, &too_few), err(displays_as(contains_substring("%2"))));
}

#[rstest]
fn test_resolve_by_id(french: LoadedCatalog) {
    let resolver = Resolver::default();

    assert_eq!(resolver.resolve_id(&french, "main.quit", None, &[]).unwrap(), "&Quitter");
    assert_eq!(resolver.resolve_id(&french, "main.missing", None, &[]).unwrap(), "main.missing");
}

#[rstest]
fn test_write_round_trip(french: LoadedCatalog) {
    let written = catalog::write(french.catalog());
    let reparsed = catalog::parse(written.as_bytes()).unwrap();

    assert_eq!(&reparsed, french.catalog());

    let statuses: Vec<MessageStatus> =
        reparsed.messages().map(|(_, _, message)| message.status).collect();
    assert_eq!(
        statuses,
        vec![
            MessageStatus::Translated,
            MessageStatus::Translated,
            MessageStatus::Translated,
            MessageStatus::Translated,
            MessageStatus::Translated,
            MessageStatus::Unfinished,
            MessageStatus::Obsolete,
            MessageStatus::Translated,
            MessageStatus::Translated,
        ]
    );
}

#[googletest::test]
fn test_malformed_catalog_is_rejected() {
    let truncated = &FR_SAMPLE.as_bytes()[..FR_SAMPLE.len() / 2];

    let result = LoadedCatalog::from_bytes(truncated);

    assert_that!(result.map(|_| ()), err(anything()));
}
