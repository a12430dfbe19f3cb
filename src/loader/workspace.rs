//! Catalog discovery and concurrent loading.
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use ignore::WalkBuilder;
use tokio::sync::Semaphore;

use crate::catalog::{
    self,
    ParseError,
};
use crate::config::{
    CatalogFileMatcher,
    CatalogFilesConfig,
    EngineSettings,
};
use crate::loader::types::{
    CatalogFile,
    CatalogSet,
    LoadError,
    LoaderError,
};
use crate::plural::is_known_locale;
use crate::store::LoadedCatalog;

/// カタログファイルを検索
///
/// `.gitignore` を尊重し、ワークスペースからの相対パスを include / exclude パターンで絞り込む。
/// 結果はパス順。
///
/// # Errors
/// 無効な glob パターン、またはルートがディレクトリでない
pub fn find_catalog_files(
    workspace_root: &Path,
    config: &CatalogFilesConfig,
) -> Result<Vec<PathBuf>, LoaderError> {
    if !workspace_root.is_dir() {
        return Err(LoaderError::NotADirectory(workspace_root.to_path_buf()));
    }

    let matcher = CatalogFileMatcher::new(workspace_root.to_path_buf(), config)?;
    let mut found_files = Vec::new();

    // ignore クレートでファイルを走査
    for result in WalkBuilder::new(workspace_root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        // ファイルのみを対象
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        if matcher.is_catalog_file(entry.path()) {
            found_files.push(entry.into_path());
        }
    }

    found_files.sort();
    tracing::debug!(
        workspace_root = %workspace_root.display(),
        count = found_files.len(),
        "Found catalog files"
    );
    Ok(found_files)
}

/// 単一のカタログファイルを読み込む
///
/// Parsing runs on the blocking pool. A catalog without a `language` attribute
/// gets the language detected from its file name, and one without a
/// `sourcelanguage` attribute gets `source_language`.
///
/// # Errors
/// 読み込みエラー、またはパースエラー
pub async fn load_catalog_file(
    path: &Path,
    source_language: &str,
) -> Result<LoadedCatalog, LoadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;

    let owned_path = path.to_path_buf();
    let source_language = source_language.to_string();
    let parsed = tokio::task::spawn_blocking(move || {
        let mut catalog = catalog::parse(&bytes)?;
        if catalog.language.is_empty()
            && let Some(language) = detect_language(&owned_path)
        {
            tracing::debug!(path = %owned_path.display(), language, "Language taken from file name");
            catalog.language = language;
        }
        if catalog.source_language.is_none() {
            catalog.source_language = Some(source_language);
        }
        Ok::<_, ParseError>(LoadedCatalog::new(catalog))
    })
    .await;

    match parsed {
        Ok(Ok(loaded)) => Ok(loaded),
        Ok(Err(source)) => Err(LoadError::Parse { path: path.to_path_buf(), source }),
        Err(join_error) => {
            Err(LoadError::Task { path: path.to_path_buf(), message: join_error.to_string() })
        }
    }
}

/// ワークスペースの全カタログを並列で読み込む
///
/// Concurrency is bounded by `loading.numThreads`. Files that fail to load are
/// recorded in [`CatalogSet::failures`] and do not stop the others.
///
/// # Errors
/// 無効な glob パターン、またはルートがディレクトリでない
pub async fn load_workspace(
    workspace_root: &Path,
    settings: &EngineSettings,
) -> Result<CatalogSet, LoaderError> {
    tracing::debug!(workspace_root = %workspace_root.display(), "Loading workspace catalogs");

    let files = find_catalog_files(workspace_root, &settings.catalog_files)?;
    let semaphore = Arc::new(Semaphore::new(settings.num_threads()));

    // 並列処理でファイルを読み込み
    let futures: Vec<_> = files
        .into_iter()
        .map(|path| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire().await.ok();
                let result = load_catalog_file(&path, &settings.source_language).await;
                (path, result)
            }
        })
        .collect();

    let mut set = CatalogSet::new();
    for (path, result) in futures::future::join_all(futures).await {
        match result {
            Ok(loaded) => set.insert(CatalogFile { path, catalog: Arc::new(loaded) }),
            Err(error) => {
                tracing::warn!(%error, "Skipping catalog");
                set.push_failure(error);
            }
        }
    }

    tracing::info!(
        catalogs = set.len(),
        failures = set.failures().len(),
        "Workspace catalogs loaded"
    );
    Ok(set)
}

/// ファイル名から言語を推測する (`app_pt_BR.ts` -> `pt_BR`, `fr.ts` -> `fr`)
///
/// Only locales with a known plural rule are accepted.
#[must_use]
pub fn detect_language(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let segments: Vec<&str> = stem.split(['_', '-', '.']).collect();

    // language + region (or script) first, then the bare language
    if let [.., language, region] = segments.as_slice()
        && is_region_subtag(region)
        && is_known_locale(language)
    {
        return Some(format!("{language}_{region}"));
    }

    segments.last().filter(|language| is_known_locale(language)).map(ToString::to_string)
}

/// `BR`, `419`, `Hant`
fn is_region_subtag(subtag: &str) -> bool {
    match subtag.len() {
        2 => subtag.chars().all(|c| c.is_ascii_alphabetic()),
        3 => subtag.chars().all(|c| c.is_ascii_digit()),
        4 => {
            let mut chars = subtag.chars();
            chars.next().is_some_and(|c| c.is_ascii_uppercase())
                && chars.all(|c| c.is_ascii_lowercase())
        }
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::test_utils::{
        ts_document,
        ts_message,
    };

    fn catalog_xml(language: Option<&str>, text: &str) -> String {
        ts_document(language, &ts_message("GMainWindow", "Cancel", text))
    }

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        let languages = dir.path().join("dist/languages");
        fs::create_dir_all(&languages).unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(languages.join("fr.ts"), catalog_xml(Some("fr"), "Annuler")).unwrap();
        fs::write(languages.join("app_pt_BR.ts"), catalog_xml(None, "Cancelar")).unwrap();
        fs::write(languages.join("broken.ts"), "<TS><context>").unwrap();
        fs::write(languages.join("notes.txt"), "not a catalog").unwrap();
        fs::write(dir.path().join("node_modules/pkg/da.ts"), catalog_xml(Some("da"), "Annuller"))
            .unwrap();
        dir
    }

    #[rstest]
    #[case::plain("fr.ts", Some("fr"))]
    #[case::region("ja_JP.ts", Some("ja_JP"))]
    #[case::prefixed("yuzu_zh_TW.ts", Some("zh_TW"))]
    #[case::prefixed_language("app-de.ts", Some("de"))]
    #[case::hyphen_region("app_pt-BR.ts", Some("pt_BR"))]
    #[case::numeric_region("es_419.ts", Some("es_419"))]
    #[case::script("zh_Hant.ts", Some("zh_Hant"))]
    #[case::not_a_region("es_file.ts", None)]
    #[case::unknown("catalog.ts", None)]
    fn test_detect_language(#[case] file_name: &str, #[case] expected: Option<&str>) {
        assert_eq!(detect_language(Path::new(file_name)).as_deref(), expected);
    }

    #[rstest]
    fn test_find_catalog_files() {
        let dir = workspace();

        let files = find_catalog_files(dir.path(), &CatalogFilesConfig::default()).unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["app_pt_BR.ts", "broken.ts", "fr.ts"]);
    }

    #[rstest]
    fn test_find_catalog_files_not_a_directory() {
        let dir = workspace();

        let result = find_catalog_files(&dir.path().join("missing"), &CatalogFilesConfig::default());

        assert!(matches!(result, Err(LoaderError::NotADirectory(_))));
    }

    #[tokio::test]
    async fn test_load_catalog_file_detects_language() {
        let dir = workspace();

        let loaded =
            load_catalog_file(&dir.path().join("dist/languages/app_pt_BR.ts"), "en").await.unwrap();

        assert_eq!(loaded.language(), "pt_BR");
        assert_eq!(loaded.catalog().message_count(), 1);
    }

    #[tokio::test]
    async fn test_load_catalog_file_errors() {
        let dir = workspace();

        let missing = load_catalog_file(&dir.path().join("missing.ts"), "en").await;
        let broken = load_catalog_file(&dir.path().join("dist/languages/broken.ts"), "en").await;

        assert!(matches!(missing, Err(LoadError::Io { .. })));
        assert!(matches!(broken, Err(LoadError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_missing_source_language_comes_from_settings() {
        let dir = workspace();
        let languages = dir.path().join("dist/languages");
        fs::write(
            languages.join("de.ts"),
            catalog_xml(Some("de"), "Abbrechen")
                .replace("<TS version=\"2.1\"", "<TS version=\"2.1\" sourcelanguage=\"en_US\""),
        )
        .unwrap();
        let settings = EngineSettings { source_language: "en_GB".to_string(), ..EngineSettings::default() };

        let set = load_workspace(dir.path(), &settings).await.unwrap();

        let source_language = |language: &str| {
            set.get(language).and_then(|file| file.catalog.catalog().source_language.clone())
        };
        assert_eq!(source_language("fr").as_deref(), Some("en_GB"));
        assert_eq!(source_language("de").as_deref(), Some("en_US"));
    }

    #[tokio::test]
    async fn test_load_workspace() {
        let dir = workspace();
        let settings = EngineSettings::default();

        let set = load_workspace(dir.path(), &settings).await.unwrap();

        assert_eq!(set.languages().collect::<Vec<_>>(), vec!["fr", "pt_br"]);
        assert_eq!(set.failures().len(), 1);
        assert!(set.failures()[0].path().ends_with("dist/languages/broken.ts"));
        let french = set.get("fr").unwrap();
        assert_eq!(
            french.catalog.lookup("GMainWindow", "Cancel", None).map(|m| m.translation.clone()),
            Some(crate::catalog::Translation::Single("Annuler".to_string()))
        );
    }
}
