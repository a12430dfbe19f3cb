//! 設定ファイルの読み込み関数

use std::path::Path;

use super::{
    ConfigError,
    EngineSettings,
};

/// Name of the workspace configuration file.
pub const CONFIG_FILE_NAME: &str = ".ts-catalog.json";

/// ワークスペースから設定を読み込む
///
/// `<workspace_root>/.ts-catalog.json` が無ければ `Ok(None)`
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub(super) fn load_from_workspace(
    workspace_root: &Path,
) -> Result<Option<EngineSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.is_file() {
        tracing::debug!(path = %config_path.display(), "Configuration file not found");
        return Ok(None);
    }

    load_from_path(&config_path).map(Some)
}

/// 指定パスの設定ファイルを読み込む (`--config`)
///
/// # Errors
/// - ファイル読み込みエラー
/// - JSON パースエラー
pub(super) fn load_from_path(config_path: &Path) -> Result<EngineSettings, ConfigError> {
    tracing::debug!(path = %config_path.display(), "Loading configuration");

    let content = std::fs::read_to_string(config_path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::resolver::UnfinishedPolicy;

    /// `load_from_workspace`: 設定ファイルが存在する場合
    #[rstest]
    fn test_load_from_workspace_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"sourceLanguage": "en_US", "unfinished": "useTranslation"}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(result.is_ok());
        let settings = result.unwrap();
        assert!(settings.is_some());
        let settings = settings.unwrap();
        assert_eq!(settings.source_language, "en_US");
        assert_eq!(settings.unfinished, UnfinishedPolicy::UseTranslation);
    }

    /// `load_from_workspace`: 設定ファイルが存在しない場合
    #[rstest]
    fn test_load_from_workspace_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    /// `load_from_workspace`: 未知の列挙値はパースエラー
    #[rstest]
    fn test_load_from_workspace_unknown_policy() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".ts-catalog.json"), r#"{"interpolation": "loose"}"#)
            .unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    /// `load_from_path`: ファイルが無い場合は I/O エラー
    #[rstest]
    fn test_load_from_path_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_path(&temp_dir.path().join("missing.json"));

        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }

    /// `load_from_workspace`: JSON パースエラー
    #[rstest]
    fn test_load_from_workspace_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".ts-catalog.json"), "invalid json").unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(result.is_err());
    }
}
