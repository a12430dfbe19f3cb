//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    EngineSettings,
    loader,
};
use crate::resolver::ResolverSettings;

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: EngineSettings,

    /// ワークスペースのルートパス
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ワークスペースの設定を読み込む
    ///
    /// 設定ファイルが無ければデフォルト値を使う。
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!(?workspace_root, "Loading settings");

        let settings = match &workspace_root {
            Some(root) => loader::load_from_workspace(root)?.unwrap_or_default(),
            None => EngineSettings::default(),
        };

        self.apply(settings)?;
        self.workspace_root = workspace_root;
        Ok(())
    }

    /// 明示的に指定された設定ファイルを読み込む
    ///
    /// # Errors
    /// [`ConfigManager::load_settings`] と同じ
    pub fn load_file(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        let settings = loader::load_from_path(config_path)?;
        self.apply(settings)?;
        self.workspace_root = config_path.parent().map(Path::to_path_buf);
        Ok(())
    }

    /// 設定を更新する
    ///
    /// # Errors
    /// バリデーションエラー
    pub fn update_settings(&mut self, new_settings: EngineSettings) -> Result<(), ConfigError> {
        tracing::debug!("Updating settings");
        self.apply(new_settings)
    }

    /// 検証してから設定を差し替える
    fn apply(&mut self, settings: EngineSettings) -> Result<(), ConfigError> {
        settings.validate().map_err(ConfigError::ValidationErrors)?;
        tracing::debug!(?settings, "Settings applied");
        self.current_settings = settings;
        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &EngineSettings {
        &self.current_settings
    }

    /// Resolver 用の設定
    #[must_use]
    pub const fn resolver_settings(&self) -> ResolverSettings {
        self.current_settings.resolver_settings()
    }

    /// ワークスペースルートを取得
    #[must_use]
    pub fn workspace_root(&self) -> Option<&Path> {
        self.workspace_root.as_deref()
    }
}
