//! テスト用ユーティリティ関数
//!
//! 複数のテストモジュールで使用される共通のヘルパー関数を提供します。
#![cfg(test)]

use crate::catalog::{
    Catalog,
    Context,
};
use crate::store::LoadedCatalog;

/// テスト用の `LoadedCatalog` を作成する
///
/// # Arguments
/// * `language` - 言語コード（例: "fr", "ja_JP"）
/// * `contexts` - コンテキスト一覧
pub(crate) fn loaded_catalog(language: &str, contexts: Vec<Context>) -> LoadedCatalog {
    LoadedCatalog::new(Catalog { language: language.to_string(), contexts, ..Catalog::default() })
}

/// テスト用の TS ドキュメントを作成する
///
/// # Arguments
/// * `language` - `language` 属性（`None` なら省略）
/// * `body` - `<TS>` 要素の中身
pub(crate) fn ts_document(language: Option<&str>, body: &str) -> String {
    let language = language.map_or_else(String::new, |l| format!(" language=\"{l}\""));
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS version=\"2.1\"{language}>\n{body}</TS>\n"
    )
}

/// 1 メッセージだけのコンテキストを TS 形式で作成する
pub(crate) fn ts_message(context: &str, source: &str, translation: &str) -> String {
    format!(
        "<context>\n    <name>{context}</name>\n    <message>\n        <source>{source}</source>\n        <translation>{translation}</translation>\n    </message>\n</context>\n"
    )
}
