//! AI CLI連携モジュール
//!
//! プロンプトを1回渡して標準出力をそのまま受け取る。
//! 画像はプロンプト中のファイルパスから CLI 側に読ませる。

use crate::ai_provider::AiProvider;
use crate::error::{PhotoAtlasError, Result};
use photo_atlas_common::parse_label_response;
use tokio::process::Command;
use tracing::debug;

/// AI CLIを実行してレスポンス本文を返す
pub async fn run_ai_cli(provider: AiProvider, model: Option<String>, prompt: String) -> Result<String> {
    let args = provider.prompt_args(&prompt, model.as_deref());

    // Windowsでは cmd /c 経由
    #[cfg(windows)]
    let output = Command::new("cmd")
        .arg("/c")
        .arg(provider.command_name())
        .args(&args)
        .output()
        .await
        .map_err(|e| PhotoAtlasError::ApiCall(format!("{} 実行エラー: {}", provider.command_name(), e)))?;

    #[cfg(not(windows))]
    let output = Command::new(provider.command_name())
        .args(&args)
        .output()
        .await
        .map_err(|e| PhotoAtlasError::ApiCall(format!("{} 実行エラー: {}", provider.command_name(), e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PhotoAtlasError::ApiCall(format!(
            "{} failed (code {:?}): {}",
            provider.command_name(),
            output.status.code(),
            stderr
        )));
    }

    let response = String::from_utf8_lossy(&output.stdout).to_string();
    let preview: String = response.chars().take(200).collect();
    debug!(chars = response.len(), preview = %preview, "AI CLI response");

    Ok(response)
}

/// レスポンスからラベル配列を読む（共通パーサーをラップ）
pub fn parse_labels(response: &str) -> Result<Vec<String>> {
    parse_label_response(response)
        .map_err(|e| PhotoAtlasError::ApiParse(format!("タグ JSONパースエラー: {}", e)))
}
