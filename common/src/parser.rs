//! AIレスポンスパーサー
//!
//! Claude CLIなどのレスポンスからJSONを抽出し、タグラベルの配列として読む

use crate::error::{Error, Result};
use serde::Deserialize;

/// APIレスポンスからJSON部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の [...] 配列
/// 3. エラー
///
/// # Examples
/// ```
/// use photo_atlas_common::extract_json;
///
/// let response = "tags: [\"sea\", \"sky\"]";
/// assert_eq!(extract_json(response).unwrap(), "[\"sea\", \"sky\"]");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('[') {
        if let Some(end) = response.rfind(']') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 文字列または `{"label": ...}` のどちらでも受ける
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LabelEntry {
    Plain(String),
    Object { label: String },
}

impl LabelEntry {
    fn into_label(self) -> String {
        match self {
            LabelEntry::Plain(label) | LabelEntry::Object { label } => label,
        }
    }
}

/// タグ付け・タグ統一のレスポンスをパース
///
/// 空白だけのラベルは捨て、前後の空白を除く。重複はそのまま返す
/// （正規化は呼び出し側で行う）。
pub fn parse_label_response(response: &str) -> Result<Vec<String>> {
    let json_str = extract_json(response)?;
    let entries: Vec<LabelEntry> = serde_json::from_str(json_str.trim())
        .map_err(|e| Error::Parse(format!("タグ JSONパースエラー: {}", e)))?;

    Ok(entries
        .into_iter()
        .map(LabelEntry::into_label)
        .map(|label| label.trim().to_string())
        .filter(|label| !label.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_with_block() {
        let response = "Here are the tags:\n```json\n[\"harbor\", \"dusk\"]\n```\nDone.";
        let json = extract_json(response).unwrap();
        assert_eq!(json, r#"["harbor", "dusk"]"#);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Result: ["a", "b"] end"#;
        assert_eq!(extract_json(response).unwrap(), r#"["a", "b"]"#);
    }

    #[test]
    fn test_extract_json_error() {
        let result = extract_json("No JSON here, just plain text.");
        if let Err(Error::Parse(msg)) = result {
            assert!(msg.contains("JSONが見つかりません"));
        } else {
            panic!("Expected Parse error");
        }
        assert!(extract_json("").is_err());
    }

    #[test]
    fn test_parse_label_response_strings() {
        let labels = parse_label_response(r#"["  golden hour ", "", "harbor"]"#).unwrap();
        assert_eq!(labels, vec!["golden hour", "harbor"]);
    }

    #[test]
    fn test_parse_label_response_objects() {
        let response = "```json\n[{\"label\": \"sea\"}, \"sky\"]\n```";
        let labels = parse_label_response(response).unwrap();
        assert_eq!(labels, vec!["sea", "sky"]);
    }

    #[test]
    fn test_parse_label_response_error() {
        assert!(parse_label_response("[1, 2").is_err());
        assert!(parse_label_response("nothing").is_err());
    }
}
