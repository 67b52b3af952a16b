//! プロンプト生成モジュール
//!
//! - build_tagging_prompt: 写真1枚のタグ付け用
//! - harmonization_vocabulary: ライブラリ全体で使われているAIタグの語彙
//! - build_harmonize_prompt: 既存AIタグを語彙に寄せて書き直す用

use crate::tag::TagType;
use crate::types::Catalog;
use std::collections::HashMap;

/// 現在のタグ統一バージョン（これ未満の写真が再処理対象）
pub const HARMONIZATION_VERSION: u32 = 1;

/// 語彙の最大数
pub const VOCABULARY_LIMIT: usize = 60;

/// 語彙に入る最小使用枚数
pub const VOCABULARY_MIN_USES: usize = 2;

/// 1枚あたりのタグ数の目安
pub const LABELS_PER_PHOTO: usize = 8;

/// タグ付けプロンプト生成
///
/// # Arguments
/// * `file_path` - 画像ファイルパス（AI CLIに読ませる）
/// * `existing` - ユーザーが付けた既存タグのラベル
pub fn build_tagging_prompt(file_path: &str, existing: &[&str]) -> String {
    let existing = if existing.is_empty() {
        "なし".to_string()
    } else {
        existing.join(", ")
    };

    format!(
        r#"Read the image file at: {file_path}

You are curating a personal photo library. Describe this photograph with short
descriptive tags (1-3 words each, English, lowercase).

## Cover
- subject and scene (e.g. "harbor", "street market", "portrait")
- mood and light (e.g. "golden hour", "moody", "overcast")
- style (e.g. "black and white", "long exposure", "minimal")

## Existing user tags
{existing}

## Output (strictly a JSON array of strings)
["tag one", "tag two"]

## Notes
- At most {LABELS_PER_PHOTO} tags
- Do not repeat the existing user tags
- Output the JSON array only, no explanation"#
    )
}

/// ライブラリのAIタグ語彙
///
/// 2枚以上で使われているAI生成タグのラベルを使用数の多い順に最大60件。
/// 同数はカタログ中の初出順。
pub fn harmonization_vocabulary(catalog: &Catalog) -> Vec<String> {
    let index = catalog.tag_index();
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut seen = 0usize;

    for photo in &catalog.photos {
        let Some(ids) = &photo.ai_tag_ids else {
            continue;
        };
        let mut unique: Vec<&str> = Vec::new();
        for id in ids {
            if !unique.contains(&id.as_str()) {
                unique.push(id.as_str());
            }
        }
        for id in unique {
            if index.tag_type(id) != Some(TagType::AiGenerated) {
                continue;
            }
            let entry = counts.entry(id).or_insert_with(|| {
                seen += 1;
                (0, seen)
            });
            entry.0 += 1;
        }
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .filter(|(_, (count, _))| *count >= VOCABULARY_MIN_USES)
        .map(|(id, (count, first))| (id, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(VOCABULARY_LIMIT)
        .filter_map(|(id, _, _)| index.get(id).map(|tag| tag.label.clone()))
        .collect()
}

/// タグ統一プロンプト生成
///
/// # Arguments
/// * `current` - 写真の現在のAIタグラベル
/// * `vocabulary` - ライブラリ語彙
pub fn build_harmonize_prompt(current: &[&str], vocabulary: &[String]) -> String {
    let current = current.join(", ");
    let vocabulary = if vocabulary.is_empty() {
        "(empty)".to_string()
    } else {
        vocabulary.join(", ")
    };

    format!(
        r#"You are harmonizing the tags of a personal photo library so that similar
photos share the same wording.

## Library vocabulary (most used first)
{vocabulary}

## Current tags of this photo
{current}

## Task
Rewrite the current tags. When a current tag means the same as a vocabulary term,
use the vocabulary term. Keep tags that have no equivalent. Drop duplicates.

## Output (strictly a JSON array of strings)
["tag one", "tag two"]

Output the JSON array only, no explanation"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;
    use crate::types::Photograph;

    fn photo(id: &str, ai: &[&str]) -> Photograph {
        Photograph {
            id: id.to_string(),
            ai_tag_ids: Some(ai.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_tagging_prompt() {
        let prompt = build_tagging_prompt("/photos/sea.jpg", &["family"]);
        assert!(prompt.contains("/photos/sea.jpg"));
        assert!(prompt.contains("family"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn test_build_tagging_prompt_without_existing() {
        let prompt = build_tagging_prompt("a.jpg", &[]);
        assert!(prompt.contains("なし"));
    }

    #[test]
    fn test_vocabulary_requires_two_uses_and_ranks() {
        let tags = vec![
            Tag::new("sea", TagType::AiGenerated),
            Tag::new("sky", TagType::AiGenerated),
            Tag::new("boat", TagType::AiGenerated),
            Tag::new("moody", TagType::Qualitative),
        ];
        let photos = vec![
            photo("a", &["sky", "sea", "boat", "moody"]),
            photo("b", &["sea", "sky", "moody"]),
            photo("c", &["sea", "sea"]),
        ];
        let catalog = Catalog::new(photos, tags);

        // boat は1枚のみ、moody はAI生成タグではない
        assert_eq!(harmonization_vocabulary(&catalog), vec!["sea", "sky"]);
    }

    #[test]
    fn test_vocabulary_limit() {
        let tags: Vec<Tag> = (0..80)
            .map(|i| Tag::new(&format!("t{}", i), TagType::AiGenerated))
            .collect();
        let ids: Vec<String> = tags.iter().map(|t| t.id.clone()).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let catalog = Catalog::new(vec![photo("a", &refs), photo("b", &refs)], tags);

        let vocabulary = harmonization_vocabulary(&catalog);
        assert_eq!(vocabulary.len(), VOCABULARY_LIMIT);
        assert_eq!(vocabulary[0], "t0");
    }

    #[test]
    fn test_build_harmonize_prompt() {
        let prompt = build_harmonize_prompt(&["seaside"], &["sea".to_string()]);
        assert!(prompt.contains("seaside"));
        assert!(prompt.contains("sea"));
        assert!(build_harmonize_prompt(&[], &[]).contains("(empty)"));
    }
}
