//! タグ定義とタグ索引

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// タグ種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagType {
    Technical,
    Seasonal,
    Categorical,
    Qualitative,
    AiGenerated,
}

impl TagType {
    /// 主題的な一致として数える種別か
    pub fn is_meaningful(self) -> bool {
        matches!(self, TagType::AiGenerated | TagType::Qualitative | TagType::Categorical)
    }
}

impl std::str::FromStr for TagType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "technical" | "tech" => Ok(TagType::Technical),
            "seasonal" | "season" => Ok(TagType::Seasonal),
            "categorical" | "category" => Ok(TagType::Categorical),
            "qualitative" | "quality" => Ok(TagType::Qualitative),
            "ai_generated" | "ai" => Ok(TagType::AiGenerated),
            _ => Err(format!(
                "Unknown tag type: {}. Use technical, seasonal, categorical, qualitative, or ai",
                s
            )),
        }
    }
}

impl std::fmt::Display for TagType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TagType::Technical => write!(f, "technical"),
            TagType::Seasonal => write!(f, "seasonal"),
            TagType::Categorical => write!(f, "categorical"),
            TagType::Qualitative => write!(f, "qualitative"),
            TagType::AiGenerated => write!(f, "ai"),
        }
    }
}

/// タグ定義
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub tag_type: TagType,
}

impl Tag {
    /// ラベルからIDを導出してタグを作る
    pub fn new(label: &str, tag_type: TagType) -> Self {
        Self {
            id: tag_id(label),
            label: label.trim().to_string(),
            tag_type,
        }
    }
}

/// ラベルからタグIDを導出
///
/// 小文字化し、英数字以外の連続をハイフン1つに置換する。
/// 先頭・末尾のハイフンは除去。
pub fn tag_id(label: &str) -> String {
    let mut id = String::with_capacity(label.len());
    let mut pending_hyphen = false;
    for c in label.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !id.is_empty() {
                id.push('-');
            }
            pending_hyphen = false;
            id.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    id
}

/// タグIDからタグ定義を引く索引
///
/// 未定義のIDは単に見つからない（エラーにしない）。
#[derive(Debug, Clone)]
pub struct TagIndex<'a> {
    by_id: HashMap<&'a str, &'a Tag>,
}

impl<'a> TagIndex<'a> {
    pub fn new(tags: &'a [Tag]) -> Self {
        Self {
            by_id: tags.iter().map(|t| (t.id.as_str(), t)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&'a Tag> {
        self.by_id.get(id).copied()
    }

    pub fn tag_type(&self, id: &str) -> Option<TagType> {
        self.get(id).map(|t| t.tag_type)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
