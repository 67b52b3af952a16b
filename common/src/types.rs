//! 写真カタログの型定義
//!
//! CLIと将来のフロントエンドで共有される型:
//! - Photograph: 取り込み済みの写真1枚（コアからは読み取り専用）
//! - Season: 撮影月から推定した季節
//! - Catalog: 写真とタグ定義の束
//! - ContentFilter: センシティブ写真の除外設定

use crate::color::{normalize_palette, Rgb, PALETTE_SIZE};
use crate::tag::{Tag, TagIndex};
use chrono::{DateTime, Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// カメラ・レンズ不明を表す値
pub const UNKNOWN: &str = "unknown";

/// 1日（ミリ秒）
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// 1時間（ミリ秒）
pub const HOUR_MS: i64 = 60 * 60 * 1000;

/// 季節
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Winter,
    Spring,
    #[default]
    Summer,
    Autumn,
}

impl Season {
    /// 月（1-12）から季節を求める
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
        }
    }
}

impl std::str::FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "winter" => Ok(Season::Winter),
            "spring" => Ok(Season::Spring),
            "summer" => Ok(Season::Summer),
            "autumn" | "fall" => Ok(Season::Autumn),
            _ => Err(format!("Unknown season: {}. Use winter, spring, summer, or autumn", s)),
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 写真レコード
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photograph {
    pub id: String,

    #[serde(default)]
    pub file_name: String,

    /// 画像ファイルの絶対パス
    #[serde(default)]
    pub file_path: String,

    /// 撮影日時（エポックミリ秒）
    pub timestamp: i64,

    #[serde(default)]
    pub season: Season,

    /// 日単位のクラスタキー（YYYY-MM-DD）
    #[serde(default)]
    pub day_key: String,

    #[serde(default = "unknown")]
    pub camera_model: String,

    #[serde(default = "unknown")]
    pub lens_model: String,

    #[serde(default)]
    pub aperture: String,

    #[serde(default)]
    pub shutter_speed: String,

    #[serde(default)]
    pub iso: String,

    /// 代表色（16進, 5色）
    #[serde(default)]
    pub palette: Vec<String>,

    /// ユーザーが付けたタグID
    #[serde(default)]
    pub tag_ids: Vec<String>,

    /// AIが付けたタグID
    #[serde(default)]
    pub ai_tag_ids: Option<Vec<String>>,

    /// タグ統一処理のバージョン
    #[serde(default)]
    pub harmonization_version: Option<u32>,
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

impl Photograph {
    /// 撮影日時から時刻系フィールドを埋めた写真を作る
    pub fn from_capture(id: impl Into<String>, captured: NaiveDateTime) -> Self {
        let mut photo = Self {
            id: id.into(),
            camera_model: unknown(),
            lens_model: unknown(),
            ..Default::default()
        };
        photo.set_capture_time(captured);
        photo
    }

    /// 撮影日時を設定（季節・日キーも更新）
    pub fn set_capture_time(&mut self, captured: NaiveDateTime) {
        self.timestamp = captured.and_utc().timestamp_millis();
        self.season = Season::from_month(captured.month());
        self.day_key = captured.date().format("%Y-%m-%d").to_string();
    }

    /// タイムスタンプから季節・日キーを再計算
    pub fn refresh_derived_dates(&mut self) {
        if let Some(dt) = DateTime::from_timestamp_millis(self.timestamp) {
            self.season = Season::from_month(dt.month());
            self.day_key = dt.date_naive().format("%Y-%m-%d").to_string();
        }
    }

    /// ユーザータグ＋AIタグ（重複除去、出現順）
    pub fn combined_tag_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.tag_ids.len());
        let ai = self.ai_tag_ids.iter().flatten();
        for id in self.tag_ids.iter().chain(ai) {
            if !ids.contains(&id.as_str()) {
                ids.push(id.as_str());
            }
        }
        ids
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|t| t == tag_id)
            || self.ai_tag_ids.iter().flatten().any(|t| t == tag_id)
    }

    pub fn has_ai_tags(&self) -> bool {
        self.ai_tag_ids.as_ref().is_some_and(|ids| !ids.is_empty())
    }

    /// 5色に正規化したパレット
    pub fn palette_rgb(&self) -> [Rgb; PALETTE_SIZE] {
        normalize_palette(&self.palette)
    }

    /// 白黒写真か（タグラベルのキーワード判定）
    pub fn is_monochrome(&self, index: &TagIndex<'_>) -> bool {
        self.combined_tag_ids()
            .into_iter()
            .filter_map(|id| index.get(id))
            .any(|tag| is_monochrome_label(&tag.label))
    }
}

/// 白黒を示すキーワード
pub const MONOCHROME_KEYWORDS: &[&str] = &[
    "b&w",
    "black and white",
    "monochrome",
    "grayscale",
    "noir",
    "silver gelatin",
];

pub fn is_monochrome_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    MONOCHROME_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// 不明値でなく、かつ一致するか
pub fn known_and_equal(a: &str, b: &str) -> bool {
    !a.is_empty() && !a.eq_ignore_ascii_case(UNKNOWN) && a == b
}

/// 写真とタグ定義の束
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub photos: Vec<Photograph>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Catalog {
    pub fn new(photos: Vec<Photograph>, tags: Vec<Tag>) -> Self {
        Self { photos, tags }
    }

    pub fn photo(&self, id: &str) -> Option<&Photograph> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    pub fn tag_index(&self) -> TagIndex<'_> {
        TagIndex::new(&self.tags)
    }
}

/// センシティブ写真の除外設定
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFilter {
    pub enabled: bool,
    /// センシティブを表すタグID
    pub tag_id: String,
    /// 同タグのラベル（大文字小文字を区別せず照合）
    pub label: String,
}

impl ContentFilter {
    pub fn new(label: &str, enabled: bool) -> Self {
        Self {
            enabled,
            tag_id: crate::tag::tag_id(label),
            label: label.to_string(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// この写真を除外すべきか
    pub fn blocks(&self, photo: &Photograph, index: &TagIndex<'_>) -> bool {
        if !self.enabled {
            return false;
        }
        photo.combined_tag_ids().into_iter().any(|id| {
            (!self.tag_id.is_empty() && id == self.tag_id)
                || index
                    .get(id)
                    .is_some_and(|t| !self.label.is_empty() && t.label.eq_ignore_ascii_case(&self.label))
        })
    }

    /// ラベルがセンシティブタグのものか
    pub fn is_sensitive_label(&self, label: &str) -> bool {
        !self.label.is_empty() && label.eq_ignore_ascii_case(&self.label)
    }
}
