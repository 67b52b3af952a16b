//! アンカー（探索の焦点）
//!
//! 写真・タグ・色・日付・カメラ・レンズ・季節のいずれか、またはなし。

use crate::color::normalize_hex;
use crate::error::{Error, Result};
use crate::types::Season;
use serde::{Deserialize, Serialize};

/// アンカー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnchorMode {
    None,
    Image,
    Tag,
    Color,
    Date,
    Camera,
    Lens,
    Season,
}

impl AnchorMode {
    /// クラスタ表示になる種別
    pub fn is_cluster(self) -> bool {
        !matches!(self, AnchorMode::None | AnchorMode::Image)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AnchorMode::None => "none",
            AnchorMode::Image => "image",
            AnchorMode::Tag => "tag",
            AnchorMode::Color => "color",
            AnchorMode::Date => "date",
            AnchorMode::Camera => "camera",
            AnchorMode::Lens => "lens",
            AnchorMode::Season => "season",
        }
    }
}

/// 表示用の付帯情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorMeta {
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// アンカー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Anchor {
    #[default]
    None,
    Image {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<AnchorMeta>,
    },
    Tag {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<AnchorMeta>,
    },
    Color {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<AnchorMeta>,
    },
    Date {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<AnchorMeta>,
    },
    Camera {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<AnchorMeta>,
    },
    Lens {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<AnchorMeta>,
    },
    Season {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        meta: Option<AnchorMeta>,
    },
}

impl Anchor {
    pub fn image(id: impl Into<String>) -> Self {
        Anchor::Image { id: id.into(), meta: None }
    }

    pub fn tag(id: impl Into<String>) -> Self {
        Anchor::Tag { id: id.into(), meta: None }
    }

    /// 色は小文字 `#rrggbb` に正規化（不正値はそのまま保持）
    pub fn color(hex: &str) -> Self {
        let id = normalize_hex(hex).unwrap_or_else(|| hex.to_string());
        Anchor::Color { id, meta: None }
    }

    pub fn date(timestamp_ms: i64) -> Self {
        Anchor::Date { id: timestamp_ms.to_string(), meta: None }
    }

    pub fn camera(model: impl Into<String>) -> Self {
        Anchor::Camera { id: model.into(), meta: None }
    }

    pub fn lens(model: impl Into<String>) -> Self {
        Anchor::Lens { id: model.into(), meta: None }
    }

    pub fn season(season: Season) -> Self {
        Anchor::Season { id: season.as_str().to_string(), meta: None }
    }

    /// 付帯情報を付ける（None アンカーには付かない）
    pub fn with_meta(mut self, meta: AnchorMeta) -> Self {
        match &mut self {
            Anchor::None => {}
            Anchor::Image { meta: m, .. }
            | Anchor::Tag { meta: m, .. }
            | Anchor::Color { meta: m, .. }
            | Anchor::Date { meta: m, .. }
            | Anchor::Camera { meta: m, .. }
            | Anchor::Lens { meta: m, .. }
            | Anchor::Season { meta: m, .. } => *m = Some(meta),
        }
        self
    }

    pub fn mode(&self) -> AnchorMode {
        match self {
            Anchor::None => AnchorMode::None,
            Anchor::Image { .. } => AnchorMode::Image,
            Anchor::Tag { .. } => AnchorMode::Tag,
            Anchor::Color { .. } => AnchorMode::Color,
            Anchor::Date { .. } => AnchorMode::Date,
            Anchor::Camera { .. } => AnchorMode::Camera,
            Anchor::Lens { .. } => AnchorMode::Lens,
            Anchor::Season { .. } => AnchorMode::Season,
        }
    }

    /// 識別子（None は空文字）
    pub fn id(&self) -> &str {
        match self {
            Anchor::None => "",
            Anchor::Image { id, .. }
            | Anchor::Tag { id, .. }
            | Anchor::Color { id, .. }
            | Anchor::Date { id, .. }
            | Anchor::Camera { id, .. }
            | Anchor::Lens { id, .. }
            | Anchor::Season { id, .. } => id,
        }
    }

    pub fn meta(&self) -> Option<&AnchorMeta> {
        match self {
            Anchor::None => None,
            Anchor::Image { meta, .. }
            | Anchor::Tag { meta, .. }
            | Anchor::Color { meta, .. }
            | Anchor::Date { meta, .. }
            | Anchor::Camera { meta, .. }
            | Anchor::Lens { meta, .. }
            | Anchor::Season { meta, .. } => meta.as_ref(),
        }
    }

    /// 同じ対象を指すか（種別とIDで比較、付帯情報は無視）
    pub fn same_target(&self, other: &Anchor) -> bool {
        self.mode() == other.mode() && self.id() == other.id()
    }

    /// IMAGE アンカーなら写真ID
    pub fn image_id(&self) -> Option<&str> {
        match self {
            Anchor::Image { id, .. } => Some(id),
            _ => None,
        }
    }

    /// 表示用ラベル
    pub fn display_label(&self) -> String {
        match self.meta() {
            Some(meta) if !meta.label.is_empty() => meta.label.clone(),
            _ => match self {
                Anchor::None => "home".to_string(),
                other => format!("{}:{}", other.mode().as_str(), other.id()),
            },
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anchor::None => write!(f, "none"),
            other => write!(f, "{}:{}", other.mode().as_str(), other.id()),
        }
    }
}

impl std::str::FromStr for Anchor {
    type Err = Error;

    /// `none` / `image:<id>` / `tag:<id>` / `color:#rrggbb` / `date:<ms>` /
    /// `camera:<model>` / `lens:<model>` / `season:<name>`
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("none") || s.eq_ignore_ascii_case("home") || s.is_empty() {
            return Ok(Anchor::None);
        }
        let (mode, value) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidAnchor(s.to_string()))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidAnchor(s.to_string()));
        }

        match mode.to_lowercase().as_str() {
            "image" | "photo" => Ok(Anchor::image(value)),
            "tag" => Ok(Anchor::tag(crate::tag::tag_id(value))),
            "color" | "colour" => normalize_hex(value)
                .map(|hex| Anchor::Color { id: hex, meta: None })
                .ok_or_else(|| Error::InvalidAnchor(format!("不正な色: {}", value))),
            "date" => value
                .parse::<i64>()
                .map(Anchor::date)
                .map_err(|_| Error::InvalidAnchor(format!("不正なタイムスタンプ: {}", value))),
            "camera" => Ok(Anchor::camera(value)),
            "lens" => Ok(Anchor::lens(value)),
            "season" => value
                .parse::<Season>()
                .map(Anchor::season)
                .map_err(Error::InvalidAnchor),
            _ => Err(Error::InvalidAnchor(s.to_string())),
        }
    }
}
