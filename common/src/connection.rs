//! 2枚の写真のつながり（共通タグ・近い色・撮影条件）

use crate::color::Rgb;
use crate::tag::{Tag, TagIndex};
use crate::types::{known_and_equal, Photograph, HOUR_MS};
use serde::{Deserialize, Serialize};

/// 色ペアとみなす最大の二乗距離
pub const COLOR_PAIR_THRESHOLD: u32 = 3000;

/// 対応づいた色
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorMatch {
    pub from: String,
    pub to: String,
    pub distance: u32,
}

/// 撮影条件の一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum TechnicalMatch {
    SameCamera(String),
    SameIso(String),
    SameSeason(String),
    WithinHour,
    SameDay,
}

impl std::fmt::Display for TechnicalMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TechnicalMatch::SameCamera(model) => write!(f, "同じカメラ ({})", model),
            TechnicalMatch::SameIso(iso) => write!(f, "同じISO ({})", iso),
            TechnicalMatch::SameSeason(season) => write!(f, "同じ季節 ({})", season),
            TechnicalMatch::WithinHour => write!(f, "1時間以内に撮影"),
            TechnicalMatch::SameDay => write!(f, "同じ日に撮影"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub common_tags: Vec<Tag>,
    pub color_matches: Vec<ColorMatch>,
    pub technical_matches: Vec<TechnicalMatch>,
}

impl Connection {
    pub fn is_empty(&self) -> bool {
        self.common_tags.is_empty()
            && self.color_matches.is_empty()
            && self.technical_matches.is_empty()
    }

    /// 1行の説明文
    pub fn narrate(&self) -> String {
        if self.is_empty() {
            return "共通点なし".to_string();
        }
        let mut parts = Vec::new();
        if !self.common_tags.is_empty() {
            let labels: Vec<&str> = self.common_tags.iter().map(|t| t.label.as_str()).collect();
            parts.push(format!("タグ: {}", labels.join(", ")));
        }
        if !self.color_matches.is_empty() {
            let colors: Vec<String> = self
                .color_matches
                .iter()
                .map(|m| format!("{}~{}", m.from, m.to))
                .collect();
            parts.push(format!("色: {}", colors.join(", ")));
        }
        for fact in &self.technical_matches {
            parts.push(fact.to_string());
        }
        parts.join(" / ")
    }
}

/// 2枚の写真のつながりを求める
pub fn analyze_connection(a: &Photograph, b: &Photograph, tags: &[Tag]) -> Connection {
    let index = TagIndex::new(tags);
    Connection {
        common_tags: common_tags(a, b, &index),
        color_matches: color_matches(&a.palette_rgb(), &b.palette_rgb()),
        technical_matches: technical_matches(a, b),
    }
}

fn common_tags(a: &Photograph, b: &Photograph, index: &TagIndex<'_>) -> Vec<Tag> {
    let other = b.combined_tag_ids();
    a.combined_tag_ids()
        .into_iter()
        .filter(|id| other.contains(id))
        .filter_map(|id| index.get(id).cloned())
        .collect()
}

/// A の各色について、未使用の B の色のうち最も近いものを対応づける
fn color_matches(a: &[Rgb], b: &[Rgb]) -> Vec<ColorMatch> {
    let mut used = vec![false; b.len()];
    let mut matches = Vec::new();

    for &from in a {
        let best = b
            .iter()
            .enumerate()
            .filter(|(j, _)| !used[*j])
            .map(|(j, &to)| (j, from.distance_sq(to)))
            .filter(|&(_, d)| d <= COLOR_PAIR_THRESHOLD)
            .min_by_key(|&(j, d)| (d, j));

        if let Some((j, distance)) = best {
            used[j] = true;
            matches.push(ColorMatch {
                from: from.to_hex(),
                to: b[j].to_hex(),
                distance,
            });
        }
    }
    matches
}

fn technical_matches(a: &Photograph, b: &Photograph) -> Vec<TechnicalMatch> {
    let mut facts = Vec::new();
    if known_and_equal(&a.camera_model, &b.camera_model) {
        facts.push(TechnicalMatch::SameCamera(a.camera_model.clone()));
    }
    if known_and_equal(&a.iso, &b.iso) {
        facts.push(TechnicalMatch::SameIso(a.iso.clone()));
    }
    if a.season == b.season {
        facts.push(TechnicalMatch::SameSeason(a.season.to_string()));
    }
    if a.timestamp.abs_diff(b.timestamp) <= HOUR_MS as u64 {
        facts.push(TechnicalMatch::WithinHour);
    } else if !a.day_key.is_empty() && a.day_key == b.day_key {
        facts.push(TechnicalMatch::SameDay);
    }
    facts
}
