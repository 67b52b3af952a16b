//! 表示対象の選択と文脈の集計
//!
//! スコアから可視集合を決め、表示側で使う代表タグ・代表色を集計する。
//! 入力（カタログ・アンカー・除外設定）が同じなら結果も同じ。

use crate::anchor::{Anchor, AnchorMode};
use crate::color::normalize_hex;
use crate::scoring::score_photos;
use crate::tag::{Tag, TagIndex, TagType};
use crate::types::{Catalog, ContentFilter, Photograph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// IMAGE アンカーで表示する近傍の上限
pub const NEIGHBOR_LIMIT: usize = 12;

/// IMAGE アンカーの代表タグ数
pub const FOCUS_TAG_LIMIT: usize = 6;

/// クラスタ表示の代表タグ数・代表色数
pub const CLUSTER_TAG_LIMIT: usize = 5;
pub const CLUSTER_COLOR_LIMIT: usize = 5;

/// 表示側に渡す文脈
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    pub representative_tags: Vec<Tag>,
    pub active_colors: Vec<String>,
}

impl Context {
    pub fn is_empty(&self) -> bool {
        self.representative_tags.is_empty() && self.active_colors.is_empty()
    }
}

/// 再計算の結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub anchor: Anchor,
    /// 写真ID → スコア（カタログの全写真）
    pub scores: HashMap<String, i64>,
    /// 可視な写真ID（IMAGE はアンカー→近傍のスコア順、他はカタログ順）
    pub visible: Vec<String>,
    pub context: Context,
}

impl Selection {
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.iter().any(|v| v == id)
    }

    pub fn score(&self, id: &str) -> i64 {
        self.scores.get(id).copied().unwrap_or(0)
    }
}

/// 出現回数を数える（同数は初出順）
#[derive(Debug, Default)]
struct FrequencyCounter<'a> {
    order: Vec<&'a str>,
    counts: HashMap<&'a str, usize>,
}

impl<'a> FrequencyCounter<'a> {
    fn add(&mut self, key: &'a str) {
        let count = self.counts.entry(key).or_insert(0);
        if *count == 0 {
            self.order.push(key);
        }
        *count += 1;
    }

    fn top(&self, limit: usize) -> Vec<&'a str> {
        let mut ranked: Vec<(usize, &'a str)> = self
            .order
            .iter()
            .map(|k| (self.counts[k], *k))
            .collect();
        // 安定ソートなので同数は初出順のまま
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        ranked.into_iter().take(limit).map(|(_, k)| k).collect()
    }
}

/// 可視集合の中で頻出する AI タグ
fn top_ai_tags<'a>(
    visible: &[&'a Photograph],
    index: &TagIndex<'a>,
    limit: usize,
    exclude: impl Fn(&Tag) -> bool,
) -> Vec<Tag> {
    let mut counter = FrequencyCounter::default();
    for photo in visible {
        for id in photo.combined_tag_ids() {
            if let Some(tag) = index.get(id) {
                if tag.tag_type == TagType::AiGenerated && !exclude(tag) {
                    counter.add(tag.id.as_str());
                }
            }
        }
    }
    counter
        .top(limit)
        .into_iter()
        .filter_map(|id| index.get(id).cloned())
        .collect()
}

/// 可視集合の中で頻出するパレット色（写真ごとに重複を除いて数える）
fn top_colors(visible: &[&Photograph], limit: usize, exclude: Option<&str>) -> Vec<String> {
    let palettes: Vec<Vec<String>> = visible
        .iter()
        .map(|p| {
            let mut unique: Vec<String> = Vec::with_capacity(5);
            for c in p.palette_rgb().iter().map(|c| c.to_hex()) {
                if !unique.contains(&c) {
                    unique.push(c);
                }
            }
            unique
        })
        .collect();

    let mut counter = FrequencyCounter::default();
    for palette in &palettes {
        for color in palette {
            if Some(color.as_str()) != exclude {
                counter.add(color.as_str());
            }
        }
    }
    counter.top(limit).into_iter().map(str::to_string).collect()
}

/// 文脈集計の入力
struct ContextInput<'a, 'b> {
    anchor: &'b Anchor,
    visible: &'b [&'a Photograph],
    index: &'b TagIndex<'a>,
    filter: &'b ContentFilter,
    focus: Option<&'a Photograph>,
}

type ContextFn = fn(&ContextInput<'_, '_>) -> Context;

/// アンカー種別 → 文脈集計関数
fn context_strategy(mode: AnchorMode) -> ContextFn {
    match mode {
        AnchorMode::None => empty_context,
        AnchorMode::Image => focus_context,
        AnchorMode::Tag => tag_context,
        AnchorMode::Color => color_context,
        AnchorMode::Date | AnchorMode::Camera | AnchorMode::Lens | AnchorMode::Season => {
            cluster_context
        }
    }
}

fn empty_context(_: &ContextInput<'_, '_>) -> Context {
    Context::default()
}

fn focus_context(input: &ContextInput<'_, '_>) -> Context {
    let Some(focus) = input.focus else {
        return Context::default();
    };
    Context {
        representative_tags: top_ai_tags(input.visible, input.index, FOCUS_TAG_LIMIT, |t| {
            input.filter.is_sensitive_label(&t.label)
        }),
        active_colors: focus.palette_rgb().iter().map(|c| c.to_hex()).collect(),
    }
}

fn tag_context(input: &ContextInput<'_, '_>) -> Context {
    let anchor_id = input.anchor.id();
    Context {
        representative_tags: top_ai_tags(input.visible, input.index, CLUSTER_TAG_LIMIT, |t| {
            t.id == anchor_id
        }),
        active_colors: Vec::new(),
    }
}

fn color_context(input: &ContextInput<'_, '_>) -> Context {
    let anchor_color = normalize_hex(input.anchor.id()).unwrap_or_else(|| input.anchor.id().to_string());
    let mut colors = vec![anchor_color.clone()];
    colors.extend(top_colors(input.visible, CLUSTER_COLOR_LIMIT, Some(&anchor_color)));
    colors.truncate(CLUSTER_COLOR_LIMIT);
    Context {
        representative_tags: Vec::new(),
        active_colors: colors,
    }
}

fn cluster_context(input: &ContextInput<'_, '_>) -> Context {
    Context {
        representative_tags: top_ai_tags(input.visible, input.index, CLUSTER_TAG_LIMIT, |_| false),
        active_colors: top_colors(input.visible, CLUSTER_COLOR_LIMIT, None),
    }
}

/// スコアから可視な写真のインデックスを選ぶ
fn visible_indices(anchor: &Anchor, photos: &[Photograph], scores: &[i64], filter_score: i64) -> Vec<usize> {
    match anchor.mode() {
        AnchorMode::None => (0..photos.len()).filter(|&i| scores[i] != filter_score).collect(),
        AnchorMode::Image => {
            let anchor_id = anchor.id();
            let anchor_index = photos
                .iter()
                .position(|p| p.id == anchor_id)
                .filter(|&i| scores[i] != filter_score);
            let Some(anchor_index) = anchor_index else {
                return Vec::new();
            };

            let mut candidates: Vec<usize> = (0..photos.len())
                .filter(|&i| i != anchor_index && scores[i] > 0)
                .collect();
            candidates.sort_by(|a, b| scores[*b].cmp(&scores[*a]));
            candidates.truncate(NEIGHBOR_LIMIT);

            let mut visible = Vec::with_capacity(candidates.len() + 1);
            visible.push(anchor_index);
            visible.extend(candidates);
            visible
        }
        _ => (0..photos.len()).filter(|&i| scores[i] > 0).collect(),
    }
}

/// アンカーに対するスコア・可視集合・文脈を計算する
pub fn select(anchor: &Anchor, photos: &[Photograph], tags: &[Tag], filter: &ContentFilter) -> Selection {
    let scores = score_photos(anchor, photos, tags, filter);
    let indices = visible_indices(anchor, photos, &scores, crate::scoring::FILTERED_SCORE);

    let index = TagIndex::new(tags);
    let visible: Vec<&Photograph> = indices.iter().map(|&i| &photos[i]).collect();
    let focus = anchor
        .image_id()
        .and_then(|id| visible.iter().copied().find(|p| p.id == id));

    let context = context_strategy(anchor.mode())(&ContextInput {
        anchor,
        visible: &visible,
        index: &index,
        filter,
        focus,
    });

    debug!(
        anchor = %anchor,
        visible = visible.len(),
        tags = context.representative_tags.len(),
        colors = context.active_colors.len(),
        "selection recomputed"
    );

    Selection {
        anchor: anchor.clone(),
        scores: photos
            .iter()
            .zip(scores.iter())
            .map(|(p, s)| (p.id.clone(), *s))
            .collect(),
        visible: visible.iter().map(|p| p.id.clone()).collect(),
        context,
    }
}

/// カタログ版のショートカット
pub fn select_in(catalog: &Catalog, anchor: &Anchor, filter: &ContentFilter) -> Selection {
    select(anchor, &catalog.photos, &catalog.tags, filter)
}
