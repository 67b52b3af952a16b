//! 関連度スコアリング
//!
//! アンカーと写真カタログから、写真ごとの整数スコアを計算する。
//! アンカー種別ごとの採点関数は `strategy` の表から引く。
//!
//! ## 優先順位
//! 1. センシティブ除外（最優先、他の規則を適用しない）
//! 2. 種別ごとの採点（IMAGE は時間・主題・視覚・機材の合算）
//! 3. NONE は採点しない（除外以外は全て 0）

use crate::anchor::{Anchor, AnchorMode};
use crate::color::{min_distance_to, min_palette_distance, Rgb, PALETTE_SIZE};
use crate::tag::{Tag, TagIndex, TagType};
use crate::types::{known_and_equal, ContentFilter, Photograph, Season, DAY_MS};
use tracing::debug;

/// アンカー写真自身のスコア（どの組合せスコアよりも大きい）
pub const ANCHOR_SCORE: i64 = 1_000_000_000;

/// 除外された写真のスコア
pub const FILTERED_SCORE: i64 = -1_000_000_000;

/// 種別一致時のスコア
pub const MATCH_SCORE: i64 = 100;

/// COLOR アンカーの距離閾値（2乗距離）
pub const COLOR_MATCH_THRESHOLD: u32 = 1500;

/// DATE アンカーの窓（日）
pub const DATE_WINDOW_DAYS: f64 = 30.0;

/// 「主題的に強い相関」とみなす意味のある一致数
pub const HIGH_CORRELATION_MATCHES: usize = 3;

/// タグ種別ごとの重み
pub fn tag_weight(tag_type: Option<TagType>) -> i64 {
    match tag_type {
        Some(TagType::AiGenerated) => 20,
        Some(TagType::Qualitative) => 25,
        Some(TagType::Categorical) => 20,
        Some(TagType::Technical) => 5,
        _ => 2,
    }
}

/// IMAGE アンカーに対する候補写真の内訳
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairScore {
    pub temporal: i64,
    pub thematic: i64,
    pub visual: i64,
    pub technical: i64,
    pub meaningful_matches: usize,
}

impl PairScore {
    pub fn total(&self) -> i64 {
        self.temporal + self.thematic + self.visual + self.technical
    }

    pub fn high_correlation(&self) -> bool {
        self.meaningful_matches >= HIGH_CORRELATION_MATCHES
    }
}

/// 視覚項の入力
#[derive(Debug, Clone, Copy)]
pub struct VisualInput<'a> {
    pub anchor_mono: bool,
    pub candidate_mono: bool,
    pub same_day: bool,
    pub high_correlation: bool,
    pub anchor_palette: &'a [Rgb],
    pub candidate_palette: &'a [Rgb],
}

/// 白黒/カラーの組合せとパレット距離による補正
pub fn visual_adjustment(input: &VisualInput<'_>) -> i64 {
    let contextual = if input.same_day {
        Some(150)
    } else if input.high_correlation {
        Some(50)
    } else {
        None
    };

    match (input.anchor_mono, input.candidate_mono) {
        (true, true) => 200,
        (true, false) => contextual.unwrap_or(-1000),
        (false, true) => contextual.unwrap_or(-500),
        (false, false) => {
            if input.same_day || input.high_correlation {
                return 50;
            }
            match min_palette_distance(input.anchor_palette, input.candidate_palette) {
                d if d < 1500 => 200,
                d if d < 4000 => 100,
                d if d < 8000 => 20,
                _ => -150,
            }
        }
    }
}

/// 2枚の写真の時間項（1日以内 +500 / 3日以内 +100、同じ季節 +20）
pub fn temporal_score(anchor: &Photograph, candidate: &Photograph) -> i64 {
    let diff = anchor.timestamp.abs_diff(candidate.timestamp);
    let mut score = if diff <= DAY_MS as u64 {
        500
    } else if diff <= 3 * DAY_MS as u64 {
        100
    } else {
        0
    };
    if anchor.season == candidate.season {
        score += 20;
    }
    score
}

/// IMAGE アンカーに対する候補の採点内訳
pub fn pair_score(anchor: &Photograph, candidate: &Photograph, tags: &TagIndex<'_>) -> PairScore {
    let anchor_palette = anchor.palette_rgb();
    let profile = FocusProfile {
        photo: anchor,
        tag_ids: anchor.combined_tag_ids(),
        palette: anchor_palette,
        monochrome: anchor.is_monochrome(tags),
    };
    profile.score(candidate, tags)
}

/// IMAGE アンカーの事前計算
#[derive(Debug, Clone)]
struct FocusProfile<'a> {
    photo: &'a Photograph,
    tag_ids: Vec<&'a str>,
    palette: [Rgb; PALETTE_SIZE],
    monochrome: bool,
}

impl FocusProfile<'_> {
    fn score(&self, candidate: &Photograph, tags: &TagIndex<'_>) -> PairScore {
        let mut pair = PairScore {
            temporal: temporal_score(self.photo, candidate),
            ..Default::default()
        };

        for id in candidate.combined_tag_ids() {
            if !self.tag_ids.contains(&id) {
                continue;
            }
            let tag_type = tags.tag_type(id);
            pair.thematic += tag_weight(tag_type);
            if tag_type.is_some_and(TagType::is_meaningful) {
                pair.meaningful_matches += 1;
            }
        }

        let same_day = self.photo.timestamp.abs_diff(candidate.timestamp) <= DAY_MS as u64;
        let candidate_palette = candidate.palette_rgb();
        pair.visual = visual_adjustment(&VisualInput {
            anchor_mono: self.monochrome,
            candidate_mono: candidate.is_monochrome(tags),
            same_day,
            high_correlation: pair.high_correlation(),
            anchor_palette: &self.palette,
            candidate_palette: &candidate_palette,
        });

        if known_and_equal(&self.photo.camera_model, &candidate.camera_model) {
            pair.technical += 10;
        }
        if known_and_equal(&self.photo.lens_model, &candidate.lens_model) {
            pair.technical += 10;
        }

        pair
    }
}

/// 採点時に共有する文脈
pub struct ScoreContext<'a> {
    pub anchor: &'a Anchor,
    pub tags: TagIndex<'a>,
    focus: Option<FocusProfile<'a>>,
    color: Option<Rgb>,
    date: Option<i64>,
}

impl<'a> ScoreContext<'a> {
    pub fn new(anchor: &'a Anchor, photos: &'a [Photograph], tags: &'a [Tag]) -> Self {
        let index = TagIndex::new(tags);
        let focus = anchor.image_id().and_then(|id| {
            photos.iter().find(|p| p.id == id).map(|photo| FocusProfile {
                photo,
                tag_ids: photo.combined_tag_ids(),
                palette: photo.palette_rgb(),
                monochrome: photo.is_monochrome(&index),
            })
        });
        let color = match anchor.mode() {
            AnchorMode::Color => Rgb::from_hex(anchor.id()),
            _ => None,
        };
        let date = match anchor.mode() {
            AnchorMode::Date => anchor.id().trim().parse::<i64>().ok(),
            _ => None,
        };
        Self { anchor, tags: index, focus, color, date }
    }

    /// IMAGE アンカーの写真（存在する場合）
    pub fn focus_photo(&self) -> Option<&'a Photograph> {
        self.focus.as_ref().map(|f| f.photo)
    }
}

/// 種別ごとの採点関数
pub type ScoreFn = fn(&ScoreContext<'_>, &Photograph) -> i64;

/// アンカー種別 → 採点関数（NONE は採点しない）
pub fn strategy(mode: AnchorMode) -> Option<ScoreFn> {
    match mode {
        AnchorMode::None => None,
        AnchorMode::Image => Some(score_image),
        AnchorMode::Tag => Some(score_tag),
        AnchorMode::Color => Some(score_color),
        AnchorMode::Date => Some(score_date),
        AnchorMode::Camera => Some(score_camera),
        AnchorMode::Lens => Some(score_lens),
        AnchorMode::Season => Some(score_season),
    }
}

fn score_image(ctx: &ScoreContext<'_>, photo: &Photograph) -> i64 {
    let Some(focus) = &ctx.focus else {
        return 0;
    };
    if focus.photo.id == photo.id {
        return ANCHOR_SCORE;
    }
    focus.score(photo, &ctx.tags).total()
}

fn score_tag(ctx: &ScoreContext<'_>, photo: &Photograph) -> i64 {
    if photo.has_tag(ctx.anchor.id()) {
        MATCH_SCORE
    } else {
        0
    }
}

fn score_color(ctx: &ScoreContext<'_>, photo: &Photograph) -> i64 {
    match ctx.color {
        Some(target) if min_distance_to(&photo.palette_rgb(), target) < COLOR_MATCH_THRESHOLD => {
            MATCH_SCORE
        }
        _ => 0,
    }
}

fn score_date(ctx: &ScoreContext<'_>, photo: &Photograph) -> i64 {
    let Some(anchor_ts) = ctx.date else {
        return 0;
    };
    let diff_days = photo.timestamp.abs_diff(anchor_ts) as f64 / DAY_MS as f64;
    if diff_days > DATE_WINDOW_DAYS {
        return 0;
    }
    (100.0 - (diff_days / DATE_WINDOW_DAYS) * 50.0).round() as i64
}

fn score_camera(ctx: &ScoreContext<'_>, photo: &Photograph) -> i64 {
    exact(photo.camera_model == ctx.anchor.id())
}

fn score_lens(ctx: &ScoreContext<'_>, photo: &Photograph) -> i64 {
    exact(photo.lens_model == ctx.anchor.id())
}

fn score_season(ctx: &ScoreContext<'_>, photo: &Photograph) -> i64 {
    let season = ctx.anchor.id().parse::<Season>().ok();
    exact(season == Some(photo.season))
}

fn exact(matched: bool) -> i64 {
    if matched {
        MATCH_SCORE
    } else {
        0
    }
}

/// 全写真を採点する（戻り値は photos と同じ順序）
pub fn score_photos(
    anchor: &Anchor,
    photos: &[Photograph],
    tags: &[Tag],
    filter: &ContentFilter,
) -> Vec<i64> {
    let ctx = ScoreContext::new(anchor, photos, tags);
    let scorer = strategy(anchor.mode());

    let scores: Vec<i64> = photos
        .iter()
        .map(|photo| {
            if filter.blocks(photo, &ctx.tags) {
                return FILTERED_SCORE;
            }
            scorer.map(|f| f(&ctx, photo)).unwrap_or(0)
        })
        .collect();

    debug!(
        anchor = %anchor,
        photos = photos.len(),
        positive = scores.iter().filter(|s| **s > 0).count(),
        "scored catalog"
    );
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::NEUTRAL_GRAY;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .expect("日付が不正")
    }

    fn photo(id: &str, when: NaiveDateTime, palette: &[&str], tags: &[&str]) -> Photograph {
        let mut p = Photograph::from_capture(id, when);
        p.palette = palette.iter().map(|c| c.to_string()).collect();
        p.tag_ids = tags.iter().map(|t| t.to_string()).collect();
        p
    }

    fn tag_defs() -> Vec<Tag> {
        vec![
            Tag::new("b&w", TagType::Qualitative),
            Tag::new("moody", TagType::Qualitative),
            Tag::new("street", TagType::Categorical),
            Tag::new("city", TagType::AiGenerated),
            Tag::new("night", TagType::AiGenerated),
            Tag::new("35mm", TagType::Technical),
            Tag::new("nsfw", TagType::Categorical),
        ]
    }

    #[test]
    fn test_anchor_outscores_everything() {
        let tags = tag_defs();
        let when = at(2024, 6, 1, 10);
        let anchor_photo = photo("p1", when, &["#101010"], &["street", "city", "night", "moody"]);
        let twin = Photograph { id: "p2".into(), ..anchor_photo.clone() };
        let photos = vec![anchor_photo, twin];

        let scores = score_photos(&Anchor::image("p1"), &photos, &tags, &ContentFilter::disabled());
        assert_eq!(scores[0], ANCHOR_SCORE);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn test_same_day_mono_anchor_color_candidate() {
        // P1: 白黒、P2: 同日カラー、共通タグなし → 視覚 +150、時間 +500
        let tags = tag_defs();
        let p1 = photo("p1", at(2024, 6, 1, 9), &["#000000"], &["b-w"]);
        let p2 = photo("p2", at(2024, 6, 1, 18), &["#ff00ff"], &[]);
        let index = TagIndex::new(&tags);

        let pair = pair_score(&p1, &p2, &index);
        assert_eq!(pair.visual, 150);
        assert_eq!(pair.temporal, 520);
        assert!(pair.total() >= 650);
    }

    #[test]
    fn test_monochrome_pair_is_symmetric() {
        let tags = tag_defs();
        let index = TagIndex::new(&tags);
        let a = photo("a", at(2024, 1, 1, 9), &["#000000"], &["b-w"]);
        let b = photo("b", at(2023, 7, 1, 9), &["#ffffff"], &["b-w"]);

        assert_eq!(pair_score(&a, &b, &index).visual, 200);
        assert_eq!(pair_score(&b, &a, &index).visual, 200);
    }

    #[test]
    fn test_monochrome_crossing_penalties() {
        let tags = tag_defs();
        let index = TagIndex::new(&tags);
        let mono = photo("m", at(2024, 1, 1, 9), &["#000000"], &["b-w"]);
        let color = photo("c", at(2023, 7, 1, 9), &["#00ff00"], &[]);

        assert_eq!(pair_score(&mono, &color, &index).visual, -1000);
        assert_eq!(pair_score(&color, &mono, &index).visual, -500);
    }

    #[test]
    fn test_high_correlation_overrides_mono_penalty() {
        let tags = tag_defs();
        let index = TagIndex::new(&tags);
        let mono = photo("m", at(2024, 1, 1, 9), &["#000000"], &["b-w", "street", "city", "night"]);
        let color = photo("c", at(2023, 7, 1, 9), &["#00ff00"], &["street", "city", "night"]);

        let pair = pair_score(&mono, &color, &index);
        assert_eq!(pair.meaningful_matches, 3);
        assert_eq!(pair.thematic, 60);
        assert_eq!(pair.visual, 50);
    }

    #[test]
    fn test_color_pair_palette_tiers() {
        let input = |a: &[Rgb], b: &[Rgb]| {
            visual_adjustment(&VisualInput {
                anchor_mono: false,
                candidate_mono: false,
                same_day: false,
                high_correlation: false,
                anchor_palette: a,
                candidate_palette: b,
            })
        };
        let base = [Rgb::new(100, 100, 100)];
        assert_eq!(input(&base, &[Rgb::new(120, 120, 120)]), 200); // 1200
        assert_eq!(input(&base, &[Rgb::new(130, 130, 130)]), 100); // 2700
        assert_eq!(input(&base, &[Rgb::new(150, 150, 150)]), 20); // 7500
        assert_eq!(input(&base, &[Rgb::new(200, 200, 200)]), -150);
    }

    #[test]
    fn test_color_pair_same_day_is_flat_fifty() {
        let far_a = [Rgb::new(0, 0, 0)];
        let far_b = [Rgb::new(255, 255, 255)];
        let score = visual_adjustment(&VisualInput {
            anchor_mono: false,
            candidate_mono: false,
            same_day: true,
            high_correlation: false,
            anchor_palette: &far_a,
            candidate_palette: &far_b,
        });
        assert_eq!(score, 50);
    }

    #[test]
    fn test_tag_weights_and_unknown_tags() {
        let tags = tag_defs();
        let index = TagIndex::new(&tags);
        let a = photo("a", at(2020, 1, 1, 9), &[], &["35mm", "moody", "undefined-tag"]);
        let b = photo("b", at(2024, 7, 1, 9), &[], &["35mm", "moody", "undefined-tag"]);
        let pair = pair_score(&a, &b, &index);
        assert_eq!(pair.thematic, 5 + 25 + 2);
        assert_eq!(pair.meaningful_matches, 1);
    }

    #[test]
    fn test_technical_match_skips_unknown() {
        let tags = tag_defs();
        let index = TagIndex::new(&tags);
        let mut a = photo("a", at(2020, 1, 1, 9), &[], &[]);
        let mut b = photo("b", at(2024, 7, 1, 9), &[], &[]);
        assert_eq!(pair_score(&a, &b, &index).technical, 0);

        a.camera_model = "X100V".into();
        b.camera_model = "X100V".into();
        a.lens_model = "23mm".into();
        b.lens_model = "23mm".into();
        assert_eq!(pair_score(&a, &b, &index).technical, 20);
    }

    #[test]
    fn test_temporal_tiers() {
        let base = photo("a", at(2024, 6, 1, 0), &[], &[]);
        let two_days = photo("b", at(2024, 6, 3, 0), &[], &[]);
        let month = photo("c", at(2024, 7, 15, 0), &[], &[]);
        let winter = photo("d", at(2024, 12, 15, 0), &[], &[]);
        assert_eq!(temporal_score(&base, &two_days), 120);
        assert_eq!(temporal_score(&base, &month), 20);
        assert_eq!(temporal_score(&base, &winter), 0);
    }

    #[test]
    fn test_color_anchor_threshold() {
        let near = photo("near", at(2024, 1, 1, 0), &["#eb1414"], &[]); // 1200
        let far = photo("far", at(2024, 1, 1, 0), &["#eb2800", "#0000ff"], &[]); // 2000
        let exact = photo("exact", at(2024, 1, 1, 0), &["#FF0000"], &[]);
        let photos = vec![near, far, exact];
        let scores = score_photos(&Anchor::color("#ff0000"), &photos, &[], &ContentFilter::disabled());
        assert_eq!(scores, vec![100, 0, 100]);
    }

    #[test]
    fn test_date_anchor_linear_decay() {
        let anchor_time = at(2024, 6, 1, 0);
        let anchor = Anchor::date(anchor_time.and_utc().timestamp_millis());
        let photos = vec![
            photo("same", at(2024, 6, 1, 0), &[], &[]),
            photo("half", at(2024, 6, 16, 0), &[], &[]),
            photo("edge", at(2024, 7, 1, 0), &[], &[]),
            photo("out", at(2024, 8, 1, 0), &[], &[]),
        ];
        let scores = score_photos(&anchor, &photos, &[], &ContentFilter::disabled());
        assert_eq!(scores, vec![100, 75, 50, 0]);
    }

    #[test]
    fn test_camera_lens_season_exact() {
        let mut p = photo("p", at(2024, 4, 1, 0), &[], &[]);
        p.camera_model = "X100V".into();
        p.lens_model = "23mm F2".into();
        let photos = vec![p];
        let f = ContentFilter::disabled();
        assert_eq!(score_photos(&Anchor::camera("X100V"), &photos, &[], &f), vec![100]);
        assert_eq!(score_photos(&Anchor::camera("x100v"), &photos, &[], &f), vec![0]);
        assert_eq!(score_photos(&Anchor::lens("23mm F2"), &photos, &[], &f), vec![100]);
        assert_eq!(score_photos(&Anchor::season(Season::Spring), &photos, &[], &f), vec![100]);
        assert_eq!(score_photos(&Anchor::season(Season::Winter), &photos, &[], &f), vec![0]);
    }

    #[test]
    fn test_missing_anchor_entities_score_zero() {
        let photos = vec![photo("p", at(2024, 4, 1, 0), &[NEUTRAL_GRAY], &["street"])];
        let f = ContentFilter::disabled();
        assert_eq!(score_photos(&Anchor::image("deleted"), &photos, &[], &f), vec![0]);
        assert_eq!(score_photos(&Anchor::tag("deleted"), &photos, &[], &f), vec![0]);
        let bad_date = Anchor::Date { id: "not-a-number".into(), meta: None };
        assert_eq!(score_photos(&bad_date, &photos, &[], &f), vec![0]);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let mut old = photo("old", at(2024, 1, 1, 0), &[], &[]);
        old.timestamp = -DAY_MS;
        let mut future = photo("future", at(2024, 1, 1, 0), &[], &[]);
        future.timestamp = i64::MAX;
        let photos = vec![old.clone(), future.clone()];
        let f = ContentFilter::disabled();

        let latest = Anchor::Date { id: i64::MAX.to_string(), meta: None };
        assert_eq!(score_photos(&latest, &photos, &[], &f), vec![0, 100]);
        let earliest = Anchor::Date { id: i64::MIN.to_string(), meta: None };
        assert_eq!(score_photos(&earliest, &photos, &[], &f), vec![0, 0]);

        old.timestamp = i64::MIN;
        assert_eq!(temporal_score(&old, &future), temporal_score(&future, &old));
        assert!(temporal_score(&old, &future) < 500);
    }

    #[test]
    fn test_filter_dominates_every_mode() {
        let tags = tag_defs();
        let mut sensitive = photo("s", at(2024, 6, 1, 0), &["#ff0000"], &["nsfw", "street"]);
        sensitive.camera_model = "X100V".into();
        sensitive.lens_model = "23mm F2".into();
        let mut other = photo("o", at(2024, 6, 1, 1), &["#ff0000"], &["street"]);
        other.camera_model = "X100V".into();
        other.lens_model = "23mm F2".into();
        let photos = vec![sensitive, other];
        let filter = ContentFilter::new("NSFW", true);

        let anchors = [
            Anchor::None,
            Anchor::image("s"),
            Anchor::image("o"),
            Anchor::tag("street"),
            Anchor::color("#ff0000"),
            Anchor::date(at(2024, 6, 1, 0).and_utc().timestamp_millis()),
            Anchor::camera("X100V"),
            Anchor::lens("23mm F2"),
            Anchor::season(Season::Summer),
        ];
        for anchor in &anchors {
            let scores = score_photos(anchor, &photos, &tags, &filter);
            assert_eq!(scores[0], FILTERED_SCORE, "anchor {}", anchor);

            let selection = crate::selection::select(anchor, &photos, &tags, &filter);
            assert!(!selection.is_visible("s"), "anchor {}", anchor);
        }
    }
}
