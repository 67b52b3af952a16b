//! 探索コマンドの処理（explore / simulate / connect）

use crate::error::{PhotoAtlasError, Result};
use photo_atlas_common::{
    analyze_connection, select_in, Anchor, Catalog, Connection, ContentFilter, NodeFrame,
    Selection, Simulator, Viewport,
};
use serde::Serialize;
use tracing::{debug, warn};

/// ホーム画面で落ち着かせるフレーム数
pub const HOME_SETTLE_FRAMES: usize = 120;

/// シミュレーションの乱数シード
pub const SIMULATION_SEED: u64 = 42;

/// 1行表示用の可視写真
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRow {
    pub id: String,
    pub file_name: String,
    pub score: i64,
}

/// `explore --json` の出力
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreOutput<'a> {
    pub anchor: &'a Anchor,
    pub visible: Vec<VisibleRow>,
    pub context: &'a photo_atlas_common::Context,
}

/// 再計算（存在しない写真・タグを指すアンカーは警告のうえ空の結果）
pub fn explore(catalog: &Catalog, anchor: &Anchor, filter: &ContentFilter) -> Selection {
    let missing = match anchor {
        Anchor::Image { id, .. } => catalog.photo(id).is_none(),
        Anchor::Tag { id, .. } => catalog.tag(id).is_none(),
        _ => false,
    };
    if missing {
        warn!(anchor = %anchor, "anchor target not found in library");
    }
    select_in(catalog, anchor, filter)
}

pub fn visible_rows(catalog: &Catalog, selection: &Selection) -> Vec<VisibleRow> {
    selection
        .visible
        .iter()
        .map(|id| VisibleRow {
            id: id.clone(),
            file_name: catalog
                .photo(id)
                .map(|p| p.file_name.clone())
                .unwrap_or_default(),
            score: selection.score(id),
        })
        .collect()
}

pub fn explore_output<'a>(catalog: &Catalog, selection: &'a Selection) -> ExploreOutput<'a> {
    ExploreOutput {
        anchor: &selection.anchor,
        visible: visible_rows(catalog, selection),
        context: &selection.context,
    }
}

/// 可視写真と文脈を表示
pub fn print_selection(catalog: &Catalog, selection: &Selection) {
    println!("アンカー: {}", selection.anchor.display_label());
    println!("表示: {}枚 / {}枚", selection.visible.len(), catalog.photos.len());

    for row in visible_rows(catalog, selection) {
        println!("  {:>10}  {}  {}", row.score, row.id, row.file_name);
    }

    let context = &selection.context;
    if !context.representative_tags.is_empty() {
        let labels: Vec<&str> = context
            .representative_tags
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        println!("代表タグ: {}", labels.join(", "));
    }
    if !context.active_colors.is_empty() {
        println!("代表色: {}", context.active_colors.join(" "));
    }
}

/// ホームで落ち着かせてからアンカーへ遷移し、最終フレームを返す
pub fn simulate(
    catalog: &Catalog,
    anchor: &Anchor,
    filter: &ContentFilter,
    viewport: Viewport,
    frames: usize,
) -> Vec<NodeFrame> {
    let selection = explore(catalog, anchor, filter);

    let mut sim = Simulator::new(viewport, SIMULATION_SEED);
    sim.sync_catalog(&catalog.photos);
    sim.apply_selection(&select_in(catalog, &Anchor::None, filter));
    sim.run(HOME_SETTLE_FRAMES);

    sim.apply_selection(&selection);
    sim.run(frames);
    debug!(frames, nodes = sim.len(), "simulation finished");

    sim.frame()
}

/// 2枚の写真のつながり
pub fn connect(catalog: &Catalog, a: &str, b: &str) -> Result<Connection> {
    let photo_a = catalog
        .photo(a)
        .ok_or_else(|| PhotoAtlasError::PhotoNotFound(a.to_string()))?;
    let photo_b = catalog
        .photo(b)
        .ok_or_else(|| PhotoAtlasError::PhotoNotFound(b.to_string()))?;
    Ok(analyze_connection(photo_a, photo_b, &catalog.tags))
}
