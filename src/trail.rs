//! 対話式探索（トレイル）
//!
//! アンカーを選ぶたびに再計算し、履歴を積む。終了時に履歴と
//! 隣り合う写真同士のつながりを表示する。

use crate::error::{PhotoAtlasError, Result};
use crate::explore::print_selection;
use chrono::DateTime;
use dialoguer::Select;
use photo_atlas_common::types::UNKNOWN;
use photo_atlas_common::{
    analyze_connection, select_in, Anchor, AnchorMeta, Catalog, Connection, ContentFilter,
    NavigationHistory, Selection,
};

/// 候補に並べる可視写真の最大数
pub const PHOTO_CHOICE_LIMIT: usize = 12;

/// 次のアンカー候補
#[derive(Debug, Clone, PartialEq)]
pub struct TrailChoice {
    pub label: String,
    pub anchor: Anchor,
}

impl TrailChoice {
    fn new(label: String, anchor: Anchor) -> Self {
        let anchor = anchor.with_meta(AnchorMeta {
            label: label.clone(),
            detail: None,
        });
        Self { label, anchor }
    }
}

pub struct TrailSession<'a> {
    catalog: &'a Catalog,
    filter: ContentFilter,
    history: NavigationHistory,
    selection: Selection,
}

impl<'a> TrailSession<'a> {
    /// ホームから開始
    pub fn new(catalog: &'a Catalog, filter: ContentFilter) -> Self {
        let mut history = NavigationHistory::new();
        history.push(Anchor::None);
        let selection = select_in(catalog, &Anchor::None, &filter);
        Self {
            catalog,
            filter,
            history,
            selection,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    /// アンカーを移動（直前と同じ対象なら履歴は増えない）
    pub fn navigate(&mut self, anchor: Anchor) -> bool {
        let pushed = self.history.push(anchor.clone());
        self.selection = select_in(self.catalog, &anchor, &self.filter);
        pushed
    }

    /// 次のアンカー候補
    ///
    /// 可視写真・代表タグ・代表色、焦点写真があればそのカメラ・レンズ・季節・日付、
    /// ホーム以外ならホーム。
    pub fn choices(&self) -> Vec<TrailChoice> {
        let mut choices = Vec::new();
        let current = &self.selection.anchor;

        for id in self.selection.visible.iter().take(PHOTO_CHOICE_LIMIT) {
            if current.image_id() == Some(id.as_str()) {
                continue;
            }
            if let Some(photo) = self.catalog.photo(id) {
                choices.push(TrailChoice::new(
                    format!("写真 {} ({})", photo.file_name, self.selection.score(id)),
                    Anchor::image(id.clone()),
                ));
            }
        }

        for tag in &self.selection.context.representative_tags {
            choices.push(TrailChoice::new(format!("タグ {}", tag.label), Anchor::tag(tag.id.clone())));
        }

        for color in &self.selection.context.active_colors {
            choices.push(TrailChoice::new(format!("色 {}", color), Anchor::color(color)));
        }

        if let Some(photo) = current.image_id().and_then(|id| self.catalog.photo(id)) {
            if !photo.camera_model.eq_ignore_ascii_case(UNKNOWN) && !photo.camera_model.is_empty() {
                choices.push(TrailChoice::new(
                    format!("カメラ {}", photo.camera_model),
                    Anchor::camera(photo.camera_model.clone()),
                ));
            }
            if !photo.lens_model.eq_ignore_ascii_case(UNKNOWN) && !photo.lens_model.is_empty() {
                choices.push(TrailChoice::new(
                    format!("レンズ {}", photo.lens_model),
                    Anchor::lens(photo.lens_model.clone()),
                ));
            }
            choices.push(TrailChoice::new(
                format!("季節 {}", photo.season),
                Anchor::season(photo.season),
            ));
            choices.push(TrailChoice::new(
                format!("日付 {}", photo.day_key),
                Anchor::date(photo.timestamp),
            ));
        }

        if *current != Anchor::None {
            choices.push(TrailChoice::new("ホーム".to_string(), Anchor::None));
        }
        choices
    }

    /// 隣り合う IMAGE アンカーのつながり（新しい順）
    pub fn connections(&self) -> Vec<(String, String, Connection)> {
        self.history
            .adjacent_image_pairs()
            .into_iter()
            .filter_map(|(newer, older)| {
                let a = self.catalog.photo(older)?;
                let b = self.catalog.photo(newer)?;
                Some((
                    older.to_string(),
                    newer.to_string(),
                    analyze_connection(a, b, &self.catalog.tags),
                ))
            })
            .collect()
    }

    /// 履歴を古い順に並べた説明文
    pub fn narrate(&self) -> Vec<String> {
        let connections = self.connections();
        let entries: Vec<&Anchor> = self.history.entries().iter().rev().collect();
        let mut lines = Vec::with_capacity(entries.len() * 2);

        for (i, anchor) in entries.iter().enumerate() {
            if i > 0 {
                let prev = entries[i - 1];
                if let (Some(older), Some(newer)) = (prev.image_id(), anchor.image_id()) {
                    if let Some((.., connection)) = connections
                        .iter()
                        .find(|(o, n, _)| o == older && n == newer)
                    {
                        lines.push(format!("   ↳ {}", connection.narrate()));
                    }
                }
            }
            lines.push(format!("{}. {}", i + 1, self.describe(anchor)));
        }
        lines
    }

    fn describe(&self, anchor: &Anchor) -> String {
        if anchor.meta().is_some() {
            return anchor.display_label();
        }
        match anchor {
            Anchor::Image { id, .. } => self
                .catalog
                .photo(id)
                .map(|p| format!("写真 {}", p.file_name))
                .unwrap_or_else(|| anchor.display_label()),
            Anchor::Date { id, .. } => id
                .parse::<i64>()
                .ok()
                .and_then(DateTime::from_timestamp_millis)
                .map(|dt| format!("日付 {}", dt.format("%Y-%m-%d")))
                .unwrap_or_else(|| anchor.display_label()),
            _ => anchor.display_label(),
        }
    }
}

/// 対話式で探索
pub fn run_interactive_trail(catalog: &Catalog, filter: ContentFilter) -> Result<()> {
    if catalog.photos.is_empty() {
        println!("ライブラリに写真がありません。`photo-atlas scan <folder>` で取り込んでください");
        return Ok(());
    }

    let mut session = TrailSession::new(catalog, filter);

    loop {
        println!();
        print_selection(catalog, session.selection());

        let choices = session.choices();
        let mut items: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
        items.push("終了");

        let picked = Select::new()
            .with_prompt("次のアンカー")
            .items(&items)
            .default(0)
            .interact()
            .map_err(|e| PhotoAtlasError::Prompt(e.to_string()))?;

        match choices.get(picked) {
            Some(choice) => {
                session.navigate(choice.anchor.clone());
            }
            None => break,
        }
    }

    println!("\n🧭 トレイル");
    for line in session.narrate() {
        println!("{}", line);
    }
    Ok(())
}
