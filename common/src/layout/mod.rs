//! 空間レイアウトシミュレータ
//!
//! 1フレームごとに `step` を呼ぶ。各ノードの目標（位置・スケール・不透明度）を
//! アンカー種別ごとの配置関数で決め、速度に力を積算して減衰・積分する。
//!
//! ノードは写真IDをキーにした集合で保持し、アンカーが変わっても作り直さない。
//! `apply_selection` は目標を差し替えるだけで、位置と速度はそのまま引き継ぐ。

mod grid;
mod vector;

pub use grid::{GridLayout, Viewport, NARROW_WIDTH};
pub use vector::{vec2, Vec2};

use vector::{from_angle, left_normal, unit_or_zero};

use crate::anchor::AnchorMode;
use crate::selection::Selection;
use crate::types::Photograph;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use tracing::debug;

/// シミュレーションの係数
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// 毎フレームの速度減衰
    pub damping: f64,
    /// フェードアウト時の補間係数
    pub ease_out: f64,
    /// 表示中・フェードイン時の補間係数
    pub ease_in: f64,

    pub home_cell: f64,
    pub home_cell_narrow: f64,
    pub home_margin: f64,
    pub home_margin_narrow: f64,
    pub home_spring: f64,
    pub home_scale: f64,

    pub cluster_cell: f64,
    pub cluster_cell_narrow: f64,
    pub cluster_spring: f64,
    pub cluster_scale: f64,

    /// 焦点の縦位置（高さに対する比率）
    pub focal_ratio: f64,
    pub hero_spring: f64,
    /// アンカーノードの追加減衰
    pub hero_damping: f64,
    pub hero_scale: f64,
    pub hero_scale_narrow: f64,
    /// 軌道中心を焦点からどれだけ下げるか（高さに対する比率）
    pub orbit_drop_ratio: f64,
    pub gravity: f64,
    pub swirl: f64,
    /// 高関連とみなすスコア
    pub relevance_threshold: i64,
    pub neighbor_scale_high: f64,
    pub neighbor_scale_low: f64,
    /// 狭い画面での近傍スケール倍率
    pub narrow_factor: f64,
    /// 軌道中心からの境界半径（長辺に対する比率）
    pub boundary_ratio: f64,
    pub boundary_damping: f64,

    pub repulsion_strength: f64,
    pub repulsion_range: f64,
    /// 反発計算の最小距離（重なり時の発散を抑える）
    pub repulsion_min_distance: f64,
    pub collision_strength: f64,
    pub hero_radius: f64,
    pub neighbor_radius: f64,
    /// クラスタメンバーの半径（セルに対する比率）
    pub member_radius_ratio: f64,

    pub ambient_amplitude: f64,
    pub ambient_frequency: f64,
    /// 1秒あたりのフレーム数（環境振動の時間軸）
    pub frames_per_second: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            damping: 0.9,
            ease_out: 0.35,
            ease_in: 0.1,

            home_cell: 140.0,
            home_cell_narrow: 90.0,
            home_margin: 40.0,
            home_margin_narrow: 16.0,
            home_spring: 0.15,
            home_scale: 0.5,

            cluster_cell: 180.0,
            cluster_cell_narrow: 120.0,
            cluster_spring: 0.12,
            cluster_scale: 0.6,

            focal_ratio: 0.35,
            hero_spring: 0.2,
            hero_damping: 0.6,
            hero_scale: 1.8,
            hero_scale_narrow: 1.2,
            orbit_drop_ratio: 0.25,
            gravity: 0.004,
            swirl: 0.0015,
            relevance_threshold: 300,
            neighbor_scale_high: 0.7,
            neighbor_scale_low: 0.45,
            narrow_factor: 0.75,
            boundary_ratio: 0.6,
            boundary_damping: 0.5,

            repulsion_strength: 1800.0,
            repulsion_range: 400.0,
            repulsion_min_distance: 20.0,
            collision_strength: 0.5,
            hero_radius: 150.0,
            neighbor_radius: 60.0,
            member_radius_ratio: 0.45,

            ambient_amplitude: 0.05,
            ambient_frequency: 0.8,
            frames_per_second: 60.0,
        }
    }
}

/// ノードの役割（衝突半径と環境振動の有無を決める）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeRole {
    #[default]
    Hidden,
    Home,
    Hero,
    Neighbor,
    Member,
}

impl NodeRole {
    fn on_grid(self) -> bool {
        matches!(self, NodeRole::Home | NodeRole::Member)
    }
}

/// 写真1枚分の物理状態
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimNode {
    pub id: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub scale: f64,
    pub target_scale: f64,
    pub opacity: f64,
    pub target_opacity: f64,
    pub score: i64,
    pub visible: bool,
    /// 生成時に決まるホームグリッドの並び順
    pub grid_sort_key: f64,
    /// 環境振動の位相
    pub phase: f64,
    /// 直近フレームのばね目標（グリッド・焦点のみ）
    pub target: Option<Vec2>,
    pub role: NodeRole,
}

impl SimNode {
    fn spawn(id: &str, at: Vec2, rng: &mut StdRng) -> Self {
        Self {
            id: id.to_string(),
            position: at,
            velocity: Vec2::zero(),
            scale: 0.0,
            target_scale: 0.0,
            opacity: 0.0,
            target_opacity: 0.0,
            score: 0,
            visible: false,
            grid_sort_key: rng.gen::<f64>(),
            phase: rng.gen_range(0.0..TAU),
            target: None,
            role: NodeRole::Hidden,
        }
    }

    fn spring_to(&mut self, target: Vec2, k: f64) {
        self.velocity += (target - self.position) * k;
        self.target = Some(target);
    }

    fn hide(&mut self) {
        self.target_scale = 0.0;
        self.target_opacity = 0.0;
        self.target = None;
        self.role = NodeRole::Hidden;
    }
}

/// 描画側へ渡す1フレーム分の出力
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeFrame {
    pub id: String,
    pub position: Vec2,
    pub scale: f64,
    pub opacity: f64,
}

/// 配置関数
type LayoutFn = fn(&mut Simulator, f64);

/// アンカー種別 → 配置関数
fn layout_strategy(mode: AnchorMode) -> LayoutFn {
    match mode {
        AnchorMode::None => layout_home,
        AnchorMode::Image => layout_focus,
        _ => layout_cluster,
    }
}

/// レイアウトシミュレータ
#[derive(Debug, Clone)]
pub struct Simulator {
    nodes: HashMap<String, SimNode>,
    /// カタログ順
    order: Vec<String>,
    /// 直近の選択の可視順（クラスタの並び順に使う）
    visible_order: Vec<String>,
    mode: AnchorMode,
    anchor_id: String,
    viewport: Viewport,
    config: LayoutConfig,
    rng: StdRng,
    frame: u64,
}

impl Simulator {
    pub fn new(viewport: Viewport, seed: u64) -> Self {
        Self::with_config(viewport, seed, LayoutConfig::default())
    }

    pub fn with_config(viewport: Viewport, seed: u64, config: LayoutConfig) -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            visible_order: Vec::new(),
            mode: AnchorMode::None,
            anchor_id: String::new(),
            viewport,
            config,
            rng: StdRng::seed_from_u64(seed),
            frame: 0,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn mode(&self) -> AnchorMode {
        self.mode
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut SimNode> {
        self.nodes.get_mut(id)
    }

    /// カタログ順のノード
    pub fn nodes(&self) -> impl Iterator<Item = &SimNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// カタログの変化をノード集合に反映する
    ///
    /// 残る写真は状態を保持、消えた写真は削除、新しい写真は中心に
    /// スケール0・不透明度0で生成する。
    pub fn sync_catalog(&mut self, photos: &[Photograph]) {
        let center = self.viewport.center();
        let keep: HashSet<&str> = photos.iter().map(|p| p.id.as_str()).collect();
        let before = self.nodes.len();
        self.nodes.retain(|id, _| keep.contains(id.as_str()));
        let removed = before - self.nodes.len();

        let mut added = 0;
        for photo in photos {
            if !self.nodes.contains_key(&photo.id) {
                let node = SimNode::spawn(&photo.id, center, &mut self.rng);
                self.nodes.insert(photo.id.clone(), node);
                added += 1;
            }
        }
        self.order = photos.iter().map(|p| p.id.clone()).collect();
        self.visible_order.retain(|id| keep.contains(id.as_str()));

        debug!(nodes = self.order.len(), added, removed, "catalog synced");
    }

    /// 選択結果で目標を差し替える（ノードは作り直さない）
    pub fn apply_selection(&mut self, selection: &Selection) {
        self.mode = selection.anchor.mode();
        self.anchor_id = selection.anchor.id().to_string();

        let visible: HashSet<&str> = selection.visible.iter().map(String::as_str).collect();
        for node in self.nodes.values_mut() {
            node.visible = visible.contains(node.id.as_str());
            node.score = selection.score(&node.id);
        }
        self.visible_order = selection
            .visible
            .iter()
            .filter(|id| self.nodes.contains_key(id.as_str()))
            .cloned()
            .collect();

        debug!(
            mode = self.mode.as_str(),
            visible = self.visible_order.len(),
            "selection applied to simulator"
        );
    }

    /// 1フレーム進める
    pub fn step(&mut self) {
        self.frame += 1;
        let time = self.frame as f64 / self.config.frames_per_second;

        for node in self.nodes.values_mut() {
            if !node.visible {
                node.hide();
            }
        }

        layout_strategy(self.mode)(self, time);

        if self.mode != AnchorMode::None {
            self.apply_pair_forces();
        }

        self.integrate();

        if self.mode == AnchorMode::Image {
            self.contain_neighbors();
        }
    }

    /// 複数フレーム進める
    pub fn run(&mut self, frames: usize) {
        for _ in 0..frames {
            self.step();
        }
    }

    /// 描画側への出力（カタログ順）
    pub fn frame(&self) -> Vec<NodeFrame> {
        self.nodes()
            .map(|n| NodeFrame {
                id: n.id.clone(),
                position: n.position,
                scale: n.scale,
                opacity: n.opacity,
            })
            .collect()
    }

    /// IMAGE モードの焦点
    pub fn focal_point(&self) -> Vec2 {
        vec2(
            self.viewport.width / 2.0,
            self.viewport.height * self.config.focal_ratio,
        )
    }

    /// IMAGE モードの軌道中心（焦点の下）
    pub fn orbit_center(&self) -> Vec2 {
        self.focal_point() + vec2(0.0, self.viewport.height * self.config.orbit_drop_ratio)
    }

    /// IMAGE モードの境界半径
    pub fn boundary_radius(&self) -> f64 {
        self.viewport.width.max(self.viewport.height) * self.config.boundary_ratio
    }

    /// ホームグリッドの配置
    pub fn home_grid(&self, count: usize) -> GridLayout {
        let cell = if self.viewport.is_narrow() {
            self.config.home_cell_narrow
        } else {
            self.config.home_cell
        };
        let margin = if self.viewport.is_narrow() {
            self.config.home_margin_narrow
        } else {
            self.config.home_margin
        };
        GridLayout::fit(count, &self.viewport, cell, margin)
    }

    /// クラスタグリッドの配置
    pub fn cluster_grid(&self, count: usize) -> GridLayout {
        GridLayout::fit(count, &self.viewport, self.cluster_cell(), self.config.home_margin)
    }

    fn cluster_cell(&self) -> f64 {
        if self.viewport.is_narrow() {
            self.config.cluster_cell_narrow
        } else {
            self.config.cluster_cell
        }
    }

    fn responsive(&self, value: f64) -> f64 {
        if self.viewport.is_narrow() {
            value * self.config.narrow_factor
        } else {
            value
        }
    }

    fn collision_radius(&self, role: NodeRole) -> f64 {
        match role {
            NodeRole::Hero => self.responsive(self.config.hero_radius),
            NodeRole::Neighbor => self.responsive(self.config.neighbor_radius),
            NodeRole::Member => self.cluster_cell() * self.config.member_radius_ratio,
            NodeRole::Home | NodeRole::Hidden => 0.0,
        }
    }

    fn ambient(&self, node: &SimNode, time: f64) -> Vec2 {
        let w = self.config.ambient_frequency;
        vec2(
            (time * w + node.phase).sin(),
            (time * w * 0.8 + node.phase).cos(),
        ) * self.config.ambient_amplitude
    }

    /// 共に可視なノード間の反発と衝突回避
    fn apply_pair_forces(&mut self) {
        let active: Vec<(String, Vec2, f64, f64)> = self
            .order
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .filter(|n| n.role != NodeRole::Hidden)
            .map(|n| (n.id.clone(), n.position, self.collision_radius(n.role), n.phase))
            .collect();

        let strength = self.config.repulsion_strength;
        let range = self.config.repulsion_range;
        let mut impulses = vec![Vec2::zero(); active.len()];

        for i in 0..active.len() {
            for j in (i + 1)..active.len() {
                let (_, pi, ri, phase_i) = &active[i];
                let (_, pj, rj, phase_j) = &active[j];
                let delta = *pi - *pj;
                let dist = delta.length();
                // 重なっているときは位相差の方向へ押し出す
                let dir = if dist > 1e-6 {
                    delta * (1.0 / dist)
                } else {
                    from_angle(phase_i - phase_j)
                };
                let dist = dist.max(1.0);

                if dist < range {
                    let d = dist.max(self.config.repulsion_min_distance);
                    let push = dir * (strength / (d * d));
                    impulses[i] += push;
                    impulses[j] -= push;
                }

                let min_dist = ri + rj;
                if dist < min_dist {
                    let push = dir * ((min_dist - dist) * self.config.collision_strength * 0.5);
                    impulses[i] += push;
                    impulses[j] -= push;
                }
            }
        }

        for ((id, ..), impulse) in active.iter().zip(impulses) {
            if let Some(node) = self.nodes.get_mut(id) {
                node.velocity += impulse;
            }
        }
    }

    /// 境界を越えた近傍を境界の内側へ戻し、速度を落とす
    fn contain_neighbors(&mut self) {
        let orbit = self.orbit_center();
        let boundary = self.boundary_radius();
        let damping = self.config.boundary_damping;

        for node in self.nodes.values_mut() {
            if node.role != NodeRole::Neighbor {
                continue;
            }
            let offset = node.position - orbit;
            if offset.length() > boundary {
                node.position = orbit + unit_or_zero(offset) * (boundary * 0.95);
                node.velocity *= damping;
            }
        }
    }

    /// 減衰・積分・スケールと不透明度の補間
    fn integrate(&mut self) {
        let damping = self.config.damping;
        let ease_out = self.config.ease_out;
        let ease_in = self.config.ease_in;

        for node in self.nodes.values_mut() {
            node.velocity *= damping;
            node.position += node.velocity;

            let fading_out = node.target_opacity < node.opacity;
            let factor = if fading_out { ease_out } else { ease_in };
            node.scale = ease(node.scale, node.target_scale, factor);
            node.opacity = ease(node.opacity, node.target_opacity, factor);
        }
    }
}

/// 線形補間（十分近ければ目標に吸着）
fn ease(current: f64, target: f64, factor: f64) -> f64 {
    let next = current + (target - current) * factor;
    if (target - next).abs() < 1e-3 {
        target
    } else {
        next
    }
}

/// NONE: ソートキー順のホームグリッド
fn layout_home(sim: &mut Simulator, _time: f64) {
    let mut visible: Vec<(f64, String)> = sim
        .nodes
        .values()
        .filter(|n| n.visible)
        .map(|n| (n.grid_sort_key, n.id.clone()))
        .collect();
    visible.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let grid = sim.home_grid(visible.len());
    let spring = sim.config.home_spring;
    let scale = sim.config.home_scale;

    for (slot, (_, id)) in visible.iter().enumerate() {
        if let Some(node) = sim.nodes.get_mut(id) {
            node.spring_to(grid.position(slot), spring);
            node.target_scale = scale;
            node.target_opacity = 1.0;
            node.role = NodeRole::Home;
        }
    }
}

/// IMAGE: アンカーを焦点に、近傍を軌道上に
fn layout_focus(sim: &mut Simulator, time: f64) {
    let focal = sim.focal_point();
    let orbit = sim.orbit_center();
    let hero_scale = if sim.viewport.is_narrow() {
        sim.config.hero_scale_narrow
    } else {
        sim.config.hero_scale
    };
    let high = sim.responsive(sim.config.neighbor_scale_high);
    let low = sim.responsive(sim.config.neighbor_scale_low);
    let threshold = sim.config.relevance_threshold;
    let hero_spring = sim.config.hero_spring;
    let hero_damping = sim.config.hero_damping;
    let gravity = sim.config.gravity;
    let swirl = sim.config.swirl;

    let ids: Vec<String> = sim.visible_order.clone();
    for id in &ids {
        let ambient = match sim.nodes.get(id) {
            Some(node) => sim.ambient(node, time),
            None => continue,
        };
        let is_anchor = *id == sim.anchor_id;
        let Some(node) = sim.nodes.get_mut(id) else {
            continue;
        };
        node.target_opacity = 1.0;

        if is_anchor {
            node.spring_to(focal, hero_spring);
            node.velocity *= hero_damping;
            node.target_scale = hero_scale;
            node.role = NodeRole::Hero;
            continue;
        }

        let offset = node.position - orbit;
        node.velocity += offset * -gravity + left_normal(offset) * swirl;
        node.velocity += ambient;
        node.target = None;
        node.target_scale = if node.score >= threshold { high } else { low };
        node.role = NodeRole::Neighbor;
    }
}

/// クラスタ: 可視ノードを挿入順で大きめのグリッドに
fn layout_cluster(sim: &mut Simulator, _time: f64) {
    let ids: Vec<String> = sim.visible_order.clone();
    let grid = sim.cluster_grid(ids.len());
    let spring = sim.config.cluster_spring;
    let scale = sim.config.cluster_scale;

    for (slot, id) in ids.iter().enumerate() {
        if let Some(node) = sim.nodes.get_mut(id) {
            node.spring_to(grid.position(slot), spring);
            node.target_scale = scale;
            node.target_opacity = 1.0;
            node.role = NodeRole::Member;
        }
    }
}
