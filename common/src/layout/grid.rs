//! ビューポートとグリッド配置

use super::vector::{vec2, Vec2};
use serde::{Deserialize, Serialize};

/// この幅未満を狭い画面として扱う
pub const NARROW_WIDTH: f64 = 768.0;

/// 表示領域
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 1280.0, height: 800.0 }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.width / 2.0, self.height / 2.0)
    }

    pub fn is_narrow(&self) -> bool {
        self.width < NARROW_WIDTH
    }
}

/// 行列グリッド（ビューポート中心に配置）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub rows: usize,
    pub cell: f64,
    /// 左上セルの左上座標
    pub origin: Vec2,
}

impl GridLayout {
    /// `count` 個を `columns` 列で `center` 中心に並べる
    pub fn new(count: usize, columns: usize, cell: f64, center: Vec2) -> Self {
        let columns = columns.max(1);
        let rows = count.div_ceil(columns);
        let width = columns as f64 * cell;
        let height = rows as f64 * cell;
        Self {
            columns,
            rows,
            cell,
            origin: vec2(center.x - width / 2.0, center.y - height / 2.0),
        }
    }

    /// 幅から列数を決めて並べる
    pub fn fit(count: usize, viewport: &Viewport, cell: f64, margin: f64) -> Self {
        let available = (viewport.width - 2.0 * margin).max(cell);
        let columns = ((available / cell).floor() as usize).max(1);
        Self::new(count, columns, cell, viewport.center())
    }

    pub fn width(&self) -> f64 {
        self.columns as f64 * self.cell
    }

    pub fn height(&self) -> f64 {
        self.rows as f64 * self.cell
    }

    /// i 番目のセル中心
    pub fn position(&self, index: usize) -> Vec2 {
        let col = index % self.columns;
        let row = index / self.columns;
        vec2(
            self.origin.x + (col as f64 + 0.5) * self.cell,
            self.origin.y + (row as f64 + 0.5) * self.cell,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_rows_and_centering() {
        let center = vec2(500.0, 400.0);
        let grid = GridLayout::new(37, 6, 100.0, center);
        assert_eq!(grid.rows, 7);
        assert_eq!(grid.width(), 600.0);
        assert_eq!(grid.height(), 700.0);
        assert_eq!(grid.origin, vec2(200.0, 50.0));
        assert_eq!(grid.position(0), vec2(250.0, 100.0));
        assert_eq!(grid.position(7), vec2(350.0, 200.0));
        assert_eq!(grid.position(36), vec2(250.0, 700.0));

        // 全セルの中心の外接矩形がビューポート中心に対して左右対称
        let first = grid.position(0);
        let last_col = grid.position(5);
        assert_eq!((first.x + last_col.x) / 2.0, center.x);
    }

    #[test]
    fn test_grid_fit_columns() {
        let viewport = Viewport::new(920.0, 800.0);
        let grid = GridLayout::fit(37, &viewport, 140.0, 40.0);
        assert_eq!(grid.columns, 6);
        assert_eq!(grid.rows, 7);
    }

    #[test]
    fn test_grid_zero_columns_clamped() {
        let grid = GridLayout::new(3, 0, 50.0, Vec2::zero());
        assert_eq!(grid.columns, 1);
        assert_eq!(grid.rows, 3);
    }

    #[test]
    fn test_viewport_narrow() {
        assert!(Viewport::new(375.0, 812.0).is_narrow());
        assert!(!Viewport::default().is_narrow());
    }
}
