//! 色ユーティリティ
//!
//! パレットは常に5色。欠損・不正データは中立グレーで補う。

use serde::{Deserialize, Serialize};

/// パレットの色数
pub const PALETTE_SIZE: usize = 5;

/// 中立グレー（パレット補完用）
pub const NEUTRAL_GRAY: &str = "#808080";

/// 8bit RGB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` / `rrggbb` / `#rgb` を解釈
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim().trim_start_matches('#');
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b))
            }
            3 => {
                let expand = |i: usize| u8::from_str_radix(&hex[i..i + 1].repeat(2), 16).ok();
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    /// 小文字の `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// RGB空間でのユークリッド距離の2乗
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

/// 16進カラー文字列を小文字 `#rrggbb` に正規化（不正なら None）
pub fn normalize_hex(value: &str) -> Option<String> {
    Rgb::from_hex(value).map(Rgb::to_hex)
}

/// パレットを5色に正規化する
///
/// 不正な要素は捨て、残りを繰り返して5色に埋める。
/// 有効な色が1つもなければ中立グレー5色。
pub fn normalize_palette(colors: &[String]) -> [Rgb; PALETTE_SIZE] {
    let valid: Vec<Rgb> = colors.iter().filter_map(|c| Rgb::from_hex(c)).collect();
    let gray = Rgb::new(0x80, 0x80, 0x80);
    if valid.is_empty() {
        return [gray; PALETTE_SIZE];
    }
    let mut out = [gray; PALETTE_SIZE];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = valid[i % valid.len()];
    }
    out
}

/// 2つのパレット間の最小距離（全ペア）
pub fn min_palette_distance(a: &[Rgb], b: &[Rgb]) -> u32 {
    a.iter()
        .flat_map(|ca| b.iter().map(move |cb| ca.distance_sq(*cb)))
        .min()
        .unwrap_or(u32::MAX)
}

/// パレット内で指定色に最も近い距離
pub fn min_distance_to(palette: &[Rgb], target: Rgb) -> u32 {
    palette
        .iter()
        .map(|c| c.distance_sq(target))
        .min()
        .unwrap_or(u32::MAX)
}
