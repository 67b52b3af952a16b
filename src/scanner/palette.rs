//! 代表色の抽出
//!
//! 縮小画像の画素を各チャンネル上位3ビットで量子化し、
//! 出現数の多いバケツから順に平均色を取る。

use crate::error::{PhotoAtlasError, Result};
use image::RgbImage;
use photo_atlas_common::{Rgb, PALETTE_SIZE};
use std::collections::HashMap;
use std::path::Path;

/// 抽出前の縮小サイズ
const SAMPLE_SIZE: u32 = 64;

pub fn extract_palette(path: &Path) -> Result<Vec<String>> {
    let img = image::open(path)
        .map_err(|e| PhotoAtlasError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    let small = img.thumbnail(SAMPLE_SIZE, SAMPLE_SIZE).to_rgb8();
    Ok(dominant_colors(&small, PALETTE_SIZE))
}

#[derive(Default)]
struct Bucket {
    count: u64,
    sum: [u64; 3],
    first: usize,
}

/// 出現数の多い順に最大 `limit` 色（同数は先に現れた順）
pub fn dominant_colors(img: &RgbImage, limit: usize) -> Vec<String> {
    let mut buckets: HashMap<(u8, u8, u8), Bucket> = HashMap::new();

    for (i, pixel) in img.pixels().enumerate() {
        let [r, g, b] = pixel.0;
        let bucket = buckets.entry((r >> 5, g >> 5, b >> 5)).or_insert_with(|| Bucket {
            first: i,
            ..Default::default()
        });
        bucket.count += 1;
        bucket.sum[0] += r as u64;
        bucket.sum[1] += g as u64;
        bucket.sum[2] += b as u64;
    }

    let mut ranked: Vec<Bucket> = buckets.into_values().collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then(a.first.cmp(&b.first)));

    ranked
        .into_iter()
        .take(limit)
        .map(|bucket| {
            let avg = |sum: u64| (sum / bucket.count) as u8;
            Rgb::new(avg(bucket.sum[0]), avg(bucket.sum[1]), avg(bucket.sum[2])).to_hex()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb as Pixel;

    #[test]
    fn test_dominant_colors_order() {
        let mut img = RgbImage::new(10, 1);
        for x in 0..10 {
            let color = if x < 6 { [200, 20, 20] } else { [10, 10, 240] };
            img.put_pixel(x, 0, Pixel(color));
        }
        let colors = dominant_colors(&img, 5);
        assert_eq!(colors, vec!["#c81414", "#0a0af0"]);
    }

    #[test]
    fn test_dominant_colors_limit() {
        let mut img = RgbImage::new(8, 1);
        for x in 0..8 {
            img.put_pixel(x, 0, Pixel([(x * 32) as u8, 0, 0]));
        }
        assert_eq!(dominant_colors(&img, 5).len(), 5);
    }

    #[test]
    fn test_extract_palette_from_png() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("green.png");
        RgbImage::from_pixel(4, 4, Pixel([0, 128, 0]))
            .save(&path)
            .expect("画像保存失敗");

        assert_eq!(extract_palette(&path).expect("抽出失敗"), vec!["#008000"]);
    }

    #[test]
    fn test_extract_palette_invalid_file() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"broken").unwrap();
        assert!(matches!(extract_palette(&path), Err(PhotoAtlasError::ImageLoad(_))));
    }
}
