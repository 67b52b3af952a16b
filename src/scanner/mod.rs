mod exif;
pub mod palette;

pub use exif::{parse_exif_datetime, read_exif, ExifData};

use crate::error::{PhotoAtlasError, Result};
use chrono::{DateTime, Utc};
use photo_atlas_common::Photograph;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

pub fn scan_folder(folder: &Path, recursive: bool) -> Result<Vec<ImageInfo>> {
    if !folder.exists() {
        return Err(PhotoAtlasError::FolderNotFound(folder.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy();
            if IMAGE_EXTENSIONS.iter().any(|&e| e == ext_str) {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();

                images.push(ImageInfo {
                    path: path.to_path_buf(),
                    file_name,
                });
            }
        }
    }

    // パスでソート（再帰時もフォルダ単位でまとまる）
    images.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(images)
}

/// 画像から写真レコードを作る（EXIF・代表色、並列）
///
/// EXIFが読めない場合は更新日時を撮影日時とし、カメラ等は不明のまま。
/// 代表色が取れない場合は空パレット（エンジン側で灰色に補完）。
pub fn build_photographs(images: &[ImageInfo]) -> Vec<Photograph> {
    images
        .par_iter()
        .map(|img| {
            let exif = read_exif(&img.path).unwrap_or_else(|e| {
                debug!(file = %img.file_name, error = %e, "EXIF unavailable");
                ExifData::default()
            });
            let captured = exif
                .captured
                .unwrap_or_else(|| modified_time(&img.path).naive_utc());

            let mut photo = Photograph::from_capture(uuid::Uuid::new_v4().to_string(), captured);
            photo.file_name = img.file_name.clone();
            photo.file_path = img.path.display().to_string();
            if let Some(model) = exif.camera_model {
                photo.camera_model = model;
            }
            if let Some(model) = exif.lens_model {
                photo.lens_model = model;
            }
            photo.aperture = exif.aperture.unwrap_or_default();
            photo.shutter_speed = exif.shutter_speed.unwrap_or_default();
            photo.iso = exif.iso.unwrap_or_default();

            match palette::extract_palette(&img.path) {
                Ok(colors) => photo.palette = colors,
                Err(e) => warn!(file = %img.file_name, error = %e, "palette extraction skipped"),
            }
            photo
        })
        .collect()
}

fn modified_time(path: &Path) -> DateTime<Utc> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Check if a file extension is a supported image format
#[cfg(test)]
fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}
