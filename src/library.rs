//! 写真ライブラリ（tags.json / photos.json）
//!
//! 開いた時点で両ファイルを読み込み、変更のたびに該当ファイルへ書き戻す。
//! タグ定義は追記のみ。

use crate::error::{PhotoAtlasError, Result};
use photo_atlas_common::{tag_id, Catalog, Photograph, Tag, TagType};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TAGS_FILE_NAME: &str = "tags.json";
const PHOTOS_FILE_NAME: &str = "photos.json";

/// 取り込み結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub added: usize,
    pub updated: usize,
}

#[derive(Debug)]
pub struct Library {
    dir: PathBuf,
    catalog: Catalog,
}

impl Library {
    /// ライブラリを開く（ファイルがなければ空、ディレクトリは作成）
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let tags: Vec<Tag> = load_json(&dir.join(TAGS_FILE_NAME))?;
        let photos: Vec<Photograph> = load_json(&dir.join(PHOTOS_FILE_NAME))?;
        debug!(dir = %dir.display(), photos = photos.len(), tags = tags.len(), "library opened");

        Ok(Self {
            dir: dir.to_path_buf(),
            catalog: Catalog::new(photos, tags),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn photos(&self) -> &[Photograph] {
        &self.catalog.photos
    }

    pub fn tags(&self) -> &[Tag] {
        &self.catalog.tags
    }

    pub fn photo(&self, id: &str) -> Result<&Photograph> {
        self.catalog
            .photo(id)
            .ok_or_else(|| PhotoAtlasError::PhotoNotFound(id.to_string()))
    }

    /// タグを登録（同じIDがあれば既存を返す）
    pub fn add_tag(&mut self, label: &str, tag_type: TagType) -> Result<Tag> {
        let tag = self.register_tag(label, tag_type)?;
        self.save_tags()?;
        Ok(tag)
    }

    /// 複数タグをまとめて登録（保存は1回）
    pub fn add_tags(&mut self, labels: &[String], tag_type: TagType) -> Result<Vec<Tag>> {
        let mut tags = Vec::with_capacity(labels.len());
        for label in labels {
            let tag = match self.register_tag(label, tag_type) {
                Ok(tag) => tag,
                Err(PhotoAtlasError::InvalidTag(_)) => continue,
                Err(e) => return Err(e),
            };
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        self.save_tags()?;
        Ok(tags)
    }

    fn register_tag(&mut self, label: &str, tag_type: TagType) -> Result<Tag> {
        let label = label.trim();
        let id = tag_id(label);
        if id.is_empty() {
            return Err(PhotoAtlasError::InvalidTag(label.to_string()));
        }
        if let Some(existing) = self.catalog.tag(&id) {
            return Ok(existing.clone());
        }
        let tag = Tag::new(label, tag_type);
        self.catalog.tags.push(tag.clone());
        Ok(tag)
    }

    /// 取り込んだ写真をファイルパスでマージ
    ///
    /// 既存パスはID・ユーザータグ・AIタグ・統一バージョンを保持して
    /// 撮影情報と代表色だけ更新する。
    pub fn upsert_photos(&mut self, incoming: Vec<Photograph>) -> Result<UpsertSummary> {
        let mut by_path: HashMap<String, usize> = self
            .catalog
            .photos
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.file_path.is_empty())
            .map(|(i, p)| (p.file_path.clone(), i))
            .collect();

        let mut summary = UpsertSummary::default();
        for mut photo in incoming {
            if let Some(&i) = by_path.get(&photo.file_path) {
                let existing = &mut self.catalog.photos[i];
                photo.id = std::mem::take(&mut existing.id);
                photo.tag_ids = std::mem::take(&mut existing.tag_ids);
                photo.ai_tag_ids = existing.ai_tag_ids.take();
                photo.harmonization_version = existing.harmonization_version;
                *existing = photo;
                summary.updated += 1;
            } else {
                by_path.insert(photo.file_path.clone(), self.catalog.photos.len());
                self.catalog.photos.push(photo);
                summary.added += 1;
            }
        }

        self.save_photos()?;
        info!(added = summary.added, updated = summary.updated, "photos merged into library");
        Ok(summary)
    }

    /// ユーザータグを置き換える
    pub fn assign_tags(&mut self, photo_id: &str, tag_ids: Vec<String>) -> Result<()> {
        for id in &tag_ids {
            if self.catalog.tag(id).is_none() {
                return Err(PhotoAtlasError::TagNotFound(id.clone()));
            }
        }
        let photo = self.photo_mut(photo_id)?;
        let mut unique: Vec<String> = Vec::with_capacity(tag_ids.len());
        for id in tag_ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        photo.tag_ids = unique;
        self.save_photos()
    }

    /// ユーザータグを1つ外す（付いていなければ何もしない）
    pub fn remove_tag(&mut self, photo_id: &str, tag_id: &str) -> Result<bool> {
        let photo = self.photo_mut(photo_id)?;
        let before = photo.tag_ids.len();
        photo.tag_ids.retain(|id| id != tag_id);
        let removed = photo.tag_ids.len() != before;
        if removed {
            self.save_photos()?;
        }
        Ok(removed)
    }

    /// AIタグを置き換え、統一バージョンを記録する
    pub fn set_ai_tags(
        &mut self,
        photo_id: &str,
        tag_ids: Vec<String>,
        harmonization_version: Option<u32>,
    ) -> Result<()> {
        let photo = self.photo_mut(photo_id)?;
        photo.ai_tag_ids = Some(tag_ids);
        photo.harmonization_version = harmonization_version;
        self.save_photos()
    }

    pub fn remove_photo(&mut self, photo_id: &str) -> Result<bool> {
        let before = self.catalog.photos.len();
        self.catalog.photos.retain(|p| p.id != photo_id);
        let removed = self.catalog.photos.len() != before;
        if removed {
            self.save_photos()?;
        }
        Ok(removed)
    }

    /// タグごとの使用枚数（タグ定義順）
    pub fn tag_usage(&self) -> Vec<(&Tag, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for photo in &self.catalog.photos {
            for id in photo.combined_tag_ids() {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        self.catalog
            .tags
            .iter()
            .map(|t| (t, counts.get(t.id.as_str()).copied().unwrap_or(0)))
            .collect()
    }

    fn photo_mut(&mut self, id: &str) -> Result<&mut Photograph> {
        self.catalog
            .photos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| PhotoAtlasError::PhotoNotFound(id.to_string()))
    }

    fn save_tags(&self) -> Result<()> {
        save_json(&self.dir.join(TAGS_FILE_NAME), &self.catalog.tags)
    }

    fn save_photos(&self) -> Result<()> {
        save_json(&self.dir.join(PHOTOS_FILE_NAME), &self.catalog.photos)
    }
}

fn load_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, value)?;
    Ok(())
}
