use crate::error::{PhotoAtlasError, Result};
use photo_atlas_common::{ContentFilter, Viewport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// tags.json / photos.json を置くディレクトリ
    pub library_dir: PathBuf,
    pub model: String,
    pub batch_size: usize,
    /// バッチ間の待機（ミリ秒）
    pub batch_delay_ms: u64,
    pub sensitive_label: String,
    pub exclude_sensitive: bool,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_dir: default_library_dir(),
            model: "claude-sonnet-4-20250514".into(),
            batch_size: 4,
            batch_delay_ms: 1500,
            sensitive_label: "nsfw".into(),
            exclude_sensitive: true,
            viewport_width: 1280.0,
            viewport_height: 800.0,
        }
    }
}

fn default_library_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photo-atlas")
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PhotoAtlasError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-atlas").join("config.json"))
    }

    /// センシティブ除外フィルタ（`include_sensitive` で一時的に無効化）
    pub fn content_filter(&self, include_sensitive: bool) -> ContentFilter {
        ContentFilter::new(&self.sensitive_label, self.exclude_sensitive && !include_sensitive)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    pub fn set_batch_size(&mut self, size: usize) -> Result<()> {
        if size == 0 {
            return Err(PhotoAtlasError::Config("バッチサイズは1以上にしてください".into()));
        }
        self.batch_size = size;
        Ok(())
    }
}
