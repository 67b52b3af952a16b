use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhotoAtlasError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("写真が見つかりません: {0}")]
    PhotoNotFound(String),

    #[error("タグが見つかりません: {0}")]
    TagNotFound(String),

    #[error("タグとして使えないラベルです: {0:?}")]
    InvalidTag(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("AI CLI呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("AIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("対話入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] photo_atlas_common::Error),
}

pub type Result<T> = std::result::Result<T, PhotoAtlasError>;
