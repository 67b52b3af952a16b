//! photo-atlas
//!
//! 写真ライブラリの取り込み・タグ付けと、探索エンジン（photo-atlas-common）を
//! 呼び出すCLIの実装。

pub mod ai_provider;
pub mod cli;
pub mod config;
pub mod error;
pub mod explore;
pub mod library;
pub mod scanner;
pub mod tagger;
pub mod trail;
