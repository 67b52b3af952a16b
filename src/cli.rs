use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use photo_atlas_common::{Anchor, TagType};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photo-atlas")]
#[command(about = "写真キュレーション・探索ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (claude/codex/gemini)
    #[arg(long, default_value = "claude", global = true)]
    pub ai_provider: AiProvider,

    /// ライブラリディレクトリ（省略時は設定値）
    #[arg(long, global = true)]
    pub library: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真フォルダを取り込む
    Scan {
        /// 写真フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,
    },

    /// タグ定義と使用枚数を一覧
    Tags,

    /// 写真のユーザータグを編集
    Tag {
        /// 写真ID
        #[arg(required = true)]
        photo_id: String,

        /// 追加するタグのラベル（複数可）
        #[arg(long)]
        add: Vec<String>,

        /// 追加タグの種別 (technical/seasonal/categorical/qualitative/ai)
        #[arg(long = "type", default_value = "categorical")]
        tag_type: TagType,

        /// 外すタグのラベル（複数可）
        #[arg(long)]
        remove: Vec<String>,
    },

    /// AIタグのない写真に自動でタグを付ける
    Autotag {
        /// バッチサイズ（同時に処理する枚数）
        #[arg(short, long)]
        batch_size: Option<usize>,

        /// キャッシュを使用（再タグ付けをスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// AIタグをライブラリの語彙に統一
    Harmonize {
        /// バッチサイズ
        #[arg(short, long)]
        batch_size: Option<usize>,
    },

    /// アンカーを指定して可視写真と文脈を表示
    Explore {
        /// アンカー (none / image:<id> / tag:<id> / color:#rrggbb / date:<ms> /
        /// camera:<model> / lens:<model> / season:<name>)
        #[arg(required = true)]
        anchor: Anchor,

        /// センシティブ写真も含める
        #[arg(long)]
        include_sensitive: bool,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// レイアウトを計算して最終フレームをJSONで出力
    Simulate {
        /// アンカー
        #[arg(required = true)]
        anchor: Anchor,

        /// アンカー遷移後のフレーム数
        #[arg(short, long, default_value = "180")]
        frames: usize,

        /// ビューポート幅（省略時は設定値）
        #[arg(long)]
        width: Option<f64>,

        /// ビューポート高さ（省略時は設定値）
        #[arg(long)]
        height: Option<f64>,

        /// センシティブ写真も含める
        #[arg(long)]
        include_sensitive: bool,

        /// 出力ファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 2枚の写真のつながりを表示
    Connect {
        /// 写真ID
        #[arg(required = true)]
        a: String,

        /// 写真ID
        #[arg(required = true)]
        b: String,
    },

    /// 対話的に探索
    Trail {
        /// センシティブ写真も含める
        #[arg(long)]
        include_sensitive: bool,
    },

    /// 自動タグ付けキャッシュの管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// ライブラリディレクトリを設定
        #[arg(long)]
        set_library: Option<PathBuf>,

        /// AIモデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// バッチサイズを設定
        #[arg(long)]
        set_batch_size: Option<usize>,

        /// センシティブタグのラベルを設定
        #[arg(long)]
        set_sensitive_label: Option<String>,

        /// センシティブ写真を既定で除外するか
        #[arg(long)]
        set_exclude_sensitive: Option<bool>,
    },
}
