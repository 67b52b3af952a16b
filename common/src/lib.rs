//! Photo Atlas Common Library
//!
//! 探索ビューのエンジン（採点・可視選択・レイアウト・履歴・つながり）と
//! CLI/将来のフロントエンドで共有される型とユーティリティ。I/Oは行わない。

pub mod anchor;
pub mod color;
pub mod connection;
pub mod error;
pub mod history;
pub mod layout;
pub mod parser;
pub mod prompts;
pub mod scoring;
pub mod selection;
pub mod tag;
pub mod types;

pub use anchor::{Anchor, AnchorMeta, AnchorMode};
pub use color::{normalize_palette, Rgb, NEUTRAL_GRAY, PALETTE_SIZE};
pub use connection::{analyze_connection, ColorMatch, Connection, TechnicalMatch};
pub use error::{Error, Result};
pub use history::NavigationHistory;
pub use layout::{vec2, LayoutConfig, NodeFrame, Simulator, Vec2, Viewport};
pub use parser::{extract_json, parse_label_response};
pub use prompts::{
    build_harmonize_prompt, build_tagging_prompt, harmonization_vocabulary,
    HARMONIZATION_VERSION,
};
pub use scoring::{pair_score, score_photos, PairScore};
pub use selection::{select, select_in, Context, Selection};
pub use tag::{tag_id, Tag, TagIndex, TagType};
pub use types::{Catalog, ContentFilter, Photograph, Season};
