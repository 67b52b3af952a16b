//! AIによる自動タグ付けとタグ統一
//!
//! 対象写真を `batch_size` 枚ずつに分け、バッチ内は並行に1枚1回AIを呼ぶ。
//! バッチ間は一定時間待つ。結果はライブラリへの通常の更新として適用する。

pub mod cache;
pub mod claude_cli;
pub mod labels;

pub use cache::{compute_file_hash, CacheFile};
pub use labels::{clean_label, clean_labels};

use crate::ai_provider::AiProvider;
use crate::error::{PhotoAtlasError, Result};
use crate::library::Library;
use indicatif::{ProgressBar, ProgressStyle};
use photo_atlas_common::{
    build_harmonize_prompt, build_tagging_prompt, harmonization_vocabulary, TagType,
    HARMONIZATION_VERSION,
};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// バッチ実行の設定
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub batch_size: usize,
    pub delay: Duration,
    /// 進捗バーを表示するか
    pub progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 4,
            delay: Duration::from_millis(1500),
            progress: true,
        }
    }
}

/// 1枚分の依頼
#[derive(Debug, Clone)]
pub struct LabelJob {
    pub photo_id: String,
    pub file_name: String,
    pub prompt: String,
}

/// 1枚分の結果
#[derive(Debug)]
pub struct LabelOutcome {
    pub photo_id: String,
    pub file_name: String,
    pub result: Result<Vec<String>>,
}

/// 処理結果の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagReport {
    pub updated: usize,
    pub cached: usize,
    pub failed: usize,
}

/// 依頼をバッチ単位で並行実行する
///
/// `request` はプロンプトを受けてレスポンス本文を返す。失敗した写真は結果に
/// エラーとして残り、バッチは続行する。結果は依頼順に並ぶ。
pub async fn run_batches<F, Fut>(jobs: Vec<LabelJob>, options: &BatchOptions, request: F) -> Vec<LabelOutcome>
where
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    let total = jobs.len();
    let pb = if options.progress {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("  [{bar:30}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("=> "));
        }
        pb
    } else {
        ProgressBar::hidden()
    };

    let batch_size = options.batch_size.max(1);
    let batch_count = total.div_ceil(batch_size);
    let mut outcomes: Vec<(usize, LabelOutcome)> = Vec::with_capacity(total);

    for (batch_idx, batch) in jobs.chunks(batch_size).enumerate() {
        info!(batch = batch_idx + 1, of = batch_count, photos = batch.len(), "AI batch started");

        let mut set = JoinSet::new();
        for (offset, job) in batch.iter().cloned().enumerate() {
            let index = batch_idx * batch_size + offset;
            let request = request.clone();
            set.spawn(async move {
                let result = match request(job.prompt).await {
                    Ok(response) => claude_cli::parse_labels(&response),
                    Err(e) => Err(e),
                };
                (
                    index,
                    LabelOutcome {
                        photo_id: job.photo_id,
                        file_name: job.file_name,
                        result,
                    },
                )
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    pb.set_message(outcome.file_name.clone());
                    outcomes.push((index, outcome));
                }
                Err(e) => warn!(error = %e, "AI task aborted"),
            }
            pb.inc(1);
        }

        if batch_idx + 1 < batch_count && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    pb.finish_and_clear();
    outcomes.sort_by_key(|(index, _)| *index);
    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

/// AIタグのない写真にタグを付ける
///
/// `cache_dir` を渡すとファイルハッシュでキャッシュを引き、結果も書き込む。
pub async fn autotag<F, Fut>(
    library: &mut Library,
    options: &BatchOptions,
    cache_dir: Option<&std::path::Path>,
    request: F,
) -> Result<TagReport>
where
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    let mut report = TagReport::default();
    let mut cache = cache_dir.map(CacheFile::load);
    let mut hashes: Vec<(String, String, u64)> = Vec::new();
    let mut jobs = Vec::new();

    let targets: Vec<_> = library
        .photos()
        .iter()
        .filter(|p| !p.has_ai_tags())
        .cloned()
        .collect();

    for photo in &targets {
        if let Some(cache) = cache.as_ref() {
            match compute_file_hash(std::path::Path::new(&photo.file_path)) {
                Ok((hash, size)) => {
                    if let Some(labels) = cache.get(&hash) {
                        let labels = labels.to_vec();
                        apply_labels(library, &photo.id, &labels, None)?;
                        report.cached += 1;
                        continue;
                    }
                    hashes.push((photo.id.clone(), hash, size));
                }
                Err(e) => warn!(file = %photo.file_name, error = %e, "hash failed, tagging without cache"),
            }
        }

        let index = library.catalog().tag_index();
        let existing: Vec<&str> = photo
            .tag_ids
            .iter()
            .filter_map(|id| index.get(id))
            .map(|t| t.label.as_str())
            .collect();
        jobs.push(LabelJob {
            photo_id: photo.id.clone(),
            file_name: photo.file_name.clone(),
            prompt: build_tagging_prompt(&photo.file_path, &existing),
        });
    }

    info!(photos = jobs.len(), cached = report.cached, "autotag started");
    let outcomes = run_batches(jobs, options, request).await;

    for outcome in outcomes {
        match outcome.result {
            Ok(raw) => {
                let labels = clean_labels(&raw);
                apply_labels(library, &outcome.photo_id, &labels, None)?;
                if let Some(cache) = cache.as_mut() {
                    if let Some((_, hash, size)) = hashes.iter().find(|(id, ..)| *id == outcome.photo_id) {
                        cache.insert(hash.clone(), outcome.file_name.clone(), *size, labels);
                    }
                }
                report.updated += 1;
            }
            Err(e) => {
                warn!(file = %outcome.file_name, error = %e, "tagging failed, skipped");
                report.failed += 1;
            }
        }
    }

    if let (Some(cache), Some(dir)) = (cache.as_ref(), cache_dir) {
        cache.save(dir)?;
    }
    Ok(report)
}

/// 現在の統一バージョン未満の写真のAIタグをライブラリ語彙に寄せる
pub async fn harmonize<F, Fut>(library: &mut Library, options: &BatchOptions, request: F) -> Result<TagReport>
where
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    let vocabulary = harmonization_vocabulary(library.catalog());
    let index = library.catalog().tag_index();

    let jobs: Vec<LabelJob> = library
        .photos()
        .iter()
        .filter(|p| p.has_ai_tags())
        .filter(|p| p.harmonization_version.unwrap_or(0) < HARMONIZATION_VERSION)
        .map(|p| {
            let current: Vec<&str> = p
                .ai_tag_ids
                .iter()
                .flatten()
                .filter_map(|id| index.get(id))
                .map(|t| t.label.as_str())
                .collect();
            LabelJob {
                photo_id: p.id.clone(),
                file_name: p.file_name.clone(),
                prompt: build_harmonize_prompt(&current, &vocabulary),
            }
        })
        .collect();

    info!(photos = jobs.len(), vocabulary = vocabulary.len(), "harmonization started");
    let outcomes = run_batches(jobs, options, request).await;

    let mut report = TagReport::default();
    for outcome in outcomes {
        match outcome.result {
            Ok(raw) => {
                let labels = clean_labels(&raw);
                apply_labels(library, &outcome.photo_id, &labels, Some(HARMONIZATION_VERSION))?;
                report.updated += 1;
            }
            Err(e) => {
                warn!(file = %outcome.file_name, error = %e, "harmonization failed, skipped");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

/// 依頼関数が返すFuture
pub type ResponseFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

/// AI CLIを呼ぶ依頼関数
pub fn cli_requester(
    provider: AiProvider,
    model: Option<String>,
) -> impl Fn(String) -> ResponseFuture + Clone + Send + Sync + 'static {
    move |prompt: String| -> ResponseFuture {
        Box::pin(claude_cli::run_ai_cli(provider, model.clone(), prompt))
    }
}

/// ラベルをAI生成タグとして登録し、写真のAIタグを置き換える
fn apply_labels(library: &mut Library, photo_id: &str, labels: &[String], version: Option<u32>) -> Result<()> {
    let tags = library.add_tags(labels, TagType::AiGenerated)?;
    let ids = tags.into_iter().map(|t| t.id).collect();
    match library.set_ai_tags(photo_id, ids, version) {
        // 処理中に消えた写真は無視
        Err(PhotoAtlasError::PhotoNotFound(_)) => Ok(()),
        other => other,
    }
}
