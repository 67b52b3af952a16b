use clap::Parser;
use photo_atlas::cli::{Cli, Commands};
use photo_atlas::config::Config;
use photo_atlas::error::{PhotoAtlasError, Result};
use photo_atlas::library::Library;
use photo_atlas::{explore, scanner, tagger, trail};
use photo_atlas_common::{tag_id, Viewport};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "photo_atlas=debug,photo_atlas_common=debug"
    } else {
        "photo_atlas=info,photo_atlas_common=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;
    let library_dir = cli.library.clone().unwrap_or_else(|| config.library_dir.clone());

    match cli.command {
        Commands::Scan { folder, recursive } => {
            println!("📸 photo-atlas - 取り込み\n");

            println!("[1/2] 写真をスキャン中...");
            let images = scanner::scan_folder(&folder, recursive)?;
            if images.is_empty() {
                return Err(PhotoAtlasError::NoImagesFound(folder.display().to_string()));
            }
            println!("✔ {}枚の写真を検出\n", images.len());

            println!("[2/2] 撮影情報と代表色を読み取り中...");
            let photos = scanner::build_photographs(&images);
            let mut library = Library::open(&library_dir)?;
            let summary = library.upsert_photos(photos)?;
            println!("✔ 追加 {}枚 / 更新 {}枚", summary.added, summary.updated);

            println!("\n✅ 取り込み完了: {}", library.dir().display());
        }

        Commands::Tags => {
            let library = Library::open(&library_dir)?;
            let usage = library.tag_usage();
            if usage.is_empty() {
                println!("タグが登録されていません");
            }
            for (tag, count) in usage {
                println!("  {:<24} {:<12} {:>4}枚  ({})", tag.label, tag.tag_type.to_string(), count, tag.id);
            }
        }

        Commands::Tag { photo_id, add, tag_type, remove } => {
            let mut library = Library::open(&library_dir)?;
            let photo = library.photo(&photo_id)?.clone();

            let mut ids = photo.tag_ids.clone();
            for label in &add {
                let tag = library.add_tag(label, tag_type)?;
                if !ids.contains(&tag.id) {
                    ids.push(tag.id);
                }
            }
            if !add.is_empty() {
                library.assign_tags(&photo_id, ids)?;
            }
            for label in &remove {
                let id = tag_id(label);
                if library.remove_tag(&photo_id, &id)? {
                    println!("✔ 外しました: {}", label);
                } else {
                    println!("付いていないタグです: {}", label);
                }
            }

            let photo = library.photo(&photo_id)?;
            let index = library.catalog().tag_index();
            println!("{} ({})", photo.file_name, photo.id);
            for id in photo.combined_tag_ids() {
                let kind = index.tag_type(id).map(|t| t.to_string()).unwrap_or_else(|| "?".into());
                println!("  - {} [{}]", index.get(id).map(|t| t.label.as_str()).unwrap_or(id), kind);
            }
        }

        Commands::Autotag { batch_size, use_cache } => {
            println!("🏷  photo-atlas - 自動タグ付け{}\n", if use_cache { " (キャッシュ有効)" } else { "" });
            let mut library = Library::open(&library_dir)?;
            let options = batch_options(&config, batch_size)?;
            let requester = tagger::cli_requester(cli.ai_provider, Some(config.model.clone()));
            let cache_dir = use_cache.then_some(library_dir.as_path());

            let report = tagger::autotag(&mut library, &options, cache_dir, requester).await?;
            println!(
                "✔ タグ付け {}枚 / キャッシュ {}枚 / 失敗 {}枚",
                report.updated, report.cached, report.failed
            );
        }

        Commands::Harmonize { batch_size } => {
            println!("🔗 photo-atlas - タグ統一\n");
            let mut library = Library::open(&library_dir)?;
            let options = batch_options(&config, batch_size)?;
            let requester = tagger::cli_requester(cli.ai_provider, Some(config.model.clone()));

            let report = tagger::harmonize(&mut library, &options, requester).await?;
            println!("✔ 統一 {}枚 / 失敗 {}枚", report.updated, report.failed);
        }

        Commands::Explore { anchor, include_sensitive, json } => {
            let library = Library::open(&library_dir)?;
            let filter = config.content_filter(include_sensitive);
            let selection = explore::explore(library.catalog(), &anchor, &filter);

            if json {
                let output = explore::explore_output(library.catalog(), &selection);
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                explore::print_selection(library.catalog(), &selection);
            }
        }

        Commands::Simulate { anchor, frames, width, height, include_sensitive, output } => {
            let library = Library::open(&library_dir)?;
            let filter = config.content_filter(include_sensitive);
            let base = config.viewport();
            let viewport = Viewport::new(width.unwrap_or(base.width), height.unwrap_or(base.height));

            let frame = explore::simulate(library.catalog(), &anchor, &filter, viewport, frames);
            let json = serde_json::to_string_pretty(&frame)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("✔ フレームを保存: {}", path.display());
                }
                None => println!("{}", json),
            }
        }

        Commands::Connect { a, b } => {
            let library = Library::open(&library_dir)?;
            let connection = explore::connect(library.catalog(), &a, &b)?;
            let name = |id: &str| library.photo(id).map(|p| p.file_name.clone()).unwrap_or_default();
            println!("{} → {}", name(&a), name(&b));
            println!("  {}", connection.narrate());
        }

        Commands::Trail { include_sensitive } => {
            let library = Library::open(&library_dir)?;
            let filter = config.content_filter(include_sensitive);
            trail::run_interactive_trail(library.catalog(), filter)?;
        }

        Commands::Cache { clear, info } => {
            let cache_path = tagger::CacheFile::cache_path(&library_dir);

            if info || !clear {
                if cache_path.exists() {
                    let cache = tagger::CacheFile::load(&library_dir);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match tagger::CacheFile::clear(&library_dir) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }

        Commands::Config {
            show,
            set_library,
            set_model,
            set_batch_size,
            set_sensitive_label,
            set_exclude_sensitive,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(dir) = set_library {
                config.library_dir = dir;
                changed = true;
            }
            if let Some(model) = set_model {
                config.model = model;
                changed = true;
            }
            if let Some(size) = set_batch_size {
                config.set_batch_size(size)?;
                changed = true;
            }
            if let Some(label) = set_sensitive_label {
                config.sensitive_label = label;
                changed = true;
            }
            if let Some(exclude) = set_exclude_sensitive {
                config.exclude_sensitive = exclude;
                changed = true;
            }
            if changed {
                config.save()?;
                println!("✔ 設定を保存しました");
            }

            if show || !changed {
                println!("設定:");
                println!("  ライブラリ: {}", config.library_dir.display());
                println!("  モデル: {}", config.model);
                println!("  バッチサイズ: {}", config.batch_size);
                println!("  バッチ間隔: {}ms", config.batch_delay_ms);
                println!("  センシティブタグ: {}", config.sensitive_label);
                println!("  センシティブ除外: {}", if config.exclude_sensitive { "有効" } else { "無効" });
                println!("  ビューポート: {}x{}", config.viewport_width, config.viewport_height);
            }
        }
    }

    Ok(())
}

fn batch_options(config: &Config, batch_size: Option<usize>) -> Result<tagger::BatchOptions> {
    let mut config = config.clone();
    if let Some(size) = batch_size {
        config.set_batch_size(size)?;
    }
    Ok(tagger::BatchOptions {
        batch_size: config.batch_size,
        delay: Duration::from_millis(config.batch_delay_ms),
        progress: true,
    })
}
