//! ライブラリ永続化テスト

use chrono::NaiveDate;
use photo_atlas::library::{Library, UpsertSummary};
use photo_atlas_common::{Photograph, TagType};
use tempfile::tempdir;

fn photo(id: &str, path: &str, day: u32) -> Photograph {
    let when = NaiveDate::from_ymd_opt(2024, 7, day)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("日付が不正");
    let mut p = Photograph::from_capture(id, when);
    p.file_path = path.to_string();
    p.file_name = path.rsplit('/').next().unwrap_or(path).to_string();
    p
}

/// 空ディレクトリは空のライブラリ
#[test]
fn test_open_empty_library() {
    let dir = tempdir().expect("Failed to create temp dir");
    let library = Library::open(&dir.path().join("nested/lib")).expect("ライブラリを開けない");

    assert!(library.photos().is_empty());
    assert!(library.tags().is_empty());
    assert!(library.dir().exists());
}

/// 追加したタグと写真が再読み込みで残る
#[test]
fn test_persist_and_reload() {
    let dir = tempdir().expect("Failed to create temp dir");
    {
        let mut library = Library::open(dir.path()).expect("ライブラリを開けない");
        library
            .upsert_photos(vec![photo("p1", "/photos/a.jpg", 1), photo("p2", "/photos/b.jpg", 2)])
            .expect("取り込み失敗");
        let tag = library.add_tag("Golden Hour", TagType::Qualitative).expect("タグ追加失敗");
        assert_eq!(tag.id, "golden-hour");
        library.assign_tags("p1", vec![tag.id]).expect("割り当て失敗");
    }

    let library = Library::open(dir.path()).expect("ライブラリを開けない");
    assert_eq!(library.photos().len(), 2);
    assert_eq!(library.tags().len(), 1);
    assert_eq!(library.tags()[0].label, "Golden Hour");
    assert_eq!(library.photo("p1").expect("写真がない").tag_ids, vec!["golden-hour"]);
}

/// 同じパスの再取り込みはIDとタグを保ったまま更新
#[test]
fn test_upsert_keeps_identity() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut library = Library::open(dir.path()).expect("ライブラリを開けない");

    library.upsert_photos(vec![photo("p1", "/photos/a.jpg", 1)]).expect("取り込み失敗");
    let tags = library
        .add_tags(&["sea".to_string(), "Sea".to_string(), "sky".to_string()], TagType::AiGenerated)
        .expect("タグ追加失敗");
    assert_eq!(tags.len(), 2);
    library
        .set_ai_tags("p1", tags.into_iter().map(|t| t.id).collect(), Some(1))
        .expect("AIタグ設定失敗");

    let mut rescanned = photo("new-id", "/photos/a.jpg", 5);
    rescanned.camera_model = "X100V".to_string();
    let summary = library
        .upsert_photos(vec![rescanned, photo("p3", "/photos/c.jpg", 3)])
        .expect("取り込み失敗");

    assert_eq!(summary, UpsertSummary { added: 1, updated: 1 });
    let p1 = library.photo("p1").expect("IDが変わった");
    assert_eq!(p1.camera_model, "X100V");
    assert_eq!(p1.day_key, "2024-07-05");
    assert_eq!(p1.ai_tag_ids, Some(vec!["sea".to_string(), "sky".to_string()]));
    assert_eq!(p1.harmonization_version, Some(1));
    assert!(library.photo("new-id").is_err());
}

/// 既存IDのタグは種別を上書きしない
#[test]
fn test_add_tag_is_idempotent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut library = Library::open(dir.path()).expect("ライブラリを開けない");

    library.add_tag("Film", TagType::Technical).expect("タグ追加失敗");
    let again = library.add_tag("film", TagType::AiGenerated).expect("タグ追加失敗");

    assert_eq!(again.tag_type, TagType::Technical);
    assert_eq!(library.tags().len(), 1);
}

/// タグの付け外しと使用枚数
#[test]
fn test_tag_usage_and_remove() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut library = Library::open(dir.path()).expect("ライブラリを開けない");
    library
        .upsert_photos(vec![photo("p1", "/photos/a.jpg", 1), photo("p2", "/photos/b.jpg", 2)])
        .expect("取り込み失敗");
    library.add_tag("beach", TagType::Categorical).expect("タグ追加失敗");
    library.add_tag("night", TagType::Qualitative).expect("タグ追加失敗");
    library
        .assign_tags("p1", vec!["beach".into(), "beach".into(), "night".into()])
        .expect("割り当て失敗");
    library.assign_tags("p2", vec!["beach".into()]).expect("割り当て失敗");

    assert_eq!(library.photo("p1").expect("写真がない").tag_ids, vec!["beach", "night"]);
    let usage: Vec<(&str, usize)> = library
        .tag_usage()
        .into_iter()
        .map(|(t, n)| (t.id.as_str(), n))
        .collect();
    assert_eq!(usage, vec![("beach", 2), ("night", 1)]);

    assert!(library.remove_tag("p1", "beach").expect("削除失敗"));
    assert!(!library.remove_tag("p1", "beach").expect("削除失敗"));
    assert!(library.remove_photo("p2").expect("削除失敗"));
    assert!(!library.remove_photo("p2").expect("削除失敗"));

    let reloaded = Library::open(dir.path()).expect("ライブラリを開けない");
    assert_eq!(reloaded.photos().len(), 1);
    assert_eq!(reloaded.photo("p1").expect("写真がない").tag_ids, vec!["night"]);
}
