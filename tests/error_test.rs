//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use photo_atlas::error::PhotoAtlasError;
use photo_atlas::explore;
use photo_atlas::library::Library;
use photo_atlas::scanner;
use photo_atlas_common::TagType;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをスキャンした場合
#[test]
fn test_scan_nonexistent_folder() {
    let result = scanner::scan_folder(Path::new("/nonexistent/path/12345"), false);
    assert!(matches!(result, Err(PhotoAtlasError::FolderNotFound(_))));
}

/// 空のフォルダをスキャンした場合
#[test]
fn test_scan_empty_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = scanner::scan_folder(dir.path(), false);

    // 空フォルダはエラーではなく空のVecを返す
    assert!(result.expect("スキャン失敗").is_empty());
}

/// 画像のないフォルダをスキャンした場合
#[test]
fn test_scan_folder_no_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("test.txt"), "hello").expect("書き込み失敗");
    std::fs::write(dir.path().join("data.json"), "{}").expect("書き込み失敗");

    let result = scanner::scan_folder(dir.path(), true).expect("スキャン失敗");
    assert!(result.is_empty());
}

/// 壊れたphotos.jsonはJSONエラー
#[test]
fn test_open_corrupted_library() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("photos.json"), "[{ broken").expect("書き込み失敗");

    let result = Library::open(dir.path());
    assert!(matches!(result, Err(PhotoAtlasError::JsonParse(_))));
}

/// 存在しない写真
#[test]
fn test_unknown_photo() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut library = Library::open(dir.path()).expect("ライブラリを開けない");

    assert!(matches!(library.photo("missing"), Err(PhotoAtlasError::PhotoNotFound(_))));
    assert!(matches!(
        library.remove_tag("missing", "sea"),
        Err(PhotoAtlasError::PhotoNotFound(_))
    ));
    assert!(matches!(
        explore::connect(library.catalog(), "a", "b"),
        Err(PhotoAtlasError::PhotoNotFound(_))
    ));
}

/// 未登録タグの割り当て
#[test]
fn test_assign_unknown_tag() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut library = Library::open(dir.path()).expect("ライブラリを開けない");
    library
        .upsert_photos(vec![photo_atlas_common::Photograph {
            id: "p1".into(),
            file_path: "/photos/p1.jpg".into(),
            ..Default::default()
        }])
        .expect("取り込み失敗");

    let result = library.assign_tags("p1", vec!["never-registered".into()]);
    assert!(matches!(result, Err(PhotoAtlasError::TagNotFound(_))));
}

/// 記号だけのラベルは登録できない
#[test]
fn test_add_tag_without_id() {
    let dir = tempdir().expect("Failed to create temp dir");
    let mut library = Library::open(dir.path()).expect("ライブラリを開けない");

    let result = library.add_tag("!!!", TagType::Categorical);
    assert!(matches!(result, Err(PhotoAtlasError::InvalidTag(_))));
    assert!(library.tags().is_empty());

    // まとめて登録するときは使えないラベルだけ飛ばす
    let tags = library
        .add_tags(&["---".to_string(), "harbor".to_string()], TagType::AiGenerated)
        .expect("タグ追加失敗");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, "harbor");
}

/// エラーメッセージ
#[test]
fn test_error_messages() {
    let err = PhotoAtlasError::PhotoNotFound("p9".into());
    assert_eq!(err.to_string(), "写真が見つかりません: p9");

    let err = PhotoAtlasError::ApiCall("timeout".into());
    assert!(err.to_string().contains("timeout"));
}
