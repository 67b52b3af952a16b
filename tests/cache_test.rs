//! キャッシュ機能テスト
//!
//! 自動タグ付けキャッシュの動作を検証

use photo_atlas::tagger::{compute_file_hash, CacheFile};
use tempfile::tempdir;

/// 空のキャッシュファイル
#[test]
fn test_cache_file_empty() {
    let dir = tempdir().expect("Failed to create temp dir");
    let cache = CacheFile::load(dir.path());

    assert_eq!(cache.len(), 0);
    assert!(cache.is_empty());
}

/// キャッシュの保存と読み込み
#[test]
fn test_cache_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");

    let mut cache = CacheFile::load(dir.path());
    cache.insert(
        "abc123".to_string(),
        "test.jpg".to_string(),
        1024,
        vec!["sunset".to_string(), "harbor".to_string()],
    );
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    // 再読み込み
    let loaded = CacheFile::load(dir.path());
    assert_eq!(loaded.len(), 1);
    let labels = loaded.get("abc123").expect("キャッシュが見つからない");
    assert_eq!(labels, ["sunset", "harbor"]);
    assert!(loaded.get("unknown").is_none());
}

/// 壊れたキャッシュファイルは空として扱う
#[test]
fn test_cache_corrupted_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(CacheFile::cache_path(dir.path()), "{ not json").expect("書き込み失敗");

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// バージョン違いのキャッシュは捨てる
#[test]
fn test_cache_version_mismatch() {
    let dir = tempdir().expect("Failed to create temp dir");
    let json = r#"{"version": 99, "entries": {"h": {"file_name": "a.jpg", "file_size": 1, "labels": ["x"]}}}"#;
    std::fs::write(CacheFile::cache_path(dir.path()), json).expect("書き込み失敗");

    let cache = CacheFile::load(dir.path());
    assert!(cache.is_empty());
}

/// キャッシュ削除
#[test]
fn test_cache_clear() {
    let dir = tempdir().expect("Failed to create temp dir");

    assert!(!CacheFile::clear(dir.path()).expect("削除失敗"));

    let mut cache = CacheFile::load(dir.path());
    cache.insert("h".into(), "a.jpg".into(), 1, vec!["sea".into()]);
    cache.save(dir.path()).expect("キャッシュ保存失敗");

    assert!(CacheFile::clear(dir.path()).expect("削除失敗"));
    assert!(!CacheFile::cache_path(dir.path()).exists());
}

/// 同じ内容なら同じハッシュ
#[test]
fn test_compute_file_hash() {
    let dir = tempdir().expect("Failed to create temp dir");
    let a = dir.path().join("a.jpg");
    let b = dir.path().join("b.jpg");
    let c = dir.path().join("c.jpg");
    std::fs::write(&a, b"same bytes").expect("書き込み失敗");
    std::fs::write(&b, b"same bytes").expect("書き込み失敗");
    std::fs::write(&c, b"other bytes").expect("書き込み失敗");

    let (hash_a, size_a) = compute_file_hash(&a).expect("ハッシュ失敗");
    let (hash_b, _) = compute_file_hash(&b).expect("ハッシュ失敗");
    let (hash_c, _) = compute_file_hash(&c).expect("ハッシュ失敗");

    assert_eq!(hash_a, hash_b);
    assert_ne!(hash_a, hash_c);
    assert_eq!(hash_a.len(), 64);
    assert_eq!(size_a, 10);
}
