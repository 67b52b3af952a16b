//! AIラベルの整形

use photo_atlas_common::tag_id;
use regex::Regex;

/// ラベルの最大文字数
pub const MAX_LABEL_CHARS: usize = 40;

/// 箇条書き記号・引用符・末尾の句読点を除き、空白を詰めて小文字化
///
/// 英数字を含まないもの、長すぎるものは捨てる。
pub fn clean_label(raw: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref LEADING_RE: Regex = Regex::new(r#"^[\s#*•·"'`\-]+|^\d+[.)]\s+"#).unwrap();
        static ref TRAILING_RE: Regex = Regex::new(r#"[\s"'`.,;:!]+$"#).unwrap();
        static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    }

    let label = LEADING_RE.replace(raw, "");
    let label = TRAILING_RE.replace(&label, "");
    let label = SPACE_RE.replace_all(&label, " ").to_lowercase();

    if label.is_empty() || label.chars().count() > MAX_LABEL_CHARS {
        return None;
    }
    if !label.chars().any(char::is_alphanumeric) {
        return None;
    }
    Some(label)
}

/// 整形してタグID単位で重複を除く（出現順）
pub fn clean_labels<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut labels = Vec::new();
    for label in raw.iter().filter_map(|l| clean_label(l.as_ref())) {
        let id = tag_id(&label);
        if id.is_empty() || seen.contains(&id) {
            continue;
        }
        seen.push(id);
        labels.push(label);
    }
    labels
}
