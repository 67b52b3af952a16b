//! ナビゲーション履歴
//!
//! 新しいものが先頭。直前と同じ対象へのアンカーは積まない。

use crate::anchor::Anchor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationHistory {
    entries: Vec<Anchor>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// アンカーを積む（先頭と同じ対象なら何もせず false）
    pub fn push(&mut self, anchor: Anchor) -> bool {
        if self.current().is_some_and(|top| top.same_target(&anchor)) {
            return false;
        }
        self.entries.insert(0, anchor);
        true
    }

    pub fn current(&self) -> Option<&Anchor> {
        self.entries.first()
    }

    /// 新しい順
    pub fn entries(&self) -> &[Anchor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// 隣り合う IMAGE アンカーの組（新しい順、(新, 旧)）
    pub fn adjacent_image_pairs(&self) -> Vec<(&str, &str)> {
        self.entries
            .windows(2)
            .filter_map(|pair| match (pair[0].image_id(), pair[1].image_id()) {
                (Some(newer), Some(older)) => Some((newer, older)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_is_newest_first() {
        let mut history = NavigationHistory::new();
        assert!(history.push(Anchor::image("a")));
        assert!(history.push(Anchor::tag("sea")));
        assert_eq!(history.current(), Some(&Anchor::tag("sea")));
        assert_eq!(history.entries()[1], Anchor::image("a"));
    }

    #[test]
    fn test_push_same_target_is_noop() {
        let mut history = NavigationHistory::new();
        history.push(Anchor::image("a"));
        assert!(!history.push(Anchor::image("a")));
        assert_eq!(history.len(), 1);

        // 先頭以外との重複は積む
        history.push(Anchor::tag("sea"));
        assert!(history.push(Anchor::image("a")));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_adjacent_image_pairs() {
        let mut history = NavigationHistory::new();
        history.push(Anchor::image("a"));
        history.push(Anchor::image("b"));
        history.push(Anchor::tag("sea"));
        history.push(Anchor::image("c"));
        history.push(Anchor::image("d"));

        assert_eq!(history.adjacent_image_pairs(), vec![("d", "c"), ("b", "a")]);
    }

    #[test]
    fn test_reset() {
        let mut history = NavigationHistory::new();
        history.push(Anchor::None);
        history.reset();
        assert!(history.is_empty());
        assert!(history.current().is_none());
    }
}
