//! Label and feature interning.

use std::collections::HashMap;

use crate::sparse::FeatureKey;

/// Bidirectional mapping between point labels and dense indices `0..N`.
///
/// Indices are handed out in insertion order. Labels are unique and non-empty.
#[derive(Clone, Debug, Default)]
pub struct LabelCatalog {
    index: HashMap<String, usize>,
    labels: Vec<String>,
}

impl LabelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `label` and return its new index.
    ///
    /// Returns `None` when the label is empty or already registered; the
    /// existing mapping is left untouched in that case.
    pub fn insert(&mut self, label: &str) -> Option<usize> {
        if label.is_empty() || self.index.contains_key(label) {
            return None;
        }
        let idx = self.labels.len();
        self.index.insert(label.to_owned(), idx);
        self.labels.push(label.to_owned());
        Some(idx)
    }

    /// Index of `label`, if registered.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Label of point `idx`, if in range.
    pub fn label(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).map(String::as_str)
    }

    /// Number of registered labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if no label is registered.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in insertion (index) order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.labels.iter().enumerate().map(|(i, l)| (i, l.as_str()))
    }
}

/// Interns feature tokens from record files into dense keys starting at 1.
#[derive(Clone, Debug, Default)]
pub struct FeatureDictionary {
    keys: HashMap<String, FeatureKey>,
}

impl FeatureDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Key for `token`, allocating the next one on first sight.
    pub fn intern(&mut self, token: &str) -> FeatureKey {
        if let Some(&key) = self.keys.get(token) {
            return key;
        }
        let key = self.keys.len() as FeatureKey + 1;
        self.keys.insert(token.to_owned(), key);
        key
    }

    /// Key for `token` without allocating.
    pub fn get(&self, token: &str) -> Option<FeatureKey> {
        self.keys.get(token).copied()
    }

    /// Number of distinct tokens seen.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if no token has been interned.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_insertion_order() {
        let mut catalog = LabelCatalog::new();
        assert_eq!(catalog.insert("b"), Some(0));
        assert_eq!(catalog.insert("a"), Some(1));
        assert_eq!(catalog.index_of("a"), Some(1));
        assert_eq!(catalog.label(0), Some("b"));
        let order: Vec<_> = catalog.iter().map(|(_, l)| l).collect();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_catalog_rejects_empty_and_duplicate() {
        let mut catalog = LabelCatalog::new();
        assert_eq!(catalog.insert(""), None);
        assert_eq!(catalog.insert("x"), Some(0));
        assert_eq!(catalog.insert("x"), None);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.index_of("missing"), None);
    }

    #[test]
    fn test_feature_keys_start_at_one() {
        let mut dict = FeatureDictionary::new();
        assert_eq!(dict.intern("color"), 1);
        assert_eq!(dict.intern("size"), 2);
        assert_eq!(dict.intern("color"), 1);
        assert_eq!(dict.get("size"), Some(2));
        assert_eq!(dict.len(), 2);
    }
}
