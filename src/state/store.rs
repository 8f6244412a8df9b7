//! Named value store
//!
//! A mutable mapping from identifiers to `f64` values. The backing map has
//! no iteration order, so every enumeration is sorted by name on the way out.

use crate::error::StoreError;
use std::collections::HashMap;

/// Mapping from names to stored numbers. Last write wins.
#[derive(Debug, Clone, Default)]
pub struct NamedValueStore {
    values: HashMap<String, f64>,
}

impl NamedValueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `name`, overwriting any previous value
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Look up the value stored under `name`
    pub fn get(&self, name: &str) -> Result<f64, StoreError> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| StoreError::NotFound {
                name: name.to_string(),
            })
    }

    /// All `(name, value)` pairs, sorted lexicographically by name
    pub fn enumerate(&self) -> Vec<(String, f64)> {
        let mut entries: Vec<(String, f64)> = self
            .values
            .iter()
            .map(|(name, value)| (name.clone(), *value))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Remove every entry, returning how many were discarded
    pub fn clear(&mut self) -> usize {
        let count = self.values.len();
        self.values.clear();
        count
    }

    /// Number of stored entries
    pub fn size(&self) -> usize {
        self.values.len()
    }

    /// Whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut store = NamedValueStore::new();
        store.set("pi", 3.14);
        assert_eq!(store.get("pi"), Ok(3.14));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let mut store = NamedValueStore::new();
        store.set("rate", 0.05);
        store.set("rate", 0.07);
        assert_eq!(store.size(), 1);
        assert_eq!(store.get("rate"), Ok(0.07));
    }

    #[test]
    fn test_get_missing() {
        let store = NamedValueStore::new();
        let err = store.get("missing").unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_enumerate_sorted() {
        let mut store = NamedValueStore::new();
        store.set("b", 1.0);
        store.set("a", 2.0);
        assert_eq!(
            store.enumerate(),
            vec![("a".to_string(), 2.0), ("b".to_string(), 1.0)]
        );
    }

    #[test]
    fn test_clear_reports_count() {
        let mut store = NamedValueStore::new();
        store.set("x", 1.0);
        store.set("y", 2.0);
        store.set("z", 3.0);
        assert_eq!(store.clear(), 3);
        assert_eq!(store.size(), 0);
        assert!(store.is_empty());
        assert_eq!(store.clear(), 0);
    }
}
