//! Name-keyed lookup of runtime item definitions.

use craftbench_core::ItemRef;
use std::collections::HashMap;

/// Every known item, keyed by display name. Later inserts win.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    by_name: HashMap<String, ItemRef>,
}

impl ItemCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by name.
    pub fn insert(&mut self, item: ItemRef) {
        self.by_name.insert(item.name.clone(), item);
    }

    /// Insert only when the name is not known yet.
    pub fn insert_if_absent(&mut self, item: ItemRef) {
        self.by_name.entry(item.name.clone()).or_insert(item);
    }

    /// Look up by name.
    pub fn get(&self, name: &str) -> Option<ItemRef> {
        self.by_name.get(name).cloned()
    }

    /// Whether `name` is known.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True when no item is known.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
