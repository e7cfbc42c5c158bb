use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::Listable;

/// Values offered by the tag and status filter dropdowns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// Distinct tags in first-seen order
    pub tags: Vec<String>,
    /// Status label -> number of items
    pub status_counts: BTreeMap<String, usize>,
}

impl Facets {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.status_counts.is_empty()
    }

    pub fn count(&self, status: &str) -> usize {
        self.status_counts.get(status).copied().unwrap_or(0)
    }
}

/// Facets over the whole collection, ignoring any filter
pub fn facets<T: Listable>(items: &[T]) -> Facets {
    let mut seen = HashSet::new();
    let mut result = Facets::default();

    for item in items {
        for tag in item.tags() {
            if seen.insert(tag.as_str()) {
                result.tags.push(tag.clone());
            }
        }
        *result.status_counts.entry(item.status_label().to_string()).or_insert(0) += 1;
    }

    result
}
