//! Ordered-list editing for fallback chains and key-bar layouts
//!
//! Every operation returns a new `Vec` and leaves the input alone. Operations
//! that are not allowed in the current state return an unchanged copy, and
//! the matching `can_*` predicate reports `false` so callers can disable the
//! control instead.

/// Length bounds for an editable list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReorderPolicy {
    pub min_len: usize,
    /// `None` means unbounded
    pub max_len: Option<usize>,
}

impl ReorderPolicy {
    /// Fallback chains keep at least the primary agent
    pub const FALLBACK_CHAIN: ReorderPolicy = ReorderPolicy {
        min_len: 1,
        max_len: None,
    };

    /// Key-bar layouts hold between 6 keys and the whole catalog
    pub fn key_bar(catalog_size: usize) -> Self {
        Self {
            min_len: 6,
            max_len: Some(catalog_size),
        }
    }

    pub fn can_remove(&self, len: usize, index: usize) -> bool {
        index < len && len > self.min_len
    }

    pub fn is_full(&self, len: usize) -> bool {
        self.max_len.map_or(false, |max| len >= max)
    }

    /// Delete the item at `index` unless the list would drop below `min_len`
    pub fn remove<T: Clone>(&self, items: &[T], index: usize) -> Vec<T> {
        let mut result = items.to_vec();
        if self.can_remove(items.len(), index) {
            result.remove(index);
        }
        result
    }

    pub fn can_append<T, K, F>(&self, items: &[T], item: &T, key: F) -> bool
    where
        K: PartialEq,
        F: Fn(&T) -> K,
    {
        let item_key = key(item);
        !self.is_full(items.len()) && !items.iter().any(|existing| key(existing) == item_key)
    }

    /// Add `item` at the end unless an item with the same key is present or
    /// the list is full
    pub fn append<T, K, F>(&self, items: &[T], item: T, key: F) -> Vec<T>
    where
        T: Clone,
        K: PartialEq,
        F: Fn(&T) -> K,
    {
        let allowed = self.can_append(items, &item, &key);
        let mut result = items.to_vec();
        if allowed {
            result.push(item);
        }
        result
    }
}

pub fn can_move_up(len: usize, index: usize) -> bool {
    index > 0 && index < len
}

pub fn can_move_down(len: usize, index: usize) -> bool {
    index + 1 < len
}

/// Swap `index` with the item before it
pub fn move_up<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    let mut result = items.to_vec();
    if can_move_up(items.len(), index) {
        result.swap(index - 1, index);
    }
    result
}

/// Swap `index` with the item after it
pub fn move_down<T: Clone>(items: &[T], index: usize) -> Vec<T> {
    let mut result = items.to_vec();
    if can_move_down(items.len(), index) {
        result.swap(index, index + 1);
    }
    result
}

/// Catalog entries whose key is not already in `current`, in catalog order
pub fn addable<T, K, F>(current: &[T], catalog: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: PartialEq,
    F: Fn(&T) -> K,
{
    catalog
        .iter()
        .filter(|candidate| {
            let candidate_key = key(*candidate);
            !current.iter().any(|existing| key(existing) == candidate_key)
        })
        .cloned()
        .collect()
}
