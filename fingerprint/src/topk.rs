//! Bounded selection of the K largest items by key.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Keeps the `capacity` largest items seen so far, ranked by key.
///
/// Backed by a min-heap: the root is always the smallest retained key, so
/// a new item is admitted once full only if its key is strictly greater
/// than the root, which is evicted first.
///
/// Keys only need [`PartialOrd`]; incomparable keys (e.g. NaN) compare as
/// equal and are therefore never admitted over an existing item.
pub struct BoundedTopK<K, V> {
    capacity: usize,
    heap: BinaryHeap<Entry<K, V>>,
}

struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K: PartialOrd, V> PartialEq for Entry<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K: PartialOrd, V> Eq for Entry<K, V> {}

impl<K: PartialOrd, V> PartialOrd for Entry<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reverse ordering for min-heap
impl<K: PartialOrd, V> Ord for Entry<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .key
            .partial_cmp(&self.key)
            .unwrap_or(Ordering::Equal)
    }
}

impl<K: PartialOrd, V> BoundedTopK<K, V> {
    /// Creates an empty selection. Storage grows with the retained items,
    /// not with `capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::new(),
        }
    }

    /// Offers an item. Returns true if it was retained.
    pub fn push(&mut self, key: K, value: V) -> bool {
        if self.capacity == 0 {
            return false;
        }

        if self.heap.len() < self.capacity {
            self.heap.push(Entry { key, value });
            return true;
        }

        let admit = match self.heap.peek() {
            Some(min) => key.partial_cmp(&min.key) == Some(Ordering::Greater),
            None => false,
        };
        if admit {
            self.heap.pop();
            self.heap.push(Entry { key, value });
        }
        admit
    }

    /// Smallest retained key.
    pub fn min_key(&self) -> Option<&K> {
        self.heap.peek().map(|e| &e.key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drains the retained items, largest key first.
    pub fn into_sorted_vec(self) -> Vec<(K, V)> {
        // Ascending by Entry::cmp is descending by key.
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|e| (e.key, e.value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_largest() {
        let mut top = BoundedTopK::new(3);
        for (i, k) in [5, 1, 9, 3, 7, 2, 8].into_iter().enumerate() {
            top.push(k, i);
        }

        assert_eq!(top.len(), 3);
        assert_eq!(top.min_key(), Some(&7));
        assert_eq!(top.into_sorted_vec(), vec![(9, 2), (8, 6), (7, 4)]);
    }

    #[test]
    fn admits_only_strictly_greater_when_full() {
        let mut top = BoundedTopK::new(2);
        assert!(top.push(4.0, "a"));
        assert!(top.push(6.0, "b"));
        assert!(!top.push(4.0, "c"), "equal to min must not evict");
        assert!(!top.push(1.0, "d"));
        assert!(top.push(5.0, "e"));

        let kept: Vec<_> = top.into_sorted_vec().into_iter().map(|(_, v)| v).collect();
        assert_eq!(kept, vec!["b", "e"]);
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut top = BoundedTopK::new(0);
        assert!(!top.push(1.0, ()));
        assert!(top.is_empty());
        assert!(top.into_sorted_vec().is_empty());
    }

    #[test]
    fn fewer_items_than_capacity() {
        let mut top = BoundedTopK::new(10);
        top.push(2.0, 'x');
        top.push(3.0, 'y');
        assert_eq!(top.capacity(), 10);
        assert_eq!(top.into_sorted_vec(), vec![(3.0, 'y'), (2.0, 'x')]);
    }

    #[test]
    fn huge_capacity_allocates_lazily() {
        let mut top = BoundedTopK::new(usize::MAX);
        top.push(1, 'a');
        top.push(2, 'b');
        assert_eq!(top.capacity(), usize::MAX);
        assert_eq!(top.into_sorted_vec(), vec![(2, 'b'), (1, 'a')]);
    }

    #[test]
    fn nan_never_evicts() {
        let mut top = BoundedTopK::new(1);
        top.push(1.0, 0);
        assert!(!top.push(f64::NAN, 1));
        assert_eq!(top.into_sorted_vec(), vec![(1.0, 0)]);
    }
}
