//! `TwoThreeSet` - a deduplicating set view over the tree.
//!
//! A thin facade over [`TwoThreeTree`] with [`Identity`] key extraction and
//! unique insertion, for callers who want set semantics without handling
//! the multiset surface. Everything here forwards; the tree does the work.

use std::cmp::Ordering;
use std::fmt as StdFmt;

use crate::iter::{IntoIter, Iter};
use crate::ordering::{Comparator, Identity, NaturalOrder};
use crate::tree::TwoThreeTree;

/// An ordered set on a 2-3 tree.
///
/// Holds at most one value per key equivalence class; inserting an
/// equivalent value again is a no-op. Iteration runs in key order over the
/// same threaded leaf chain the tree keeps, and the cost bounds match the
/// tree's.
///
/// # Example
///
/// ```
/// use twothree::TwoThreeSet;
///
/// let mut set: TwoThreeSet<u32> = TwoThreeSet::new();
/// assert!(set.insert(3));
/// assert!(set.insert(1));
/// assert!(!set.insert(3));
///
/// assert_eq!(set.len(), 2);
/// assert!(set.contains(&3));
/// assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
/// ```
#[derive(Clone)]
pub struct TwoThreeSet<T, C = NaturalOrder> {
    tree: TwoThreeTree<T, Identity, C>,
}

impl<T, C> TwoThreeSet<T, C> {
    /// Create an empty set ordering values with `cmp`.
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        Self {
            tree: TwoThreeTree::with_comparator(cmp),
        }
    }

    /// Number of values in the set.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the set holds no values.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The smallest value, `None` on an empty set.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.tree.first()
    }

    /// The largest value, `None` on an empty set.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.tree.last()
    }

    /// In-order iterator over all values.
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    /// Drop every value. Node storage is retained for reuse.
    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<T, C: Default> TwoThreeSet<T, C> {
    /// Create an empty set with the default comparator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: TwoThreeTree::new(),
        }
    }

    /// Create an empty set with node storage for roughly `capacity` values
    /// pre-allocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tree: TwoThreeTree::with_capacity(capacity),
        }
    }
}

impl<T, C: Comparator<T>> TwoThreeSet<T, C> {
    /// Insert `value` unless an equivalent value is already present.
    /// Returns whether it went in.
    pub fn insert(&mut self, value: T) -> bool {
        self.tree.insert_unique(value)
    }

    /// Whether some value equivalent to `key` is present.
    #[must_use]
    pub fn contains(&self, key: &T) -> bool {
        self.tree.find(key).is_some()
    }

    /// The stored value equivalent to `key`, if any.
    #[must_use]
    pub fn get(&self, key: &T) -> Option<&T> {
        self.tree.find(key)
    }

    /// Remove the value equivalent to `key`. Returns whether one was there.
    pub fn remove(&mut self, key: &T) -> bool {
        self.tree.remove_one(key).is_some()
    }

    /// Remove and return the stored value equivalent to `key`.
    pub fn take(&mut self, key: &T) -> Option<T> {
        self.tree.remove_one(key)
    }

    /// Remove and return the smallest value.
    pub fn pop_first(&mut self) -> Option<T> {
        self.tree.pop_first()
    }

    /// Remove and return the largest value.
    pub fn pop_last(&mut self) -> Option<T> {
        self.tree.pop_last()
    }
}

// ============================================================================
//  Standard trait implementations
// ============================================================================

impl<T, C: Default> Default for TwoThreeSet<T, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StdFmt::Debug, C> StdFmt::Debug for TwoThreeSet<T, C> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, C> PartialEq for TwoThreeSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.tree == other.tree
    }
}

impl<T: Eq, C> Eq for TwoThreeSet<T, C> {}

impl<T: PartialOrd, C> PartialOrd for TwoThreeSet<T, C> {
    /// Lexicographic comparison of the ordered value sequences.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, C> Ord for TwoThreeSet<T, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T, C: Comparator<T>> Extend<T> for TwoThreeSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<T, C: Comparator<T> + Default> FromIterator<T> for TwoThreeSet<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, T, C> IntoIterator for &'a TwoThreeSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T, C> IntoIterator for TwoThreeSet<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Consume the set, yielding its values in order.
    fn into_iter(self) -> IntoIter<T> {
        self.tree.into_iter()
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_deduplicates() {
        let mut set: TwoThreeSet<u32> = TwoThreeSet::new();

        assert!(set.insert(5));
        assert!(set.insert(3));
        assert!(!set.insert(5));
        assert!(!set.insert(3));

        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![3, 5]);
    }

    #[test]
    fn test_contains_and_get() {
        let set: TwoThreeSet<u32> = (0..10).collect();

        assert!(set.contains(&7));
        assert!(!set.contains(&10));
        assert_eq!(set.get(&7), Some(&7));
        assert_eq!(set.get(&10), None);
    }

    #[test]
    fn test_remove_and_take() {
        let mut set: TwoThreeSet<u32> = (0..5).collect();

        assert!(set.remove(&3));
        assert!(!set.remove(&3));
        assert_eq!(set.take(&4), Some(4));
        assert_eq!(set.take(&4), None);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_from_iterator_deduplicates() {
        let set: TwoThreeSet<u32> = [3, 1, 3, 2, 1, 3].into_iter().collect();

        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pop_drains_in_order() {
        let mut set: TwoThreeSet<u32> = [4, 1, 9].into_iter().collect();

        assert_eq!(set.pop_first(), Some(1));
        assert_eq!(set.pop_last(), Some(9));
        assert_eq!(set.pop_first(), Some(4));
        assert_eq!(set.pop_first(), None);
        assert!(set.is_empty());
    }

    #[test]
    fn test_equality_and_ordering() {
        let a: TwoThreeSet<u32> = [1, 2, 3].into_iter().collect();
        let b: TwoThreeSet<u32> = [3, 2, 1].into_iter().collect();
        let c: TwoThreeSet<u32> = [1, 3].into_iter().collect();
        let empty: TwoThreeSet<u32> = TwoThreeSet::new();

        assert_eq!(a, b);
        assert_ne!(a, c);

        // Lexicographic on the ordered sequences: [1,2,3] < [1,3], and the
        // empty set precedes everything else.
        assert!(a < c);
        assert!(empty < a);
    }

    #[test]
    fn test_debug_format() {
        let set: TwoThreeSet<u32> = [2, 1].into_iter().collect();

        assert_eq!(format!("{set:?}"), "{1, 2}");
    }

    #[test]
    fn test_custom_comparator_reverses_order() {
        struct Largest;
        impl Comparator<u32> for Largest {
            fn less(&self, a: &u32, b: &u32) -> bool {
                b < a
            }
        }

        let mut set = TwoThreeSet::with_comparator(Largest);
        set.extend([2, 9, 5, 9]);

        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![9, 5, 2]);
        assert_eq!(set.first(), Some(&9));
    }

    #[test]
    fn test_into_iter_owned() {
        let set: TwoThreeSet<String> = ["b", "a"].map(String::from).into_iter().collect();

        let drained: Vec<String> = set.into_iter().collect();
        assert_eq!(drained, vec!["a", "b"]);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut set: TwoThreeSet<u32> = (0..20).collect();
        let copy = set.clone();

        set.remove(&5);

        assert_eq!(copy.len(), 20);
        assert!(copy.contains(&5));
    }
}
