//! Key routing and the bound searches.
//!
//! Routing descends from the root comparing the search key against each
//! child's cached maximum in slot order and taking the first child whose
//! maximum is not less than the key, so equal keys always route toward the
//! leftmost matching leaf. The strict variant of the same walk yields
//! `upper_bound`. A key outside `[first, last]` is rejected against the
//! header caches before any descent.

use crate::arena::NodeId;
use crate::iter::Range;
use crate::ordering::{Comparator, KeyOf};

use super::TwoThreeTree;

impl<V, X: KeyOf<V>, C: Comparator<X::Key>> TwoThreeTree<V, X, C> {
    /// Look up a value by key.
    ///
    /// With duplicates present this returns the leftmost (earliest in
    /// iteration order) match.
    ///
    /// # Example
    ///
    /// ```
    /// use twothree::TwoThreeTree;
    ///
    /// let tree: TwoThreeTree<u32> = [2, 4, 6].into_iter().collect();
    /// assert_eq!(tree.find(&4), Some(&4));
    /// assert_eq!(tree.find(&5), None);
    /// ```
    #[must_use]
    pub fn find(&self, key: &X::Key) -> Option<&V> {
        let leaf = self.find_leaf(key)?;
        Some(self.arena.node(leaf).value())
    }

    /// Number of values whose key is equivalent to `key`.
    #[must_use]
    pub fn count(&self, key: &X::Key) -> usize {
        let Some(mut cur) = self.find_leaf(key) else {
            return 0;
        };

        let mut n = 1;
        loop {
            let next = self.arena.node(cur).as_leaf().next;
            if next.is_header() || !self.equiv(key, self.key_at(next)) {
                return n;
            }
            n += 1;
            cur = next;
        }
    }

    /// Iterator from the first value whose key is not less than `key` to
    /// the end of the tree. Empty when every key is smaller.
    pub fn lower_bound(&self, key: &X::Key) -> Range<'_, V> {
        match self.lower_bound_leaf(key) {
            Some(leaf) => Range::new(&self.arena, leaf, self.rightmost),
            None => Range::empty(&self.arena),
        }
    }

    /// Iterator from the first value whose key is greater than `key` to the
    /// end of the tree. Empty when no key is greater.
    pub fn upper_bound(&self, key: &X::Key) -> Range<'_, V> {
        match self.upper_bound_leaf(key) {
            Some(leaf) => Range::new(&self.arena, leaf, self.rightmost),
            None => Range::empty(&self.arena),
        }
    }

    /// Iterator over every value whose key is equivalent to `key`, in
    /// insertion-chain order.
    ///
    /// # Example
    ///
    /// ```
    /// use twothree::TwoThreeTree;
    ///
    /// let tree: TwoThreeTree<u32> = [1, 3, 3, 3, 7].into_iter().collect();
    /// assert_eq!(tree.equal_range(&3).count(), 3);
    /// assert_eq!(tree.equal_range(&5).count(), 0);
    /// ```
    pub fn equal_range(&self, key: &X::Key) -> Range<'_, V> {
        let Some(first) = self.lower_bound_leaf(key) else {
            return Range::empty(&self.arena);
        };
        if !self.equiv(key, self.key_at(first)) {
            return Range::empty(&self.arena);
        }

        let last = match self.upper_bound_leaf(key) {
            Some(past) => self.arena.node(past).as_leaf().prev,
            None => self.rightmost,
        };
        Range::new(&self.arena, first, last)
    }

    // ------------------------------------------------------------------
    //  Leaf-level routing
    // ------------------------------------------------------------------

    /// Leftmost leaf whose key is equivalent to `key`, if any.
    pub(crate) fn find_leaf(&self, key: &X::Key) -> Option<NodeId> {
        // Keys outside [first, last] cannot match; skip the descent.
        if self.is_empty()
            || self.less(key, self.key_at(self.leftmost))
            || self.less(self.key_at(self.rightmost), key)
        {
            return None;
        }

        let leaf = self.lower_bound_leaf(key)?;
        self.equiv(key, self.key_at(leaf)).then_some(leaf)
    }

    /// First leaf whose key is not less than `key`; `None` when every key
    /// in the tree is smaller (the past-the-end position).
    pub(crate) fn lower_bound_leaf(&self, key: &X::Key) -> Option<NodeId> {
        if self.is_empty() || self.less(self.key_at(self.rightmost), key) {
            return None;
        }

        let mut cur = self.root;
        while !self.arena.node(cur).is_leaf() {
            let branch = self.arena.node(cur).as_branch();

            // key <= subtree max here, so some slot must stop the scan;
            // the last-child seed is never kept.
            let mut next = branch.child(branch.degree() - 1);
            for slot in branch.slots() {
                if !self.less(self.key_at(slot.max_leaf), key) {
                    next = slot.child;
                    break;
                }
            }
            cur = next;
        }
        Some(cur)
    }

    /// First leaf whose key is greater than `key`; `None` when no key in
    /// the tree is greater.
    pub(crate) fn upper_bound_leaf(&self, key: &X::Key) -> Option<NodeId> {
        if self.is_empty() || !self.less(key, self.key_at(self.rightmost)) {
            return None;
        }

        let mut cur = self.root;
        while !self.arena.node(cur).is_leaf() {
            let branch = self.arena.node(cur).as_branch();

            let mut next = branch.child(branch.degree() - 1);
            for slot in branch.slots() {
                if self.less(key, self.key_at(slot.max_leaf)) {
                    next = slot.child;
                    break;
                }
            }
            cur = next;
        }
        Some(cur)
    }
}

// ============================================================================
//  Tests
// ============================================================================
