//! The deletion balancer.
//!
//! Removal detaches one leaf from the chain and from its parent branch. A
//! parent left with a single child cannot stand; the repair gathers every
//! grandchild under that parent's parent (3 to 7 of them, in key order) and
//! redistributes them left to right into branches of 3 or 2, preferring
//! threes. Three grandchildren collapse into one branch and push the
//! underflow a level up; when it reaches a single-child root, the root is
//! dropped and the tree shrinks by exactly one level, keeping every leaf at
//! equal depth.

use crate::arena::NodeId;
use crate::node::ChildSlot;
use crate::ordering::{Comparator, KeyOf};
use crate::trace::{debug_log, trace_log};

use super::TwoThreeTree;

impl<V, X: KeyOf<V>, C: Comparator<X::Key>> TwoThreeTree<V, X, C> {
    /// Remove every value whose key is equivalent to `key`, returning how
    /// many were removed (0 when the key is absent).
    ///
    /// This is the multiset-wide erase; use [`remove_one`](Self::remove_one)
    /// to take out a single duplicate.
    ///
    /// # Example
    ///
    /// ```
    /// use twothree::TwoThreeTree;
    ///
    /// let mut tree: TwoThreeTree<u32> = [3, 3, 3].into_iter().collect();
    /// assert_eq!(tree.erase(&3), 3);
    /// assert_eq!(tree.erase(&3), 0);
    /// assert!(tree.is_empty());
    /// ```
    pub fn erase(&mut self, key: &X::Key) -> usize {
        let mut removed = 0;
        while let Some(leaf) = self.find_leaf(key) {
            self.remove_leaf(leaf);
            removed += 1;
        }

        if removed > 0 {
            debug_log!(removed, len = self.len, "erase");
        }
        removed
    }

    /// Remove the leftmost value whose key is equivalent to `key`.
    pub fn remove_one(&mut self, key: &X::Key) -> Option<V> {
        let leaf = self.find_leaf(key)?;
        Some(self.remove_leaf(leaf))
    }

    /// Remove and return the smallest-key value.
    pub fn pop_first(&mut self) -> Option<V> {
        if self.is_empty() {
            None
        } else {
            Some(self.remove_leaf(self.leftmost))
        }
    }

    /// Remove and return the largest-key value.
    pub fn pop_last(&mut self) -> Option<V> {
        if self.is_empty() {
            None
        } else {
            Some(self.remove_leaf(self.rightmost))
        }
    }

    // ------------------------------------------------------------------
    //  Single-leaf removal
    // ------------------------------------------------------------------

    /// Unthread and free one leaf, then rebalance its parent.
    pub(crate) fn remove_leaf(&mut self, leaf: NodeId) -> V {
        let (prev, next, parent) = {
            let node = self.arena.node(leaf);
            let threads = node.as_leaf();
            (threads.prev, threads.next, node.parent)
        };

        if prev.is_header() {
            self.leftmost = next;
        } else {
            self.arena.node_mut(prev).as_leaf_mut().next = next;
        }
        if next.is_header() {
            self.rightmost = prev;
        } else {
            self.arena.node_mut(next).as_leaf_mut().prev = prev;
        }
        self.len -= 1;
        let value = self.arena.free(leaf).into_value();

        trace_log!(leaf = %leaf, len = self.len, "remove leaf");

        if parent.is_header() {
            // The leaf was the whole tree.
            self.root = NodeId::HEADER;
            return value;
        }

        let idx = self.arena.node(parent).as_branch().position_of(leaf);
        self.arena.node_mut(parent).as_branch_mut().remove_slot(idx);
        self.fixup_underflow(parent);
        value
    }

    /// Restore the 2-or-3-children invariant starting at a branch that just
    /// lost a child, cascading upward as merges empty out further branches.
    fn fixup_underflow(&mut self, mut at: NodeId) {
        loop {
            if self.arena.node(at).as_branch().degree() >= 2 {
                self.refresh_upward(at);
                return;
            }

            if at == self.root {
                // Single-child root: promote the child, dropping one level.
                let child = self.arena.node(at).as_branch().child(0);
                self.arena.free(at);
                self.arena.node_mut(child).parent = NodeId::HEADER;
                self.root = child;

                debug_log!(root = %child, "tree shrank one level");
                return;
            }

            let grandparent = self.arena.node(at).parent;
            self.regroup_children(grandparent);
            at = grandparent;
        }
    }

    /// Redistribute all grandchildren of `g` in key order into branches of
    /// 3 or 2, reusing `g`'s existing children nodes and freeing the rest.
    ///
    /// Exactly one child of `g` has a single grandchild (the underflow), so
    /// the total is 3..=7. Preferring 3-groups on the left mirrors how the
    /// totals break down: 3 -> one branch (underflow moves up), 4 -> 2+2,
    /// 5 -> 3+2, 6 -> 3+3, 7 -> 3+2+2.
    fn regroup_children(&mut self, g: NodeId) {
        let (old_children, old_n) = {
            let branch = self.arena.node(g).as_branch();
            (branch.slots, branch.degree())
        };

        let mut grand = [ChildSlot::EMPTY; 7];
        let mut total = 0;
        for old in &old_children[..old_n] {
            for slot in self.arena.node(old.child).as_branch().slots() {
                grand[total] = *slot;
                total += 1;
            }
        }

        let groups: &[usize] = match total {
            3 => &[3],
            4 => &[2, 2],
            5 => &[3, 2],
            6 => &[3, 3],
            7 => &[3, 2, 2],
            _ => unreachable!("regroup saw {total} grandchildren"),
        };

        trace_log!(g = %g, total, "regroup grandchildren");

        let mut new_slots = [ChildSlot::EMPTY; 3];
        let mut taken = 0;
        for (k, &size) in groups.iter().enumerate() {
            let reused = old_children[k].child;

            let mut slots = [ChildSlot::EMPTY; 3];
            let mut count = 0;
            slots[..size].copy_from_slice(&grand[taken..taken + size]);
            for slot in &slots[..size] {
                count += self.arena.node(slot.child).count();
                self.arena.node_mut(slot.child).parent = reused;
            }
            {
                let branch = self.arena.node_mut(reused).as_branch_mut();
                branch.slots = slots;
                branch.set_degree(size);
                branch.count = count;
            }

            new_slots[k] = ChildSlot {
                child: reused,
                max_leaf: grand[taken + size - 1].max_leaf,
            };
            taken += size;
        }

        for surplus in &old_children[groups.len()..old_n] {
            self.arena.free(surplus.child);
        }

        let g_branch = self.arena.node_mut(g).as_branch_mut();
        g_branch.slots = new_slots;
        g_branch.set_degree(groups.len());
        // g's count is untouched here: the leaf already left the books, and
        // the fixup loop recomputes it on the way out.
    }
}

// ============================================================================
//  Tests
// ============================================================================
