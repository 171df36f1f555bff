//! The insertion balancer.
//!
//! A new value becomes a leaf at its lower bound, so a fresh duplicate lands
//! just before its equals on the chain. The parent branch absorbs the new
//! child directly when it has room. A full parent splits instead: it keeps
//! its two larger children, the two smaller ones move into a fresh sibling,
//! and the sibling is handed one level up by the same rule. If that
//! recursion passes the root, a new two-child root grows the tree taller by
//! exactly one level, which keeps every leaf at equal depth.

use crate::arena::NodeId;
use crate::node::{ChildSlot, Node};
use crate::ordering::{Comparator, KeyOf};
use crate::trace::{debug_log, trace_log};

use super::TwoThreeTree;

/// Where a new leaf enters the chain, relative to an existing leaf.
#[derive(Clone, Copy)]
enum Placement {
    Before(NodeId),
    After(NodeId),
}

impl<V, X: KeyOf<V>, C: Comparator<X::Key>> TwoThreeTree<V, X, C> {
    /// Insert `value`, keeping any existing values with an equivalent key
    /// (multiset insert).
    ///
    /// Among equal keys the new value is placed first, so `find` and
    /// `equal_range` see the most recent duplicate at the front of the run.
    ///
    /// # Panics
    ///
    /// Panics if the tree already holds `u32::MAX - 1` nodes.
    pub fn insert_equal(&mut self, value: V) {
        match self.placement_for(X::key_of(&value)) {
            None => self.insert_first(value),
            Some(placement) => self.insert_leaf_at(placement, value),
        }
    }

    /// Insert `value` unless a value with an equivalent key is already
    /// present. Returns whether the value was inserted.
    ///
    /// # Panics
    ///
    /// Panics if the tree already holds `u32::MAX - 1` nodes.
    pub fn insert_unique(&mut self, value: V) -> bool {
        match self.placement_for(X::key_of(&value)) {
            None => {
                self.insert_first(value);
                true
            }
            Some(Placement::Before(leaf))
                if self.equiv(X::key_of(&value), self.key_at(leaf)) =>
            {
                false
            }
            Some(placement) => {
                self.insert_leaf_at(placement, value);
                true
            }
        }
    }

    /// Chain position for a new leaf with key `key`: before its lower bound,
    /// or after the rightmost leaf when every present key is smaller.
    /// `None` on an empty tree.
    fn placement_for(&self, key: &X::Key) -> Option<Placement> {
        if self.is_empty() {
            return None;
        }
        Some(match self.lower_bound_leaf(key) {
            Some(leaf) => Placement::Before(leaf),
            None => Placement::After(self.rightmost),
        })
    }

    /// First value of an empty tree: a lone root leaf.
    fn insert_first(&mut self, value: V) {
        debug_assert!(self.is_empty());

        let leaf = self.arena.alloc(Node::leaf(
            value,
            NodeId::HEADER,
            NodeId::HEADER,
            NodeId::HEADER,
        ));
        self.root = leaf;
        self.leftmost = leaf;
        self.rightmost = leaf;
        self.len = 1;

        debug_log!(leaf = %leaf, "insert first leaf");
    }

    /// Thread a new leaf into the chain next to its anchor and hand it to
    /// the anchor's parent branch.
    fn insert_leaf_at(&mut self, placement: Placement, value: V) {
        let (anchor, before) = match placement {
            Placement::Before(anchor) => (anchor, true),
            Placement::After(anchor) => (anchor, false),
        };
        let (prev, next) = if before {
            (self.arena.node(anchor).as_leaf().prev, anchor)
        } else {
            (anchor, self.arena.node(anchor).as_leaf().next)
        };

        let parent = self.arena.node(anchor).parent;
        let leaf = self.arena.alloc(Node::leaf(value, parent, prev, next));

        if prev.is_header() {
            self.leftmost = leaf;
        } else {
            self.arena.node_mut(prev).as_leaf_mut().next = leaf;
        }
        if next.is_header() {
            self.rightmost = leaf;
        } else {
            self.arena.node_mut(next).as_leaf_mut().prev = leaf;
        }
        self.len += 1;

        debug_log!(leaf = %leaf, len = self.len, "insert leaf");

        if parent.is_header() {
            // The anchor was the root leaf; grow the first branch over the
            // pair.
            let (lo, hi) = if before { (leaf, anchor) } else { (anchor, leaf) };
            let root = self.arena.alloc(Node::branch2(
                NodeId::HEADER,
                ChildSlot::of_leaf(lo),
                ChildSlot::of_leaf(hi),
                2,
            ));
            self.arena.node_mut(lo).parent = root;
            self.arena.node_mut(hi).parent = root;
            self.root = root;
            return;
        }

        let idx = self.arena.node(parent).as_branch().position_of(anchor) + usize::from(!before);
        if let Some(top) = self.add_child(parent, idx, ChildSlot::of_leaf(leaf)) {
            self.root = top;
        }
    }

    /// Insert `slot` as the `idx`-th child of `branch`, splitting full
    /// branches upward as needed.
    ///
    /// Returns the id of a newly created top node when the walk grows past
    /// the subtree's previous top (the caller re-roots), `None` otherwise.
    /// Cache repair for the touched path is included either way.
    pub(crate) fn add_child(
        &mut self,
        mut branch: NodeId,
        mut idx: usize,
        mut slot: ChildSlot,
    ) -> Option<NodeId> {
        loop {
            if !self.arena.node(branch).as_branch().is_full() {
                self.arena.node_mut(slot.child).parent = branch;
                self.arena
                    .node_mut(branch)
                    .as_branch_mut()
                    .insert_slot(idx, slot);
                self.refresh_upward(branch);
                return None;
            }

            // Full: three residents plus the incomer regroup as two branches
            // of two. The smaller pair moves into a fresh sibling, the larger
            // pair stays, and the sibling is inserted one level up at the
            // resident's position.
            let (resident, parent) = {
                let node = self.arena.node(branch);
                (node.as_branch().slots, node.parent)
            };
            let mut four = [slot; 4];
            four[..idx].copy_from_slice(&resident[..idx]);
            four[idx + 1..].copy_from_slice(&resident[idx..]);
            let [lo0, lo1, hi0, hi1] = four;

            let lo_count =
                self.arena.node(lo0.child).count() + self.arena.node(lo1.child).count();
            let hi_count =
                self.arena.node(hi0.child).count() + self.arena.node(hi1.child).count();

            {
                let resident_branch = self.arena.node_mut(branch).as_branch_mut();
                resident_branch.slots = [hi0, hi1, ChildSlot::EMPTY];
                resident_branch.degree = 2;
                resident_branch.count = hi_count;
            }
            let sibling = self.arena.alloc(Node::branch2(parent, lo0, lo1, lo_count));
            for s in [lo0, lo1] {
                self.arena.node_mut(s.child).parent = sibling;
            }
            for s in [hi0, hi1] {
                self.arena.node_mut(s.child).parent = branch;
            }

            trace_log!(branch = %branch, sibling = %sibling, "split full branch");

            if parent.is_header() {
                // Grew past the old top; a fresh two-child node takes over.
                let top = self.arena.alloc(Node::branch2(
                    NodeId::HEADER,
                    ChildSlot {
                        child: sibling,
                        max_leaf: lo1.max_leaf,
                    },
                    ChildSlot {
                        child: branch,
                        max_leaf: hi1.max_leaf,
                    },
                    lo_count + hi_count,
                ));
                self.arena.node_mut(sibling).parent = top;
                self.arena.node_mut(branch).parent = top;

                debug_log!(top = %top, "tree grew one level");
                return Some(top);
            }

            // The resident's cached maximum in its parent may be stale when
            // the incomer landed on the high side; repair it before
            // ascending.
            idx = {
                let parent_branch = self.arena.node_mut(parent).as_branch_mut();
                let i = parent_branch.position_of(branch);
                parent_branch.slots[i].max_leaf = hi1.max_leaf;
                i
            };
            slot = ChildSlot {
                child: sibling,
                max_leaf: lo1.max_leaf,
            };
            branch = parent;
        }
    }

    /// Walk from `from` to the top of its tree, recomputing each branch's
    /// cached leaf count and per-child maxima from the level below.
    ///
    /// Sound whenever every node under the walked path already carries
    /// correct caches, which is the state every balancer leaves behind.
    pub(crate) fn refresh_upward(&mut self, from: NodeId) {
        debug_assert!(!self.arena.node(from).is_leaf());

        let mut at = from;
        while !at.is_header() {
            let degree = self.arena.node(at).as_branch().degree();
            let mut count = 0;
            for i in 0..degree {
                let child = self.arena.node(at).as_branch().child(i);
                count += self.arena.node(child).count();
                let max = self.subtree_max(child);
                self.arena.node_mut(at).as_branch_mut().slots[i].max_leaf = max;
            }
            self.arena.node_mut(at).as_branch_mut().count = count;
            at = self.arena.node(at).parent;
        }
    }

    /// Rightmost leaf of `node`'s subtree: the node itself for a leaf, the
    /// cached last-slot maximum for a branch.
    pub(crate) fn subtree_max(&self, node: NodeId) -> NodeId {
        let n = self.arena.node(node);
        if n.is_leaf() {
            node
        } else {
            n.as_branch().last_max()
        }
    }
}

// ============================================================================
//  Tests
// ============================================================================
