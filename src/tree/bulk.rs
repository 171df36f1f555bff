//! Whole-tree surgery: split, splice, and the clone rebuild.
//!
//! The operations here move subtrees, never individual values. The workhorse
//! is `join_subtrees`, which concatenates two detached subtrees in time
//! proportional to their height difference. `split` dismantles a single
//! root-to-leaf path and folds the severed pieces back together on each
//! side; `splice` moves the smaller tree's nodes into the larger tree's
//! arena and joins once. Cloning rebuilds the copy bottom-up from the
//! source's leaf chain and never compares a key.

use std::mem;

use crate::arena::{NodeArena, NodeId};
use crate::node::{ChildSlot, MAX_DEGREE, Node, NodeKind};
use crate::ordering::{Comparator, KeyOf};
use crate::trace::{debug_log, warn_log};

use super::{TreeError, TwoThreeTree};

impl<V, X: KeyOf<V>, C: Comparator<X::Key>> TwoThreeTree<V, X, C> {
    /// Split the tree at `key`, consuming it.
    ///
    /// The first returned tree keeps every value whose key orders strictly
    /// before `key` and retains this tree's node storage; the second
    /// receives the rest (equal keys included) in freshly allocated storage.
    /// Whole subtrees move, so the rebalancing work is proportional to the
    /// tree's height rather than to the number of values on either side.
    ///
    /// ```
    /// use twothree::TwoThreeTree;
    ///
    /// let tree: TwoThreeTree<u32> = (0..8).collect();
    /// let (below, rest) = tree.split(&5);
    ///
    /// assert_eq!(below.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    /// assert_eq!(rest.iter().copied().collect::<Vec<_>>(), vec![5, 6, 7]);
    /// ```
    #[must_use]
    pub fn split(mut self, key: &X::Key) -> (Self, Self)
    where
        C: Clone,
    {
        if self.is_empty() || self.less(self.key_at(self.rightmost), key) {
            // Every key is below the cut.
            let rest = Self::with_comparator(self.cmp.clone());
            return (self, rest);
        }
        if !self.less(self.key_at(self.leftmost), key) {
            // Every key is at or above the cut.
            let below = Self::with_comparator(self.cmp.clone());
            return (below, self);
        }

        // Both sides are non-empty. Walk the routing path for `key`, freeing
        // each branch on it and setting aside the untouched siblings: those
        // left of the path keep keys below the cut, those right of it keys
        // at or above. Push order is outside-in, so each stack holds its
        // subtrees from tallest to shortest.
        let total = self.len;
        let mut below: Vec<NodeId> = Vec::new();
        let mut above: Vec<NodeId> = Vec::new();
        let mut cur = self.root;
        while !self.arena.node(cur).is_leaf() {
            let (slots, degree) = {
                let branch = self.arena.node(cur).as_branch();
                (branch.slots, branch.degree())
            };
            let mut idx = degree - 1;
            for (i, slot) in slots[..degree].iter().enumerate() {
                if !self.less(self.key_at(slot.max_leaf), key) {
                    idx = i;
                    break;
                }
            }
            for slot in &slots[..idx] {
                self.arena.node_mut(slot.child).parent = NodeId::HEADER;
                below.push(slot.child);
            }
            // Far sibling first: the upper stack is folded in reverse, which
            // must run ascending within a level as well.
            for slot in slots[idx + 1..degree].iter().rev() {
                self.arena.node_mut(slot.child).parent = NodeId::HEADER;
                above.push(slot.child);
            }
            let next = slots[idx].child;
            self.arena.free(cur);
            cur = next;
        }

        // `cur` is the first leaf at or above the cut; it opens the upper
        // side. Sever the chain just before it.
        let boundary = cur;
        self.arena.node_mut(boundary).parent = NodeId::HEADER;
        above.push(boundary);
        let last_below = self.arena.node(boundary).as_leaf().prev;
        self.arena.node_mut(last_below).as_leaf_mut().next = NodeId::HEADER;
        self.arena.node_mut(boundary).as_leaf_mut().prev = NodeId::HEADER;

        // Fold each stack back into one subtree. The lower stack runs
        // smallest keys first, so each piece joins on the right; reversing
        // the upper stack does the same for the other side.
        let mut lower = NodeId::HEADER;
        for sub in below {
            lower = if lower.is_header() {
                sub
            } else {
                self.join_subtrees(lower, sub)
            };
        }
        let mut upper = NodeId::HEADER;
        for sub in above.into_iter().rev() {
            upper = if upper.is_header() {
                sub
            } else {
                self.join_subtrees(upper, sub)
            };
        }
        debug_assert!(!lower.is_header() && !upper.is_header());

        // The lower side stays put; the upper side moves out into its own
        // storage.
        let mut rest = Self::with_comparator(self.cmp.clone());
        let (new_root, first, last) = transplant(&mut self.arena, &mut rest.arena, upper);
        rest.root = new_root;
        rest.leftmost = first;
        rest.rightmost = last;
        rest.len = rest.arena.node(new_root).count();

        self.root = lower;
        self.rightmost = last_below;
        self.len = self.arena.node(lower).count();
        debug_assert_eq!(self.len + rest.len, total);

        debug_log!(below = self.len, above = rest.len, "split tree");
        (self, rest)
    }

    /// Append every value of `other` to this tree, leaving `other` empty.
    ///
    /// Requires the donor's smallest key to be no less than this tree's
    /// largest; equal boundary keys are fine, and the donated equals then
    /// follow the resident ones. The smaller tree's nodes are moved across
    /// arenas one by one, after which a single join links the two subtrees,
    /// so splicing a small tree onto a large one never touches the large
    /// tree's values. Both trees must order keys the same way.
    ///
    /// ```
    /// use twothree::TwoThreeTree;
    ///
    /// let mut low: TwoThreeTree<u32> = (0..4).collect();
    /// let mut high: TwoThreeTree<u32> = (4..8).collect();
    ///
    /// low.splice(&mut high).unwrap();
    /// assert_eq!(low.len(), 8);
    /// assert!(high.is_empty());
    /// ```
    ///
    /// # Errors
    ///
    /// [`TreeError::PrecedenceViolation`] when the donor's smallest key
    /// orders strictly before this tree's largest. Neither tree is modified.
    pub fn splice(&mut self, other: &mut Self) -> Result<(), TreeError> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            self.arena = mem::take(&mut other.arena);
            self.root = other.root;
            self.leftmost = other.leftmost;
            self.rightmost = other.rightmost;
            self.len = other.len;
            other.root = NodeId::HEADER;
            other.leftmost = NodeId::HEADER;
            other.rightmost = NodeId::HEADER;
            other.len = 0;
            return Ok(());
        }

        let donor_min = X::key_of(other.arena.node(other.leftmost).value());
        if self.less(donor_min, self.key_at(self.rightmost)) {
            warn_log!("splice rejected, donor keys reach below the receiver");
            return Err(TreeError::PrecedenceViolation);
        }

        if other.len <= self.len {
            // Donor nodes move into our arena, then join on the right.
            let (sub, first, last) = transplant(&mut other.arena, &mut self.arena, other.root);
            self.arena.node_mut(self.rightmost).as_leaf_mut().next = first;
            self.arena.node_mut(first).as_leaf_mut().prev = self.rightmost;
            self.root = self.join_subtrees(self.root, sub);
            self.rightmost = last;
        } else {
            // We are the smaller side: move our nodes into the donor's
            // arena, take that arena over, then join as before.
            let (sub, first, last) = transplant(&mut self.arena, &mut other.arena, self.root);
            mem::swap(&mut self.arena, &mut other.arena);
            self.arena.node_mut(last).as_leaf_mut().next = other.leftmost;
            self.arena.node_mut(other.leftmost).as_leaf_mut().prev = last;
            self.root = self.join_subtrees(sub, other.root);
            self.leftmost = first;
            self.rightmost = other.rightmost;
        }
        self.len += other.len;
        debug_log!(donated = other.len, total = self.len, "splice complete");

        other.arena.clear();
        other.root = NodeId::HEADER;
        other.leftmost = NodeId::HEADER;
        other.rightmost = NodeId::HEADER;
        other.len = 0;
        Ok(())
    }

    /// Concatenate two detached subtrees and return the root of the result.
    ///
    /// Purely positional: every leaf under `left` must already order before
    /// every leaf under `right`, their chain links must already run from one
    /// into the other, and both roots must carry a `HEADER` parent. No key
    /// is compared. Equal heights get a fresh two-child top; otherwise the
    /// shorter tree is added as one more child on the facing spine of the
    /// taller, splitting upward as needed.
    fn join_subtrees(&mut self, left: NodeId, right: NodeId) -> NodeId {
        debug_assert!(self.arena.node(left).parent.is_header());
        debug_assert!(self.arena.node(right).parent.is_header());

        let left_height = self.height_of(left);
        let right_height = self.height_of(right);

        if left_height == right_height {
            let count = self.arena.node(left).count() + self.arena.node(right).count();
            let left_slot = ChildSlot {
                child: left,
                max_leaf: self.subtree_max(left),
            };
            let right_slot = ChildSlot {
                child: right,
                max_leaf: self.subtree_max(right),
            };
            let top = self
                .arena
                .alloc(Node::branch2(NodeId::HEADER, left_slot, right_slot, count));
            self.arena.node_mut(left).parent = top;
            self.arena.node_mut(right).parent = top;
            return top;
        }

        if left_height > right_height {
            // Descend the right spine of `left` to the branch whose children
            // sit at `right`'s height, and append `right` there.
            let mut at = left;
            for _ in 0..left_height - right_height - 1 {
                let branch = self.arena.node(at).as_branch();
                at = branch.child(branch.degree() - 1);
            }
            let idx = self.arena.node(at).as_branch().degree();
            let slot = ChildSlot {
                child: right,
                max_leaf: self.subtree_max(right),
            };
            match self.add_child(at, idx, slot) {
                Some(top) => top,
                None => left,
            }
        } else {
            // Mirror image: prepend `left` on the left spine of `right`.
            let mut at = right;
            for _ in 0..right_height - left_height - 1 {
                at = self.arena.node(at).as_branch().child(0);
            }
            let slot = ChildSlot {
                child: left,
                max_leaf: self.subtree_max(left),
            };
            match self.add_child(at, 0, slot) {
                Some(top) => top,
                None => right,
            }
        }
    }

    /// Branch levels between `node` and its leaf floor; 0 for a leaf.
    fn height_of(&self, node: NodeId) -> usize {
        let mut height = 0;
        let mut cur = node;
        while !self.arena.node(cur).is_leaf() {
            cur = self.arena.node(cur).as_branch().child(0);
            height += 1;
        }
        height
    }
}

// ============================================================================
//  Cross-arena transplant
// ============================================================================

/// Move the subtree rooted at `root` out of `src` and into `dst`.
///
/// Nodes are visited in order, so the subtree's leaf chain is rebuilt as it
/// lands; cached maxima are remapped to the new leaf ids and counts carry
/// over unchanged. The new root is left with a `HEADER` parent. Returns the
/// new ids of the root and of the subtree's first and last leaves.
fn transplant<V>(
    src: &mut NodeArena<V>,
    dst: &mut NodeArena<V>,
    root: NodeId,
) -> (NodeId, NodeId, NodeId) {
    let mut first = NodeId::HEADER;
    let mut last = NodeId::HEADER;
    let slot = transplant_node(src, dst, root, NodeId::HEADER, &mut first, &mut last);
    (slot.child, first, last)
}

/// Recursive worker for [`transplant`]: moves one node, returns its new
/// child slot for the parent being rebuilt above it.
fn transplant_node<V>(
    src: &mut NodeArena<V>,
    dst: &mut NodeArena<V>,
    old: NodeId,
    new_parent: NodeId,
    first: &mut NodeId,
    last: &mut NodeId,
) -> ChildSlot {
    let node = src.free(old);
    match node.kind {
        NodeKind::Leaf(leaf) => {
            let new = dst.alloc(Node::leaf(leaf.value, new_parent, *last, NodeId::HEADER));
            if last.is_header() {
                *first = new;
            } else {
                dst.node_mut(*last).as_leaf_mut().next = new;
            }
            *last = new;
            ChildSlot::of_leaf(new)
        }
        NodeKind::Branch(branch) => {
            // Allocate the destination branch first so the children can
            // point at it, then fill its slots from their new ids.
            let new = dst.alloc(Node::branch(
                new_parent,
                [ChildSlot::EMPTY; MAX_DEGREE],
                0,
                branch.count,
            ));
            let degree = branch.degree();
            let mut slots = [ChildSlot::EMPTY; MAX_DEGREE];
            for (i, slot) in branch.slots().iter().enumerate() {
                slots[i] = transplant_node(src, dst, slot.child, new, first, last);
            }
            {
                let rebuilt = dst.node_mut(new).as_branch_mut();
                rebuilt.slots = slots;
                rebuilt.set_degree(degree);
            }
            ChildSlot {
                child: new,
                max_leaf: slots[degree - 1].max_leaf,
            }
        }
    }
}

// ============================================================================
//  Clone rebuild
// ============================================================================

impl<V, X, C> TwoThreeTree<V, X, C> {
    /// Bulk-load `n` values, already in key order, into this empty tree.
    ///
    /// Leaves are chained as they arrive and branch levels grow bottom-up:
    /// three children per branch while more than four nodes remain on a
    /// level, then a tail of 2, 3, or 2+2, so no grouping ever produces a
    /// one-child branch. No key is compared anywhere on this path.
    fn rebuild_from_sorted<I>(&mut self, values: I, n: usize)
    where
        I: Iterator<Item = V>,
    {
        debug_assert!(self.is_empty());

        if n == 0 {
            return;
        }

        let mut level: Vec<ChildSlot> = Vec::with_capacity(n);
        let mut prev = NodeId::HEADER;
        for value in values {
            let leaf = self
                .arena
                .alloc(Node::leaf(value, NodeId::HEADER, prev, NodeId::HEADER));
            if prev.is_header() {
                self.leftmost = leaf;
            } else {
                self.arena.node_mut(prev).as_leaf_mut().next = leaf;
            }
            level.push(ChildSlot::of_leaf(leaf));
            prev = leaf;
        }
        self.rightmost = prev;
        self.len = level.len();
        debug_assert_eq!(self.len, n);

        while level.len() > 1 {
            let mut upper = Vec::with_capacity(level.len() / 2 + 1);
            let mut taken = 0;
            while level.len() - taken > 4 {
                upper.push(self.pack_branch(&level[taken..taken + 3]));
                taken += 3;
            }
            match level.len() - taken {
                2 => upper.push(self.pack_branch(&level[taken..taken + 2])),
                3 => upper.push(self.pack_branch(&level[taken..taken + 3])),
                4 => {
                    upper.push(self.pack_branch(&level[taken..taken + 2]));
                    upper.push(self.pack_branch(&level[taken + 2..taken + 4]));
                }
                tail => unreachable!("level tail of {tail} nodes"),
            }
            level = upper;
        }
        self.root = level[0].child;
    }

    /// Wrap `children` (2 or 3 of them, in key order) in a fresh branch and
    /// return the branch's own child slot.
    fn pack_branch(&mut self, children: &[ChildSlot]) -> ChildSlot {
        debug_assert!((2..=MAX_DEGREE).contains(&children.len()));

        let mut slots = [ChildSlot::EMPTY; MAX_DEGREE];
        slots[..children.len()].copy_from_slice(children);

        let mut count = 0;
        for slot in children {
            count += self.arena.node(slot.child).count();
        }
        let branch = self
            .arena
            .alloc(Node::branch(NodeId::HEADER, slots, children.len(), count));
        for slot in children {
            self.arena.node_mut(slot.child).parent = branch;
        }

        ChildSlot {
            child: branch,
            max_leaf: children[children.len() - 1].max_leaf,
        }
    }
}

impl<V: Clone, X, C: Clone> Clone for TwoThreeTree<V, X, C> {
    /// Deep copy by one ordered pass over the leaf chain, rebuilding the
    /// branch structure bottom-up without comparing keys.
    fn clone(&self) -> Self {
        let mut copy = Self::with_comparator(self.cmp.clone());
        copy.rebuild_from_sorted(self.iter().cloned(), self.len);
        copy
    }
}

// ============================================================================
//  Tests
// ============================================================================
