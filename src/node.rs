//! Tree node representation.
//!
//! A node is either a [`Leaf`](NodeKind::Leaf) holding exactly one value or a
//! [`Branch`](NodeKind::Branch) holding two or three children. Branches cache,
//! per child, the id of the maximum leaf in that child's subtree, and cache the
//! total number of leaves below them. A branch's own maximum is therefore its
//! last slot's cached maximum.
//!
//! Leaves double as links of the sorted leaf chain: `prev`/`next` thread ids
//! connect them in key order, with [`NodeId::HEADER`] terminating both ends.

use crate::arena::NodeId;

/// Maximum number of children in a branch.
pub(crate) const MAX_DEGREE: usize = 3;

// ============================================================================
//  ChildSlot
// ============================================================================

/// One child entry of a branch: the child id plus the cached id of the
/// maximum (rightmost) leaf anywhere in that child's subtree.
///
/// Caching the leaf id rather than a copy of the key keeps routing free of
/// any `Clone` bound on keys; the key is read through the leaf when needed.
/// When the child is itself a leaf, `max_leaf == child`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ChildSlot {
    pub(crate) child: NodeId,
    pub(crate) max_leaf: NodeId,
}

impl ChildSlot {
    /// Unused slot filler.
    pub(crate) const EMPTY: Self = Self {
        child: NodeId::HEADER,
        max_leaf: NodeId::HEADER,
    };

    /// Slot for a child that is a leaf (its own maximum).
    #[inline]
    pub(crate) const fn of_leaf(leaf: NodeId) -> Self {
        Self {
            child: leaf,
            max_leaf: leaf,
        }
    }
}

// ============================================================================
//  Leaf and Branch payloads
// ============================================================================

/// Payload of a leaf node: the stored value and its chain threads.
#[derive(Debug)]
pub(crate) struct LeafNode<V> {
    pub(crate) value: V,

    /// Previous leaf in key order, `HEADER` at the leftmost leaf.
    pub(crate) prev: NodeId,

    /// Next leaf in key order, `HEADER` at the rightmost leaf.
    pub(crate) next: NodeId,
}

/// Payload of a branch node.
///
/// Only the first `degree` entries of `slots` are meaningful. `degree` is 2
/// or 3 whenever the tree is at rest; it passes through 1 (underflow) inside
/// the deletion balancer and 0 while a branch is being assembled.
#[derive(Debug)]
pub(crate) struct BranchNode {
    pub(crate) slots: [ChildSlot; MAX_DEGREE],
    pub(crate) degree: u8,

    /// Leaves below this branch.
    pub(crate) count: usize,
}

impl BranchNode {
    #[inline]
    pub(crate) fn degree(&self) -> usize {
        self.degree as usize
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.degree() == MAX_DEGREE
    }

    #[inline]
    pub(crate) fn set_degree(&mut self, degree: usize) {
        debug_assert!(degree <= MAX_DEGREE);

        #[allow(clippy::cast_possible_truncation)]
        {
            self.degree = degree as u8;
        }
    }

    /// Live slots, in key order.
    #[inline]
    pub(crate) fn slots(&self) -> &[ChildSlot] {
        &self.slots[..self.degree()]
    }

    #[inline]
    pub(crate) fn child(&self, i: usize) -> NodeId {
        debug_assert!(i < self.degree());

        self.slots[i].child
    }

    /// Cached maximum leaf of the whole branch (last slot's maximum).
    #[inline]
    pub(crate) fn last_max(&self) -> NodeId {
        debug_assert!(self.degree() > 0);

        self.slots[self.degree() - 1].max_leaf
    }

    /// Slot index of `child`.
    ///
    /// The caller must only pass an id that is a current child; anything
    /// else means a broken parent link.
    #[inline]
    pub(crate) fn position_of(&self, child: NodeId) -> usize {
        match self.slots().iter().position(|s| s.child == child) {
            Some(i) => i,
            None => unreachable!("node {child} is not a child of this branch"),
        }
    }

    /// Insert `slot` at position `i`, shifting later slots right.
    pub(crate) fn insert_slot(&mut self, i: usize, slot: ChildSlot) {
        let degree = self.degree();
        debug_assert!(degree < MAX_DEGREE, "insert into full branch");
        debug_assert!(i <= degree);

        let mut j = degree;
        while j > i {
            self.slots[j] = self.slots[j - 1];
            j -= 1;
        }
        self.slots[i] = slot;
        self.degree += 1;
    }

    /// Remove and return the slot at position `i`, shifting later slots left.
    pub(crate) fn remove_slot(&mut self, i: usize) -> ChildSlot {
        let degree = self.degree();
        debug_assert!(i < degree);

        let removed = self.slots[i];
        for j in i..degree - 1 {
            self.slots[j] = self.slots[j + 1];
        }
        self.slots[degree - 1] = ChildSlot::EMPTY;
        self.degree -= 1;
        removed
    }
}

// ============================================================================
//  Node
// ============================================================================

/// A tree node: parent link plus leaf or branch payload.
#[derive(Debug)]
pub(crate) struct Node<V> {
    /// Parent branch, `HEADER` at the root (and while detached).
    pub(crate) parent: NodeId,
    pub(crate) kind: NodeKind<V>,
}

/// The two node shapes.
#[derive(Debug)]
pub(crate) enum NodeKind<V> {
    Leaf(LeafNode<V>),
    Branch(BranchNode),
}

impl<V> Node<V> {
    /// New leaf node.
    #[inline]
    pub(crate) const fn leaf(value: V, parent: NodeId, prev: NodeId, next: NodeId) -> Self {
        Self {
            parent,
            kind: NodeKind::Leaf(LeafNode { value, prev, next }),
        }
    }

    /// New branch with `degree` slots already filled in `slots`.
    #[inline]
    pub(crate) fn branch(
        parent: NodeId,
        slots: [ChildSlot; MAX_DEGREE],
        degree: usize,
        count: usize,
    ) -> Self {
        debug_assert!(degree <= MAX_DEGREE);

        #[allow(clippy::cast_possible_truncation)]
        let degree = degree as u8;

        Self {
            parent,
            kind: NodeKind::Branch(BranchNode {
                slots,
                degree,
                count,
            }),
        }
    }

    /// New two-child branch.
    #[inline]
    pub(crate) fn branch2(parent: NodeId, s0: ChildSlot, s1: ChildSlot, count: usize) -> Self {
        Self::branch(parent, [s0, s1, ChildSlot::EMPTY], 2, count)
    }

    #[inline]
    pub(crate) const fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Leaves in this node's subtree: 1 for a leaf, the cached count for a
    /// branch.
    #[inline]
    pub(crate) fn count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(_) => 1,
            NodeKind::Branch(b) => b.count,
        }
    }

    #[inline]
    pub(crate) fn as_leaf(&self) -> &LeafNode<V> {
        match &self.kind {
            NodeKind::Leaf(leaf) => leaf,
            NodeKind::Branch(_) => unreachable!("leaf expected, found branch"),
        }
    }

    #[inline]
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<V> {
        match &mut self.kind {
            NodeKind::Leaf(leaf) => leaf,
            NodeKind::Branch(_) => unreachable!("leaf expected, found branch"),
        }
    }

    #[inline]
    pub(crate) fn as_branch(&self) -> &BranchNode {
        match &self.kind {
            NodeKind::Branch(branch) => branch,
            NodeKind::Leaf(_) => unreachable!("branch expected, found leaf"),
        }
    }

    #[inline]
    pub(crate) fn as_branch_mut(&mut self) -> &mut BranchNode {
        match &mut self.kind {
            NodeKind::Branch(branch) => branch,
            NodeKind::Leaf(_) => unreachable!("branch expected, found leaf"),
        }
    }

    /// The stored value of a leaf.
    #[inline]
    pub(crate) fn value(&self) -> &V {
        &self.as_leaf().value
    }

    /// Consume a leaf node, yielding its value.
    #[inline]
    pub(crate) fn into_value(self) -> V {
        match self.kind {
            NodeKind::Leaf(leaf) => leaf.value,
            NodeKind::Branch(_) => unreachable!("branch node holds no value"),
        }
    }
}

// ============================================================================
//  Tests
// ============================================================================
