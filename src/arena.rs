//! Index-addressed node storage.
//!
//! Every node of a [`TwoThreeTree`](crate::TwoThreeTree) lives in a single
//! [`NodeArena`], a `Vec` of slots addressed by [`NodeId`]. Parent and child
//! relations are `NodeId` fields rather than owning references, so the
//! mutually-referencing node graph (parent links, child links, leaf threads)
//! needs no shared ownership and no raw pointers.
//!
//! Freed slots are kept on an intrusive free list and reused by later
//! allocations, so a long-lived tree with churn does not grow without bound.
//! Slot indices are `u32`, which caps a single tree at `u32::MAX - 1` nodes;
//! the top index is reserved for [`NodeId::HEADER`].

use std::collections::TryReserveError;

use crate::node::Node;

// ============================================================================
//  NodeId
// ============================================================================

/// Stable handle to a node slot in a [`NodeArena`].
///
/// `NodeId` is meaningful only together with the arena that issued it.
/// The reserved value [`NodeId::HEADER`] never names a slot: it stands for
/// the header/sentinel position ("one past the last leaf", "no parent",
/// "no such node").
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The header/sentinel id. Marks "no node": the parent of the root,
    /// both thread ends of the leaf chain, and the empty free list.
    pub const HEADER: Self = Self(u32::MAX);

    /// Whether this id is the header/sentinel rather than a real slot.
    #[inline]
    #[must_use]
    pub const fn is_header(self) -> bool {
        self.0 == u32::MAX
    }

    /// Build an id from a raw slot index.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit below the reserved header value,
    /// i.e. if the arena has reached `u32::MAX - 1` slots.
    #[inline]
    #[must_use]
    pub(crate) fn from_index(index: usize) -> Self {
        assert!(index < u32::MAX as usize, "node arena exceeded u32 slot space");

        #[allow(clippy::cast_possible_truncation)]
        Self(index as u32)
    }

    /// The raw slot index. Must not be called on [`NodeId::HEADER`].
    #[inline]
    #[must_use]
    pub(crate) fn index(self) -> usize {
        debug_assert!(!self.is_header(), "header id has no slot index");

        self.0 as usize
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_header() {
            write!(f, "NodeId(HEADER)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_header() {
            write!(f, "header")
        } else {
            write!(f, "n{}", self.0)
        }
    }
}

// ============================================================================
//  NodeArena
// ============================================================================

/// One slot of the arena: either a live node or a link in the free list.
#[derive(Debug)]
enum Slot<V> {
    Occupied(Node<V>),
    Vacant { next_free: NodeId },
}

/// Growable slab of tree nodes with slot reuse.
///
/// Allocation pops the free list when possible and appends otherwise.
/// Freeing a slot returns the node by value and pushes the slot onto the
/// free list. Access through a stale id (a freed slot) is a logic error
/// in the tree code and aborts via `unreachable!`.
#[derive(Debug)]
pub(crate) struct NodeArena<V> {
    slots: Vec<Slot<V>>,

    /// Head of the intrusive free list, `HEADER` when empty.
    free_head: NodeId,

    /// Number of occupied slots.
    live: usize,
}

impl<V> NodeArena<V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: NodeId::HEADER,
            live: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: NodeId::HEADER,
            live: 0,
        }
    }

    /// Number of live nodes.
    #[cfg(test)]
    pub(crate) const fn len(&self) -> usize {
        self.live
    }

    /// Total slots, live and vacant.
    #[cfg(test)]
    pub(crate) fn capacity_used(&self) -> usize {
        self.slots.len()
    }

    /// Fallibly grow the slot vector for at least `additional` more nodes.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.slots.try_reserve(additional)
    }

    /// Store `node`, reusing a vacant slot when one exists.
    pub(crate) fn alloc(&mut self, node: Node<V>) -> NodeId {
        self.live += 1;

        if self.free_head.is_header() {
            let id = NodeId::from_index(self.slots.len());
            self.slots.push(Slot::Occupied(node));
            return id;
        }

        let id = self.free_head;
        let slot = &mut self.slots[id.index()];
        match *slot {
            Slot::Vacant { next_free } => {
                self.free_head = next_free;
                *slot = Slot::Occupied(node);
                id
            }
            Slot::Occupied(_) => unreachable!("free list points at a live slot"),
        }
    }

    /// Release the slot for `id`, returning the node it held.
    pub(crate) fn free(&mut self, id: NodeId) -> Node<V> {
        let slot = &mut self.slots[id.index()];
        let vacated = Slot::Vacant {
            next_free: self.free_head,
        };
        match std::mem::replace(slot, vacated) {
            Slot::Occupied(node) => {
                self.free_head = id;
                self.live -= 1;
                node
            }
            Slot::Vacant { .. } => unreachable!("double free of node slot {id}"),
        }
    }

    /// Borrow the node at `id`.
    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<V> {
        match &self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("read through freed node id {id}"),
        }
    }

    /// Mutably borrow the node at `id`.
    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<V> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => unreachable!("write through freed node id {id}"),
        }
    }

    /// Drop every node and reset the free list. Capacity is retained.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_head = NodeId::HEADER;
        self.live = 0;
    }
}

impl<V> Default for NodeArena<V> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn leaf(value: u64) -> Node<u64> {
        Node::leaf(value, NodeId::HEADER, NodeId::HEADER, NodeId::HEADER)
    }

    #[test]
    fn test_header_id_is_reserved() {
        assert!(NodeId::HEADER.is_header());
        assert!(!NodeId::from_index(0).is_header());
        assert_eq!(format!("{}", NodeId::HEADER), "header");
        assert_eq!(format!("{}", NodeId::from_index(7)), "n7");
    }

    #[test]
    fn test_alloc_returns_distinct_ids() {
        let mut arena: NodeArena<u64> = NodeArena::new();

        let a = arena.alloc(leaf(1));
        let b = arena.alloc(leaf(2));
        let c = arena.alloc(leaf(3));

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(arena.len(), 3);
        assert_eq!(*arena.node(a).value(), 1);
        assert_eq!(*arena.node(c).value(), 3);
    }

    #[test]
    fn test_free_then_alloc_reuses_slot() {
        let mut arena: NodeArena<u64> = NodeArena::new();

        let a = arena.alloc(leaf(1));
        let b = arena.alloc(leaf(2));
        assert_eq!(arena.len(), 2);

        let node = arena.free(a);
        assert_eq!(*node.value(), 1);
        assert_eq!(arena.len(), 1);

        // The vacated slot comes back before the vector grows again.
        let c = arena.alloc(leaf(3));
        assert_eq!(c, a);
        assert_eq!(arena.capacity_used(), 2);
        assert_eq!(*arena.node(b).value(), 2);
        assert_eq!(*arena.node(c).value(), 3);
    }

    #[test]
    fn test_free_list_is_lifo() {
        let mut arena: NodeArena<u64> = NodeArena::new();

        let ids: Vec<NodeId> = (0..4).map(|v| arena.alloc(leaf(v))).collect();
        arena.free(ids[1]);
        arena.free(ids[3]);

        assert_eq!(arena.alloc(leaf(10)), ids[3]);
        assert_eq!(arena.alloc(leaf(11)), ids[1]);
        assert_eq!(arena.len(), 4);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut arena: NodeArena<u64> = NodeArena::new();

        for v in 0..8 {
            arena.alloc(leaf(v));
        }
        arena.free(NodeId::from_index(2));
        arena.clear();

        assert_eq!(arena.len(), 0);
        assert_eq!(arena.capacity_used(), 0);

        let id = arena.alloc(leaf(42));
        assert_eq!(id, NodeId::from_index(0));
    }

    #[test]
    fn test_try_reserve_grows_capacity() {
        let mut arena: NodeArena<u64> = NodeArena::new();

        arena.try_reserve(64).unwrap();
        let before = arena.slots.capacity();
        assert!(before >= 64);

        for v in 0..64 {
            arena.alloc(leaf(v));
        }
        assert_eq!(arena.slots.capacity(), before);
    }
}
