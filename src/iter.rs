//! Leaf-chain iterators.
//!
//! Iteration never touches branch structure: leaves form a doubly-threaded
//! chain in key order, anchored at the header sentinel on both ends, and the
//! iterators here just follow `next`/`prev` threads. [`Iter`] walks the whole
//! tree, [`Range`] a bound-delimited stretch of it, and [`IntoIter`] drains
//! an owned tree front to back.

use crate::arena::{NodeArena, NodeId};
use crate::node::NodeKind;

// ============================================================================
//  Iter
// ============================================================================

/// Borrowing in-order iterator over every value in a tree.
///
/// Double-ended and exact-size: `next` walks the leaf chain forward from the
/// leftmost leaf, `next_back` walks it backward from the rightmost.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, V> {
    arena: &'a NodeArena<V>,
    front: NodeId,
    back: NodeId,

    /// Values not yet yielded from either end. The authority on exhaustion;
    /// `front`/`back` are meaningless once this reaches zero.
    remaining: usize,
}

impl<'a, V> Iter<'a, V> {
    pub(crate) fn new(arena: &'a NodeArena<V>, front: NodeId, back: NodeId, len: usize) -> Self {
        Self {
            arena,
            front,
            back,
            remaining: len,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        if self.remaining == 0 {
            return None;
        }

        let leaf = self.arena.node(self.front).as_leaf();
        self.front = leaf.next;
        self.remaining -= 1;
        Some(&leaf.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        if self.remaining == 0 {
            return None;
        }

        let leaf = self.arena.node(self.back).as_leaf();
        self.back = leaf.prev;
        self.remaining -= 1;
        Some(&leaf.value)
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> std::iter::FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

// ============================================================================
//  Range
// ============================================================================

/// Borrowing iterator over a contiguous stretch of the leaf chain.
///
/// Produced by the bound searches (`lower_bound`, `upper_bound`,
/// `equal_range`). Both endpoints are tracked as inclusive leaf positions;
/// an empty range is flagged at construction.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, V> {
    arena: &'a NodeArena<V>,
    front: NodeId,
    back: NodeId,
    exhausted: bool,
}

impl<'a, V> Range<'a, V> {
    /// Range covering `front..=back` on the leaf chain.
    pub(crate) fn new(arena: &'a NodeArena<V>, front: NodeId, back: NodeId) -> Self {
        Self {
            arena,
            front,
            back,
            exhausted: false,
        }
    }

    /// Range yielding nothing.
    pub(crate) fn empty(arena: &'a NodeArena<V>) -> Self {
        Self {
            arena,
            front: NodeId::HEADER,
            back: NodeId::HEADER,
            exhausted: true,
        }
    }
}

impl<'a, V> Iterator for Range<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        if self.exhausted {
            return None;
        }

        let leaf = self.arena.node(self.front).as_leaf();
        if self.front == self.back {
            self.exhausted = true;
        } else {
            self.front = leaf.next;
        }
        Some(&leaf.value)
    }
}

impl<'a, V> DoubleEndedIterator for Range<'a, V> {
    fn next_back(&mut self) -> Option<&'a V> {
        if self.exhausted {
            return None;
        }

        let leaf = self.arena.node(self.back).as_leaf();
        if self.front == self.back {
            self.exhausted = true;
        } else {
            self.back = leaf.prev;
        }
        Some(&leaf.value)
    }
}

impl<V> std::iter::FusedIterator for Range<'_, V> {}

impl<V> Clone for Range<'_, V> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            front: self.front,
            back: self.back,
            exhausted: self.exhausted,
        }
    }
}

// ============================================================================
//  IntoIter
// ============================================================================

/// Owning in-order iterator, draining the tree front to back.
///
/// Leaves are freed as they are consumed; whatever remains unyielded is
/// dropped with the arena.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IntoIter<V> {
    arena: NodeArena<V>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<V> IntoIter<V> {
    pub(crate) fn new(arena: NodeArena<V>, front: NodeId, back: NodeId, len: usize) -> Self {
        Self {
            arena,
            front,
            back,
            remaining: len,
        }
    }
}

impl<V> Iterator for IntoIter<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.arena.free(self.front);
        self.remaining -= 1;
        match node.kind {
            NodeKind::Leaf(leaf) => {
                self.front = leaf.next;
                Some(leaf.value)
            }
            NodeKind::Branch(_) => unreachable!("leaf chain reached a branch"),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for IntoIter<V> {
    fn next_back(&mut self) -> Option<V> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.arena.free(self.back);
        self.remaining -= 1;
        match node.kind {
            NodeKind::Leaf(leaf) => {
                self.back = leaf.prev;
                Some(leaf.value)
            }
            NodeKind::Branch(_) => unreachable!("leaf chain reached a branch"),
        }
    }
}

impl<V> ExactSizeIterator for IntoIter<V> {}

impl<V> std::iter::FusedIterator for IntoIter<V> {}

// ============================================================================
//  Tests
// ============================================================================
