//! Filepath: src/tree.rs
//! `TwoThreeTree` - an ordered multiset-capable container on a 2-3 tree.
//!
//! This module provides the main `TwoThreeTree<V, X, C>` type together with
//! its error types. The balancing and bulk machinery lives in submodules:
//! search/routing, the insertion balancer, the deletion balancer, bulk
//! operations (split/splice/rebuild), and the invariant checker.

use std::fmt as StdFmt;
use std::marker::PhantomData;

use crate::arena::{NodeArena, NodeId};
use crate::iter::{IntoIter, Iter};
use crate::ordering::{Comparator, Identity, KeyOf, NaturalOrder};

mod bulk;
mod check;
mod insert;
mod remove;
mod search;

pub use check::VerifyError;

// ============================================================================
//  TreeError
// ============================================================================

/// Errors reported by fallible tree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// `splice` was called with a donor tree whose minimum key orders before
    /// the receiver's maximum key. Neither tree is modified.
    PrecedenceViolation,

    /// Memory reservation failed.
    AllocationFailed,
}

impl StdFmt::Display for TreeError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::PrecedenceViolation => {
                write!(f, "splice donor holds a key below the receiver's maximum")
            }

            Self::AllocationFailed => write!(f, "memory allocation failed"),
        }
    }
}

impl std::error::Error for TreeError {}

// ============================================================================
//  TwoThreeTree
// ============================================================================

/// An ordered, duplicate-friendly associative container implemented as a
/// height-balanced 2-3 search tree.
///
/// Every value lives in a leaf; branches hold 2 or 3 children with a cached
/// maximum key and leaf count per subtree, and all leaves sit at the same
/// depth. Leaves are additionally threaded into a doubly-linked chain in key
/// order, so iteration never touches the branch structure. Insert, erase and
/// the key searches are `O(log n)`; `split` and `splice` move whole subtrees
/// instead of individual values.
///
/// Nodes are stored in an index-addressed arena owned by the tree, which
/// caps a single tree at `u32::MAX - 1` nodes (about two billion values).
///
/// # Type Parameters
///
/// - `V` - The value type to store
/// - `X` - Key extraction from values (defaults to [`Identity`]: the value
///   is its own key)
/// - `C` - Key comparator (defaults to [`NaturalOrder`]: the key's [`Ord`])
///
/// # Example
///
/// ```
/// use twothree::TwoThreeTree;
///
/// let mut tree: TwoThreeTree<u32> = TwoThreeTree::new();
/// for v in [5, 3, 8, 3] {
///     tree.insert_equal(v);
/// }
///
/// assert_eq!(tree.len(), 4);
/// assert_eq!(tree.count(&3), 2);
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![3, 3, 5, 8]);
///
/// assert_eq!(tree.erase(&3), 2);
/// assert_eq!(tree.find(&3), None);
/// ```
pub struct TwoThreeTree<V, X = Identity, C = NaturalOrder> {
    /// Node storage; all parent/child/thread relations are ids into this.
    arena: NodeArena<V>,

    /// Root node, `HEADER` when the tree is empty.
    root: NodeId,

    /// First (smallest-key) leaf, `HEADER` when empty.
    leftmost: NodeId,

    /// Last (largest-key) leaf, `HEADER` when empty.
    rightmost: NodeId,

    /// Number of leaves. Kept in step with the root's cached count.
    len: usize,

    /// The key order. All trees taking part in `splice` must agree on it.
    cmp: C,

    /// Key extraction is a type-level choice, never per-instance state.
    _key_of: PhantomData<X>,
}

impl<V, X, C> TwoThreeTree<V, X, C> {
    /// Create an empty tree ordering keys with `cmp`.
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        Self {
            arena: NodeArena::new(),
            root: NodeId::HEADER,
            leftmost: NodeId::HEADER,
            rightmost: NodeId::HEADER,
            len: 0,
            cmp,
            _key_of: PhantomData,
        }
    }

    /// Number of values in the tree.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no values.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The smallest-key value, `None` on an empty tree.
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&V> {
        if self.is_empty() {
            None
        } else {
            Some(self.arena.node(self.leftmost).value())
        }
    }

    /// The largest-key value, `None` on an empty tree.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&V> {
        if self.is_empty() {
            None
        } else {
            Some(self.arena.node(self.rightmost).value())
        }
    }

    /// In-order iterator over all values.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::new(&self.arena, self.leftmost, self.rightmost, self.len)
    }

    /// Drop every value. Node storage is retained for reuse.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = NodeId::HEADER;
        self.leftmost = NodeId::HEADER;
        self.rightmost = NodeId::HEADER;
        self.len = 0;
    }

    /// Exchange the entire contents of two trees in O(1).
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Fallibly reserve node storage for at least `additional` more values.
    ///
    /// A tree of `n` values uses fewer than `2n` nodes, so this reserves two
    /// slots per expected value. After a successful reservation, that many
    /// insertions will not reallocate.
    ///
    /// # Errors
    ///
    /// [`TreeError::AllocationFailed`] when the allocator cannot satisfy the
    /// request; the tree is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TreeError> {
        let slots = additional
            .checked_mul(2)
            .ok_or(TreeError::AllocationFailed)?;
        self.arena
            .try_reserve(slots)
            .map_err(|_| TreeError::AllocationFailed)
    }
}

impl<V, X, C: Default> TwoThreeTree<V, X, C> {
    /// Create an empty tree with the default comparator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_comparator(C::default())
    }

    /// Create an empty tree with node storage for roughly `capacity` values
    /// pre-allocated.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut tree = Self::new();
        tree.arena = NodeArena::with_capacity(capacity.saturating_mul(2));
        tree
    }
}

impl<V, X: KeyOf<V>, C: Comparator<X::Key>> TwoThreeTree<V, X, C> {
    /// Key of the value stored in leaf `id`.
    #[inline]
    pub(crate) fn key_at(&self, id: NodeId) -> &X::Key {
        X::key_of(self.arena.node(id).value())
    }

    /// Whether `a` orders strictly before `b` under this tree's comparator.
    #[inline]
    pub(crate) fn less(&self, a: &X::Key, b: &X::Key) -> bool {
        self.cmp.less(a, b)
    }

    /// Whether `a` and `b` are equivalent under this tree's comparator.
    #[inline]
    pub(crate) fn equiv(&self, a: &X::Key, b: &X::Key) -> bool {
        self.cmp.equiv(a, b)
    }
}

// ============================================================================
//  Standard trait implementations
// ============================================================================

impl<V, X, C: Default> Default for TwoThreeTree<V, X, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: StdFmt::Debug, X, C> StdFmt::Debug for TwoThreeTree<V, X, C> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<V: PartialEq, X, C> PartialEq for TwoThreeTree<V, X, C> {
    /// Trees are equal when their in-order value sequences are equal,
    /// regardless of node layout.
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<V: Eq, X, C> Eq for TwoThreeTree<V, X, C> {}

impl<V, X: KeyOf<V>, C: Comparator<X::Key>> Extend<V> for TwoThreeTree<V, X, C> {
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.insert_equal(value);
        }
    }
}

impl<V, X: KeyOf<V>, C: Comparator<X::Key> + Default> FromIterator<V> for TwoThreeTree<V, X, C> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, V, X, C> IntoIterator for &'a TwoThreeTree<V, X, C> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<V, X, C> IntoIterator for TwoThreeTree<V, X, C> {
    type Item = V;
    type IntoIter = IntoIter<V>;

    /// Consume the tree, yielding its values in key order.
    fn into_iter(self) -> IntoIter<V> {
        IntoIter::new(self.arena, self.leftmost, self.rightmost, self.len)
    }
}

// ============================================================================
//  Tests
// ============================================================================
