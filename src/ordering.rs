//! Key ordering and key extraction.
//!
//! A tree is configured by two small objects instead of compile-time
//! globals: a [`Comparator`] defining a strict weak order over keys, and a
//! [`KeyOf`] projection from stored values to their keys. Both default to
//! the obvious choices ([`NaturalOrder`], [`Identity`]), so a plain
//! `TwoThreeTree<u64>` orders whole values by `Ord`.
//!
//! The comparator is passed at construction and stored in the tree, so
//! stateful orders (collations, reversed orders) work without wrapper key
//! types:
//!
//! ```
//! use twothree::{Comparator, Identity, TwoThreeTree};
//!
//! #[derive(Clone, Copy, Default)]
//! struct Reversed;
//!
//! impl Comparator<u64> for Reversed {
//!     fn less(&self, a: &u64, b: &u64) -> bool {
//!         b < a
//!     }
//! }
//!
//! let mut tree: TwoThreeTree<u64, Identity, Reversed> = TwoThreeTree::with_comparator(Reversed);
//! tree.extend([3, 1, 2]);
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
//! ```

// ============================================================================
//  Comparator
// ============================================================================

/// Strict weak order over keys of type `K`.
///
/// Only `less` is required; equivalence is derived as "neither argument is
/// less than the other", which is how duplicates are recognized throughout
/// the tree.
pub trait Comparator<K: ?Sized> {
    /// Whether `a` orders strictly before `b`.
    fn less(&self, a: &K, b: &K) -> bool;

    /// Whether `a` and `b` are equivalent under this order.
    #[inline]
    fn equiv(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }
}

// ============================================================================
//  KeyOf
// ============================================================================

/// Projection from a stored value to the key it is ordered by.
///
/// Implementations are stateless: the projection is a property of the value
/// type, not of a particular tree instance.
pub trait KeyOf<V> {
    /// The key type compared by the tree's [`Comparator`].
    type Key: ?Sized;

    /// Borrow the key out of a stored value.
    fn key_of(value: &V) -> &Self::Key;
}

/// The whole value is the key (set-like usage).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Identity;

impl<V> KeyOf<V> for Identity {
    type Key = V;

    #[inline]
    fn key_of(value: &V) -> &V {
        value
    }
}

// ============================================================================
//  Tests
// ============================================================================
