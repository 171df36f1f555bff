//! # `TwoThree`
//!
//! An ordered, duplicate-friendly container on a height-balanced 2-3 tree.
//!
//! Every value lives in a leaf and every leaf sits at the same depth.
//! Branches hold two or three children, each slot carrying the cached
//! maximum key of the child's subtree, and branches also cache their leaf
//! count, so key routing and order statistics both run in `O(log n)`.
//! Leaves are threaded into a doubly-linked chain in key order, which makes
//! iteration a pointer walk that never touches the branch structure.
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `find` / `count` / bound searches | `O(log n)` |
//! | `insert_equal` / `insert_unique` | `O(log n)` |
//! | `erase` / `remove_one` / pops | `O(log n)` per removed value |
//! | `iter` / range iteration | `O(1)` per step |
//! | `split` | `O(log n)` subtree joins plus moving the upper side out |
//! | `splice` | moving the smaller tree plus one join |
//!
//! ## Duplicates
//!
//! `insert_equal` keeps every duplicate, and a fresh duplicate lands in
//! front of its equals on the chain. `insert_unique` and [`TwoThreeSet`]
//! give set semantics over the same structure.
//!
//! ## Keys and ordering
//!
//! Values are their own keys by default ([`Identity`]); a [`KeyOf`]
//! implementation extracts embedded keys from record types, and a
//! [`Comparator`] instance replaces the natural [`Ord`] order where needed.
//!
//! ```rust
//! use twothree::TwoThreeTree;
//!
//! let mut tree: TwoThreeTree<u32> = TwoThreeTree::new();
//! tree.extend([5, 3, 8, 3]);
//!
//! assert_eq!(tree.count(&3), 2);
//! assert_eq!(tree.first(), Some(&3));
//!
//! let (below, rest) = tree.split(&5);
//! assert_eq!(below.iter().copied().collect::<Vec<_>>(), vec![3, 3]);
//! assert_eq!(rest.iter().copied().collect::<Vec<_>>(), vec![5, 8]);
//! ```
//!
//! ## Tracing
//!
//! The optional `tracing` feature hooks the rebalancing paths up to the
//! `tracing` crate. Default builds compile the hooks out entirely.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// The node layer is module-private with pub(crate) items on purpose.
#![allow(clippy::redundant_pub_crate)]

pub mod arena;
pub mod iter;
mod node;
pub mod ordering;
pub mod set;
mod trace;
pub mod tree;

#[cfg(test)]
mod test_util;

// Re-export main types for convenience
pub use arena::NodeId;
pub use ordering::{Comparator, Identity, KeyOf, NaturalOrder};
pub use set::TwoThreeSet;
pub use tree::{TreeError, TwoThreeTree, VerifyError};
