//! Structural self-checks backing the test suites.
//!
//! `verify` re-derives every invariant the balancers are supposed to
//! maintain: parent links, resting degrees, uniform leaf depth, cached
//! maxima and counts, the header caches, and the threaded chain's links and
//! key order. It walks the whole tree and is meant for tests and debugging,
//! not for production paths.

use std::fmt as StdFmt;
use std::fmt::Write as _;

use crate::arena::NodeId;
use crate::node::MAX_DEGREE;
use crate::ordering::{Comparator, KeyOf};

use super::TwoThreeTree;

// ============================================================================
//  VerifyError
// ============================================================================

/// An invariant violation found by [`TwoThreeTree::verify`].
///
/// Each variant names the first offending node the check ran into; the walk
/// stops there, so one underlying fault reports one error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    /// A node's parent link does not point at the branch holding it.
    BadParentLink {
        /// The node with the wrong link.
        node: NodeId,
    },

    /// A branch at rest has fewer than 2 or more than 3 children.
    BadDegree {
        /// The offending branch.
        node: NodeId,
        /// Its recorded degree.
        degree: usize,
    },

    /// Not all leaves sit at the same depth.
    UnequalLeafDepth {
        /// The branch whose subtrees bottom out at different depths.
        node: NodeId,
    },

    /// A branch slot's cached maximum is not the last leaf of its child's
    /// subtree.
    StaleMax {
        /// The branch holding the slot.
        node: NodeId,
        /// Index of the stale slot.
        slot: usize,
    },

    /// A branch's cached leaf count disagrees with its subtree.
    StaleCount {
        /// The offending branch.
        node: NodeId,
        /// The count the branch carries.
        cached: usize,
        /// The count its subtree actually holds.
        actual: usize,
    },

    /// Adjacent leaves on the chain are out of key order.
    OutOfOrder {
        /// The leaf whose key orders before its predecessor's.
        leaf: NodeId,
    },

    /// The leaf chain's links are not reciprocal, skip a leaf, or disagree
    /// with the tree's in-order leaf sequence.
    BrokenThread {
        /// The leaf at which the chain walk diverged.
        leaf: NodeId,
    },

    /// The cached length or the leftmost/rightmost ids disagree with the
    /// tree's contents.
    BadHeader,
}

impl StdFmt::Display for VerifyError {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::BadParentLink { node } => write!(f, "{node} carries a stale parent link"),
            Self::BadDegree { node, degree } => write!(f, "{node} rests at degree {degree}"),
            Self::UnequalLeafDepth { node } => {
                write!(f, "{node} holds subtrees of unequal depth")
            }
            Self::StaleMax { node, slot } => {
                write!(f, "{node} caches a stale maximum in slot {slot}")
            }
            Self::StaleCount {
                node,
                cached,
                actual,
            } => write!(f, "{node} caches {cached} leaves but holds {actual}"),
            Self::OutOfOrder { leaf } => write!(f, "{leaf} breaks the chain's key order"),
            Self::BrokenThread { leaf } => write!(f, "{leaf} breaks the leaf chain"),
            Self::BadHeader => write!(f, "header caches disagree with the tree"),
        }
    }
}

impl std::error::Error for VerifyError {}

/// What one subtree reported back up the checking recursion.
#[derive(Clone, Copy)]
struct SubtreeStats {
    count: usize,
    first: NodeId,
    last: NodeId,
    height: usize,
}

// ============================================================================
//  Checking walk
// ============================================================================

impl<V, X: KeyOf<V>, C: Comparator<X::Key>> TwoThreeTree<V, X, C> {
    /// Check every structural invariant, returning the first violation.
    ///
    /// # Errors
    ///
    /// The [`VerifyError`] variant naming the first broken invariant found.
    pub fn verify(&self) -> Result<(), VerifyError> {
        if self.root.is_header() {
            if self.len != 0 || !self.leftmost.is_header() || !self.rightmost.is_header() {
                return Err(VerifyError::BadHeader);
            }
            return Ok(());
        }

        if !self.arena.node(self.root).parent.is_header() {
            return Err(VerifyError::BadParentLink { node: self.root });
        }

        let mut leaves = Vec::with_capacity(self.len);
        let stats = self.check_subtree(self.root, &mut leaves)?;
        if stats.count != self.len
            || stats.first != self.leftmost
            || stats.last != self.rightmost
        {
            return Err(VerifyError::BadHeader);
        }

        self.check_chain(&leaves)
    }

    /// Recursively check the subtree under `node`, appending its leaves in
    /// order to `leaves`.
    fn check_subtree(
        &self,
        node: NodeId,
        leaves: &mut Vec<NodeId>,
    ) -> Result<SubtreeStats, VerifyError> {
        if self.arena.node(node).is_leaf() {
            leaves.push(node);
            return Ok(SubtreeStats {
                count: 1,
                first: node,
                last: node,
                height: 0,
            });
        }

        let degree = self.arena.node(node).as_branch().degree();
        if !(2..=MAX_DEGREE).contains(&degree) {
            return Err(VerifyError::BadDegree { node, degree });
        }

        let mut count = 0;
        let mut first = NodeId::HEADER;
        let mut last = NodeId::HEADER;
        let mut height = 0;
        for i in 0..degree {
            let slot = self.arena.node(node).as_branch().slots[i];
            if self.arena.node(slot.child).parent != node {
                return Err(VerifyError::BadParentLink { node: slot.child });
            }

            let sub = self.check_subtree(slot.child, leaves)?;
            if slot.max_leaf != sub.last {
                return Err(VerifyError::StaleMax { node, slot: i });
            }
            if i == 0 {
                first = sub.first;
                height = sub.height;
            } else if sub.height != height {
                return Err(VerifyError::UnequalLeafDepth { node });
            }
            count += sub.count;
            last = sub.last;
        }

        let cached = self.arena.node(node).count();
        if cached != count {
            return Err(VerifyError::StaleCount {
                node,
                cached,
                actual: count,
            });
        }

        Ok(SubtreeStats {
            count,
            first,
            last,
            height: height + 1,
        })
    }

    /// Walk the chain from `leftmost`, checking reciprocal links, key
    /// order, and agreement with the in-order leaf sequence.
    fn check_chain(&self, leaves: &[NodeId]) -> Result<(), VerifyError> {
        let mut prev = NodeId::HEADER;
        let mut cur = self.leftmost;
        for &expected in leaves {
            if cur != expected {
                return Err(VerifyError::BrokenThread { leaf: expected });
            }
            let (chain_prev, chain_next) = {
                let leaf = self.arena.node(cur).as_leaf();
                (leaf.prev, leaf.next)
            };
            if chain_prev != prev {
                return Err(VerifyError::BrokenThread { leaf: cur });
            }
            if !prev.is_header() && self.less(self.key_at(cur), self.key_at(prev)) {
                return Err(VerifyError::OutOfOrder { leaf: cur });
            }
            prev = cur;
            cur = chain_next;
        }
        if !cur.is_header() {
            return Err(VerifyError::BrokenThread { leaf: cur });
        }
        Ok(())
    }
}

// ============================================================================
//  Structure dump
// ============================================================================

impl<V, X, C> TwoThreeTree<V, X, C> {
    /// Render the node structure as an indented listing, one node per line.
    /// Debugging aid; the output format is not stable.
    #[must_use]
    pub fn dump(&self) -> String
    where
        V: StdFmt::Debug,
    {
        let mut out = String::new();
        if self.root.is_header() {
            out.push_str("(empty)\n");
        } else {
            self.dump_node(self.root, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, node: NodeId, depth: usize, out: &mut String)
    where
        V: StdFmt::Debug,
    {
        let pad = "  ".repeat(depth);
        let n = self.arena.node(node);
        if n.is_leaf() {
            let _ = writeln!(out, "{pad}{node} leaf {:?}", n.value());
        } else {
            let branch = n.as_branch();
            let _ = writeln!(
                out,
                "{pad}{node} branch [degree {}, count {}]",
                branch.degree(),
                branch.count
            );
            for slot in branch.slots() {
                self.dump_node(slot.child, depth + 1, out);
            }
        }
    }
}

// ============================================================================
//  Tests
// ============================================================================
