//! Branch-and-bound drivers and their shared accounting.
//!
//! Three drivers share this module's frame:
//!
//! - [`fixed_order`]: branches on the lowest-numbered uncovered vertex with
//!   a static degree bound. The baseline driver.
//! - [`dd`]: domination-degree driver; pivots via the heavy candidate
//!   degree queue and bounds with the undominated queue's greedy cover
//!   count.
//! - [`mdd`]: maximum-dominator-degree driver; bounds with the MDD stack
//!   and distinguishes fatal from tight bound violations.
//!
//! [`SearchFrame`] carries the per-solve knobs every driver honours: size
//! bounds, the res/mod residue partitioning of the search tree, and the
//! per-depth node histogram.

pub mod branching;
pub mod dd;
pub mod fixed_order;
pub mod mdd;

pub use dd::DdSolver;
pub use fixed_order::FixedOrderSolver;
pub use mdd::MddSolver;

use crate::types::MAX_VERTS;

/// Pivot selection rule, fixed at solver construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotRule {
    /// Undominated vertex with the fewest remaining candidates in N[v].
    MinCandidateDegree,
    /// Undominated vertex with the most remaining candidates in N[v].
    MaxCandidateDegree,
    /// Undominated vertex with the smallest mdd (MDD driver only).
    MinMdd,
    /// Undominated vertex with the largest mdd (MDD driver only).
    MaxMdd,
}

/// Order in which a pivot's candidate neighbourhood is branched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOrder {
    /// Lowest undominated-rank first ("minUCD"; usually the weak choice).
    Ascending,
    /// Highest undominated-rank first ("maxUCD"; usually best).
    Descending,
}

/// The policy record read by the drivers' hot paths.
#[derive(Debug, Clone, Copy)]
pub struct SolverPolicy {
    pub pivot: PivotRule,
    pub order: BranchOrder,
    /// Stop the branch loop as soon as an include turned out mandatory
    /// (some undominated vertex was left with no other candidate).
    pub force_stop_on_trapped: bool,
    /// Re-evaluate the bounds between branch iterations.
    pub recheck_bounds_in_loop: bool,
    /// Generation mode: emit every certificate in the size window instead
    /// of optimizing.
    pub generate_all: bool,
}

/// Why a search unwound early.
#[derive(Debug)]
pub(crate) enum Unwind {
    /// The output proxy asked to stop; not an error.
    Terminated,
    /// The search state contradicted itself (collaborator bug).
    Inconsistent(String),
}

/// Outcome of the res/mod accounting at one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeCheck {
    /// Node belongs to another residue class; abandon the branch.
    Reject,
    /// Keep going; the cutoff depth has not been reached yet.
    Descend,
    /// Node passed the cutoff test; no descendant needs checking again.
    Detach,
}

/// Per-solve bounds, residue partitioning, and node accounting.
#[derive(Debug, Clone)]
pub struct SearchFrame {
    /// No certificate larger than this is emitted.
    pub upper: usize,
    /// No certificate smaller than this is emitted.
    pub lower: usize,
    pub res: u64,
    pub modulus: u64,
    /// Depth at which the search tree is split into residue classes.
    pub resmod_depth: Option<usize>,
    depth_log: Vec<u64>,
}

impl Default for SearchFrame {
    fn default() -> Self {
        Self {
            upper: MAX_VERTS,
            lower: 0,
            res: 0,
            modulus: 1,
            resmod_depth: None,
            depth_log: Vec::new(),
        }
    }
}

impl SearchFrame {
    /// Clears the node histogram for a graph on `n` vertices.
    pub fn reset(&mut self, n: usize) {
        self.depth_log.clear();
        self.depth_log.resize(n + 1, 0);
    }

    /// Logs the node and decides its fate under res/mod partitioning.
    ///
    /// At the cutoff depth the node is kept iff its ordinal falls in the
    /// configured residue class; a kept node needs no further checks
    /// anywhere below it, which the drivers exploit by re-entering the
    /// search monomorphised with `CHECK = false` (after un-logging, so the
    /// unchecked entry logs it exactly once).
    pub(crate) fn report_node<const CHECK: bool>(&mut self, depth: usize) -> NodeCheck {
        self.depth_log[depth] += 1;
        if !CHECK {
            return NodeCheck::Descend;
        }
        match self.resmod_depth {
            Some(d) if depth == d => {
                if (self.depth_log[depth] - 1) % self.modulus == self.res {
                    NodeCheck::Detach
                } else {
                    NodeCheck::Reject
                }
            }
            _ => NodeCheck::Descend,
        }
    }

    pub(crate) fn unreport_node(&mut self, depth: usize) {
        self.depth_log[depth] -= 1;
    }

    /// Emits the per-depth node counts to the log at debug level.
    pub fn log_depth_histogram(&self) {
        let max_depth = self
            .depth_log
            .iter()
            .rposition(|&c| c > 0)
            .unwrap_or(0);
        log::debug!("depth log:");
        let mut total: u64 = 0;
        for (depth, &count) in self.depth_log.iter().enumerate().take(max_depth + 1) {
            log::debug!("{depth:2}: {count}");
            total += count;
        }
        log::debug!("total logged calls: {total}");
    }
}
