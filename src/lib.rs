//! # domset-rs: minimum dominating sets by branch and bound
//!
//! **`domset-rs`** finds minimum dominating sets on undirected graphs (and
//! exhaustively enumerates dominating sets in a size window) with a
//! branch-and-bound search built on incremental data structures.
//!
//! ## What is a dominating set?
//!
//! A set D of vertices such that every vertex of the graph is in D or
//! adjacent to a vertex in D. Finding a minimum one is NP-hard; this crate
//! attacks it with exact search whose per-node work is kept tiny by three
//! cooperating structures:
//!
//! - a **degree priority queue** bucketing vertices by how many undominated
//!   (or still-candidate) vertices their closed neighbourhoods hold, giving
//!   O(1) min/max queries and a greedy cover lower bound;
//! - an **MDD stack** tracking, per undominated vertex, the best any single
//!   future dominator could still do for it, with an undo log that restores
//!   the structure exactly when the search backtracks;
//! - swap-indexed **vertex sets** with O(1) membership, insertion, and
//!   most-recently-added removal.
//!
//! ## Search constraints
//!
//! Instances may force vertices into (`force_in`) or out of (`force_out`)
//! the dominating set, bound the certificate size (`-u` / `-l`), and split
//! the search tree into residue classes (`--res` / `--mod` /
//! `--resmod-depth`) so independent processes cover disjoint parts of the
//! space.
//!
//! ## Quick start
//!
//! ```rust
//! use domset_rs::graph::Graph;
//! use domset_rs::instance::{CollectProxy, DominationInstance, Solver};
//! use domset_rs::solver::{BranchOrder, DdSolver, PivotRule, SearchFrame, SolverPolicy};
//!
//! // A 6-cycle.
//! let mut g = Graph::new(6).unwrap();
//! for i in 0..6 {
//!     g.add_edge(i, (i + 1) % 6);
//! }
//! let mut inst = DominationInstance::from_graph(g);
//!
//! let mut solver = DdSolver::new(
//!     SolverPolicy {
//!         pivot: PivotRule::MinCandidateDegree,
//!         order: BranchOrder::Descending,
//!         force_stop_on_trapped: false,
//!         recheck_bounds_in_loop: false,
//!         generate_all: false,
//!     },
//!     SearchFrame::default(),
//! );
//!
//! let mut out = CollectProxy::new();
//! solver.solve(&mut inst, &mut out).unwrap();
//! assert_eq!(out.sets.last().unwrap().len(), 2);
//! ```
//!
//! ## Core components
//!
//! - **[`solver`]**: the three drivers (`fixed_order`, DD, MDD) and their
//!   shared bounds/res-mod frame.
//! - **[`degree_pq`]**, **[`mdd_stack`]**, **[`vertex_set`]**: the
//!   incremental structures the drivers lean on.
//! - **[`generators`]**, **[`io`]**, **[`filters`]**: board/Kneser/grid
//!   graph sources, the text format, and preprocessing.
//! - **[`registry`]**: the name-keyed component tables behind the CLI.

pub mod degree_pq;
pub mod error;
pub mod filters;
pub mod generators;
pub mod graph;
pub mod instance;
pub mod io;
pub mod mdd_stack;
pub mod registry;
pub mod solver;
pub mod types;
pub mod vertex_set;

#[cfg(test)]
pub(crate) mod test_graphs;
