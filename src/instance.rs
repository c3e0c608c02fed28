//! Problem instances and the component seams around the solver core.
//!
//! A [`DominationInstance`] bundles a graph with its `force_in` /
//! `force_out` constraint sets. Instances flow through a pipeline of
//! pluggable components: an [`InputSource`] produces them, zero or more
//! [`PreprocessFilter`]s rewrite them, a [`Solver`] searches them, and an
//! [`OutputProxy`] consumes the certificates.

use std::ops::ControlFlow;

use crate::error::Result;
use crate::graph::Graph;
use crate::vertex_set::VertexSet;

/// A graph together with inclusion/exclusion constraints.
///
/// Invariant at solver entry: `force_in` and `force_out` are disjoint
/// subsets of the vertex set. Solvers validate this and reject violating
/// instances with a configuration error.
#[derive(Debug, Clone, Default)]
pub struct DominationInstance {
    pub graph: Graph,
    pub force_in: VertexSet,
    pub force_out: VertexSet,
}

impl DominationInstance {
    /// Wraps a graph with empty constraint sets sized to it.
    pub fn from_graph(graph: Graph) -> Self {
        let n = graph.n();
        Self {
            graph,
            force_in: VertexSet::new(n),
            force_out: VertexSet::new(n),
        }
    }
}

/// Produces a stream of instances. Implementations are stateful iterators:
/// `read_next` returns `Ok(None)` once the stream is exhausted (which
/// includes unparseable trailing input).
pub trait InputSource {
    fn read_next(&mut self) -> Result<Option<DominationInstance>>;
}

/// Rewrites an instance in place before solving: renumbering, appending to
/// the constraint sets, or diagnostics.
pub trait PreprocessFilter {
    fn process(&mut self, inst: &mut DominationInstance) -> Result<()>;
}

/// Consumes certificates for one instance in three phases:
/// `initialize` → any number of `process_set` calls → `finalize`.
///
/// In optimization mode `process_set` receives every *incremental
/// improvement*, not just the final optimum; proxies that only care about
/// the best set keep the last one they saw. Returning
/// [`ControlFlow::Break`] asks the solver to stop searching; the solver
/// unwinds, restores its state, and still calls `finalize`. Termination is
/// cooperative and is not an error.
pub trait OutputProxy {
    fn initialize(&mut self, _inst: &DominationInstance) {}

    fn process_set(&mut self, inst: &DominationInstance, set: &VertexSet) -> ControlFlow<()>;

    fn finalize(&mut self, _inst: &DominationInstance) {}
}

/// A dominating-set solver. `solve` owns the full lifecycle for one
/// instance, including the output proxy's three phases.
pub trait Solver {
    fn solve(&mut self, inst: &mut DominationInstance, output: &mut dyn OutputProxy)
        -> Result<()>;
}

/// Test/utility proxy that records every emitted certificate.
#[derive(Debug, Default)]
pub struct CollectProxy {
    pub sets: Vec<Vec<usize>>,
    /// When set, request termination after this many certificates.
    pub limit: Option<usize>,
}

impl CollectProxy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputProxy for CollectProxy {
    fn process_set(&mut self, inst: &DominationInstance, set: &VertexSet) -> ControlFlow<()> {
        let mut s: Vec<usize> = set.iter().map(|v| inst.graph.real_index(v)).collect();
        s.sort();
        self.sets.push(s);
        match self.limit {
            Some(limit) if self.sets.len() >= limit => ControlFlow::Break(()),
            _ => ControlFlow::Continue(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_graph_sizes_constraint_sets() {
        let g = Graph::new(5).unwrap();
        let inst = DominationInstance::from_graph(g);
        assert_eq!(inst.force_in.capacity(), 5);
        assert_eq!(inst.force_out.capacity(), 5);
        assert!(inst.force_in.is_empty());
    }

    #[test]
    fn collect_proxy_reports_real_indices_and_limits() {
        let mut g = Graph::new(3).unwrap();
        g.add_edge(0, 1);
        let g = g.renumber(&[2, 1, 0]); // real indices now reversed
        let inst = DominationInstance::from_graph(g);

        let mut proxy = CollectProxy {
            limit: Some(1),
            ..Default::default()
        };
        let mut set = VertexSet::new(3);
        set.add(0);
        let flow = proxy.process_set(&inst, &set);
        assert_eq!(proxy.sets, vec![vec![2]]);
        assert!(flow.is_break());
    }
}
