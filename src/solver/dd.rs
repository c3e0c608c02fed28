//! Domination-degree branch-and-bound driver.
//!
//! Runs two degree queues in lockstep: the light queue ranks every vertex
//! by how many undominated vertices its closed neighbourhood still holds
//! (domination degree, used for the cover lower bound and branch ordering),
//! and the heavy queue ranks by how many candidates the neighbourhood still
//! holds (candidate degree, used for pivot selection among the undominated
//! vertices).

use std::mem;
use std::ops::ControlFlow;

use crate::degree_pq::{DegreePqHeavy, DegreePqLight};
use crate::error::{DomsetError, Result};
use crate::instance::{DominationInstance, OutputProxy, Solver};
use crate::types::{VertIndex, INVALID_VERTEX};
use crate::vertex_set::VertexSet;

use super::branching::BranchScratch;
use super::{NodeCheck, PivotRule, SearchFrame, SolverPolicy, Unwind};

pub struct DdSolver {
    policy: SolverPolicy,
    pub frame: SearchFrame,
}

impl DdSolver {
    /// The DD driver pivots through the candidate degree queue; only the
    /// candidate-degree pivot rules apply.
    pub fn new(policy: SolverPolicy, frame: SearchFrame) -> Self {
        assert!(
            matches!(
                policy.pivot,
                PivotRule::MinCandidateDegree | PivotRule::MaxCandidateDegree
            ),
            "DD driver supports candidate-degree pivot rules only"
        );
        Self { policy, frame }
    }
}

impl Solver for DdSolver {
    fn solve(
        &mut self,
        inst: &mut DominationInstance,
        output: &mut dyn OutputProxy,
    ) -> Result<()> {
        inst.graph.add_self_loops();
        inst.graph.sort_neighbours_descending();
        let inst: &DominationInstance = inst;

        for v in inst.force_in.iter() {
            if inst.force_out.contains(v) {
                return Err(DomsetError::Config(format!(
                    "vertex {v} is both forced in and forced out"
                )));
            }
        }

        let n = inst.graph.n();
        self.frame.reset(n);

        let mut b = VertexSet::new(n);
        b.reset_full(n.saturating_sub(1));
        if !self.policy.generate_all && self.frame.upper < n {
            b.reset_full(self.frame.upper + 1);
        }

        let mut search = DdSearch {
            inst,
            output: &mut *output,
            policy: self.policy,
            frame: &mut self.frame,
            d: VertexSet::new(n),
            b,
            undominated_dpq: DegreePqLight::new(&inst.graph),
            candidate_dpq: DegreePqHeavy::new(&inst.graph),
            covered: vec![0; n],
            fixed: vec![false; n],
            total_covered: 0,
            total_fixed: 0,
            scratch: (0..=n).map(|_| BranchScratch::default()).collect(),
        };

        for v in inst.force_in.iter() {
            search.remove_candidate(v);
            search.d.add(v);
            for &u in inst.graph.neighbours(v) {
                search.dominate(u);
            }
        }
        for v in inst.force_out.iter() {
            search.remove_candidate(v);
        }

        search.output.initialize(inst);
        match search.search::<true>() {
            Ok(()) | Err(Unwind::Terminated) => {}
            Err(Unwind::Inconsistent(msg)) => return Err(DomsetError::Inconsistent(msg)),
        }
        drop(search);
        output.finalize(inst);

        self.frame.log_depth_histogram();
        Ok(())
    }
}

struct DdSearch<'a> {
    inst: &'a DominationInstance,
    output: &'a mut dyn OutputProxy,
    policy: SolverPolicy,
    frame: &'a mut SearchFrame,
    d: VertexSet,
    b: VertexSet,
    undominated_dpq: DegreePqLight,
    candidate_dpq: DegreePqHeavy,
    covered: Vec<u32>,
    fixed: Vec<bool>,
    total_covered: usize,
    total_fixed: usize,
    scratch: Vec<BranchScratch>,
}

impl DdSearch<'_> {
    fn search<const CHECK: bool>(&mut self) -> std::result::Result<(), Unwind> {
        let depth = self.d.len();
        match self.frame.report_node::<CHECK>(depth) {
            NodeCheck::Reject => return Ok(()),
            NodeCheck::Detach => {
                self.frame.unreport_node(depth);
                return self.search::<false>();
            }
            NodeCheck::Descend => {}
        }

        let n = self.inst.graph.n();
        if self.total_covered == n {
            if self.policy.generate_all {
                if depth >= self.frame.lower && depth <= self.frame.upper {
                    self.emit()?;
                }
            } else if depth >= self.frame.lower && depth < self.b.len() {
                self.b.clone_from(&self.d);
                self.emit()?;
            }
            return Ok(());
        }

        let pivot = match self.policy.pivot {
            PivotRule::MinCandidateDegree => self.candidate_dpq.get_min_undominated_vertex(),
            PivotRule::MaxCandidateDegree => self.candidate_dpq.get_max_undominated_vertex(),
            PivotRule::MinMdd | PivotRule::MaxMdd => unreachable!(),
        };
        if pivot == INVALID_VERTEX {
            return Ok(());
        }
        debug_assert!(self.covered[pivot] == 0 && pivot < n);

        if !self.policy.recheck_bounds_in_loop && !self.bounds_satisfied() {
            return Ok(());
        }

        let mut scratch = mem::take(&mut self.scratch[depth]);
        {
            let inst = self.inst;
            scratch.rank_neighbours(
                inst.graph
                    .neighbours(pivot)
                    .iter()
                    .copied()
                    .filter(|&u| !self.fixed[u]),
                &self.undominated_dpq,
                self.policy.order,
            );
        }

        let mut branched = 0;
        let mut result = Ok(());
        for idx in 0..scratch.ordered.len() {
            if self.policy.recheck_bounds_in_loop && !self.bounds_satisfied() {
                break;
            }
            let j = scratch.ordered[idx];
            branched = idx + 1;
            match self.branch_on::<CHECK>(j) {
                Ok(forced) => {
                    if self.policy.force_stop_on_trapped && forced {
                        break;
                    }
                }
                Err(unwind) => {
                    result = Err(unwind);
                    break;
                }
            }
        }

        // Deliberate: branch vertices are unfixed in the same order they
        // were fixed, not in reverse. The per-node counts depend on it.
        for q in 0..branched {
            self.add_candidate(scratch.ordered[q]);
        }
        self.scratch[depth] = scratch;
        result
    }

    /// Includes `j`, recurses, and restores the pre-include state. Returns
    /// whether the include was mandatory (some undominated vertex had no
    /// other candidate left). `j` stays fixed: the remainder of the caller's
    /// loop treats it as forbidden.
    fn branch_on<const CHECK: bool>(&mut self, j: VertIndex) -> std::result::Result<bool, Unwind> {
        let forced = self.remove_candidate(j);
        self.d.add(j);
        let inst = self.inst;
        for &k in inst.graph.neighbours(j) {
            self.dominate(k);
        }

        let result = self.search::<CHECK>();

        for &k in inst.graph.neighbours(j).iter().rev() {
            self.undominate(k);
        }
        self.d.remove_pop(j);
        result.map(|()| forced)
    }

    fn emit(&mut self) -> std::result::Result<(), Unwind> {
        match self.output.process_set(self.inst, &self.d) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => Err(Unwind::Terminated),
        }
    }

    fn bounds_satisfied(&self) -> bool {
        let n = self.inst.graph.n();
        let need = self
            .undominated_dpq
            .count_minimum_to_dominate(n - self.total_covered);
        let projected = self.d.len() + need;
        let enough_candidates = n - self.total_fixed >= need;
        if self.policy.generate_all {
            projected <= self.frame.upper && enough_candidates
        } else {
            projected < self.b.len() && enough_candidates
        }
    }

    /// Fixes `v`. Returns true if some undominated neighbour of `v` just
    /// lost its last candidate, i.e. `v` itself must be in the set.
    fn remove_candidate(&mut self, v: VertIndex) -> bool {
        debug_assert!(!self.fixed[v]);
        self.fixed[v] = true;
        self.total_fixed += 1;
        self.undominated_dpq.remove_candidate(v);
        self.candidate_dpq.remove_candidate(v);
        let inst = self.inst;
        let mut forced = false;
        for &u in inst.graph.neighbours(v) {
            if self.candidate_dpq.decrement(u) == 0 && self.covered[u] == 0 {
                forced = true;
            }
        }
        forced
    }

    fn add_candidate(&mut self, v: VertIndex) {
        debug_assert!(self.fixed[v]);
        self.fixed[v] = false;
        self.total_fixed -= 1;
        self.undominated_dpq.add_candidate(v);
        self.candidate_dpq.add_candidate(v);
        let inst = self.inst;
        for &u in inst.graph.neighbours(v) {
            self.candidate_dpq.increment(u);
        }
    }

    fn dominate(&mut self, v: VertIndex) {
        self.covered[v] += 1;
        if self.covered[v] > 1 {
            return;
        }
        self.total_covered += 1;
        self.undominated_dpq.dominate(v);
        self.candidate_dpq.dominate(v);
        let inst = self.inst;
        for &u in inst.graph.neighbours(v) {
            self.undominated_dpq.decrement(u);
        }
    }

    fn undominate(&mut self, v: VertIndex) {
        self.covered[v] -= 1;
        if self.covered[v] > 0 {
            return;
        }
        self.total_covered -= 1;
        self.undominated_dpq.undominate(v);
        self.candidate_dpq.undominate(v);
        let inst = self.inst;
        for &u in inst.graph.neighbours(v) {
            self.undominated_dpq.increment(u);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::CollectProxy;
    use crate::solver::BranchOrder;
    use crate::test_graphs::{complete, cycle, path};

    fn optimizing() -> DdSolver {
        DdSolver::new(
            SolverPolicy {
                pivot: PivotRule::MinCandidateDegree,
                order: BranchOrder::Ascending,
                force_stop_on_trapped: false,
                recheck_bounds_in_loop: false,
                generate_all: false,
            },
            SearchFrame::default(),
        )
    }

    fn generating() -> DdSolver {
        DdSolver::new(
            SolverPolicy {
                pivot: PivotRule::MinCandidateDegree,
                order: BranchOrder::Ascending,
                force_stop_on_trapped: false,
                recheck_bounds_in_loop: false,
                generate_all: true,
            },
            SearchFrame::default(),
        )
    }

    fn best_size(solver: &mut DdSolver, inst: &mut DominationInstance) -> usize {
        let mut proxy = CollectProxy::new();
        solver.solve(inst, &mut proxy).unwrap();
        proxy.sets.last().expect("no certificate emitted").len()
    }

    #[test]
    fn complete_graph_needs_one_vertex() {
        let mut inst = DominationInstance::from_graph(complete(4));
        assert_eq!(best_size(&mut optimizing(), &mut inst), 1);
    }

    #[test]
    fn path_of_five_needs_two() {
        let mut inst = DominationInstance::from_graph(path(5));
        assert_eq!(best_size(&mut optimizing(), &mut inst), 2);
    }

    #[test]
    fn cycle_of_six_needs_two() {
        let mut inst = DominationInstance::from_graph(cycle(6));
        assert_eq!(best_size(&mut optimizing(), &mut inst), 2);
    }

    #[test]
    fn improvements_shrink_strictly() {
        let mut inst = DominationInstance::from_graph(cycle(9));
        let mut proxy = CollectProxy::new();
        optimizing().solve(&mut inst, &mut proxy).unwrap();
        let sizes: Vec<_> = proxy.sets.iter().map(Vec::len).collect();
        assert!(sizes.windows(2).all(|w| w[1] < w[0]));
        assert_eq!(*sizes.last().unwrap(), 3);
    }

    #[test]
    fn emitted_sets_dominate() {
        let mut inst = DominationInstance::from_graph(cycle(6));
        let mut proxy = CollectProxy::new();
        generating().solve(&mut inst, &mut proxy).unwrap();
        assert!(!proxy.sets.is_empty());
        let g = &inst.graph;
        for set in &proxy.sets {
            for v in 0..g.n() {
                assert!(
                    g.neighbours(v).iter().any(|u| set.contains(u)),
                    "vertex {v} undominated by {set:?}"
                );
            }
        }
    }

    #[test]
    fn force_constraints_are_honoured() {
        let mut inst = DominationInstance::from_graph(cycle(6));
        inst.force_in.add(0);
        let mut proxy = CollectProxy::new();
        optimizing().solve(&mut inst, &mut proxy).unwrap();
        let best = proxy.sets.last().unwrap();
        assert_eq!(best.len(), 2);
        assert!(best.contains(&0));

        let mut inst = DominationInstance::from_graph(path(5));
        inst.force_out.add(1);
        inst.force_out.add(3);
        let mut proxy = CollectProxy::new();
        optimizing().solve(&mut inst, &mut proxy).unwrap();
        let best = proxy.sets.last().unwrap();
        assert_eq!(best, &vec![0, 2, 4]);
    }

    #[test]
    fn contradictory_constraints_rejected() {
        let mut inst = DominationInstance::from_graph(path(3));
        inst.force_in.add(1);
        inst.force_out.add(1);
        let mut proxy = CollectProxy::new();
        assert!(matches!(
            optimizing().solve(&mut inst, &mut proxy),
            Err(DomsetError::Config(_))
        ));
    }

    #[test]
    fn unsatisfiable_force_out_emits_nothing() {
        // Forbidding all of N[0] leaves vertex 0 uncoverable.
        let mut inst = DominationInstance::from_graph(path(3));
        inst.force_out.add(0);
        inst.force_out.add(1);
        let mut proxy = CollectProxy::new();
        optimizing().solve(&mut inst, &mut proxy).unwrap();
        assert!(proxy.sets.is_empty());
    }

    #[test]
    fn terminate_stops_after_first_certificate() {
        let mut inst = DominationInstance::from_graph(cycle(6));
        let mut proxy = CollectProxy {
            limit: Some(1),
            ..Default::default()
        };
        generating().solve(&mut inst, &mut proxy).unwrap();
        assert_eq!(proxy.sets.len(), 1);
    }

    #[test]
    fn generation_respects_size_window() {
        let mut solver = generating();
        solver.frame.upper = 2;
        solver.frame.lower = 2;
        let mut inst = DominationInstance::from_graph(path(4));
        let mut proxy = CollectProxy::new();
        solver.solve(&mut inst, &mut proxy).unwrap();
        assert!(!proxy.sets.is_empty());
        assert!(proxy.sets.iter().all(|s| s.len() == 2));
        // {1, 2} and {1, 3} and {0, 2} etc. are all here exactly once.
        let mut dedup = proxy.sets.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), proxy.sets.len());
    }

    #[test]
    fn empty_graph_generation_emits_empty_set() {
        let mut inst = DominationInstance::from_graph(crate::graph::Graph::new(0).unwrap());
        let mut proxy = CollectProxy::new();
        generating().solve(&mut inst, &mut proxy).unwrap();
        assert_eq!(proxy.sets, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn determinism_two_runs_identical() {
        let run = || {
            let mut inst = DominationInstance::from_graph(cycle(9));
            let mut proxy = CollectProxy::new();
            optimizing().solve(&mut inst, &mut proxy).unwrap();
            proxy.sets
        };
        assert_eq!(run(), run());
    }

    /// Branching on a vertex and unwinding must restore every observable
    /// piece of driver state, even though a whole subtree ran in between.
    #[test]
    fn branch_undo_restores_observable_state() {
        let mut inst = DominationInstance::from_graph(cycle(6));
        inst.graph.add_self_loops();
        inst.graph.sort_neighbours_descending();
        let inst = &inst;
        let n = inst.graph.n();

        let mut proxy = CollectProxy::new();
        let mut frame = SearchFrame::default();
        frame.reset(n);
        let mut search = DdSearch {
            inst,
            output: &mut proxy,
            policy: SolverPolicy {
                pivot: PivotRule::MinCandidateDegree,
                order: BranchOrder::Ascending,
                force_stop_on_trapped: false,
                recheck_bounds_in_loop: false,
                generate_all: false,
            },
            frame: &mut frame,
            d: VertexSet::new(n),
            b: VertexSet::full(n, n - 1),
            undominated_dpq: DegreePqLight::new(&inst.graph),
            candidate_dpq: DegreePqHeavy::new(&inst.graph),
            covered: vec![0; n],
            fixed: vec![false; n],
            total_covered: 0,
            total_fixed: 0,
            scratch: (0..=n).map(|_| BranchScratch::default()).collect(),
        };

        let snapshot = |s: &DdSearch| {
            (
                s.covered.clone(),
                s.fixed.clone(),
                s.total_covered,
                s.total_fixed,
                s.d.clone(),
                (0..n).map(|v| s.undominated_dpq.ranked_degree(v)).collect::<Vec<_>>(),
                (0..n).map(|v| s.candidate_dpq.ranked_degree(v)).collect::<Vec<_>>(),
                (0..n).map(|v| s.undominated_dpq.is_dominated(v)).collect::<Vec<_>>(),
                (0..n).map(|v| s.candidate_dpq.is_candidate(v)).collect::<Vec<_>>(),
            )
        };

        let before = snapshot(&search);
        search.branch_on::<false>(0).unwrap();
        search.add_candidate(0);
        assert_eq!(snapshot(&search), before);
        assert!(!proxy.sets.is_empty());
    }
}
