//! Maximum-dominator-degree branch-and-bound driver.
//!
//! Keeps, besides the undominated degree queue, a per-vertex set of
//! candidate closed-neighbours and the [`MddStack`], whose
//! `min_vertices_needed` bound is usually much stronger than the plain
//! cover count. Bound violations come in two strengths: *fatal* ones hold
//! until the current branch unwinds (not enough unfixed vertices left), so
//! a fatal child result stops the parent's loop exactly like a trapped
//! vertex; *tight* ones may be caused by the tentative include currently
//! on the stack and only prune the node itself.

use std::mem;
use std::ops::ControlFlow;

use crate::degree_pq::DegreePqLight;
use crate::error::{DomsetError, Result};
use crate::instance::{DominationInstance, OutputProxy, Solver};
use crate::mdd_stack::MddStack;
use crate::types::{VertIndex, INVALID_VERTEX, MAX_VERTS};
use crate::vertex_set::VertexSet;

use super::branching::BranchScratch;
use super::{NodeCheck, PivotRule, SearchFrame, SolverPolicy, Unwind};

pub struct MddSolver {
    policy: SolverPolicy,
    pub frame: SearchFrame,
}

impl MddSolver {
    pub fn new(policy: SolverPolicy, frame: SearchFrame) -> Self {
        Self { policy, frame }
    }
}

/// Result of one search node, threaded up so the caller can distinguish a
/// fatal bound from an exhausted subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Descent {
    Done,
    Tight,
    Fatal,
}

impl Solver for MddSolver {
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

        let mut candidate_neighbours = Vec::with_capacity(n);
        for v in 0..n {
            let mut s = VertexSet::new(n);
            for &u in inst.graph.neighbours(v) {
                s.add(u);
            }
            candidate_neighbours.push(s);
        }
        let undominated = VertexSet::full(n, n);
        let undominated_dpq = DegreePqLight::new(&inst.graph);
        let mdd = MddStack::new(&inst.graph, &candidate_neighbours, &undominated, &undominated_dpq);

        let mut search = MddSearch {
            inst,
            output: &mut *output,
            policy: self.policy,
            frame: &mut self.frame,
            d: VertexSet::new(n),
            b,
            undominated_dpq,
            candidate_neighbours,
            undominated,
            mdd,
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
            search.mdd.add_dominator(
                v,
                &inst.graph,
                &search.candidate_neighbours,
                &search.undominated,
                &search.undominated_dpq,
            );
        }
        for v in inst.force_out.iter() {
            search.remove_candidate(v);
            search.mdd.exclude_dominator(
                v,
                &inst.graph,
                &search.candidate_neighbours,
                &search.undominated,
                &search.undominated_dpq,
            );
        }

        search.output.initialize(inst);
        match search.search::<true>() {
            Ok(_) | Err(Unwind::Terminated) => {}
            Err(Unwind::Inconsistent(msg)) => return Err(DomsetError::Inconsistent(msg)),
        }
        drop(search);
        output.finalize(inst);

        self.frame.log_depth_histogram();
        Ok(())
    }
}

struct MddSearch<'a> {
    inst: &'a DominationInstance,
    output: &'a mut dyn OutputProxy,
    policy: SolverPolicy,
    frame: &'a mut SearchFrame,
    d: VertexSet,
    b: VertexSet,
    undominated_dpq: DegreePqLight,
    /// For each vertex, the candidates remaining in its closed
    /// neighbourhood.
    candidate_neighbours: Vec<VertexSet>,
    undominated: VertexSet,
    mdd: MddStack,
    covered: Vec<u32>,
    fixed: Vec<bool>,
    total_covered: usize,
    total_fixed: usize,
    scratch: Vec<BranchScratch>,
}

impl MddSearch<'_> {
    fn search<const CHECK: bool>(&mut self) -> std::result::Result<Descent, Unwind> {
        let depth = self.d.len();
        match self.frame.report_node::<CHECK>(depth) {
            NodeCheck::Reject => return Ok(Descent::Done),
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
            return Ok(Descent::Done);
        }

        match self.evaluate_bounds() {
            Descent::Done => {}
            verdict => return Ok(verdict),
        }

        let pivot = self.choose_next_vertex();
        debug_assert_ne!(pivot, INVALID_VERTEX);

        let mut scratch = mem::take(&mut self.scratch[depth]);
        scratch.rank_neighbours(
            self.candidate_neighbours[pivot].iter(),
            &self.undominated_dpq,
            self.policy.order,
        );

        let mut branched = 0;
        let mut result = Ok(Descent::Done);
        for idx in 0..scratch.ordered.len() {
            let j = scratch.ordered[idx];
            branched = idx + 1;
            match self.branch_on::<CHECK>(j) {
                Ok(forced) => {
                    if self.policy.force_stop_on_trapped && forced {
                        break;
                    }
                    if self.policy.recheck_bounds_in_loop
                        && self.evaluate_bounds() != Descent::Done
                    {
                        break;
                    }
                }
                Err(unwind) => {
                    result = Err(unwind);
                    break;
                }
            }
        }

        for q in (0..branched).rev() {
            let j = scratch.ordered[q];
            self.mdd.unexclude_dominator(j);
            self.add_candidate(j);
        }
        self.scratch[depth] = scratch;
        result
    }

    /// Includes `j`, recurses, restores, and leaves `j` excluded (the
    /// caller's loop must not retry it; the matching unexclude happens in
    /// the caller's unfix pass). A fatal bound below counts as "forced":
    /// it cannot clear until this loop unwinds.
    fn branch_on<const CHECK: bool>(&mut self, j: VertIndex) -> std::result::Result<bool, Unwind> {
        let mut forced = self.remove_candidate(j);
        self.d.add(j);
        let inst = self.inst;
        for &k in inst.graph.neighbours(j) {
            self.dominate(k);
        }
        self.mdd.add_dominator(
            j,
            &inst.graph,
            &self.candidate_neighbours,
            &self.undominated,
            &self.undominated_dpq,
        );

        let result = self.search::<CHECK>();
        if let Ok(Descent::Fatal) = result {
            forced = true;
        }

        self.mdd.remove_dominator(j);
        for &k in inst.graph.neighbours(j).iter().rev() {
            self.undominate(k);
        }
        self.d.remove_pop(j);
        self.mdd.exclude_dominator(
            j,
            &inst.graph,
            &self.candidate_neighbours,
            &self.undominated,
            &self.undominated_dpq,
        );

        result.map(|_| forced)
    }

    fn emit(&mut self) -> std::result::Result<(), Unwind> {
        match self.output.process_set(self.inst, &self.d) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => Err(Unwind::Terminated),
        }
    }

    fn evaluate_bounds(&self) -> Descent {
        let n = self.inst.graph.n();
        let need = self.mdd.min_vertices_needed();
        if need >= MAX_VERTS {
            return Descent::Fatal;
        }
        let slack = n - self.total_fixed + 1;
        if slack < need {
            return Descent::Fatal;
        }
        if slack == need {
            return Descent::Tight;
        }
        let projected = self.d.len() + need;
        if self.policy.generate_all {
            if projected > self.frame.upper {
                return Descent::Tight;
            }
        } else if projected >= self.b.len() {
            return Descent::Tight;
        }
        Descent::Done
    }

    fn choose_next_vertex(&self) -> VertIndex {
        match self.policy.pivot {
            PivotRule::MinMdd => self.mdd.get_min_mdd_vertex(&self.undominated),
            PivotRule::MaxMdd => self.mdd.get_max_mdd_vertex(&self.undominated),
            PivotRule::MinCandidateDegree => {
                let mut best = INVALID_VERTEX;
                let mut best_cd = MAX_VERTS;
                for v in self.undominated.iter() {
                    let cd = self.candidate_neighbours[v].len();
                    if cd < best_cd {
                        best_cd = cd;
                        best = v;
                    }
                }
                best
            }
            PivotRule::MaxCandidateDegree => {
                let mut best = INVALID_VERTEX;
                let mut best_cd = 0;
                for v in self.undominated.iter() {
                    let cd = self.candidate_neighbours[v].len();
                    if cd > best_cd {
                        best_cd = cd;
                        best = v;
                    }
                }
                best
            }
        }
    }

    /// Fixes `v` and withdraws it from every candidate-neighbour set it
    /// appears in. Returns true if some uncovered vertex just lost its last
    /// candidate.
    fn remove_candidate(&mut self, v: VertIndex) -> bool {
        debug_assert!(!self.fixed[v]);
        self.fixed[v] = true;
        self.total_fixed += 1;
        self.undominated_dpq.remove_candidate(v);
        let inst = self.inst;
        let mut forced = false;
        for &u in inst.graph.neighbours(v) {
            self.candidate_neighbours[u].remove(v);
            if self.candidate_neighbours[u].is_empty() && self.covered[u] == 0 {
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
        let inst = self.inst;
        for &u in inst.graph.neighbours(v) {
            self.candidate_neighbours[u].add(v);
        }
    }

    fn dominate(&mut self, v: VertIndex) {
        self.covered[v] += 1;
        if self.covered[v] > 1 {
            return;
        }
        self.total_covered += 1;
        self.undominated_dpq.dominate(v);
        self.undominated.remove(v);
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
        self.undominated.add(v);
        let inst = self.inst;
        for &u in inst.graph.neighbours(v) {
            self.undominated_dpq.increment(u);
        }
    }
}
