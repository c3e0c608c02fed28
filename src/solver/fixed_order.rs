//! Fixed-order branch-and-bound driver.
//!
//! The baseline driver: no degree queues, no incremental bounds. It always
//! branches on the lowest-numbered uncovered vertex, ordering candidates
//! as the pivot itself, then its uncovered unfixed neighbours, then its
//! covered unfixed neighbours. The lower bound divides the remaining
//! uncovered count by one global `max_deg + 1`.

use std::mem;
use std::ops::ControlFlow;

use crate::error::{DomsetError, Result};
use crate::instance::{DominationInstance, OutputProxy, Solver};
use crate::types::VertIndex;
use crate::vertex_set::VertexSet;

use super::branching::BranchScratch;
use super::{NodeCheck, SearchFrame, Unwind};

pub struct FixedOrderSolver {
    generate_all: bool,
    pub frame: SearchFrame,
}

impl FixedOrderSolver {
    pub fn new(generate_all: bool, frame: SearchFrame) -> Self {
        Self { generate_all, frame }
    }
}

impl Solver for FixedOrderSolver {
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
        b.reset_full(n);
        if !self.generate_all && self.frame.upper < n {
            b.reset_full(self.frame.upper + 1);
        }

        let mut search = FixedOrderSearch {
            inst,
            output: &mut *output,
            generate_all: self.generate_all,
            frame: &mut self.frame,
            d: VertexSet::new(n),
            b,
            // Degrees include the self-loops just added. The bound divides
            // by max_deg + 1, so it stays admissible, only looser; it is
            // never tightened as the search fixes vertices.
            max_deg: inst.graph.max_degree(),
            covered: vec![0; n],
            fixed: vec![false; n],
            total_covered: 0,
            total_fixed: 0,
            scratch: (0..=n).map(|_| BranchScratch::default()).collect(),
        };

        for v in inst.force_in.iter() {
            search.d.add(v);
            for &u in inst.graph.neighbours(v) {
                if search.covered[u] == 0 {
                    search.total_covered += 1;
                }
                search.covered[u] += 1;
            }
        }
        for v in inst.force_out.iter() {
            search.fixed[v] = true;
            search.total_fixed += 1;
        }

        search.output.initialize(inst);
        match search.search::<true>(0) {
            Ok(()) | Err(Unwind::Terminated) => {}
            Err(Unwind::Inconsistent(msg)) => return Err(DomsetError::Inconsistent(msg)),
        }
        drop(search);
        output.finalize(inst);

        self.frame.log_depth_histogram();
        Ok(())
    }
}

struct FixedOrderSearch<'a> {
    inst: &'a DominationInstance,
    output: &'a mut dyn OutputProxy,
    generate_all: bool,
    frame: &'a mut SearchFrame,
    d: VertexSet,
    b: VertexSet,
    max_deg: usize,
    covered: Vec<u32>,
    fixed: Vec<bool>,
    total_covered: usize,
    total_fixed: usize,
    scratch: Vec<BranchScratch>,
}

impl FixedOrderSearch<'_> {
    /// `from` is the lowest vertex that might still be uncovered; all
    /// vertices below it are covered for the lifetime of this node.
    fn search<const CHECK: bool>(&mut self, from: VertIndex) -> std::result::Result<(), Unwind> {
        let depth = self.d.len();
        match self.frame.report_node::<CHECK>(depth) {
            NodeCheck::Reject => return Ok(()),
            NodeCheck::Detach => {
                self.frame.unreport_node(depth);
                return self.search::<false>(from);
            }
            NodeCheck::Descend => {}
        }

        let n = self.inst.graph.n();
        if self.total_covered == n {
            if self.generate_all {
                if depth >= self.frame.lower && depth <= self.frame.upper {
                    self.emit()?;
                }
            } else if depth >= self.frame.lower && depth < self.b.len() {
                self.b.clone_from(&self.d);
                self.emit()?;
            }
            return Ok(());
        }

        let mut pivot = from;
        while pivot < n && self.covered[pivot] > 0 {
            pivot += 1;
        }
        if pivot >= n {
            return Err(Unwind::Inconsistent(
                "all vertices covered but the covered total disagrees".to_string(),
            ));
        }

        let need = (n - self.total_covered + self.max_deg) / (self.max_deg + 1);
        let projected = depth + need;
        if self.generate_all {
            if projected > self.frame.upper || n - self.total_fixed < need {
                return Ok(());
            }
        } else if projected >= self.b.len() || n - self.total_fixed < need {
            return Ok(());
        }

        let mut scratch = mem::take(&mut self.scratch[depth]);
        scratch.ordered.clear();
        {
            let inst = self.inst;
            if !self.fixed[pivot] {
                scratch.ordered.push(pivot);
            }
            for &j in inst.graph.neighbours(pivot) {
                if !self.fixed[j] && self.covered[j] == 0 && j != pivot {
                    scratch.ordered.push(j);
                }
            }
            for &j in inst.graph.neighbours(pivot) {
                if !self.fixed[j] && self.covered[j] > 0 {
                    scratch.ordered.push(j);
                }
            }
        }

        let mut branched = 0;
        let mut result = Ok(());
        for idx in 0..scratch.ordered.len() {
            let j = scratch.ordered[idx];
            branched = idx + 1;
            if let Err(unwind) = self.branch_on::<CHECK>(pivot, j) {
                result = Err(unwind);
                break;
            }
        }

        for q in (0..branched).rev() {
            let j = scratch.ordered[q];
            debug_assert!(self.fixed[j]);
            self.fixed[j] = false;
            self.total_fixed -= 1;
        }
        self.scratch[depth] = scratch;
        result
    }

    fn branch_on<const CHECK: bool>(
        &mut self,
        pivot: VertIndex,
        j: VertIndex,
    ) -> std::result::Result<(), Unwind> {
        self.fixed[j] = true;
        self.total_fixed += 1;
        self.d.add(j);

        let inst = self.inst;
        for &k in inst.graph.neighbours(j) {
            if self.covered[k] == 0 {
                self.total_covered += 1;
            }
            self.covered[k] += 1;
        }
        debug_assert!(self.covered[pivot] > 0);

        let result = self.search::<CHECK>(pivot + 1);

        for &k in inst.graph.neighbours(j) {
            self.covered[k] -= 1;
            if self.covered[k] == 0 {
                self.total_covered -= 1;
            }
        }
        self.d.remove_pop(j);
        result
    }

    fn emit(&mut self) -> std::result::Result<(), Unwind> {
        match self.output.process_set(self.inst, &self.d) {
            ControlFlow::Continue(()) => Ok(()),
            ControlFlow::Break(()) => Err(Unwind::Terminated),
        }
    }
}
