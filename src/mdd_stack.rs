//! Maximum-dominator-degree tracking with an undo log.
//!
//! For an undominated vertex `u`, `mdd(u)` is the largest domination degree
//! any single candidate in N[u] still offers: an upper bound on how much
//! one future dominator can do for `u`. Dominated vertices carry
//! [`INVALID_MDD`]. A histogram `counts[k]` over the live values and the
//! running `max_mdd` feed the
//! [`min_vertices_needed`](MddStack::min_vertices_needed) lower bound.
//!
//! Every `add_dominator`/`exclude_dominator` event pushes a *row*: the set
//! of `(vertex, previous mdd)` pairs it overwrote. Rows live in one flat
//! entry vector with a stack of `(dominator, start)` marks, so matching
//! undo calls restore the previous values exactly; the whole structure is
//! bitwise identical after a balanced push/pop pair. Row storage for the
//! worst case (n rows of n entries) is reserved up front, once per solve.
//!
//! The stack does not own its collaborators; the graph, per-vertex
//! candidate sets, the undominated set, and the undominated degree queue
//! are borrowed per call.

use crate::degree_pq::DegreePqLight;
use crate::graph::Graph;
use crate::types::{VertIndex, INVALID_MDD, INVALID_VERTEX, MAX_VERTS};
use crate::vertex_set::VertexSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    vertex: VertIndex,
    old_mdd: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MddStack {
    mdd: Vec<usize>,
    /// `counts[k]` = number of undominated vertices with mdd `k`.
    counts: Vec<usize>,
    max_mdd: usize,
    entries: Vec<Entry>,
    /// One mark per open row: the dominator it belongs to and where its
    /// entries start in `entries`.
    rows: Vec<(VertIndex, usize)>,
}

impl MddStack {
    /// Computes initial mdd values for every currently undominated vertex.
    /// Call after the degree queue is built and before any constraint is
    /// applied.
    pub fn new(
        g: &Graph,
        candidate_neighbours: &[VertexSet],
        undominated: &VertexSet,
        undominated_dpq: &DegreePqLight,
    ) -> Self {
        let n = g.n();
        let mut stack = Self {
            mdd: vec![INVALID_MDD; n],
            counts: vec![0; n + 1],
            max_mdd: 0,
            entries: Vec::with_capacity(n * n),
            rows: Vec::with_capacity(n),
        };
        for v in undominated.iter() {
            let m = recompute_mdd(v, candidate_neighbours, undominated_dpq);
            stack.mdd[v] = m;
            stack.counts[m] += 1;
        }
        for k in 0..=n {
            if stack.counts[k] > 0 {
                stack.max_mdd = k;
            }
        }
        stack
    }

    #[inline]
    pub fn get_mdd(&self, v: VertIndex) -> usize {
        self.mdd[v]
    }

    #[inline]
    pub fn get_max_mdd(&self) -> usize {
        self.max_mdd
    }

    /// First undominated vertex (in set order) whose mdd equals `max_mdd`.
    pub fn get_max_mdd_vertex(&self, undominated: &VertexSet) -> VertIndex {
        for v in undominated.iter() {
            if self.mdd[v] == self.max_mdd {
                return v;
            }
        }
        debug_assert!(false, "max_mdd out of sync with the undominated set");
        INVALID_VERTEX
    }

    /// Undominated vertex with the smallest mdd (first such in set order).
    pub fn get_min_mdd_vertex(&self, undominated: &VertexSet) -> VertIndex {
        let mut best = INVALID_VERTEX;
        let mut best_mdd = MAX_VERTS;
        for v in undominated.iter() {
            if self.mdd[v] < best_mdd {
                best_mdd = self.mdd[v];
                best = v;
            }
        }
        best
    }

    /// Records the effect of `v` joining the dominating set. Must run after
    /// the driver has marked all of N[v] covered: the newly covered
    /// neighbours drop out of the histogram, and every remaining
    /// undominated vertex is recomputed outright (candidate degrees up to
    /// four hops from `v` may have moved, so a local walk would not be any
    /// cheaper than the full sweep over the typically small undominated
    /// set).
    pub fn add_dominator(
        &mut self,
        v: VertIndex,
        g: &Graph,
        candidate_neighbours: &[VertexSet],
        undominated: &VertexSet,
        undominated_dpq: &DegreePqLight,
    ) {
        self.rows.push((v, self.entries.len()));

        for &u in g.neighbours(v) {
            let old = self.mdd[u];
            if old == INVALID_MDD {
                continue;
            }
            self.entries.push(Entry { vertex: u, old_mdd: old });
            self.mdd[u] = INVALID_MDD;
            self.counts[old] -= 1;
        }

        for u in undominated.iter() {
            let old = self.mdd[u];
            debug_assert_ne!(old, INVALID_MDD);
            let new = recompute_mdd(u, candidate_neighbours, undominated_dpq);
            if old == new {
                continue;
            }
            debug_assert!(new < old);
            self.entries.push(Entry { vertex: u, old_mdd: old });
            self.mdd[u] = new;
            self.counts[old] -= 1;
            self.counts[new] += 1;
        }

        while self.max_mdd > 0 && self.counts[self.max_mdd] == 0 {
            self.max_mdd -= 1;
        }
    }

    /// Undoes the matching [`add_dominator`](Self::add_dominator). Call
    /// before any neighbour of `v` is marked uncovered again.
    pub fn remove_dominator(&mut self, v: VertIndex) {
        self.pop_row(v);
    }

    /// Records the effect of forbidding `v` (which is not in the set); call
    /// just after `v` stops being a candidate. Only undominated neighbours
    /// of `v` can lose mdd, so the sweep is local.
    pub fn exclude_dominator(
        &mut self,
        v: VertIndex,
        g: &Graph,
        candidate_neighbours: &[VertexSet],
        undominated: &VertexSet,
        undominated_dpq: &DegreePqLight,
    ) {
        self.rows.push((v, self.entries.len()));

        for &u in g.neighbours(v) {
            if !undominated.contains(u) {
                continue;
            }
            let old = self.mdd[u];
            let new = recompute_mdd(u, candidate_neighbours, undominated_dpq);
            if new != old {
                debug_assert!(new < old);
                self.entries.push(Entry { vertex: u, old_mdd: old });
                self.mdd[u] = new;
                self.counts[old] -= 1;
                self.counts[new] += 1;
            }
        }

        while self.max_mdd > 0 && self.counts[self.max_mdd] == 0 {
            self.max_mdd -= 1;
        }
    }

    /// Undoes the matching [`exclude_dominator`](Self::exclude_dominator);
    /// call just before `v` becomes a candidate again.
    pub fn unexclude_dominator(&mut self, v: VertIndex) {
        self.pop_row(v);
    }

    fn pop_row(&mut self, dominator: VertIndex) {
        let (v, start) = self.rows.pop().expect("row stack underflow");
        assert_eq!(v, dominator, "rows popped out of order");

        let mut highest = 0;
        while self.entries.len() > start {
            let Entry { vertex, old_mdd } = self.entries.pop().unwrap();
            let current = self.mdd[vertex];
            self.mdd[vertex] = old_mdd;
            if current != INVALID_MDD {
                self.counts[current] -= 1;
            }
            self.counts[old_mdd] += 1;
            highest = highest.max(old_mdd);
        }
        if highest > self.max_mdd {
            self.max_mdd = highest;
        }
    }

    /// Lower bound on how many more dominators the remaining undominated
    /// vertices require. A vertex with mdd 0 cannot be covered at all, so
    /// the bound is [`MAX_VERTS`] (infinity). Otherwise a dominator of mdd
    /// `k` is credited with knocking out `k` vertices; the greedy walk
    /// carries negative remainders between histogram cells, which keeps
    /// the bound admissible and the per-node counts stable.
    pub fn min_vertices_needed(&self) -> usize {
        if self.counts[0] > 0 {
            return MAX_VERTS;
        }
        let mut needed = 0;
        let mut carry: isize = 0;
        for k in 0..=self.max_mdd {
            carry += self.counts[k] as isize;
            while carry > 0 {
                carry -= k as isize;
                needed += 1;
            }
        }
        needed
    }
}

fn recompute_mdd(
    v: VertIndex,
    candidate_neighbours: &[VertexSet],
    undominated_dpq: &DegreePqLight,
) -> usize {
    let mut new_mdd = 0;
    for u in candidate_neighbours[v].iter() {
        new_mdd = new_mdd.max(undominated_dpq.ranked_degree(u));
    }
    new_mdd
}
