//! Bucketed degree priority queue with intrusive arena-index lists.
//!
//! Every vertex carries a mutable *rank-degree* `r(v)`: the number of
//! still-relevant vertices in its closed neighbourhood. Vertices with equal
//! rank share a bucket; the non-empty buckets form a doubly-linked list in
//! ascending rank order threaded through a sentinel bucket, so the minimum
//! and maximum rank are O(1) reads.
//!
//! # Layout
//!
//! Following the CUDD-style intrusive discipline, there are no node objects
//! and no pointers: both link structures are index arenas.
//!
//! ```text
//! buckets: [B0][B1][B2] ... [Bn][SENT]          (index == rank, SENT == n+1)
//!            └──────── next/prev: circular list of non-empty ranks ────────┘
//!
//! verts:   [v0 .. v(n-1) | s0 .. sn]            (s_d == list sentinel of B_d)
//!            └─ next/prev: per-bucket circular list of undominated verts ──┘
//! ```
//!
//! Each bucket records `count` (vertices at this rank), `unfixed` (how many
//! are still candidates) and, for the heavy variant, `undominated`
//! plus an intrusive list of its undominated vertices through the bucket's
//! sentinel slot `s_d`. Splicing a vertex in or out of that list is
//! branch-free.
//!
//! # Variants
//!
//! `HEAVY` is a const generic: [`DegreePqLight`] tracks ranks and counts
//! only, [`DegreePqHeavy`] additionally maintains the per-bucket
//! undominated lists needed for the O(1) min/max-undominated-vertex
//! queries. Both monomorphise; the light variant pays nothing for the
//! machinery it does not use.

use crate::graph::Graph;
use crate::types::{VertIndex, INFEASIBLE, INVALID_VERTEX};

#[derive(Debug, Clone, Copy, Default)]
struct Bucket {
    next: usize,
    prev: usize,
    /// Rank of this bucket; equals its index, except for the sentinel.
    deg: usize,
    count: usize,
    unfixed: usize,
    undominated: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct PqVert {
    next: usize,
    prev: usize,
    /// Current rank, which is also the index of the owning bucket.
    deg: usize,
    fixed: bool,
    dominated: bool,
}

/// See the module docs. `HEAVY` enables the per-bucket undominated lists.
#[derive(Debug, Clone)]
pub struct DegreePq<const HEAVY: bool> {
    n: usize,
    buckets: Vec<Bucket>,
    verts: Vec<PqVert>,
}

pub type DegreePqLight = DegreePq<false>;
pub type DegreePqHeavy = DegreePq<true>;

impl<const HEAVY: bool> DegreePq<HEAVY> {
    /// Builds the queue for `g`, seeding every vertex at rank 0 and then
    /// incrementing once per neighbour-list entry. Ranks therefore start
    /// equal to the current list lengths, i.e. closed-neighbourhood sizes
    /// once self-loops are installed.
    pub fn new(g: &Graph) -> Self {
        let n = g.n();
        let sent = n + 1;
        let mut buckets = vec![Bucket::default(); n + 2];
        for (i, b) in buckets.iter_mut().enumerate() {
            b.deg = i;
            b.next = i;
            b.prev = i;
        }
        buckets[sent].deg = INVALID_VERTEX;

        // Vertex slots 0..n, then one list sentinel per rank bucket.
        let mut verts = vec![PqVert::default(); 2 * n + 1];
        for s in n..2 * n + 1 {
            verts[s].next = s;
            verts[s].prev = s;
        }

        let mut pq = Self { n, buckets, verts };

        for v in 0..n {
            pq.verts[v].deg = 0;
            pq.splice_in(v);
        }
        pq.buckets[0].count = n;
        pq.buckets[0].unfixed = n;
        pq.buckets[0].undominated = n;
        pq.buckets[0].next = sent;
        pq.buckets[0].prev = sent;
        pq.buckets[sent].next = 0;
        pq.buckets[sent].prev = 0;

        for v in 0..n {
            for _ in 0..g.deg(v) {
                pq.increment(v);
            }
        }
        pq
    }

    #[inline]
    fn sentinel(&self) -> usize {
        self.n + 1
    }

    #[inline]
    fn head(&self) -> usize {
        self.buckets[self.sentinel()].next
    }

    #[inline]
    fn tail(&self) -> usize {
        self.buckets[self.sentinel()].prev
    }

    /// List sentinel slot of the rank-`deg` bucket in the vertex arena.
    #[inline]
    fn list_sentinel(&self, deg: usize) -> usize {
        self.n + deg
    }

    /// Appends `v` to the undominated list of its current bucket.
    #[inline]
    fn splice_in(&mut self, v: usize) {
        let s = self.list_sentinel(self.verts[v].deg);
        let prev = self.verts[s].prev;
        self.verts[v].next = s;
        self.verts[v].prev = prev;
        self.verts[prev].next = v;
        self.verts[s].prev = v;
    }

    /// Unlinks `v` from whatever undominated list holds it.
    #[inline]
    fn splice_out(&mut self, v: usize) {
        let next = self.verts[v].next;
        let prev = self.verts[v].prev;
        self.verts[next].prev = prev;
        self.verts[prev].next = next;
    }

    #[inline]
    pub fn ranked_degree(&self, v: VertIndex) -> usize {
        self.verts[v].deg
    }

    #[inline]
    pub fn is_candidate(&self, v: VertIndex) -> bool {
        !self.verts[v].fixed
    }

    #[inline]
    pub fn is_dominated(&self, v: VertIndex) -> bool {
        self.verts[v].dominated
    }

    /// Marks `v` as a candidate again. Precondition: `v` is fixed.
    pub fn add_candidate(&mut self, v: VertIndex) {
        debug_assert!(self.verts[v].fixed);
        let b = self.verts[v].deg;
        self.buckets[b].unfixed += 1;
        self.verts[v].fixed = false;
    }

    /// Fixes `v` (no longer a candidate). Precondition: `v` is unfixed.
    pub fn remove_candidate(&mut self, v: VertIndex) {
        let b = self.verts[v].deg;
        debug_assert!(!self.verts[v].fixed && self.buckets[b].unfixed > 0);
        self.buckets[b].unfixed -= 1;
        self.verts[v].fixed = true;
    }

    /// Flags `v` dominated; the heavy variant drops it from its bucket's
    /// undominated list. Precondition: `v` is undominated.
    pub fn dominate(&mut self, v: VertIndex) {
        debug_assert!(!self.verts[v].dominated);
        self.verts[v].dominated = true;
        if HEAVY {
            self.buckets[self.verts[v].deg].undominated -= 1;
            self.splice_out(v);
        }
    }

    /// Undoes [`dominate`](Self::dominate). The heavy variant re-appends `v`
    /// at the tail of its bucket's list (not its former position).
    pub fn undominate(&mut self, v: VertIndex) {
        debug_assert!(self.verts[v].dominated);
        self.verts[v].dominated = false;
        if HEAVY {
            self.buckets[self.verts[v].deg].undominated += 1;
            self.splice_in(v);
        }
    }

    /// Moves `v` up one rank, creating and linking the target bucket if it
    /// was empty and unlinking the source bucket if it drains. Returns the
    /// new rank.
    pub fn increment(&mut self, v: VertIndex) -> usize {
        let old = self.verts[v].deg;
        let new = old + 1;
        debug_assert!(new <= self.n);

        if self.buckets[new].count == 0 {
            let after = self.buckets[old].next;
            self.buckets[new].next = after;
            self.buckets[new].prev = old;
            self.buckets[after].prev = new;
            self.buckets[old].next = new;
        }
        self.verts[v].deg = new;
        self.buckets[new].count += 1;

        if HEAVY && !self.verts[v].dominated {
            self.splice_out(v);
            self.splice_in(v);
            self.buckets[old].undominated -= 1;
            self.buckets[new].undominated += 1;
        }

        if !self.verts[v].fixed {
            self.buckets[old].unfixed -= 1;
            self.buckets[new].unfixed += 1;
        }

        self.buckets[old].count -= 1;
        if self.buckets[old].count == 0 {
            let before = self.buckets[old].prev;
            self.buckets[new].prev = before;
            self.buckets[before].next = new;
        }
        new
    }

    /// Moves `v` down one rank; the mirror image of
    /// [`increment`](Self::increment). Returns the new rank.
    pub fn decrement(&mut self, v: VertIndex) -> usize {
        let old = self.verts[v].deg;
        debug_assert!(old >= 1);
        let new = old - 1;

        if self.buckets[new].count == 0 {
            let before = self.buckets[old].prev;
            self.buckets[new].next = old;
            self.buckets[new].prev = before;
            self.buckets[before].next = new;
            self.buckets[old].prev = new;
        }
        self.verts[v].deg = new;
        self.buckets[new].count += 1;

        if HEAVY && !self.verts[v].dominated {
            self.splice_out(v);
            self.splice_in(v);
            self.buckets[old].undominated -= 1;
            self.buckets[new].undominated += 1;
        }

        if !self.verts[v].fixed {
            self.buckets[old].unfixed -= 1;
            self.buckets[new].unfixed += 1;
        }

        self.buckets[old].count -= 1;
        if self.buckets[old].count == 0 {
            let after = self.buckets[old].next;
            self.buckets[new].next = after;
            self.buckets[after].prev = new;
        }
        new
    }

    /// Smallest rank currently held by any vertex.
    pub fn get_min_degree(&self) -> usize {
        self.buckets[self.head()].deg
    }

    /// Largest rank currently held by any vertex.
    pub fn get_max_degree(&self) -> usize {
        self.buckets[self.tail()].deg
    }

    /// Greedy lower bound on how many still-candidate vertices are needed
    /// for their ranks to sum to at least `m`: walk buckets from the top,
    /// take `ceil(m/deg)` or the whole bucket. Returns [`INFEASIBLE`] when
    /// the walk reaches rank 0 (or runs out of buckets) with demand left.
    pub fn count_minimum_to_dominate(&self, mut m: usize) -> usize {
        let mut count = 0;
        let mut node = self.tail();
        loop {
            let deg = self.buckets[node].deg;
            if deg == 0 || deg == INVALID_VERTEX {
                return INFEASIBLE;
            }
            let needed = (m + deg - 1) / deg;
            let unfixed = self.buckets[node].unfixed;
            if needed <= unfixed {
                count += needed;
                break;
            }
            count += unfixed;
            m -= deg * unfixed;
            node = self.buckets[node].prev;
        }
        count
    }
}

impl DegreePq<true> {
    /// First undominated vertex of the lowest-ranked bucket that has one,
    /// or [`INVALID_VERTEX`] when every vertex is dominated.
    pub fn get_min_undominated_vertex(&self) -> VertIndex {
        let mut b = self.head();
        while self.buckets[b].deg != INVALID_VERTEX {
            if self.buckets[b].undominated > 0 {
                return self.verts[self.list_sentinel(self.buckets[b].deg)].next;
            }
            b = self.buckets[b].next;
        }
        INVALID_VERTEX
    }

    /// First undominated vertex of the highest-ranked bucket that has one,
    /// or [`INVALID_VERTEX`] when every vertex is dominated.
    pub fn get_max_undominated_vertex(&self) -> VertIndex {
        let mut b = self.tail();
        while self.buckets[b].deg != INVALID_VERTEX {
            if self.buckets[b].undominated > 0 {
                return self.verts[self.list_sentinel(self.buckets[b].deg)].next;
            }
            b = self.buckets[b].prev;
        }
        INVALID_VERTEX
    }
}
