//! Branch-candidate ordering via an order-preserving radix list.
//!
//! For a pivot vertex, the branch loop wants its candidate neighbourhood
//! sorted by current undominated rank. Candidates arrive one by one and are
//! threaded into a doubly-linked list kept in ascending rank order, with a
//! per-rank shortcut (`degree_heads`) remembering the most recently
//! inserted node of each rank so equal-rank candidates chain in insertion
//! order. Links are indices into a node arena; slot 0 is the list sentinel.
//!
//! The two read-out directions have deliberately different tie behaviour:
//! the descending walk visits equal ranks in *reverse* insertion order, the
//! ascending walk in insertion order. Both orders are fully determined by
//! the candidate iteration order, which keeps whole searches reproducible.
//!
//! One [`BranchScratch`] is pooled per recursion depth, so a search node
//! reuses its level's buffers instead of allocating per call.

use super::BranchOrder;
use crate::degree_pq::DegreePqLight;
use crate::types::{VertIndex, INVALID_VERTEX};

#[derive(Debug, Clone, Copy)]
struct RadixNode {
    next: usize,
    prev: usize,
    deg: usize,
    u: VertIndex,
}

/// Reusable per-depth buffers for one branch loop.
#[derive(Debug, Default)]
pub(crate) struct BranchScratch {
    /// The branch candidates in final order.
    pub ordered: Vec<VertIndex>,
    nodes: Vec<RadixNode>,
    degree_heads: Vec<usize>,
}

impl BranchScratch {
    /// Fills `ordered` with `candidates` ranked by their current degree in
    /// `dpq`. Rank-0 candidates never survive the read-out; the drivers
    /// only feed neighbourhoods of an undominated pivot, where every
    /// candidate has positive rank.
    pub fn rank_neighbours<I>(&mut self, candidates: I, dpq: &DegreePqLight, order: BranchOrder)
    where
        I: IntoIterator<Item = VertIndex>,
    {
        self.ordered.clear();
        self.nodes.clear();
        self.nodes.push(RadixNode {
            next: 0,
            prev: 0,
            deg: 0,
            u: INVALID_VERTEX,
        });

        self.degree_heads.clear();
        self.degree_heads.resize(dpq.get_max_degree() + 1, 0);

        for u in candidates {
            let deg = dpq.ranked_degree(u);
            let idx = self.nodes.len();
            let mut prev = self.degree_heads[deg];
            if prev == 0 {
                // No node of this rank yet: scan down from the tail for the
                // last node of rank <= deg.
                prev = self.nodes[0].prev;
                while self.nodes[prev].deg > deg {
                    prev = self.nodes[prev].prev;
                }
            }
            let next = self.nodes[prev].next;
            self.nodes.push(RadixNode { next, prev, deg, u });
            self.nodes[next].prev = idx;
            self.nodes[prev].next = idx;
            self.degree_heads[deg] = idx;
        }

        match order {
            BranchOrder::Descending => {
                let mut p = self.nodes[0].prev;
                while self.nodes[p].deg != 0 {
                    self.ordered.push(self.nodes[p].u);
                    p = self.nodes[p].prev;
                }
            }
            BranchOrder::Ascending => {
                let mut p = self.nodes[0].next;
                while self.nodes[p].deg != 0 {
                    self.ordered.push(self.nodes[p].u);
                    p = self.nodes[p].next;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;

    /// A graph whose prepared ranks are 0:3, 1:4, 2:4, 3:2, 4:4.
    fn dpq_with_known_ranks() -> DegreePqLight {
        let mut g = Graph::new(5).unwrap();
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        g.add_edge(4, 0);
        g.add_edge(4, 1);
        g.add_edge(4, 2);
        g.add_self_loops();
        DegreePqLight::new(&g)
    }

    #[test]
    fn descending_ranks_high_first_with_reversed_ties() {
        let dpq = dpq_with_known_ranks();
        // Ranks: 0 -> 3, 1 -> 4, 2 -> 4, 3 -> 2, 4 -> 4.
        let mut scratch = BranchScratch::default();
        scratch.rank_neighbours([0, 1, 2, 3, 4], &dpq, BranchOrder::Descending);
        // Rank-4 group inserted as 1,2,4 reads back reversed.
        assert_eq!(scratch.ordered, vec![4, 2, 1, 0, 3]);
    }

    #[test]
    fn ascending_ranks_low_first_preserving_ties() {
        let dpq = dpq_with_known_ranks();
        let mut scratch = BranchScratch::default();
        scratch.rank_neighbours([0, 1, 2, 3, 4], &dpq, BranchOrder::Ascending);
        assert_eq!(scratch.ordered, vec![3, 0, 1, 2, 4]);
    }

    #[test]
    fn scratch_is_reusable_across_calls() {
        let dpq = dpq_with_known_ranks();
        let mut scratch = BranchScratch::default();
        scratch.rank_neighbours([0, 1, 2, 3, 4], &dpq, BranchOrder::Descending);
        scratch.rank_neighbours([3, 0], &dpq, BranchOrder::Ascending);
        assert_eq!(scratch.ordered, vec![3, 0]);
    }

    #[test]
    fn empty_candidate_list_yields_empty_order() {
        let dpq = dpq_with_known_ranks();
        let mut scratch = BranchScratch::default();
        scratch.rank_neighbours(std::iter::empty(), &dpq, BranchOrder::Descending);
        assert!(scratch.ordered.is_empty());
    }
}
