//! Preprocess filters: constraint injection and vertex renumbering.
//!
//! Renumbering filters replace the instance with a relabelled copy. The
//! constraint sets are mapped through the inverse permutation and
//! `real_index` rides along in the graph, so downstream output is still in
//! input coordinates.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{DomsetError, Result};
use crate::instance::{DominationInstance, PreprocessFilter};
use crate::io::graph_to_string;
use crate::types::VertIndex;
use crate::vertex_set::VertexSet;

/// `force_in` / `force_out`: appends a fixed vertex list to one of the
/// instance's constraint sets.
pub struct ForceFilter {
    vertices: Vec<VertIndex>,
    force_out: bool,
}

impl ForceFilter {
    pub fn force_in(vertices: Vec<VertIndex>) -> Self {
        Self {
            vertices,
            force_out: false,
        }
    }

    pub fn force_out(vertices: Vec<VertIndex>) -> Self {
        Self {
            vertices,
            force_out: true,
        }
    }
}

impl PreprocessFilter for ForceFilter {
    fn process(&mut self, inst: &mut DominationInstance) -> Result<()> {
        let n = inst.graph.n();
        let set = if self.force_out {
            &mut inst.force_out
        } else {
            &mut inst.force_in
        };
        for &v in &self.vertices {
            if v >= n {
                return Err(DomsetError::Config(format!(
                    "vertex index {v} is invalid"
                )));
            }
            if !set.contains(v) {
                set.add(v);
            }
        }
        Ok(())
    }
}

/// Applies `permutation` to the instance: new vertex `i` is old vertex
/// `permutation[i]`.
fn apply_renumbering(inst: &mut DominationInstance, permutation: &[VertIndex]) {
    let n = inst.graph.n();
    let mut inverse = vec![0; n];
    for (i, &p) in permutation.iter().enumerate() {
        inverse[p] = i;
    }

    let graph = inst.graph.renumber(permutation);
    let mut force_in = VertexSet::new(n);
    for v in inst.force_in.iter() {
        force_in.add(inverse[v]);
    }
    let mut force_out = VertexSet::new(n);
    for v in inst.force_out.iter() {
        force_out.add(inverse[v]);
    }
    *inst = DominationInstance {
        graph,
        force_in,
        force_out,
    };
}

/// Degree-ordering strategy for [`RenumberByDegree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeOrder {
    /// `renumber_mindeg`: low-degree vertices first.
    Ascending,
    /// `renumber_maxdeg`: high-degree vertices first.
    Descending,
}

pub struct RenumberByDegree {
    order: DegreeOrder,
}

impl RenumberByDegree {
    pub fn new(order: DegreeOrder) -> Self {
        Self { order }
    }
}

impl PreprocessFilter for RenumberByDegree {
    fn process(&mut self, inst: &mut DominationInstance) -> Result<()> {
        let g = &inst.graph;
        let mut perm: Vec<VertIndex> = (0..g.n()).collect();
        match self.order {
            DegreeOrder::Ascending => perm.sort_by_key(|&v| g.deg(v)),
            DegreeOrder::Descending => {
                perm.sort_by(|&a, &b| g.deg(b).cmp(&g.deg(a)))
            }
        }
        apply_renumbering(inst, &perm);
        Ok(())
    }
}

/// `renumber_bfs`: breadth-first numbering from a configurable root.
/// Disconnected graphs cannot be fully numbered and are rejected.
pub struct RenumberBfs {
    root: VertIndex,
}

impl RenumberBfs {
    pub fn new(root: VertIndex) -> Self {
        Self { root }
    }
}

impl PreprocessFilter for RenumberBfs {
    fn process(&mut self, inst: &mut DominationInstance) -> Result<()> {
        let g = &inst.graph;
        let n = g.n();
        if self.root >= n {
            return Err(DomsetError::Config(format!(
                "BFS root {} is not a vertex",
                self.root
            )));
        }
        let mut seen = vec![false; n];
        let mut order = Vec::with_capacity(n);
        order.push(self.root);
        seen[self.root] = true;
        let mut next = 0;
        while next < order.len() {
            let v = order[next];
            next += 1;
            for &u in g.neighbours(v) {
                if !seen[u] {
                    seen[u] = true;
                    order.push(u);
                }
            }
        }
        if order.len() != n {
            return Err(DomsetError::Config(
                "BFS renumbering requires a connected graph".to_string(),
            ));
        }
        apply_renumbering(inst, &order);
        Ok(())
    }
}

/// `renumber_random`: a seeded Knuth shuffle of the vertex numbering.
pub struct RenumberRandom {
    rng: ChaCha8Rng,
}

impl RenumberRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl PreprocessFilter for RenumberRandom {
    fn process(&mut self, inst: &mut DominationInstance) -> Result<()> {
        let n = inst.graph.n();
        let mut perm: Vec<VertIndex> = (0..n).collect();
        for i in 0..n {
            let j = self.rng.gen_range(i..n);
            perm.swap(i, j);
        }
        apply_renumbering(inst, &perm);
        Ok(())
    }
}

/// `print_graph_stderr`: logs the graph and changes nothing.
pub struct PrintGraph;

impl PreprocessFilter for PrintGraph {
    fn process(&mut self, inst: &mut DominationInstance) -> Result<()> {
        log::info!("\n{}", graph_to_string(&inst.graph));
        Ok(())
    }
}
