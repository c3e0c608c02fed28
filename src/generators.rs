//! Built-in graph generators and the board-shaped certificate printer.
//!
//! Board generators number cells row-major, so cell `(i, j)` of an
//! `side × side` board is vertex `i * side + j`. Restricted variants reuse
//! the plain generator and seed `force_out` with the forbidden cells.

use std::ops::ControlFlow;

use crate::error::{DomsetError, Result};
use crate::graph::Graph;
use crate::instance::{DominationInstance, InputSource, OutputProxy};
use crate::types::MAX_DEGREE;
use crate::vertex_set::VertexSet;

fn check_degrees(g: &Graph, what: &str) -> Result<()> {
    if g.max_degree() >= MAX_DEGREE {
        return Err(DomsetError::LimitExceeded(format!(
            "degree of {what} graph exceeds the maximum"
        )));
    }
    Ok(())
}

/// Queen moves from every cell: same row, same column, both diagonals.
fn queen_graph(side: usize) -> Result<Graph> {
    let g_n = side * side;
    let mut g = Graph::new(g_n)?;
    for vi in 0..side {
        for vj in 0..side {
            let v = vi * side + vj;
            for uj in 0..side {
                if uj != vj {
                    g.vertex_mut(v).push_neighbour(vi * side + uj);
                }
            }
            for ui in 0..side {
                if ui != vi {
                    g.vertex_mut(v).push_neighbour(ui * side + vj);
                }
            }
            add_diagonals(&mut g, side, vi, vj);
        }
    }
    check_degrees(&g, "queen")?;
    Ok(g)
}

/// Bishop moves only: the two diagonals.
fn bishop_graph(side: usize) -> Result<Graph> {
    let g_n = side * side;
    let mut g = Graph::new(g_n)?;
    for vi in 0..side {
        for vj in 0..side {
            add_diagonals(&mut g, side, vi, vj);
        }
    }
    check_degrees(&g, "bishop")?;
    Ok(g)
}

fn add_diagonals(g: &mut Graph, side: usize, vi: usize, vj: usize) {
    let v = vi * side + vj;
    let side = side as isize;
    for k in -side..side {
        let ui = vi as isize + k;
        let uj = vj as isize + k;
        if ui >= 0 && ui < side && uj >= 0 && uj < side && k != 0 {
            g.vertex_mut(v).push_neighbour((ui * side + uj) as usize);
        }
    }
    for k in -side..side {
        let ui = vi as isize + k;
        let uj = vj as isize - k;
        if ui >= 0 && ui < side && uj >= 0 && uj < side && k != 0 {
            g.vertex_mut(v).push_neighbour((ui * side + uj) as usize);
        }
    }
}

/// Which cells of a queen board are forbidden from dominating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueenRestriction {
    /// The plain problem: no restriction.
    None,
    /// Only the top-left quadrant may dominate.
    TopLeftQuadrant,
    /// Only the border cells may dominate.
    Border,
}

impl QueenRestriction {
    fn forbids(self, side: usize, i: usize, j: usize) -> bool {
        let half = (side + 1) / 2;
        match self {
            QueenRestriction::None => false,
            QueenRestriction::TopLeftQuadrant => i >= half || j >= half,
            QueenRestriction::Border => {
                i > 0 && i + 1 < side && j > 0 && j + 1 < side
            }
        }
    }
}

/// `queen` / `queen_topleft` / `border_queen`: one queen graph per board
/// size in `[start, end]`.
pub struct QueenSource {
    next: usize,
    end: usize,
    restriction: QueenRestriction,
}

impl QueenSource {
    pub fn new(start: usize, end: usize, restriction: QueenRestriction) -> Self {
        Self {
            next: start,
            end,
            restriction,
        }
    }
}

impl InputSource for QueenSource {
    fn read_next(&mut self) -> Result<Option<DominationInstance>> {
        if self.next > self.end {
            return Ok(None);
        }
        let side = self.next;
        self.next += 1;
        let mut inst = DominationInstance::from_graph(queen_graph(side)?);
        for i in 0..side {
            for j in 0..side {
                if self.restriction.forbids(side, i, j) {
                    inst.force_out.add(i * side + j);
                }
            }
        }
        Ok(Some(inst))
    }
}

/// `bishop`: one bishop graph per board size in `[start, end]`.
pub struct BishopSource {
    next: usize,
    end: usize,
}

impl BishopSource {
    pub fn new(start: usize, end: usize) -> Self {
        Self { next: start, end }
    }
}

impl InputSource for BishopSource {
    fn read_next(&mut self) -> Result<Option<DominationInstance>> {
        if self.next > self.end {
            return Ok(None);
        }
        let side = self.next;
        self.next += 1;
        Ok(Some(DominationInstance::from_graph(bishop_graph(side)?)))
    }
}

/// `kneser`: vertices are the `k`-subsets of an `n`-set, adjacent when
/// disjoint. Subsets are enumerated as bitmasks in the fixed
/// population-count order below so vertex numbering is reproducible.
pub struct KneserSource {
    n: usize,
    k: usize,
    generated: bool,
}

impl KneserSource {
    pub fn new(n: usize, k: usize) -> Self {
        Self {
            n,
            k,
            generated: false,
        }
    }
}

fn subsets_by_popcount(n: usize, count: usize, prefix: u32, out: &mut Vec<u32>) {
    if count == 0 {
        out.push(prefix << n);
        return;
    }
    if n == 1 {
        debug_assert_eq!(count, 1);
        out.push((prefix << 1) | 1);
        return;
    }
    if count < n {
        subsets_by_popcount(n - 1, count, prefix << 1, out);
    }
    subsets_by_popcount(n - 1, count - 1, (prefix << 1) | 1, out);
}

impl InputSource for KneserSource {
    fn read_next(&mut self) -> Result<Option<DominationInstance>> {
        if self.generated {
            return Ok(None);
        }
        self.generated = true;
        if self.n == 0 {
            return Err(DomsetError::Config(
                "kneser generator needs -n of at least 1".to_string(),
            ));
        }
        if self.n > 31 {
            return Err(DomsetError::Config(
                "kneser generator supports -n up to 31".to_string(),
            ));
        }
        if self.k == 0 || self.k > self.n {
            return Err(DomsetError::Config(
                "kneser generator needs -k in 1..=n".to_string(),
            ));
        }

        let mut subsets = Vec::new();
        subsets_by_popcount(self.n, self.k, 0, &mut subsets);

        let mut g = Graph::new(subsets.len())?;
        for (i, &a) in subsets.iter().enumerate() {
            for (j, &b) in subsets.iter().enumerate() {
                if a & b == 0 {
                    g.vertex_mut(i).push_neighbour(j);
                }
            }
        }
        Ok(Some(DominationInstance::from_graph(g)))
    }
}

/// Row-major index into a triangular board whose row `r` has `r + 1` cells.
fn tri_index(row: usize, col: usize) -> usize {
    row * (row + 1) / 2 + col
}

/// `TG`: triangular grid graph of order `n` (the last row has `n` cells).
pub struct TrigridSource {
    n: usize,
    generated: bool,
}

impl TrigridSource {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            generated: false,
        }
    }
}

impl InputSource for TrigridSource {
    fn read_next(&mut self) -> Result<Option<DominationInstance>> {
        if self.generated {
            return Ok(None);
        }
        self.generated = true;
        if self.n == 0 {
            return Err(DomsetError::Config(
                "trigrid generator needs -n of at least 1".to_string(),
            ));
        }
        let n = self.n;
        let mut g = Graph::new(tri_index(n, 0))?;
        for i in 0..n {
            for j in 0..=i {
                let v = tri_index(i, j);
                if i > 0 {
                    if j > 0 {
                        g.vertex_mut(v).push_neighbour(tri_index(i - 1, j - 1));
                    }
                    if j < i {
                        g.vertex_mut(v).push_neighbour(tri_index(i - 1, j));
                    }
                }
                if j > 0 {
                    g.vertex_mut(v).push_neighbour(tri_index(i, j - 1));
                }
                if j < i {
                    g.vertex_mut(v).push_neighbour(tri_index(i, j + 1));
                }
                if i + 1 < n {
                    g.vertex_mut(v).push_neighbour(tri_index(i + 1, j));
                    g.vertex_mut(v).push_neighbour(tri_index(i + 1, j + 1));
                }
            }
        }
        Ok(Some(DominationInstance::from_graph(g)))
    }
}

/// `queen_board`: renders the best certificate as a `Q`/`_` board. The
/// instance must still be a square board: vertex count a perfect square,
/// untouched by renumbering, `real_index` equal to the index.
pub struct QueenBoard {
    best: VertexSet,
}

impl QueenBoard {
    pub fn new() -> Self {
        Self {
            best: VertexSet::new(0),
        }
    }

    fn side_of(n: usize) -> Option<usize> {
        let side = (n as f64).sqrt().round() as usize;
        (side * side == n).then_some(side)
    }
}

impl Default for QueenBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputProxy for QueenBoard {
    fn initialize(&mut self, inst: &DominationInstance) {
        let n = inst.graph.n();
        self.best = VertexSet::full(n, n);
    }

    fn process_set(&mut self, _inst: &DominationInstance, set: &VertexSet) -> ControlFlow<()> {
        self.best.clone_from(set);
        ControlFlow::Continue(())
    }

    fn finalize(&mut self, inst: &DominationInstance) {
        let n = inst.graph.n();
        let Some(side) = Self::side_of(n) else {
            log::error!("queen_board output requires a square board graph");
            return;
        };
        if self.best.len() == n {
            log::info!("no dominating set found");
            return;
        }
        let mut board = vec![vec![false; side]; side];
        for v in self.best.iter() {
            let r = inst.graph.real_index(v);
            board[r / side][r % side] = true;
        }
        log::info!("size: {}", self.best.len());
        for row in &board {
            let line: Vec<&str> = row.iter().map(|&q| if q { "Q" } else { "_" }).collect();
            println!("{}", line.join(" "));
        }
        println!();
    }
}
