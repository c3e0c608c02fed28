//! Graph text format, the stdin input source, and the stock output proxies.
//!
//! The text format is whitespace-separated ASCII: `n`, then for each vertex
//! its degree followed by that many 0-based neighbour indices. Tokens may
//! be split across lines arbitrarily; several graphs may follow each other
//! in one stream. Self-loops and parallel edges are accepted.
//!
//! Certificates are written to stdout; diagnostics go to the log stream.

use std::io::{BufRead, Write};
use std::ops::ControlFlow;

use crate::error::{DomsetError, Result};
use crate::graph::Graph;
use crate::instance::{DominationInstance, InputSource, OutputProxy};
use crate::types::{MAX_DEGREE, MAX_VERTS};
use crate::vertex_set::VertexSet;

/// Whitespace token stream over a buffered reader. `next_usize` returns
/// `None` at end of input or on a token that is not a number, which ends
/// the graph stream cleanly.
pub struct TokenReader<R> {
    reader: R,
    line: String,
    pos: usize,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            pos: 0,
        }
    }

    /// Byte span of the next token within `line`, refilling as needed.
    fn next_span(&mut self) -> Option<(usize, usize)> {
        loop {
            let rest = &self.line[self.pos..];
            let trimmed = rest.trim_start();
            if !trimmed.is_empty() {
                let start = self.pos + (rest.len() - trimmed.len());
                let len = trimmed
                    .find(char::is_whitespace)
                    .unwrap_or(trimmed.len());
                self.pos = start + len;
                return Some((start, start + len));
            }
            self.line.clear();
            self.pos = 0;
            match self.reader.read_line(&mut self.line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {}
            }
        }
    }

    fn next_usize(&mut self) -> Option<usize> {
        let (start, end) = self.next_span()?;
        self.line[start..end].parse().ok()
    }
}

/// Reads one graph from the token stream. Returns `Ok(None)` at end of
/// input or on unparseable text; rejects graphs beyond the compile-time
/// limits.
pub fn read_graph<R: BufRead>(reader: &mut TokenReader<R>) -> Result<Option<Graph>> {
    let Some(n) = reader.next_usize() else {
        return Ok(None);
    };
    if n >= MAX_VERTS {
        return Err(DomsetError::LimitExceeded(format!(
            "graph with too many vertices ({n})"
        )));
    }
    let mut g = Graph::new(n)?;
    for v in 0..n {
        let Some(deg) = reader.next_usize() else {
            return Ok(None);
        };
        if deg >= MAX_DEGREE {
            return Err(DomsetError::LimitExceeded(format!(
                "vertex {v} has degree {deg}"
            )));
        }
        for _ in 0..deg {
            let Some(u) = reader.next_usize() else {
                return Ok(None);
            };
            if u >= n {
                return Ok(None);
            }
            g.vertex_mut(v).push_neighbour(u);
        }
    }
    Ok(Some(g))
}

/// Writes a graph in the text format.
pub fn write_graph<W: Write>(out: &mut W, g: &Graph) -> std::io::Result<()> {
    writeln!(out, "{}", g.n())?;
    for v in 0..g.n() {
        write!(out, "{} ", g.deg(v))?;
        for &u in g.neighbours(v) {
            write!(out, "{u} ")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Renders a graph to a string in the text format.
pub fn graph_to_string(g: &Graph) -> String {
    let mut buf = Vec::new();
    write_graph(&mut buf, g).expect("writing to a Vec cannot fail");
    String::from_utf8(buf).expect("graph text is ASCII")
}

/// `basic_input`: reads adjacency lists from a buffered reader (stdin in
/// the binary), one instance per graph.
pub struct GraphStreamSource<R> {
    tokens: TokenReader<R>,
}

impl<R: BufRead> GraphStreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            tokens: TokenReader::new(reader),
        }
    }
}

impl<R: BufRead> InputSource for GraphStreamSource<R> {
    fn read_next(&mut self) -> Result<Option<DominationInstance>> {
        Ok(read_graph(&mut self.tokens)?.map(DominationInstance::from_graph))
    }
}

fn print_certificate(inst: &DominationInstance, set: &VertexSet) {
    let mut line = String::new();
    line.push_str(&set.len().to_string());
    for v in set.iter() {
        line.push(' ');
        line.push_str(&inst.graph.real_index(v).to_string());
    }
    println!("{line}");
}

/// `output_all`: every certificate on its own line, then `-1`.
///
/// Under an optimizing solver the lines are the strictly improving
/// sequence of best-so-far sets, not just the optimum.
#[derive(Debug, Default)]
pub struct OutputAll {
    total_solutions: u64,
}

impl OutputProxy for OutputAll {
    fn initialize(&mut self, _inst: &DominationInstance) {
        self.total_solutions = 0;
    }

    fn process_set(&mut self, inst: &DominationInstance, set: &VertexSet) -> ControlFlow<()> {
        self.total_solutions += 1;
        print_certificate(inst, set);
        ControlFlow::Continue(())
    }

    fn finalize(&mut self, _inst: &DominationInstance) {
        println!("-1");
        log::info!("total solutions generated: {}", self.total_solutions);
    }
}

/// `output_first`: like `output_all` but asks the solver to stop after a
/// fixed number of certificates (default 1).
#[derive(Debug)]
pub struct OutputFirst {
    limit: u64,
    seen: u64,
}

impl OutputFirst {
    pub fn new(limit: u64) -> Self {
        Self { limit, seen: 0 }
    }
}

impl OutputProxy for OutputFirst {
    fn initialize(&mut self, _inst: &DominationInstance) {
        self.seen = 0;
    }

    fn process_set(&mut self, inst: &DominationInstance, set: &VertexSet) -> ControlFlow<()> {
        self.seen += 1;
        print_certificate(inst, set);
        if self.seen >= self.limit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn finalize(&mut self, _inst: &DominationInstance) {
        log::info!("stopped after {} certificate(s)", self.seen);
    }
}

/// `output_best`: remembers the last certificate and prints it once the
/// search finishes. With `size_only`, prints just the size (the domination
/// number once the search ran to completion).
#[derive(Debug)]
pub struct OutputBest {
    size_only: bool,
    best: VertexSet,
}

impl OutputBest {
    pub fn new(size_only: bool) -> Self {
        Self {
            size_only,
            best: VertexSet::new(0),
        }
    }
}

impl OutputProxy for OutputBest {
    fn initialize(&mut self, inst: &DominationInstance) {
        let n = inst.graph.n();
        self.best = VertexSet::full(n, n);
    }

    fn process_set(&mut self, _inst: &DominationInstance, set: &VertexSet) -> ControlFlow<()> {
        self.best.clone_from(set);
        ControlFlow::Continue(())
    }

    fn finalize(&mut self, inst: &DominationInstance) {
        if self.size_only {
            println!("{}", self.best.len());
        } else {
            print_certificate(inst, &self.best);
        }
    }
}

/// `graph_only`: prints the (preprocessed) graph and ignores certificates.
#[derive(Debug, Default)]
pub struct GraphOnly;

impl OutputProxy for GraphOnly {
    fn process_set(&mut self, _inst: &DominationInstance, _set: &VertexSet) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn finalize(&mut self, inst: &DominationInstance) {
        print!("{}", graph_to_string(&inst.graph));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(text: &str) -> TokenReader<&[u8]> {
        TokenReader::new(text.as_bytes())
    }

    #[test]
    fn tokens_cross_line_boundaries() {
        let mut t = reader("1 2\n  3\n\n4");
        assert_eq!(t.next_usize(), Some(1));
        assert_eq!(t.next_usize(), Some(2));
        assert_eq!(t.next_usize(), Some(3));
        assert_eq!(t.next_usize(), Some(4));
        assert_eq!(t.next_usize(), None);
    }

    #[test]
    fn read_k4_adjacency() {
        let text = "4\n3 1 2 3\n3 0 2 3\n3 0 1 3\n3 0 1 2\n";
        let g = read_graph(&mut reader(text)).unwrap().unwrap();
        assert_eq!(g.n(), 4);
        for v in 0..4 {
            assert_eq!(g.deg(v), 3);
        }
        assert_eq!(g.neighbours(0), &[1, 2, 3]);
    }

    #[test]
    fn several_graphs_in_one_stream() {
        let text = "1 0 2 1 1 1 0";
        let mut t = reader(text);
        let a = read_graph(&mut t).unwrap().unwrap();
        assert_eq!(a.n(), 1);
        let b = read_graph(&mut t).unwrap().unwrap();
        assert_eq!(b.n(), 2);
        assert_eq!(b.neighbours(0), &[1]);
        assert!(read_graph(&mut t).unwrap().is_none());
    }

    #[test]
    fn garbage_ends_stream_cleanly() {
        assert!(read_graph(&mut reader("x")).unwrap().is_none());
        assert!(read_graph(&mut reader("2 1")).unwrap().is_none());
        // Out-of-range neighbour index.
        assert!(read_graph(&mut reader("2 1 5 0")).unwrap().is_none());
    }

    #[test]
    fn oversized_graph_is_a_limit_error() {
        let text = format!("{MAX_VERTS}");
        assert!(matches!(
            read_graph(&mut reader(&text)),
            Err(DomsetError::LimitExceeded(_))
        ));
    }

    #[test]
    fn write_round_trips() {
        let text = "3\n2 1 2 \n1 0 \n1 0 \n";
        let g = read_graph(&mut reader(text)).unwrap().unwrap();
        assert_eq!(graph_to_string(&g), text);
    }

    #[test]
    fn stream_source_yields_instances() {
        let mut src = GraphStreamSource::new("2 1 1 1 0".as_bytes());
        let inst = src.read_next().unwrap().unwrap();
        assert_eq!(inst.graph.n(), 2);
        assert!(inst.force_in.is_empty() && inst.force_out.is_empty());
        assert!(src.read_next().unwrap().is_none());
    }
}
