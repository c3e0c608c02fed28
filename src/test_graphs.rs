//! Small named graphs shared by the unit tests.

use crate::graph::Graph;

/// Path 0 - 1 - ... - (n-1).
pub fn path(n: usize) -> Graph {
    let mut g = Graph::new(n).unwrap();
    for i in 1..n {
        g.add_edge(i - 1, i);
    }
    g
}

/// Cycle on `n` vertices.
pub fn cycle(n: usize) -> Graph {
    let mut g = path(n);
    if n > 2 {
        g.add_edge(n - 1, 0);
    }
    g
}

/// Complete graph on `n` vertices.
pub fn complete(n: usize) -> Graph {
    let mut g = Graph::new(n).unwrap();
    for i in 0..n {
        for j in (i + 1)..n {
            g.add_edge(i, j);
        }
    }
    g
}

/// Star with centre 0 and `leaves` leaves.
pub fn star(leaves: usize) -> Graph {
    let mut g = Graph::new(leaves + 1).unwrap();
    for leaf in 1..=leaves {
        g.add_edge(0, leaf);
    }
    g
}
