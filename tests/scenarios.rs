//! End-to-end scenarios across the whole pipeline: text format in, every
//! driver, constraints, renumbering, residue partitioning, and brute-force
//! cross-checks on small graphs.

use domset_rs::graph::Graph;
use domset_rs::instance::{CollectProxy, DominationInstance, PreprocessFilter, Solver};
use domset_rs::io::{read_graph, TokenReader};
use domset_rs::registry::{ComponentSettings, Registry};
use domset_rs::solver::{
    BranchOrder, DdSolver, FixedOrderSolver, MddSolver, PivotRule, SearchFrame, SolverPolicy,
};

fn parse(text: &str) -> Graph {
    read_graph(&mut TokenReader::new(text.as_bytes()))
        .unwrap()
        .expect("test graph must parse")
}

fn cycle(n: usize) -> Graph {
    let mut g = Graph::new(n).unwrap();
    for i in 0..n {
        g.add_edge(i, (i + 1) % n);
    }
    g
}

fn path(n: usize) -> Graph {
    let mut g = Graph::new(n).unwrap();
    for i in 1..n {
        g.add_edge(i - 1, i);
    }
    g
}

fn queen(side: usize) -> Graph {
    let registry = Registry::with_builtin_components();
    let settings = ComponentSettings {
        n: Some(side),
        ..Default::default()
    };
    let mut src = registry.spawn_input_source("queen", &settings).unwrap();
    src.read_next().unwrap().unwrap().graph
}

fn dd_solver(generate_all: bool) -> DdSolver {
    DdSolver::new(
        SolverPolicy {
            pivot: PivotRule::MinCandidateDegree,
            order: BranchOrder::Descending,
            force_stop_on_trapped: false,
            recheck_bounds_in_loop: false,
            generate_all,
        },
        SearchFrame::default(),
    )
}

fn mdd_solver(generate_all: bool) -> MddSolver {
    MddSolver::new(
        SolverPolicy {
            pivot: PivotRule::MinCandidateDegree,
            order: BranchOrder::Descending,
            force_stop_on_trapped: false,
            recheck_bounds_in_loop: true,
            generate_all,
        },
        SearchFrame::default(),
    )
}

fn solve_best(solver: &mut dyn Solver, g: Graph) -> Vec<usize> {
    let mut inst = DominationInstance::from_graph(g);
    let mut proxy = CollectProxy::new();
    solver.solve(&mut inst, &mut proxy).unwrap();
    proxy.sets.last().cloned().expect("no certificate emitted")
}

/// All dominating sets of `g` by subset enumeration (real indices).
fn brute_force_dominating_sets(g: &Graph) -> Vec<Vec<usize>> {
    let n = g.n();
    assert!(n <= 20);
    let mut result = Vec::new();
    for mask in 0u32..(1 << n) {
        let dominated = |v: usize| {
            mask & (1 << v) != 0 || g.neighbours(v).iter().any(|&u| mask & (1 << u) != 0)
        };
        if (0..n).all(dominated) {
            result.push((0..n).filter(|&v| mask & (1 << v) != 0).collect());
        }
    }
    result
}

fn gamma(g: &Graph) -> usize {
    brute_force_dominating_sets(g)
        .iter()
        .map(Vec::len)
        .min()
        .unwrap()
}

fn is_dominating(g: &Graph, set: &[usize]) -> bool {
    (0..g.n()).all(|v| {
        set.contains(&v) || g.neighbours(v).iter().any(|u| set.contains(u))
    })
}

#[test]
fn scenario_k4_from_text_format() {
    let text = "4\n3 1 2 3\n3 0 2 3\n3 0 1 3\n3 0 1 2";
    let g = parse(text);
    let best = solve_best(&mut dd_solver(false), g.clone());
    assert_eq!(best.len(), 1);
    assert!(is_dominating(&g, &best));
}

#[test]
fn scenario_p5_and_c6() {
    for (g, expected) in [(path(5), 2), (cycle(6), 2)] {
        for solver in [
            &mut dd_solver(false) as &mut dyn Solver,
            &mut mdd_solver(false),
            &mut FixedOrderSolver::new(false, SearchFrame::default()),
        ] {
            let best = solve_best(solver, g.clone());
            assert_eq!(best.len(), expected);
            assert!(is_dominating(&g, &best));
        }
    }
}

#[test]
fn scenario_queen_4x4() {
    // Two queens suffice on the 4x4 board, e.g. (0,0) and (2,2); confirmed
    // against subset enumeration below.
    let g = queen(4);
    assert_eq!(gamma(&g), 2);
    for solver in [
        &mut dd_solver(false) as &mut dyn Solver,
        &mut mdd_solver(false),
    ] {
        let best = solve_best(solver, g.clone());
        assert_eq!(best.len(), 2);
        assert!(is_dominating(&g, &best));
    }
}

#[test]
fn scenario_force_in_on_c6() {
    let mut inst = DominationInstance::from_graph(cycle(6));
    inst.force_in.add(0);
    let mut proxy = CollectProxy::new();
    mdd_solver(false).solve(&mut inst, &mut proxy).unwrap();
    let best = proxy.sets.last().unwrap();
    assert_eq!(best.len(), 2);
    assert!(best.contains(&0));
}

#[test]
fn scenario_residue_classes_partition_queen_5x5() {
    let run = |modulus: u64, res: u64| {
        let mut solver = dd_solver(true);
        solver.frame.upper = 3;
        solver.frame.modulus = modulus;
        solver.frame.res = res;
        solver.frame.resmod_depth = Some(2);
        let mut inst = DominationInstance::from_graph(queen(5));
        let mut proxy = CollectProxy::new();
        solver.solve(&mut inst, &mut proxy).unwrap();
        proxy.sets
    };

    let whole = run(1, 0);
    assert!(!whole.is_empty());
    assert!(whole.iter().all(|s| s.len() == 3));

    let mut union: Vec<Vec<usize>> = Vec::new();
    for res in 0..4 {
        union.extend(run(4, res));
    }

    // The union over all residue classes is the whole enumeration with no
    // duplicates across classes.
    let mut whole_sorted = whole.clone();
    whole_sorted.sort();
    let mut union_sorted = union.clone();
    union_sorted.sort();
    assert_eq!(union.len(), whole.len());
    assert_eq!(union_sorted, whole_sorted);
}

#[test]
fn generation_covers_every_minimal_set() {
    for g in [path(4), cycle(5), cycle(6), path(6)] {
        let mut inst = DominationInstance::from_graph(g.clone());
        let mut proxy = CollectProxy::new();
        dd_solver(true).solve(&mut inst, &mut proxy).unwrap();

        // Every emitted set dominates and none repeats.
        for set in &proxy.sets {
            assert!(is_dominating(&g, set), "{set:?} does not dominate");
        }
        let mut dedup = proxy.sets.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), proxy.sets.len());

        // Every inclusion-minimal dominating set is present.
        let all = brute_force_dominating_sets(&g);
        let minimal: Vec<_> = all
            .iter()
            .filter(|d| {
                !all.iter()
                    .any(|other| other.len() < d.len() && other.iter().all(|v| d.contains(v)))
            })
            .cloned()
            .collect();
        for m in &minimal {
            assert!(
                proxy.sets.contains(m),
                "minimal set {m:?} missing from the enumeration"
            );
        }
    }
}

#[test]
fn optimum_matches_brute_force_on_small_graphs() {
    let mut star = Graph::new(7).unwrap();
    for leaf in 1..7 {
        star.add_edge(0, leaf);
    }
    // A path 0-1-2 next to a disjoint triangle 3-4-5.
    let mut two_components = Graph::new(6).unwrap();
    two_components.add_edge(0, 1);
    two_components.add_edge(1, 2);
    two_components.add_edge(3, 4);
    two_components.add_edge(4, 5);
    two_components.add_edge(5, 3);

    for g in [path(7), cycle(8), star, two_components, queen(3)] {
        let expected = gamma(&g);
        assert_eq!(
            solve_best(&mut dd_solver(false), g.clone()).len(),
            expected
        );
        assert_eq!(
            solve_best(&mut mdd_solver(false), g.clone()).len(),
            expected
        );
        assert_eq!(
            solve_best(
                &mut FixedOrderSolver::new(false, SearchFrame::default()),
                g.clone()
            )
            .len(),
            expected
        );
    }
}

#[test]
fn renumbering_preserves_the_domination_number() {
    use domset_rs::filters::{DegreeOrder, RenumberByDegree, RenumberRandom};

    let g = queen(4);
    let plain = solve_best(&mut dd_solver(false), g.clone()).len();

    let mut inst = DominationInstance::from_graph(g.clone());
    RenumberRandom::new(42).process(&mut inst).unwrap();
    let mut proxy = CollectProxy::new();
    dd_solver(false).solve(&mut inst, &mut proxy).unwrap();
    let shuffled = proxy.sets.last().unwrap();
    assert_eq!(shuffled.len(), plain);
    // Certificates come back in original coordinates and still dominate
    // the original graph.
    assert!(is_dominating(&g, shuffled));

    let mut inst = DominationInstance::from_graph(g.clone());
    RenumberByDegree::new(DegreeOrder::Ascending)
        .process(&mut inst)
        .unwrap();
    let mut proxy = CollectProxy::new();
    mdd_solver(false).solve(&mut inst, &mut proxy).unwrap();
    assert_eq!(proxy.sets.last().unwrap().len(), plain);
}

#[test]
fn root_lower_bounds_are_admissible() {
    use domset_rs::degree_pq::DegreePqLight;

    for g in [path(5), cycle(7), queen(3), cycle(9)] {
        let expected = gamma(&g);
        let mut prepared = g.clone();
        prepared.add_self_loops();
        prepared.sort_neighbours_descending();
        let dpq = DegreePqLight::new(&prepared);
        let bound = dpq.count_minimum_to_dominate(prepared.n());
        assert!(
            bound <= expected,
            "cover bound {bound} exceeds the optimum {expected}"
        );
    }
}

#[test]
fn enumeration_lower_bound_filters_small_sets() {
    let mut solver = dd_solver(true);
    solver.frame.lower = 3;
    solver.frame.upper = 3;
    let mut inst = DominationInstance::from_graph(cycle(6));
    let mut proxy = CollectProxy::new();
    solver.solve(&mut inst, &mut proxy).unwrap();
    assert!(!proxy.sets.is_empty());
    assert!(proxy.sets.iter().all(|s| s.len() == 3));
}

#[test]
fn contradictory_force_out_reports_no_set() {
    // Forbid the whole closed neighbourhood of vertex 0.
    let mut inst = DominationInstance::from_graph(path(4));
    inst.force_out.add(0);
    inst.force_out.add(1);
    for solver in [
        &mut dd_solver(false) as &mut dyn Solver,
        &mut mdd_solver(false),
        &mut FixedOrderSolver::new(false, SearchFrame::default()),
    ] {
        let mut fresh = inst.clone();
        let mut proxy = CollectProxy::new();
        solver.solve(&mut fresh, &mut proxy).unwrap();
        assert!(proxy.sets.is_empty());
    }
}
