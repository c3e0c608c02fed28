//! Whole-search benchmarks on queen boards.
//!
//! Queen domination is the canonical workload for this solver family: the
//! boards are dense, the bounds do real work, and the per-node cost of the
//! degree queues and the MDD stack dominates the runtime.
//!
//! Run with:
//! ```bash
//! cargo bench --bench solver
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use domset_rs::generators::{QueenRestriction, QueenSource};
use domset_rs::instance::{CollectProxy, DominationInstance, InputSource, Solver};
use domset_rs::solver::{
    BranchOrder, DdSolver, MddSolver, PivotRule, SearchFrame, SolverPolicy,
};

fn queen_instance(side: usize) -> DominationInstance {
    QueenSource::new(side, side, QueenRestriction::None)
        .read_next()
        .unwrap()
        .unwrap()
}

fn dd_policy() -> SolverPolicy {
    SolverPolicy {
        pivot: PivotRule::MinCandidateDegree,
        order: BranchOrder::Descending,
        force_stop_on_trapped: false,
        recheck_bounds_in_loop: false,
        generate_all: false,
    }
}

fn mdd_policy() -> SolverPolicy {
    SolverPolicy {
        recheck_bounds_in_loop: true,
        ..dd_policy()
    }
}

fn bench_queen_optimization(c: &mut Criterion) {
    let mut group = c.benchmark_group("queen_optimize");
    for side in [5, 6] {
        group.bench_with_input(BenchmarkId::new("dd", side), &side, |b, &side| {
            b.iter(|| {
                let mut inst = queen_instance(side);
                let mut proxy = CollectProxy::new();
                DdSolver::new(dd_policy(), SearchFrame::default())
                    .solve(&mut inst, &mut proxy)
                    .unwrap();
                proxy.sets.last().unwrap().len()
            })
        });
        group.bench_with_input(BenchmarkId::new("mdd", side), &side, |b, &side| {
            b.iter(|| {
                let mut inst = queen_instance(side);
                let mut proxy = CollectProxy::new();
                MddSolver::new(mdd_policy(), SearchFrame::default())
                    .solve(&mut inst, &mut proxy)
                    .unwrap();
                proxy.sets.last().unwrap().len()
            })
        });
    }
    group.finish();
}

fn bench_queen_enumeration(c: &mut Criterion) {
    c.bench_function("queen5_enumerate_optimal", |b| {
        b.iter(|| {
            let mut inst = queen_instance(5);
            let mut proxy = CollectProxy::new();
            let mut frame = SearchFrame::default();
            frame.upper = 3;
            let mut solver = DdSolver::new(
                SolverPolicy {
                    generate_all: true,
                    ..dd_policy()
                },
                frame,
            );
            solver.solve(&mut inst, &mut proxy).unwrap();
            proxy.sets.len()
        })
    });
}

criterion_group!(benches, bench_queen_optimization, bench_queen_enumeration);
criterion_main!(benches);
