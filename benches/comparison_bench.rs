use agv_pathfinding::{
    compute_route, CellKind, ColonyParams, Connectivity, Grid, Position, Strategy,
};
use criterion::{criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::hint::black_box;

const N: usize = 40;
const N_SCENARIOS: usize = 20;

/// A random floor with scattered walls plus a set of reachable start/goal pairs.
fn random_floor(rng: &mut StdRng) -> (Grid, Vec<(Position, Position)>) {
    let mut grid = Grid::new(N, N).unwrap();
    for row in 0..N {
        for col in 0..N {
            if rng.gen_bool(0.25) {
                grid.set_cell(Position::new(row, col), CellKind::Wall).unwrap();
            }
        }
    }
    let connectivity = Connectivity::of(&grid);
    let mut scenarios = Vec::new();
    while scenarios.len() < N_SCENARIOS {
        let start = Position::new(rng.gen_range(0..N), rng.gen_range(0..N));
        let goal = Position::new(rng.gen_range(0..N), rng.gen_range(0..N));
        if connectivity.reachable(&grid, start, goal) {
            scenarios.push((start, goal));
        }
    }
    (grid, scenarios)
}

fn bench_strategy(c: &mut Criterion, label: &str, strategy: Strategy) {
    let mut rng = StdRng::seed_from_u64(0);
    let (grid, scenarios) = random_floor(&mut rng);
    c.bench_function(format!("{label}, {N}x{N}").as_str(), |b| {
        b.iter(|| {
            for (start, goal) in &scenarios {
                black_box(compute_route(&grid, *start, *goal, &strategy).unwrap());
            }
        })
    });
}

fn bench_dijkstra(c: &mut Criterion) {
    bench_strategy(c, "Dijkstra", Strategy::Dijkstra);
}

fn bench_astar(c: &mut Criterion) {
    bench_strategy(c, "Astar", Strategy::Astar);
}

fn bench_colony(c: &mut Criterion) {
    let params = ColonyParams {
        ants: 10,
        iterations: 10,
        seed: Some(0),
        ..ColonyParams::default()
    };
    bench_strategy(c, "Colony", Strategy::Colony(params));
}

criterion_group!(benches, bench_dijkstra, bench_astar, bench_colony);
criterion_main!(benches);
