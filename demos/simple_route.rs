use agv_pathfinding::{compute_route, ColonyParams, Grid, Position, RouteSolver, Strategy};
use tracing_subscriber::EnvFilter;

// In this example a route is found on a 5x5 floor with shape
//  _____
// |S    |
// |###  |
// |     |
// |  ###|
// |    E|
//  _____
// where
// - # marks a wall
// - S marks the start
// - E marks the end
//
// with each of the three strategies. Set RUST_LOG=debug to see the searches work.

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut grid = Grid::new(5, 5).unwrap();
    for (row, col) in [(1, 0), (1, 1), (1, 2), (3, 2), (3, 3), (3, 4)] {
        grid.toggle_wall(Position::new(row, col)).unwrap();
    }
    println!("{}", grid);
    let start = Position::new(0, 0);
    let end = Position::new(4, 4);
    let colony = ColonyParams {
        seed: Some(42),
        ..ColonyParams::default()
    };
    for strategy in [Strategy::Dijkstra, Strategy::Astar, Strategy::Colony(colony)] {
        let route = compute_route(&grid, start, end, &strategy).unwrap();
        println!("{} ({} steps): {}", strategy.name(), route.steps(), route);
    }
}
