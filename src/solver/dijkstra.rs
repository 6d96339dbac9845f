use crate::grid::Grid;
use crate::position::Position;
use crate::route::Route;
use crate::solver::{GridSolver, RouteSolver};

pub(crate) const NAME: &str = "dijkstra";

/// Uniform-cost search. Expands cells in order of accumulated cost only, which on the
/// unit-cost grid visits them in breadth-first rings around the start.
#[derive(Clone, Copy, Debug, Default)]
pub struct DijkstraSolver;

impl GridSolver for DijkstraSolver {
    fn heuristic(&self, _: &Position, _: &Position) -> u32 {
        0
    }
}

impl RouteSolver for DijkstraSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn find_route(&self, grid: &Grid, start: Position, goal: Position) -> Route {
        self.solve(grid, start, goal)
    }
}
