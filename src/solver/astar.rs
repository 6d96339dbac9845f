use crate::grid::Grid;
use crate::position::Position;
use crate::route::Route;
use crate::solver::{GridSolver, RouteSolver};
use crate::STEP_COST;

pub(crate) const NAME: &str = "astar";

/// A* guided by the Manhattan distance, which is admissible and consistent on a
/// 4-connected unit-cost grid. A `heuristic_factor` above 1.0 trades optimality for
/// fewer expansions.
#[derive(Clone, Debug)]
pub struct AstarSolver {
    pub heuristic_factor: f32,
}

impl AstarSolver {
    pub fn new() -> AstarSolver {
        AstarSolver {
            heuristic_factor: 1.0,
        }
    }
}

impl Default for AstarSolver {
    fn default() -> Self {
        AstarSolver::new()
    }
}

impl GridSolver for AstarSolver {
    /// Manhattan distance times the heuristic factor.
    fn heuristic(&self, p1: &Position, p2: &Position) -> u32 {
        ((p1.manhattan_distance(p2) as u32 * STEP_COST) as f32 * self.heuristic_factor) as u32
    }
}

impl RouteSolver for AstarSolver {
    fn name(&self) -> &'static str {
        NAME
    }

    fn find_route(&self, grid: &Grid, start: Position, goal: Position) -> Route {
        self.solve(grid, start, goal)
    }
}
