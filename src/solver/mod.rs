use log::{info, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{GridError, RouteFailure};
use crate::grid::{Connectivity, Grid};
use crate::position::Position;
use crate::route::Route;
use crate::search::best_first;

pub mod astar;
pub mod colony;
pub mod dijkstra;

use astar::AstarSolver;
use colony::{ColonyParams, ColonySearch};
use dijkstra::DijkstraSolver;

/// The capability every search strategy provides: a route from `start` to `goal` on a
/// read-only grid. Implementations never fail by raising; an unsuccessful [Route]
/// carries the reason.
pub trait RouteSolver {
    fn name(&self) -> &'static str;

    fn find_route(&self, grid: &Grid, start: Position, goal: Position) -> Route;
}

impl<S: RouteSolver + ?Sized> RouteSolver for &S {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn find_route(&self, grid: &Grid, start: Position, goal: Position) -> Route {
        (**self).find_route(grid, start, goal)
    }
}

impl<S: RouteSolver + ?Sized> RouteSolver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn find_route(&self, grid: &Grid, start: Position, goal: Position) -> Route {
        (**self).find_route(grid, start, goal)
    }
}

/// Solvers that run the shared best-first search and differ only in their heuristic.
pub trait GridSolver {
    /// Lower bound on the remaining cost from `p1` to `p2`.
    fn heuristic(&self, p1: &Position, p2: &Position) -> u32;

    fn successors(&self, grid: &Grid, node: &Position) -> SmallVec<[(Position, u32); 4]> {
        grid.neighborhood_points_and_cost(node)
    }

    /// Sum of the step costs along `path`.
    fn get_path_cost(&self, path: &[Position]) -> u32 {
        path.windows(2)
            .map(|w| w[0].manhattan_distance(&w[1]) as u32 * crate::STEP_COST)
            .sum()
    }

    /// Computes a path from start to goal. Endpoints are assumed to be traversable.
    fn get_path_single_goal(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
    ) -> Option<Vec<Position>> {
        best_first(
            &start,
            |node| self.successors(grid, node),
            |point| self.heuristic(point, &goal),
            |point| *point == goal,
        )
        .map(|(v, _c)| v)
    }

    /// Validates the endpoints and wraps [get_path_single_goal](Self::get_path_single_goal)
    /// into a [Route].
    fn solve(&self, grid: &Grid, start: Position, goal: Position) -> Route {
        if let Err(reason) = check_endpoints(grid, start, goal) {
            return Route::failed(reason);
        }
        match self.get_path_single_goal(grid, start, goal) {
            Some(path) => Route::found(path),
            None => Route::failed(RouteFailure::NoPathFound),
        }
    }
}

/// Fails fast when either endpoint is outside the grid or a wall.
pub fn check_endpoints(grid: &Grid, start: Position, goal: Position) -> Result<(), RouteFailure> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        return Err(RouteFailure::OutOfBounds);
    }
    if !grid.is_traversable(start) || !grid.is_traversable(goal) {
        return Err(RouteFailure::Untraversable);
    }
    Ok(())
}

/// Caller-selected search strategy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    Dijkstra,
    #[default]
    Astar,
    Colony(ColonyParams),
}

impl RouteSolver for Strategy {
    fn name(&self) -> &'static str {
        match self {
            Strategy::Dijkstra => dijkstra::NAME,
            Strategy::Astar => astar::NAME,
            Strategy::Colony(_) => colony::NAME,
        }
    }

    fn find_route(&self, grid: &Grid, start: Position, goal: Position) -> Route {
        match self {
            Strategy::Dijkstra => DijkstraSolver.find_route(grid, start, goal),
            Strategy::Astar => AstarSolver::new().find_route(grid, start, goal),
            Strategy::Colony(params) => {
                ColonySearch::new(params.clone()).find_route(grid, start, goal)
            }
        }
    }
}

/// Computes a route with the given strategy. Positions outside the grid are reported as
/// an error; every other failure comes back as an unsuccessful [Route].
///
/// The colony strategy is skipped when start and goal lie on different connected
/// components, since it would otherwise spend its whole iteration budget.
pub fn compute_route(
    grid: &Grid,
    start: Position,
    goal: Position,
    strategy: &Strategy,
) -> Result<Route, GridError> {
    grid.check_bounds(start)?;
    grid.check_bounds(goal)?;
    info!("Computing route {} -> {} with {}", start, goal, strategy.name());
    if let Err(reason) = check_endpoints(grid, start, goal) {
        warn!("Route {} -> {} rejected: {}", start, goal, reason);
        return Ok(Route::failed(reason));
    }
    if matches!(strategy, Strategy::Colony(_))
        && Connectivity::of(grid).unreachable(grid, start, goal)
    {
        warn!("{} is not reachable from {}", goal, start);
        return Ok(Route::failed(RouteFailure::NoPathFound));
    }
    let route = strategy.find_route(grid, start, goal);
    if !route.is_success() {
        warn!("No route {} -> {} found by {}", start, goal, strategy.name());
    }
    Ok(route)
}
