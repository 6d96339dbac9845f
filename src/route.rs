use core::fmt;
use itertools::Itertools;

use crate::error::RouteFailure;
use crate::grid::Grid;
use crate::position::Position;

/// The outcome of a route query: either the full cell sequence from start to goal
/// (both inclusive, 4-connected) or the reason no such sequence was produced.
/// A failed route never carries a partial path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    path: Vec<Position>,
    failure: Option<RouteFailure>,
}

impl Route {
    pub fn found(path: Vec<Position>) -> Route {
        debug_assert!(!path.is_empty());
        Route {
            path,
            failure: None,
        }
    }

    pub fn failed(reason: RouteFailure) -> Route {
        Route {
            path: Vec::new(),
            failure: Some(reason),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub fn failure(&self) -> Option<RouteFailure> {
        self.failure
    }

    /// The visited cells; empty for a failed route.
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    pub fn into_path(self) -> Option<Vec<Position>> {
        match self.failure {
            None => Some(self.path),
            Some(_) => None,
        }
    }

    /// Number of cells in the path, including start and goal.
    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Number of moves, one less than the number of cells.
    pub fn steps(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<Position> {
        self.path.first().copied()
    }

    pub fn goal(&self) -> Option<Position> {
        self.path.last().copied()
    }

    /// Checks the route invariants against a grid: it starts at `start`, ends at `goal`,
    /// every consecutive pair is one orthogonal step apart and no cell is a wall.
    pub fn is_valid_for(&self, grid: &Grid, start: Position, goal: Position) -> bool {
        self.is_success()
            && self.start() == Some(start)
            && self.goal() == Some(goal)
            && self
                .path
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.manhattan_distance(b) == 1)
            && self.path.iter().all(|p| grid.is_traversable(*p))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.failure {
            Some(reason) => write!(f, "no route: {}", reason),
            None => write!(f, "{}", self.path.iter().join(" -> ")),
        }
    }
}
