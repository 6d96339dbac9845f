//! Error types for grid access, route computation, map documents and task execution.

use thiserror::Error;

use crate::position::Position;

/// Errors raised by bounds-checked grid access.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    #[error("position {position} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        position: Position,
        rows: usize,
        cols: usize,
    },

    #[error("a grid needs at least one row and one column")]
    EmptyGrid,
}

/// Why a [Route](crate::route::Route) is unsuccessful. This is carried by the route,
/// not raised, so callers branch on [Route::is_success](crate::route::Route::is_success).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteFailure {
    #[error("start or goal lies outside the grid")]
    OutOfBounds,

    #[error("start or goal is a wall")]
    Untraversable,

    #[error("no path connects start and goal")]
    NoPathFound,

    #[error("search was cancelled before any path was found")]
    Cancelled,

    #[error("colony parameters are out of range")]
    InvalidParameters,
}

/// Errors raised while reading, writing or converting map documents.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("map io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("map document is not valid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("maze has no cells")]
    Empty,

    #[error("maze row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell code {code} at {position}")]
    UnknownCell { code: u8, position: Position },

    #[error("{marker} marker {position} is outside the maze")]
    MarkerOutOfBounds {
        marker: &'static str,
        position: Position,
    },
}

/// Errors raised when a task cannot be started.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskError {
    #[error("no vehicle has been placed")]
    NoVehicle,

    #[error("no destination has been placed")]
    NoDestination,

    #[error(transparent)]
    Grid(#[from] GridError),
}
