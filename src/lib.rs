//! # agv_pathfinding
//!
//! Route planning for an automated guided vehicle on a warehouse floor. The floor is a
//! uniform-cost 4-connected grid of free cells, walls, shelves and stations. Routes can
//! be found with [Dijkstra](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm),
//! [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) with a Manhattan heuristic,
//! or a stochastic [ant colony](https://en.wikipedia.org/wiki/Ant_colony_optimization_algorithms)
//! search. Connected components are pre-computed with a [UnionFind](petgraph::unionfind::UnionFind)
//! so the colony does not wander on a goal it can never reach.
//!
//! A [TaskExecutor] drives the vehicle through a [Task], one cell per tick, picking
//! shelves up and placing them down at stations. Floors are persisted as small JSON
//! documents by the [MapStore].
//!
//! ```
//! use agv_pathfinding::{compute_route, Grid, Position, Strategy};
//!
//! let grid = Grid::new(3, 3).unwrap();
//! let route = compute_route(&grid, Position::new(0, 0), Position::new(2, 2), &Strategy::Astar)
//!     .unwrap();
//! assert_eq!(route.steps(), 4);
//! ```
pub mod error;
pub mod grid;
pub mod map_store;
pub mod position;
pub mod route;
pub mod search;
pub mod solver;
pub mod task;
pub mod warehouse;

pub use crate::error::{GridError, MapError, RouteFailure, TaskError};
pub use crate::grid::{CellKind, Connectivity, Grid};
pub use crate::map_store::{MapDocument, MapStore};
pub use crate::position::Position;
pub use crate::route::Route;
pub use crate::solver::astar::AstarSolver;
pub use crate::solver::colony::{CancelToken, ColonyParams, ColonyReport, ColonySearch};
pub use crate::solver::dijkstra::DijkstraSolver;
pub use crate::solver::{compute_route, GridSolver, RouteSolver, Strategy};
pub use crate::task::{start_task, Action, ExecutorState, Task, TaskExecutor, TaskStep};
pub use crate::warehouse::Warehouse;

/// Rows of the default editor floor.
pub const DEFAULT_ROWS: usize = 40;
/// Columns of the default editor floor.
pub const DEFAULT_COLS: usize = 40;
/// Cost of a single move between adjacent cells.
pub const STEP_COST: u32 = 1;
/// Row and column offsets of the 4-neighbourhood: up, down, left, right. Searches
/// expand neighbours in this order, which fixes the tie-breaking between equal routes.
pub const NEUMANN_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
