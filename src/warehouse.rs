use log::debug;

use crate::error::{GridError, TaskError};
use crate::grid::{CellKind, Grid};
use crate::position::Position;
use crate::route::Route;
use crate::solver::{compute_route, Strategy};

/// A [Grid] together with its markers. The vehicle (`robot`) and destination (`end`)
/// are the only markers stored here. Shelves and stations live in the grid cells and
/// are read back from there, so there is a single source of truth for them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warehouse {
    pub(crate) grid: Grid,
    pub(crate) robot: Option<Position>,
    pub(crate) end: Option<Position>,
}

impl Warehouse {
    /// A blank floor without markers.
    pub fn new(rows: usize, cols: usize) -> Result<Warehouse, GridError> {
        Ok(Warehouse::from_grid(Grid::new(rows, cols)?))
    }

    pub fn from_grid(grid: Grid) -> Warehouse {
        Warehouse {
            grid,
            robot: None,
            end: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn robot(&self) -> Option<Position> {
        self.robot
    }

    pub fn end(&self) -> Option<Position> {
        self.end
    }

    pub fn set_robot(&mut self, pos: Position) -> Result<(), GridError> {
        self.grid.check_bounds(pos)?;
        self.robot = Some(pos);
        Ok(())
    }

    pub fn set_end(&mut self, pos: Position) -> Result<(), GridError> {
        self.grid.check_bounds(pos)?;
        self.end = Some(pos);
        Ok(())
    }

    pub fn clear_robot(&mut self) {
        self.robot = None;
    }

    pub fn clear_end(&mut self) {
        self.end = None;
    }

    pub fn toggle_wall(&mut self, pos: Position) -> Result<CellKind, GridError> {
        self.grid.toggle_wall(pos)
    }

    pub fn place_shelf(&mut self, pos: Position) -> Result<(), GridError> {
        self.place(pos, CellKind::Shelf)
    }

    pub fn place_picking_station(&mut self, pos: Position) -> Result<(), GridError> {
        self.place(pos, CellKind::PickingStation)
    }

    pub fn place_putaway_station(&mut self, pos: Position) -> Result<(), GridError> {
        self.place(pos, CellKind::PutawayStation)
    }

    /// Resets a cell to free floor, removing any wall, shelf or station on it.
    pub fn clear_cell(&mut self, pos: Position) -> Result<(), GridError> {
        self.place(pos, CellKind::Free)
    }

    fn place(&mut self, pos: Position, kind: CellKind) -> Result<(), GridError> {
        debug!("Placing {:?} at {}", kind, pos);
        self.grid.set_cell(pos, kind)
    }

    pub fn shelves(&self) -> Vec<Position> {
        self.grid.positions_of(CellKind::Shelf).collect()
    }

    pub fn picking_stations(&self) -> Vec<Position> {
        self.grid.positions_of(CellKind::PickingStation).collect()
    }

    pub fn putaway_stations(&self) -> Vec<Position> {
        self.grid.positions_of(CellKind::PutawayStation).collect()
    }

    /// Routes the vehicle to the destination marker.
    pub fn route(&self, strategy: &Strategy) -> Result<Route, TaskError> {
        let start = self.robot.ok_or(TaskError::NoVehicle)?;
        let goal = self.end.ok_or(TaskError::NoDestination)?;
        Ok(compute_route(&self.grid, start, goal, strategy)?)
    }
}

impl Default for Warehouse {
    /// The reference editor floor: 40 x 40 free cells.
    fn default() -> Self {
        Warehouse::from_grid(Grid::default())
    }
}
