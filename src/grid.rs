use core::fmt;
use log::debug;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

use crate::error::GridError;
use crate::position::Position;
use crate::{DEFAULT_COLS, DEFAULT_ROWS, STEP_COST};

/// Terrain classification of a single cell. Only [CellKind::Wall] blocks movement;
/// shelves and stations are driven over like free floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellKind {
    #[default]
    Free,
    Wall,
    PickingStation,
    PutawayStation,
    Shelf,
}

impl CellKind {
    /// Integer code used by the map document format.
    pub fn code(self) -> u8 {
        match self {
            CellKind::Free => 0,
            CellKind::Wall => 1,
            CellKind::PickingStation => 2,
            CellKind::PutawayStation => 3,
            CellKind::Shelf => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<CellKind> {
        match code {
            0 => Some(CellKind::Free),
            1 => Some(CellKind::Wall),
            2 => Some(CellKind::PickingStation),
            3 => Some(CellKind::PutawayStation),
            4 => Some(CellKind::Shelf),
            _ => None,
        }
    }

    pub fn is_traversable(self) -> bool {
        self != CellKind::Wall
    }

    fn symbol(self) -> char {
        match self {
            CellKind::Free => '.',
            CellKind::Wall => '#',
            CellKind::PickingStation => 'P',
            CellKind::PutawayStation => 'T',
            CellKind::Shelf => 'S',
        }
    }
}

/// A rectangular field of [CellKind]s stored row-major. The dimensions are fixed at
/// creation; only the classification of individual cells changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
}

impl Grid {
    /// A blank `rows` x `cols` grid of [CellKind::Free] cells.
    pub fn new(rows: usize, cols: usize) -> Result<Grid, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        Ok(Grid {
            rows,
            cols,
            cells: vec![CellKind::Free; rows * cols],
        })
    }

    /// Builds a grid from rows of equal length. Callers are expected to have validated
    /// the shape; see [MapDocument](crate::map_store::MapDocument) for the checked path.
    pub(crate) fn from_rows(rows: Vec<Vec<CellKind>>) -> Result<Grid, GridError> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if n_rows == 0 || n_cols == 0 {
            return Err(GridError::EmptyGrid);
        }
        debug_assert!(rows.iter().all(|r| r.len() == n_cols));
        Ok(Grid {
            rows: n_rows,
            cols: n_cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    pub fn check_bounds(&self, pos: Position) -> Result<(), GridError> {
        if self.in_bounds(pos) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                position: pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    pub(crate) fn get_ix(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    pub fn classify(&self, pos: Position) -> Result<CellKind, GridError> {
        self.check_bounds(pos)?;
        Ok(self.cells[self.get_ix(pos)])
    }

    /// Overwrites the classification of a single cell.
    pub fn set_cell(&mut self, pos: Position, kind: CellKind) -> Result<(), GridError> {
        self.check_bounds(pos)?;
        let ix = self.get_ix(pos);
        self.cells[ix] = kind;
        Ok(())
    }

    /// Turns a wall into free floor and anything else into a wall, returning the new kind.
    pub fn toggle_wall(&mut self, pos: Position) -> Result<CellKind, GridError> {
        let kind = match self.classify(pos)? {
            CellKind::Wall => CellKind::Free,
            _ => CellKind::Wall,
        };
        self.set_cell(pos, kind)?;
        Ok(kind)
    }

    /// True iff `pos` is inside the grid and not a wall.
    pub fn is_traversable(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cells[self.get_ix(pos)].is_traversable()
    }

    /// Traversable 4-neighbours of `pos` in up, down, left, right order.
    pub fn neighborhood_points(&self, pos: &Position) -> SmallVec<[Position; 4]> {
        pos.neumann_neighborhood()
            .into_iter()
            .filter(|p| self.is_traversable(*p))
            .collect()
    }

    pub fn neighborhood_points_and_cost(&self, pos: &Position) -> SmallVec<[(Position, u32); 4]> {
        self.neighborhood_points(pos)
            .into_iter()
            .map(|p| (p, STEP_COST))
            .collect()
    }

    /// All positions of the given kind in row-major order.
    pub fn positions_of(&self, kind: CellKind) -> impl Iterator<Item = Position> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, k)| **k == kind)
            .map(move |(ix, _)| Position::new(ix / cols, ix % cols))
    }

    /// Rows of cells, top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[CellKind]> {
        self.cells.chunks(self.cols)
    }
}

impl Default for Grid {
    fn default() -> Grid {
        Grid {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            cells: vec![CellKind::Free; DEFAULT_ROWS * DEFAULT_COLS],
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.iter_rows() {
            let line = row.iter().map(|k| k.symbol()).collect::<String>();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Connected components of the traversable cells of a [Grid], kept in a [UnionFind].
/// This is a snapshot: edits to the grid after construction are not reflected.
#[derive(Clone, Debug)]
pub struct Connectivity {
    components: UnionFind<usize>,
    rows: usize,
    cols: usize,
}

impl Connectivity {
    /// Links every traversable cell to its traversable down and right neighbours.
    pub fn of(grid: &Grid) -> Connectivity {
        debug!("Generating connected components for {}x{} grid", grid.rows, grid.cols);
        let mut components = UnionFind::new(grid.rows * grid.cols);
        for row in 0..grid.rows {
            for col in 0..grid.cols {
                let point = Position::new(row, col);
                if !grid.is_traversable(point) {
                    continue;
                }
                let parent_ix = grid.get_ix(point);
                [Position::new(row + 1, col), Position::new(row, col + 1)]
                    .into_iter()
                    .filter(|p| grid.is_traversable(*p))
                    .for_each(|p| {
                        components.union(parent_ix, grid.get_ix(p));
                    });
            }
        }
        Connectivity {
            components,
            rows: grid.rows,
            cols: grid.cols,
        }
    }

    fn ix(&self, pos: Position) -> Option<usize> {
        (pos.row < self.rows && pos.col < self.cols).then(|| pos.row * self.cols + pos.col)
    }

    /// Checks if start and goal are on the same component. Walled or out-of-bounds
    /// endpoints are never reachable, except a traversable cell from itself.
    pub fn reachable(&self, grid: &Grid, start: Position, goal: Position) -> bool {
        if !grid.is_traversable(start) || !grid.is_traversable(goal) {
            return false;
        }
        match (self.ix(start), self.ix(goal)) {
            (Some(s), Some(g)) => self.components.equiv(s, g),
            _ => false,
        }
    }

    /// Checks if start and goal are not on the same component.
    pub fn unreachable(&self, grid: &Grid, start: Position, goal: Position) -> bool {
        !self.reachable(grid, start, goal)
    }
}
