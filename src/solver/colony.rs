//! Ant colony search. Each iteration releases a number of ants that walk randomly from
//! the start, preferring cells with more pheromone and cells closer to the goal. Walks
//! that reach the goal reinforce the cells they crossed, shorter walks more strongly.
//! The shortest walk ever seen is the answer; there is no optimality guarantee.
use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::RouteFailure;
use crate::grid::Grid;
use crate::position::Position;
use crate::route::Route;
use crate::solver::{check_endpoints, RouteSolver};

pub(crate) const NAME: &str = "colony";

/// Evaporation never takes a cell below this value.
pub const MIN_PHEROMONE: f64 = 1e-9;

/// Tuning of the colony search. Missing fields take their defaults when deserialised.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyParams {
    /// Ants released per iteration.
    pub ants: usize,
    pub iterations: usize,
    /// Exponent on the pheromone term.
    pub alpha: f64,
    /// Exponent on the goal-distance term.
    pub beta: f64,
    /// Fraction of pheromone removed from every cell after each iteration.
    pub evaporation_rate: f64,
    /// Pheromone shared out over the cells of each successful walk.
    pub deposit: f64,
    /// Fixes the random source. Unseeded searches draw from system entropy.
    pub seed: Option<u64>,
    /// Wall-clock budget for one search.
    pub time_limit: Option<Duration>,
}

impl ColonyParams {
    /// Checks that the exponents and the deposit are finite and non-negative and that
    /// the evaporation rate lies in `[0, 1]`.
    pub fn validate(&self) -> Result<(), RouteFailure> {
        let non_negative = |v: f64| v.is_finite() && v >= 0.0;
        if non_negative(self.alpha)
            && non_negative(self.beta)
            && non_negative(self.deposit)
            && (0.0..=1.0).contains(&self.evaporation_rate)
        {
            Ok(())
        } else {
            Err(RouteFailure::InvalidParameters)
        }
    }
}

impl Default for ColonyParams {
    fn default() -> Self {
        ColonyParams {
            ants: 10,
            iterations: 100,
            alpha: 1.0,
            beta: 2.0,
            evaporation_rate: 0.5,
            deposit: 1.0,
            seed: None,
            time_limit: None,
        }
    }
}

/// Shared flag that stops a running colony search at the next ant.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Pheromone level per grid cell, row-major like [Grid]. Owned by a single search.
#[derive(Clone, Debug, PartialEq)]
pub struct PheromoneField {
    cols: usize,
    values: Vec<f64>,
}

impl PheromoneField {
    pub fn new(rows: usize, cols: usize) -> PheromoneField {
        PheromoneField {
            cols,
            values: vec![1.0; rows * cols],
        }
    }

    fn ix(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    pub fn get(&self, pos: Position) -> f64 {
        self.values[self.ix(pos)]
    }

    /// Multiplies every cell by `1 - rate`, flooring at [MIN_PHEROMONE].
    pub fn evaporate(&mut self, rate: f64) {
        let keep = (1.0 - rate).clamp(0.0, 1.0);
        for v in self.values.iter_mut() {
            *v = (*v * keep).max(MIN_PHEROMONE);
        }
    }

    /// Adds `amount / path.len()` to every cell of `path`, saturating at [f64::MAX].
    pub fn deposit(&mut self, path: &[Position], amount: f64) {
        if path.is_empty() {
            return;
        }
        let share = amount / path.len() as f64;
        for p in path {
            let ix = self.ix(*p);
            self.values[ix] = (self.values[ix] + share).min(f64::MAX);
        }
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Everything a colony search produced, for callers that want more than the route.
#[derive(Clone, Debug)]
pub struct ColonyReport {
    pub route: Route,
    /// Cell count of the shortest successful walk; [None] if no ant reached the goal.
    pub best_length: Option<usize>,
    pub iterations_run: usize,
    pub successful_walks: usize,
    pub pheromone: PheromoneField,
}

#[derive(Clone, Debug, Default)]
pub struct ColonySearch {
    pub params: ColonyParams,
    cancel: Option<CancelToken>,
}

impl ColonySearch {
    pub fn new(params: ColonyParams) -> ColonySearch {
        ColonySearch {
            params,
            cancel: None,
        }
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> ColonySearch {
        self.cancel = Some(token);
        self
    }

    /// Runs the search with a random source built from the configured seed.
    pub fn search(&self, grid: &Grid, start: Position, goal: Position) -> ColonyReport {
        let mut rng = match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.search_with_rng(grid, start, goal, &mut rng)
    }

    /// Runs the search drawing every random choice from `rng`.
    pub fn search_with_rng<R: Rng>(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        rng: &mut R,
    ) -> ColonyReport {
        let mut pheromone = PheromoneField::new(grid.rows(), grid.cols());
        if let Err(reason) =
            check_endpoints(grid, start, goal).and_then(|_| self.params.validate())
        {
            return ColonyReport {
                route: Route::failed(reason),
                best_length: None,
                iterations_run: 0,
                successful_walks: 0,
                pheromone,
            };
        }
        info!(
            "Colony search {} -> {}: {} ants x {} iterations",
            start, goal, self.params.ants, self.params.iterations
        );
        let deadline = self.params.time_limit.map(|limit| Instant::now() + limit);
        let mut best: Option<Vec<Position>> = None;
        let mut iterations_run = 0;
        let mut successful_walks = 0;
        let mut cancelled = false;

        'iterations: for iteration in 0..self.params.iterations {
            let mut successful: Vec<Vec<Position>> = Vec::new();
            for _ in 0..self.params.ants {
                if self.should_stop(deadline) {
                    cancelled = true;
                    break 'iterations;
                }
                if let Some(path) = self.walk(grid, start, goal, &pheromone, rng) {
                    if best.as_ref().map_or(true, |b| path.len() < b.len()) {
                        best = Some(path.clone());
                    }
                    successful.push(path);
                }
            }
            pheromone.evaporate(self.params.evaporation_rate);
            for path in &successful {
                pheromone.deposit(path, self.params.deposit);
            }
            successful_walks += successful.len();
            iterations_run += 1;
            debug!(
                "Iteration {}: {} successful ants, best length {:?}",
                iteration,
                successful.len(),
                best.as_ref().map(Vec::len)
            );
        }

        let best_length = best.as_ref().map(Vec::len);
        let route = match best {
            Some(path) => Route::found(path),
            None if cancelled => Route::failed(RouteFailure::Cancelled),
            None => Route::failed(RouteFailure::NoPathFound),
        };
        ColonyReport {
            route,
            best_length,
            iterations_run,
            successful_walks,
            pheromone,
        }
    }

    fn should_stop(&self, deadline: Option<Instant>) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
            || deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// One ant's walk. Returns the full path if the goal was reached, [None] on a dead end.
    fn walk<R: Rng>(
        &self,
        grid: &Grid,
        start: Position,
        goal: Position,
        pheromone: &PheromoneField,
        rng: &mut R,
    ) -> Option<Vec<Position>> {
        let mut visited = vec![false; grid.rows() * grid.cols()];
        visited[grid.get_ix(start)] = true;
        let mut path = vec![start];
        let mut current = start;
        while current != goal {
            let candidates = grid
                .neighborhood_points(&current)
                .into_iter()
                .filter(|p| !visited[grid.get_ix(*p)])
                .collect::<Vec<_>>();
            if candidates.is_empty() {
                return None;
            }
            let log_weights = candidates
                .iter()
                .map(|p| self.log_desirability(pheromone.get(*p), p.manhattan_distance(&goal)))
                .collect::<Vec<f64>>();
            // Normalised against the largest weight so the biggest term is exactly 1.0.
            let max = log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let weights = log_weights
                .iter()
                .map(|w| (w - max).exp())
                .collect::<Vec<f64>>();
            let next = if !max.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                candidates[rng.gen_range(0..candidates.len())]
            } else {
                match WeightedIndex::new(&weights) {
                    Ok(dist) => candidates[dist.sample(rng)],
                    Err(_) => candidates[rng.gen_range(0..candidates.len())],
                }
            };
            visited[grid.get_ix(next)] = true;
            path.push(next);
            current = next;
        }
        Some(path)
    }

    /// `ln(pheromone^alpha * (1 / (distance + 1))^beta)`, kept in log space so large
    /// exponents cannot overflow.
    fn log_desirability(&self, pheromone: f64, distance_to_goal: usize) -> f64 {
        let distance = (distance_to_goal as f64 + 1.0).ln();
        self.params.alpha * pheromone.ln() - self.params.beta * distance
    }
}

impl RouteSolver for ColonySearch {
    fn name(&self) -> &'static str {
        NAME
    }

    fn find_route(&self, grid: &Grid, start: Position, goal: Position) -> Route {
        self.search(grid, start, goal).route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::CellKind;

    fn seeded(seed: u64) -> ColonySearch {
        ColonySearch::new(ColonyParams {
            seed: Some(seed),
            ..ColonyParams::default()
        })
    }

    #[test]
    fn finds_valid_route_on_open_grid() {
        let grid = Grid::new(6, 6).unwrap();
        let start = Position::new(0, 0);
        let goal = Position::new(5, 4);
        let report = seeded(1).search(&grid, start, goal);
        assert!(report.route.is_valid_for(&grid, start, goal));
        assert!(report.route.steps() >= start.manhattan_distance(&goal));
        assert_eq!(report.best_length, Some(report.route.len()));
        assert_eq!(report.iterations_run, 100);
    }

    #[test]
    fn same_seed_same_route() {
        let mut grid = Grid::new(8, 8).unwrap();
        for row in 1..7 {
            grid.set_cell(Position::new(row, 4), CellKind::Wall).unwrap();
        }
        let start = Position::new(4, 0);
        let goal = Position::new(4, 7);
        let a = seeded(42).search(&grid, start, goal);
        let b = seeded(42).search(&grid, start, goal);
        assert_eq!(a.route, b.route);
        assert_eq!(a.pheromone, b.pheromone);
        assert!(a.route.is_valid_for(&grid, start, goal));
    }

    #[test]
    fn disconnected_grid_leaves_best_unset() {
        let mut grid = Grid::new(4, 4).unwrap();
        for col in 0..4 {
            grid.set_cell(Position::new(2, col), CellKind::Wall).unwrap();
        }
        let search = ColonySearch::new(ColonyParams {
            iterations: 20,
            seed: Some(3),
            ..ColonyParams::default()
        });
        let report = search.search(&grid, Position::new(0, 0), Position::new(3, 3));
        assert_eq!(report.route.failure(), Some(RouteFailure::NoPathFound));
        assert_eq!(report.best_length, None);
        assert_eq!(report.successful_walks, 0);
        assert_eq!(report.iterations_run, 20);
    }

    /// Full evaporation with no deposits must still leave every cell positive.
    #[test]
    fn pheromone_stays_positive() {
        let mut grid = Grid::new(3, 3).unwrap();
        for col in 0..3 {
            grid.set_cell(Position::new(1, col), CellKind::Wall).unwrap();
        }
        let search = ColonySearch::new(ColonyParams {
            iterations: 50,
            evaporation_rate: 1.0,
            seed: Some(9),
            ..ColonyParams::default()
        });
        let report = search.search(&grid, Position::new(0, 0), Position::new(2, 2));
        assert!(report.pheromone.min() > 0.0);

        let mut field = PheromoneField::new(2, 2);
        for _ in 0..5000 {
            field.evaporate(0.5);
        }
        assert!(field.values().iter().all(|v| *v > 0.0));
    }

    #[test]
    fn deposit_favours_short_walks() {
        let mut field = PheromoneField::new(1, 4);
        let short = [Position::new(0, 0), Position::new(0, 1)];
        let long = [
            Position::new(0, 0),
            Position::new(0, 1),
            Position::new(0, 2),
            Position::new(0, 3),
        ];
        field.deposit(&short, 1.0);
        field.deposit(&long, 1.0);
        assert_eq!(field.get(Position::new(0, 0)), 1.0 + 0.5 + 0.25);
        assert_eq!(field.get(Position::new(0, 3)), 1.25);
    }

    #[test]
    fn cancelled_before_start() {
        let grid = Grid::new(5, 5).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let report = seeded(5)
            .with_cancel_token(token)
            .search(&grid, Position::new(0, 0), Position::new(4, 4));
        assert_eq!(report.route.failure(), Some(RouteFailure::Cancelled));
        assert_eq!(report.iterations_run, 0);
    }

    #[test]
    fn zero_time_limit_cancels() {
        let grid = Grid::new(5, 5).unwrap();
        let search = ColonySearch::new(ColonyParams {
            time_limit: Some(Duration::ZERO),
            ..ColonyParams::default()
        });
        let route = search.find_route(&grid, Position::new(0, 0), Position::new(4, 4));
        assert_eq!(route.failure(), Some(RouteFailure::Cancelled));
    }

    /// Weights far beyond the range of f64 must not reach the sampler as infinities.
    #[test]
    fn extreme_weights_still_find_route() {
        let grid = Grid::new(4, 4).unwrap();
        let start = Position::new(0, 0);
        let goal = Position::new(3, 3);
        for params in [
            ColonyParams {
                deposit: 1e308,
                seed: Some(2),
                ..ColonyParams::default()
            },
            ColonyParams {
                alpha: 400.0,
                deposit: 10.0,
                seed: Some(2),
                ..ColonyParams::default()
            },
            ColonyParams {
                alpha: 400.0,
                beta: 400.0,
                deposit: 1e308,
                seed: Some(2),
                ..ColonyParams::default()
            },
        ] {
            let report = ColonySearch::new(params).search(&grid, start, goal);
            assert!(report.route.is_valid_for(&grid, start, goal));
            assert!(report.pheromone.values().iter().all(|v| v.is_finite() && *v > 0.0));
        }
    }

    #[test]
    fn out_of_range_params_fail_route() {
        let grid = Grid::new(3, 3).unwrap();
        for params in [
            ColonyParams {
                alpha: f64::NAN,
                ..ColonyParams::default()
            },
            ColonyParams {
                beta: -1.0,
                ..ColonyParams::default()
            },
            ColonyParams {
                deposit: f64::INFINITY,
                ..ColonyParams::default()
            },
            ColonyParams {
                evaporation_rate: 1.5,
                ..ColonyParams::default()
            },
        ] {
            assert_eq!(params.validate(), Err(RouteFailure::InvalidParameters));
            let search = ColonySearch::new(params);
            let route = search.find_route(&grid, Position::new(0, 0), Position::new(2, 2));
            assert_eq!(route.failure(), Some(RouteFailure::InvalidParameters));
        }
        assert_eq!(ColonyParams::default().validate(), Ok(()));
    }

    #[test]
    fn injected_rng_is_used() {
        let grid = Grid::new(5, 5).unwrap();
        let search = ColonySearch::default();
        let start = Position::new(0, 0);
        let goal = Position::new(4, 4);
        let a = search.search_with_rng(&grid, start, goal, &mut StdRng::seed_from_u64(11));
        let b = search.search_with_rng(&grid, start, goal, &mut StdRng::seed_from_u64(11));
        assert_eq!(a.route, b.route);
    }
}
