//! Multi-leg jobs for a single vehicle. A [Task] lists where to go and what to do on
//! arrival; a [TaskExecutor] plans each leg with a [RouteSolver] when the leg is entered
//! and then moves the vehicle one cell per [step](TaskExecutor::step). Timing is left to
//! whoever calls `step`.
use log::{debug, info, warn};

use crate::error::{RouteFailure, TaskError};
use crate::grid::CellKind;
use crate::position::Position;
use crate::solver::RouteSolver;
use crate::warehouse::Warehouse;

/// What the vehicle does once it reaches a step's target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    MoveTo,
    /// Lifts the shelf standing on the target, freeing its cell.
    PickUp,
    /// Puts the carried shelf down on the target cell, which must be free floor.
    PlaceDown,
    /// Stays put for the given number of steps.
    Wait(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskStep {
    pub target: Position,
    pub action: Action,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Task {
    steps: Vec<TaskStep>,
}

impl Task {
    pub fn new() -> Task {
        Task::default()
    }

    /// Appends a leg to the task.
    pub fn then(mut self, target: Position, action: Action) -> Task {
        self.steps.push(TaskStep { target, action });
        self
    }

    /// Drive to the shelf and lift it, carry it to the station, wait there, then bring
    /// it back and set it down where it was.
    pub fn fetch_and_return(shelf: Position, station: Position, wait_steps: u32) -> Task {
        Task::new()
            .then(shelf, Action::PickUp)
            .then(station, Action::Wait(wait_steps))
            .then(shelf, Action::PlaceDown)
    }

    /// Builds [fetch_and_return](Self::fetch_and_return) from the first shelf and the
    /// first picking station (or, failing that, putaway station) in row-major order.
    pub fn from_warehouse(warehouse: &Warehouse, wait_steps: u32) -> Option<Task> {
        let shelf = warehouse.shelves().first().copied()?;
        let station = warehouse
            .picking_stations()
            .first()
            .or(warehouse.putaway_stations().first())
            .copied()?;
        Some(Task::fetch_and_return(shelf, station, wait_steps))
    }

    pub fn steps(&self) -> &[TaskStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Where the executor is in its job. `leg` indexes into [Task::steps].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    /// The next call to `step` plans this leg.
    PlanningLeg { leg: usize },
    MovingLeg { leg: usize },
    Waiting { leg: usize, remaining: u32 },
    Done,
    /// Planning `leg` failed. Completed legs are not rolled back.
    Failed { leg: usize, reason: RouteFailure },
}

impl ExecutorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutorState::Done | ExecutorState::Failed { .. })
    }
}

/// Drives one vehicle through a [Task]. Owns the warehouse for the duration of the job;
/// take it back with [into_warehouse](Self::into_warehouse).
#[derive(Debug)]
pub struct TaskExecutor<S> {
    warehouse: Warehouse,
    solver: S,
    task: Task,
    vehicle: Position,
    state: ExecutorState,
    route: Vec<Position>,
    route_ix: usize,
    carrying: bool,
    trail: Vec<Position>,
}

/// Starts `task` for the vehicle standing on the warehouse's robot marker.
pub fn start_task<S: RouteSolver>(
    warehouse: Warehouse,
    task: Task,
    solver: S,
) -> Result<TaskExecutor<S>, TaskError> {
    TaskExecutor::new(warehouse, task, solver)
}

impl<S: RouteSolver> TaskExecutor<S> {
    pub fn new(warehouse: Warehouse, task: Task, solver: S) -> Result<TaskExecutor<S>, TaskError> {
        let vehicle = warehouse.robot().ok_or(TaskError::NoVehicle)?;
        for step in task.steps() {
            warehouse.grid().check_bounds(step.target)?;
        }
        info!(
            "Starting {}-leg task for vehicle at {} using {}",
            task.len(),
            vehicle,
            solver.name()
        );
        Ok(TaskExecutor {
            warehouse,
            solver,
            task,
            vehicle,
            state: ExecutorState::Idle,
            route: Vec::new(),
            route_ix: 0,
            carrying: false,
            trail: vec![vehicle],
        })
    }

    /// Advances the job by one tick and returns the vehicle position and the new state.
    /// While moving, a tick is exactly one cell. A leg is planned by the tick that enters
    /// it, which also takes the first cell of the new route. Once the job is done or has
    /// failed, further calls change nothing.
    pub fn step(&mut self) -> (Position, ExecutorState) {
        match self.state {
            ExecutorState::Done | ExecutorState::Failed { .. } => {}
            ExecutorState::Idle => self.begin_leg(0),
            ExecutorState::PlanningLeg { leg } => self.begin_leg(leg),
            ExecutorState::MovingLeg { leg } => self.advance(leg),
            ExecutorState::Waiting { leg, remaining } => {
                if remaining <= 1 {
                    self.finish_leg(leg);
                } else {
                    self.state = ExecutorState::Waiting {
                        leg,
                        remaining: remaining - 1,
                    };
                }
            }
        }
        (self.vehicle, self.state)
    }

    /// Steps until the job is done or has failed, returning the final state.
    pub fn run(&mut self) -> ExecutorState {
        while !self.state.is_terminal() {
            self.step();
        }
        self.state
    }

    fn begin_leg(&mut self, leg: usize) {
        let Some(step) = self.task.steps().get(leg).copied() else {
            self.state = ExecutorState::Done;
            return;
        };
        self.state = ExecutorState::PlanningLeg { leg };
        self.warehouse.robot = Some(self.vehicle);
        let route = self
            .solver
            .find_route(self.warehouse.grid(), self.vehicle, step.target);
        match route.failure() {
            Some(reason) => {
                warn!(
                    "Leg {} from {} to {} failed: {}",
                    leg, self.vehicle, step.target, reason
                );
                self.state = ExecutorState::Failed { leg, reason };
            }
            None => {
                info!("Leg {} planned with {} steps", leg, route.steps());
                self.route = route.into_path().unwrap_or_default();
                self.route_ix = 0;
                self.state = ExecutorState::MovingLeg { leg };
                self.advance(leg);
            }
        }
    }

    fn advance(&mut self, leg: usize) {
        if self.route_ix + 1 < self.route.len() {
            self.route_ix += 1;
            self.vehicle = self.route[self.route_ix];
            self.trail.push(self.vehicle);
            self.warehouse.robot = Some(self.vehicle);
        }
        if self.route_ix + 1 >= self.route.len() {
            self.arrive(leg);
        }
    }

    fn arrive(&mut self, leg: usize) {
        let step = self.task.steps()[leg];
        debug!("Arrived at {} for {:?}", step.target, step.action);
        match step.action {
            Action::MoveTo => {}
            Action::PickUp => match self.warehouse.grid().classify(step.target) {
                Ok(CellKind::Shelf) => {
                    self.set_cell(step.target, CellKind::Free);
                    self.carrying = true;
                }
                other => warn!("Nothing to pick up at {}: {:?}", step.target, other),
            },
            Action::PlaceDown => match self.warehouse.grid().classify(step.target) {
                Ok(CellKind::Free) if self.carrying => {
                    self.set_cell(step.target, CellKind::Shelf);
                    self.carrying = false;
                }
                Ok(_) if !self.carrying => warn!("No shelf to place down at {}", step.target),
                other => warn!("Cannot place a shelf at {}: {:?}", step.target, other),
            },
            Action::Wait(ticks) if ticks > 0 => {
                self.state = ExecutorState::Waiting {
                    leg,
                    remaining: ticks,
                };
                return;
            }
            Action::Wait(_) => {}
        }
        self.finish_leg(leg);
    }

    fn set_cell(&mut self, pos: Position, kind: CellKind) {
        if let Err(e) = self.warehouse.grid.set_cell(pos, kind) {
            warn!("Could not update cell: {}", e);
        }
    }

    fn finish_leg(&mut self, leg: usize) {
        self.state = if leg + 1 < self.task.len() {
            ExecutorState::PlanningLeg { leg: leg + 1 }
        } else {
            info!("Task finished at {}", self.vehicle);
            ExecutorState::Done
        };
    }
}

impl<S> TaskExecutor<S> {
    pub fn position(&self) -> Position {
        self.vehicle
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }

    pub fn is_carrying(&self) -> bool {
        self.carrying
    }

    /// Every cell the vehicle has occupied, starting with its initial position.
    pub fn trail(&self) -> &[Position] {
        &self.trail
    }

    /// Route of the leg in progress, or of the last planned leg.
    pub fn current_route(&self) -> &[Position] {
        &self.route
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    /// Edits made here are seen by the next leg to be planned, not by the one in progress.
    /// The robot marker belongs to the executor while the job runs: it is rewritten from
    /// the vehicle position whenever a leg is planned or the vehicle moves.
    pub fn warehouse_mut(&mut self) -> &mut Warehouse {
        &mut self.warehouse
    }

    pub fn into_warehouse(self) -> Warehouse {
        self.warehouse
    }
}
