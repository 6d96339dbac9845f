use agv_pathfinding::{start_task, ExecutorState, Position, Strategy, Task, Warehouse};
use tracing_subscriber::EnvFilter;

// A vehicle fetches the only shelf, brings it to the picking station, waits there for
// two ticks and carries it back. The floor is printed after every tick:
// - S marks a shelf
// - P marks the picking station
// - # marks a wall
// - A marks the vehicle

fn render(warehouse: &Warehouse, vehicle: Position) -> String {
    warehouse
        .grid()
        .to_string()
        .lines()
        .enumerate()
        .map(|(row, line)| {
            line.chars()
                .enumerate()
                .map(|(col, c)| {
                    if Position::new(row, col) == vehicle {
                        'A'
                    } else {
                        c
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut warehouse = Warehouse::new(6, 6).unwrap();
    for col in 0..4 {
        warehouse.toggle_wall(Position::new(3, col)).unwrap();
    }
    warehouse.place_shelf(Position::new(1, 1)).unwrap();
    warehouse.place_picking_station(Position::new(5, 0)).unwrap();
    warehouse.set_robot(Position::new(0, 5)).unwrap();

    let task = Task::from_warehouse(&warehouse, 2).unwrap();
    let mut executor = start_task(warehouse, task, Strategy::Astar).unwrap();
    let mut tick = 0;
    loop {
        let (pos, state) = executor.step();
        tick += 1;
        println!("tick {}: {:?}\n{}\n", tick, state, render(executor.warehouse(), pos));
        if state.is_terminal() {
            if let ExecutorState::Failed { leg, reason } = state {
                println!("Leg {} failed: {}", leg, reason);
            }
            break;
        }
    }
    println!("Trail: {:?}", executor.trail());
}
