/// Saves floors to a scratch directory and loads them back through the map store.
use agv_pathfinding::{MapDocument, MapError, MapStore, Position, Strategy, Warehouse};
use std::fs;
use std::path::PathBuf;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "agv_pathfinding_{}_{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn sample_warehouse() -> Warehouse {
    let mut w = Warehouse::new(6, 8).unwrap();
    for col in 1..7 {
        w.toggle_wall(Position::new(3, col)).unwrap();
    }
    w.place_shelf(Position::new(1, 1)).unwrap();
    w.place_shelf(Position::new(1, 5)).unwrap();
    w.place_picking_station(Position::new(5, 0)).unwrap();
    w.place_putaway_station(Position::new(5, 7)).unwrap();
    w.set_robot(Position::new(0, 0)).unwrap();
    w
}

#[test]
fn save_list_load() {
    let dir = scratch_dir("save_list_load");
    let store = MapStore::open(&dir).unwrap();
    assert!(store.list().unwrap().is_empty());

    let w = sample_warehouse();
    let path = store.save("floor_b", &w).unwrap();
    assert!(path.ends_with("floor_b.json"));
    store.save("floor_a", &Warehouse::new(2, 2).unwrap()).unwrap();
    fs::write(dir.join("notes.txt"), "not a map").unwrap();
    assert_eq!(store.list().unwrap(), vec!["floor_a", "floor_b"]);

    let loaded = store.load("floor_b").unwrap();
    assert_eq!(loaded, w);
    assert_eq!(loaded.end(), None);
    assert_eq!(loaded.shelves(), w.shelves());

    // Saving again under the same name replaces the map.
    let mut edited = loaded;
    edited.set_end(Position::new(5, 7)).unwrap();
    store.save("floor_b", &edited).unwrap();
    let reloaded = store.load("floor_b").unwrap();
    assert_eq!(reloaded.end(), Some(Position::new(5, 7)));
    let route = reloaded.route(&Strategy::Astar).unwrap();
    assert!(route.is_success());

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn load_reports_bad_files() {
    let dir = scratch_dir("load_reports_bad_files");
    let store = MapStore::open(&dir).unwrap();
    assert!(matches!(store.load("missing"), Err(MapError::Io(_))));

    fs::write(store.path_for("garbled"), "{ maze: ").unwrap();
    assert!(matches!(store.load("garbled"), Err(MapError::Json(_))));

    fs::write(store.path_for("ragged"), r#"{"maze": [[0, 0], [1]]}"#).unwrap();
    assert!(matches!(
        store.load("ragged"),
        Err(MapError::Ragged { row: 1, .. })
    ));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn document_preserves_cells_and_markers() {
    let w = sample_warehouse();
    let doc = MapDocument::from(&w);
    assert_eq!(doc.maze.len(), 6);
    assert_eq!(doc.maze[3], vec![0, 1, 1, 1, 1, 1, 1, 0]);
    assert_eq!(doc.maze[5][0], 2);
    assert_eq!(doc.maze[5][7], 3);
    assert_eq!(doc.maze[1][5], 4);
    assert_eq!(doc.robot, Some([0, 0]));
    assert_eq!(doc.end, None);

    let json = doc.to_json().unwrap();
    assert!(json.contains("\"end\":null"));
    let back = Warehouse::try_from(MapDocument::from_json(&json).unwrap()).unwrap();
    assert_eq!(back, w);
}
