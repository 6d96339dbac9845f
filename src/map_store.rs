//! Saved maps. A map is one JSON document per name:
//!
//! ```json
//! { "maze": [[0, 1, 4], [2, 0, 3]], "robot": [0, 0], "end": null }
//! ```
//!
//! Cell codes are those of [CellKind::code]. Conversion to and from [Warehouse] is
//! lossless, including absent markers.
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::MapError;
use crate::grid::{CellKind, Grid};
use crate::position::Position;
use crate::warehouse::Warehouse;

const MAP_EXTENSION: &str = "json";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDocument {
    pub maze: Vec<Vec<u8>>,
    #[serde(default)]
    pub robot: Option<[usize; 2]>,
    #[serde(default)]
    pub end: Option<[usize; 2]>,
}

impl MapDocument {
    pub fn from_json(s: &str) -> Result<MapDocument, MapError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> Result<String, MapError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl TryFrom<MapDocument> for Warehouse {
    type Error = MapError;

    fn try_from(doc: MapDocument) -> Result<Self, Self::Error> {
        let expected = doc.maze.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(MapError::Empty);
        }
        let mut rows = Vec::with_capacity(doc.maze.len());
        for (row, codes) in doc.maze.iter().enumerate() {
            if codes.len() != expected {
                return Err(MapError::Ragged {
                    row,
                    expected,
                    found: codes.len(),
                });
            }
            let cells = codes
                .iter()
                .enumerate()
                .map(|(col, &code)| {
                    CellKind::from_code(code).ok_or(MapError::UnknownCell {
                        code,
                        position: Position::new(row, col),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
        let grid = Grid::from_rows(rows).map_err(|_| MapError::Empty)?;
        let marker = |name: &'static str, m: Option<[usize; 2]>| -> Result<_, MapError> {
            match m.map(Position::from) {
                Some(p) if !grid.in_bounds(p) => Err(MapError::MarkerOutOfBounds {
                    marker: name,
                    position: p,
                }),
                other => Ok(other),
            }
        };
        let robot = marker("robot", doc.robot)?;
        let end = marker("end", doc.end)?;
        Ok(Warehouse { grid, robot, end })
    }
}

impl From<&Warehouse> for MapDocument {
    fn from(w: &Warehouse) -> Self {
        MapDocument {
            maze: w
                .grid()
                .iter_rows()
                .map(|row| row.iter().map(|k| k.code()).collect())
                .collect(),
            robot: w.robot().map(Into::into),
            end: w.end().map(Into::into),
        }
    }
}

/// A directory of `<name>.json` map documents.
#[derive(Clone, Debug)]
pub struct MapStore {
    dir: PathBuf,
}

impl MapStore {
    /// Opens the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<MapStore, MapError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(MapStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, MAP_EXTENSION))
    }

    /// Names of the stored maps, sorted.
    pub fn list(&self) -> Result<Vec<String>, MapError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(MAP_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn load(&self, name: &str) -> Result<Warehouse, MapError> {
        let reader = BufReader::new(File::open(self.path_for(name))?);
        let doc: MapDocument = serde_json::from_reader(reader)?;
        Warehouse::try_from(doc)
    }

    /// Writes the map under `name`, replacing any map of that name.
    pub fn save(&self, name: &str, warehouse: &Warehouse) -> Result<PathBuf, MapError> {
        let path = self.path_for(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(&mut writer, &MapDocument::from(warehouse))?;
        writer.flush()?;
        info!("Map '{}' saved to {}", name, path.display());
        Ok(path)
    }

    /// A fresh name of the form `map_<unix seconds>`.
    pub fn default_name() -> String {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        format!("map_{}", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_reference_document() {
        let doc = MapDocument::from_json(
            r#"{"maze": [[0, 1, 0], [4, 2, 3]], "robot": [0, 0], "end": null}"#,
        )
        .unwrap();
        let w = Warehouse::try_from(doc).unwrap();
        assert_eq!(w.grid().classify(Position::new(0, 1)), Ok(CellKind::Wall));
        assert_eq!(w.shelves(), vec![Position::new(1, 0)]);
        assert_eq!(w.picking_stations(), vec![Position::new(1, 1)]);
        assert_eq!(w.putaway_stations(), vec![Position::new(1, 2)]);
        assert_eq!(w.robot(), Some(Position::new(0, 0)));
        assert_eq!(w.end(), None);
    }

    #[test]
    fn missing_markers_default_to_none() {
        let doc = MapDocument::from_json(r#"{"maze": [[0]]}"#).unwrap();
        assert_eq!(doc.robot, None);
        let w = Warehouse::try_from(doc).unwrap();
        assert_eq!(
            MapDocument::from(&w).to_json().unwrap(),
            r#"{"maze":[[0]],"robot":null,"end":null}"#
        );
    }

    #[test]
    fn rejects_malformed_documents() {
        let ragged = MapDocument {
            maze: vec![vec![0, 0], vec![0]],
            robot: None,
            end: None,
        };
        assert!(matches!(
            Warehouse::try_from(ragged),
            Err(MapError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            })
        ));
        let unknown = MapDocument {
            maze: vec![vec![0, 7]],
            robot: None,
            end: None,
        };
        assert!(matches!(
            Warehouse::try_from(unknown),
            Err(MapError::UnknownCell { code: 7, .. })
        ));
        let marker = MapDocument {
            maze: vec![vec![0, 0]],
            robot: None,
            end: Some([0, 2]),
        };
        assert!(matches!(
            Warehouse::try_from(marker),
            Err(MapError::MarkerOutOfBounds { marker: "end", .. })
        ));
        let empty = MapDocument {
            maze: vec![],
            robot: None,
            end: None,
        };
        assert!(matches!(Warehouse::try_from(empty), Err(MapError::Empty)));
        assert!(matches!(
            MapDocument::from_json("{\"maze\": 3}"),
            Err(MapError::Json(_))
        ));
    }

    #[test]
    fn default_name_has_prefix() {
        let name = MapStore::default_name();
        assert!(name.starts_with("map_"));
        assert!(name[4..].parse::<u64>().is_ok());
    }
}
