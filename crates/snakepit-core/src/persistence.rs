//! Save/Load for the snake population and the consumed-space ledger
//!
//! The population is written with bincode behind a format version. The
//! ledger of eaten eggs is a small human-readable JSON file mapping
//! [`space_key`](crate::world::space_key) to the consumed coordinate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::components::WorldCoord;
use crate::snake::Snake;
use crate::world::SpaceStore;

/// Version number for population saves (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a population
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    /// Save format version
    pub version: u32,
    pub active: bool,
    pub spawn_cooldown: f32,
    /// Snakes in population order
    pub snakes: Vec<Snake>,
}

impl PopulationSnapshot {
    pub fn new(active: bool, spawn_cooldown: f32, snakes: Vec<Snake>) -> Self {
        Self {
            version: SAVE_VERSION,
            active,
            spawn_cooldown,
            snakes,
        }
    }
}

/// Write a population snapshot
pub fn save_population<W: Write>(
    writer: W,
    snapshot: &PopulationSnapshot,
) -> Result<(), SaveError> {
    bincode::serialize_into(writer, snapshot)?;
    Ok(())
}

/// Read a population snapshot, rejecting other format versions
pub fn load_population<R: Read>(reader: R) -> Result<PopulationSnapshot, SaveError> {
    let snapshot: PopulationSnapshot = bincode::deserialize_from(reader)?;

    if snapshot.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: snapshot.version,
        });
    }

    Ok(snapshot)
}

/// Space ledger kept in a JSON file, keyed by content key.
#[derive(Debug)]
pub struct FileSpaceStore {
    path: PathBuf,
    spaces: BTreeMap<String, WorldCoord>,
}

impl FileSpaceStore {
    /// Open the ledger at `path`; a missing file starts an empty ledger.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let path = path.into();
        let spaces = match File::open(&path) {
            Ok(file) => serde_json::from_reader(BufReader::new(file))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, spaces })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.spaces.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<WorldCoord> {
        self.spaces.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

impl SpaceStore for FileSpaceStore {
    fn set(&mut self, key: String, at: WorldCoord) {
        self.spaces.insert(key, at);
    }

    fn save(&mut self) -> Result<(), SaveError> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &self.spaces)?;
        writer.flush()?;
        Ok(())
    }
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
    /// Save holds more snakes than the loading population allows
    OverCapacity { cap: usize, found: usize },
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::Json(e) => write!(f, "JSON error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::OverCapacity { cap, found } => {
                write!(f, "Save holds {} snakes, cap is {}", found, cap)
            }
        }
    }
}

impl std::error::Error for SaveError {}
