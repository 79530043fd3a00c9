//! Contracts for everything the snakes borrow from the surrounding game.
//!
//! The procedural world, the ledger of consumed resources and the message line
//! are owned outside the simulation. Snakes only see them through the traits here,
//! bundled per tick into a [`Habitat`].

use sha2::{Digest, Sha256};

use crate::components::{Origin, WorldCoord};
use crate::persistence::SaveError;

/// Classification of a world cell, as seen by the snakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    /// Food; a head landing here grows the snake and consumes the egg
    Egg,
    /// Vegetation; new snakes hatch only on plant cells
    Plant,
    Empty,
}

/// Pure classification of absolute world coordinates.
pub trait WorldOracle {
    fn classify(&self, at: WorldCoord) -> Terrain;
}

impl<F: Fn(WorldCoord) -> Terrain> WorldOracle for F {
    fn classify(&self, at: WorldCoord) -> Terrain {
        self(at)
    }
}

/// The game's procedural location function.
///
/// Cells hash to `(x + 1000 * y) mod 127`; id `'0'` is an egg and id `'@'`
/// is a plant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralOracle;

impl ProceduralOracle {
    pub const EGG_ID: i64 = b'0' as i64;
    pub const PLANT_ID: i64 = b'@' as i64;

    pub fn location_id(at: WorldCoord) -> i64 {
        at.x.wrapping_add(at.y.wrapping_mul(1000)).rem_euclid(127)
    }
}

impl WorldOracle for ProceduralOracle {
    fn classify(&self, at: WorldCoord) -> Terrain {
        match Self::location_id(at) {
            Self::EGG_ID => Terrain::Egg,
            Self::PLANT_ID => Terrain::Plant,
            _ => Terrain::Empty,
        }
    }
}

/// Persistent ledger of consumed world resources ("spaces").
pub trait SpaceStore {
    /// Mark the resource at `at` as gone, under its content key.
    fn set(&mut self, key: String, at: WorldCoord);
    /// Flush the ledger to durable storage.
    fn save(&mut self) -> Result<(), SaveError>;
}

/// Content-derived ledger key for a consumed coordinate: SHA-256 hex of `"x,y"`.
pub fn space_key(at: WorldCoord) -> String {
    let digest = Sha256::digest(format!("{},{}", at.x, at.y).as_bytes());
    format!("{:x}", digest)
}

/// In-memory [`SpaceStore`]; records entries and counts flushes.
#[derive(Debug, Clone, Default)]
pub struct MemorySpaces {
    pub entries: std::collections::BTreeMap<String, WorldCoord>,
    pub saves: usize,
}

impl MemorySpaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_consumed(&self, at: WorldCoord) -> bool {
        self.entries.contains_key(&space_key(at))
    }
}

impl SpaceStore for MemorySpaces {
    fn set(&mut self, key: String, at: WorldCoord) {
        self.entries.insert(key, at);
    }

    fn save(&mut self) -> Result<(), SaveError> {
        self.saves += 1;
        Ok(())
    }
}

/// Fire-and-forget sink for user-facing status text.
pub trait MessageSink {
    fn post(&mut self, text: &str, timeout_secs: f32);
}

/// The game's single status line. A new post replaces the old one.
#[derive(Debug, Clone, Default)]
pub struct MessageBoard {
    current: Option<(String, f32)>,
}

impl MessageBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text currently on display, if its timeout hasn't run out
    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn remaining(&self) -> f32 {
        self.current.as_ref().map_or(0.0, |(_, left)| *left)
    }

    /// Count the display timeout down, clearing the message when it expires.
    pub fn tick(&mut self, delta_seconds: f32) {
        if let Some((_, left)) = self.current.as_mut() {
            *left -= delta_seconds;
            if *left <= 0.0 {
                self.current = None;
            }
        }
    }
}

impl MessageSink for MessageBoard {
    fn post(&mut self, text: &str, timeout_secs: f32) {
        self.current = Some((text.to_string(), timeout_secs));
    }
}

/// Per-tick view of the surrounding game handed to snakes.
pub struct Habitat<'a> {
    pub origin: Origin,
    pub oracle: &'a dyn WorldOracle,
    pub spaces: &'a mut dyn SpaceStore,
    pub messages: &'a mut dyn MessageSink,
}

impl<'a> Habitat<'a> {
    pub fn new(
        origin: Origin,
        oracle: &'a dyn WorldOracle,
        spaces: &'a mut dyn SpaceStore,
        messages: &'a mut dyn MessageSink,
    ) -> Self {
        Self {
            origin,
            oracle,
            spaces,
            messages,
        }
    }

    /// Classify the cell under a local position.
    pub fn terrain_at(&self, pos: crate::components::LocalPos) -> (WorldCoord, Terrain) {
        let at = self.origin.to_world(pos);
        (at, self.oracle.classify(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_procedural_markers() {
        let oracle = ProceduralOracle;
        // 48 + 0 * 1000
        assert_eq!(oracle.classify(WorldCoord::new(48, 0)), Terrain::Egg);
        assert_eq!(oracle.classify(WorldCoord::new(64, 0)), Terrain::Plant);
        assert_eq!(oracle.classify(WorldCoord::new(1, 0)), Terrain::Empty);
        // 175 mod 127 == 48
        assert_eq!(oracle.classify(WorldCoord::new(175, 0)), Terrain::Egg);
    }

    #[test]
    fn test_location_id_is_non_negative() {
        // -79 mod 127 == 48 with floored modulo
        assert_eq!(ProceduralOracle::location_id(WorldCoord::new(-79, 0)), 48);
        for x in -300..300 {
            let id = ProceduralOracle::location_id(WorldCoord::new(x, -7));
            assert!((0..127).contains(&id));
        }
    }

    #[test]
    fn test_space_key_is_content_derived() {
        let a = space_key(WorldCoord::new(3, -4));
        assert_eq!(a, space_key(WorldCoord::new(3, -4)));
        assert_ne!(a, space_key(WorldCoord::new(-4, 3)));
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_message_board_expires() {
        let mut board = MessageBoard::new();
        board.post("hello", 2.0);
        board.tick(1.5);
        assert_eq!(board.current(), Some("hello"));
        board.tick(0.5);
        assert_eq!(board.current(), None);
    }

    #[test]
    fn test_closure_oracle() {
        let only_origin = |at: WorldCoord| {
            if at == WorldCoord::new(0, 0) {
                Terrain::Plant
            } else {
                Terrain::Empty
            }
        };
        assert_eq!(only_origin.classify(WorldCoord::new(0, 0)), Terrain::Plant);
        assert_eq!(only_origin.classify(WorldCoord::new(0, 1)), Terrain::Empty);
    }
}
