//! Snakepit Core - wandering snakes for a procedurally addressed world
//!
//! Snakes roam the terrain around the player, grow by eating eggs, hatch on
//! plants and bite each other for rattles. This crate holds the simulation
//! only; the world, the consumed-space ledger and the terminal belong to the
//! game and are reached through the traits in [`world`] and [`render`].
//!
//! # Architecture
//!
//! - [`snake`]: a single snake's movement, growth, bite and projection
//! - [`population`]: the live set of snakes, collisions and spawning
//! - [`world`]: collaborator contracts (terrain oracle, space store, messages)
//! - [`config`]: tuning with JSON loading and validation
//! - [`persistence`]: bincode population saves and the JSON space ledger
//!
//! # Example
//!
//! ```rust,no_run
//! use snakepit_core::prelude::*;
//!
//! let mut population = SnakePopulation::new(PopulationConfig::default().with_seed(7));
//! let mut spaces = MemorySpaces::new();
//! let mut messages = MessageBoard::new();
//!
//! loop {
//!     let mut habitat = Habitat::new(
//!         Origin::new(0.0, 0.0),
//!         &ProceduralOracle,
//!         &mut spaces,
//!         &mut messages,
//!     );
//!     population.update(1.0 / 30.0, &mut habitat);
//! }
//! ```

pub mod components;
pub mod config;
pub mod persistence;
pub mod population;
pub mod render;
pub mod snake;
pub mod world;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{PopulationConfig, SnakeRules};
    pub use crate::population::{BiteEvent, SnakePopulation, TickSummary};
    pub use crate::render::{Glyph, SegmentStyle, Surface, TextSurface, Tone};
    pub use crate::snake::{Snake, Step};
    pub use crate::world::{
        Habitat, MemorySpaces, MessageBoard, MessageSink, ProceduralOracle, SpaceStore, Terrain,
        WorldOracle,
    };
}
