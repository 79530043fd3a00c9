//! Coordinate frames used across the simulation.
//!
//! Snakes live in a *local* integer frame centred on the player. The game keeps
//! a floating world origin (`world_x`, `world_y`) that slides as the player
//! walks; adding it to a local position and rounding gives the absolute
//! [`WorldCoord`] the procedural world is addressed by.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Integer position in the local frame, relative to the world origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalPos {
    pub x: i32,
    pub y: i32,
}

impl LocalPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for LocalPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add<Direction> for LocalPos {
    type Output = Self;
    fn add(self, dir: Direction) -> Self {
        let (dx, dy) = dir.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Cardinal movement direction. Screen rows grow downward, so `Up` is -y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Unit step for this direction
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    /// Uniform pick over all four directions (the current one included)
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// Absolute integer coordinate in the procedural world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldCoord {
    pub x: i64,
    pub y: i64,
}

impl WorldCoord {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// The game's sliding world origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub x: f64,
    pub y: f64,
}

impl Origin {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate a local position into the absolute world frame.
    ///
    /// Each axis is rounded half-to-even, so an origin of `0.5` maps local `0`
    /// to world `0` and local `1` to world `2`.
    pub fn to_world(&self, pos: LocalPos) -> WorldCoord {
        WorldCoord {
            x: (pos.x as f64 + self.x).round_ties_even() as i64,
            y: (pos.y as f64 + self.y).round_ties_even() as i64,
        }
    }
}

/// Visible terminal extent, used to clip rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Screen cell (row, col) for a local position; the origin sits mid-screen.
    pub fn to_screen(&self, pos: LocalPos) -> (i32, i32) {
        (pos.y + self.height / 2, pos.x + self.width / 2)
    }

    pub fn contains(&self, row: i32, col: i32) -> bool {
        (0..self.height).contains(&row) && (0..self.width).contains(&col)
    }
}
