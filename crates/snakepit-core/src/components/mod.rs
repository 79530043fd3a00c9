//! Plain data types shared by the snake entity and the population manager.
//!
//! These carry no behavior beyond small coordinate helpers; the simulation
//! logic lives in [`crate::snake`] and [`crate::population`].

mod common;

pub use common::*;
