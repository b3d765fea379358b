//! Conway's Game of Life (B3/S23) on a fixed-size toroidal grid.

pub mod error;
pub mod torus;
pub use error::GridError;
pub use torus::{Grid, LifeConfig, Pattern, TickBackend, patterns};
