//! Toroidal grid engine internals and public API.

pub(crate) mod coords;
mod engine;
pub mod patterns;
mod rules;

pub use engine::{Grid, LifeConfig, PARALLEL_MIN_CELLS, TickBackend};
pub use patterns::Pattern;
