//! skyburst - fireworks for the terminal
//!
//! Modules:
//! - `fireworks`: the simulation and its frame painter
//! - `surface`: RGB raster the painter draws on
//! - `terminal`: half-block presenter for the raster
//! - `config`: show tuning loaded from JSON
//! - `color`, `error`: shared helpers

pub mod color;
pub mod config;
pub mod error;
pub mod fireworks;
pub mod surface;
pub mod terminal;

pub use config::Config;
pub use error::{Error, Result};
pub use fireworks::Controller;
