//! The fireworks show: entities, burst patterns, physics, launch scheduling,
//! painting and the run lifecycle.
//!
//! One tick is one frame. [`Controller::tick`] runs the scheduler, then the
//! physics step, then paints onto the run's surface.

pub mod controller;
pub mod entity;
pub mod patterns;
pub mod physics;
pub mod render;
pub mod scheduler;

pub use controller::Controller;
pub use entity::{LightFlash, Particle, Rocket, SimState, Viewport};
pub use patterns::{Burst, Pattern};
pub use render::{BlendMode, Canvas, GradientStop};
