//! Frame painting against a backend-agnostic [`Canvas`].
//!
//! The previous frame is never cleared. Each pass paints a translucent dark
//! layer over it, which leaves the fading streaks behind moving embers.

use super::entity::SimState;
use crate::color::{self, Rgb};

/// Flash opacity used when a flash carries none of its own.
const DEFAULT_FLASH_ALPHA: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Normal alpha compositing
    SourceOver,
    /// `1 - (1 - dst)(1 - src)`: overlapping light only ever brightens
    Screen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the radius, `0.0` at the center and `1.0` at the edge
    pub offset: f32,
    pub color: Rgb,
    pub alpha: f32,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgb, alpha: f32) -> Self {
        Self { offset, color, alpha }
    }
}

/// White core, the flash colour close in, transparent from 80% out.
pub fn flash_stops(flash_color: Rgb) -> [GradientStop; 4] {
    [
        GradientStop::new(0.0, color::WHITE, 1.0),
        GradientStop::new(0.2, flash_color, 1.0),
        GradientStop::new(0.8, color::BLACK, 0.0),
        GradientStop::new(1.0, color::BLACK, 0.0),
    ]
}

/// Immediate-mode drawing surface. Coordinates are in surface pixels.
pub trait Canvas {
    /// Paint `color` over the whole surface at `alpha`, source-over,
    /// regardless of the current blend mode.
    fn fade(&mut self, color: Rgb, alpha: f32);

    /// Blend mode for the following fills.
    fn set_blend(&mut self, mode: BlendMode);

    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgb, alpha: f32);

    /// Fill the square `[center - radius, center + radius]` with a radial
    /// gradient running from `center` out to `radius`.
    fn fill_radial_gradient(&mut self, center: (f32, f32), radius: f32, stops: &[GradientStop], alpha: f32);
}

/// Paint one frame and drain the flash queue.
pub fn draw_frame<C: Canvas + ?Sized>(state: &mut SimState, canvas: &mut C) {
    let scale = state.config.world_scale;
    let to_px = |x: f32, y: f32| (x / scale, y / scale);
    let tuning = &state.config.render;

    canvas.set_blend(BlendMode::SourceOver);
    canvas.fade(tuning.fade_color, tuning.fade_alpha);

    canvas.set_blend(BlendMode::Screen);

    for rocket in &state.rockets {
        canvas.fill_circle(to_px(rocket.x, rocket.y), rocket.size / scale, rocket.color, rocket.alpha);
    }

    for particle in &state.particles {
        canvas.fill_circle(
            to_px(particle.x, particle.y),
            particle.size / scale,
            particle.color,
            particle.alpha,
        );
    }

    while let Some(flash) = state.pop_flash() {
        let alpha = if flash.alpha > 0.0 { flash.alpha } else { DEFAULT_FLASH_ALPHA };
        canvas.fill_radial_gradient(
            to_px(flash.x, flash.y),
            flash.radius / scale,
            &flash_stops(flash.color),
            alpha,
        );
    }
}
