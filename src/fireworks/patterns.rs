//! Burst generators.
//!
//! Every generator takes the detonation point and returns the new particles
//! together with the colour the detonation flash should use. Ring sizes are
//! multiples of `fire_number` so all five bursts have comparable density.

use std::f32::consts::{FRAC_PI_2, TAU};

use fastrand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::Particle;
use crate::color::{self, Rgb};
use crate::config::ShowTuning;

const GRAVITY: f32 = 0.04;
const HEAVY_GRAVITY: f32 = 0.06;
const LIGHT_GRAVITY: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Single evenly spaced ring
    Circle,
    /// Two rings, two colours
    DoubleCircle,
    /// Ring, filled disc and a tilted elliptical ring
    PlanetCircle,
    /// Fast ring around a dense filled disc
    FullCircle,
    /// Heart silhouette from a piecewise speed profile
    Heart,
}

impl Pattern {
    pub const ALL: [Pattern; 5] = [
        Pattern::Heart,
        Pattern::FullCircle,
        Pattern::DoubleCircle,
        Pattern::PlanetCircle,
        Pattern::Circle,
    ];

    /// Uniform pick among `enabled`, falling back to all five when empty.
    pub fn random(rng: &mut Rng, enabled: &[Pattern]) -> Self {
        let pool = if enabled.is_empty() { &Self::ALL[..] } else { enabled };
        pool[rng.usize(0..pool.len())]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Circle => "circle",
            Pattern::DoubleCircle => "double_circle",
            Pattern::PlanetCircle => "planet_circle",
            Pattern::FullCircle => "full_circle",
            Pattern::Heart => "heart",
        }
    }

    pub fn generate(self, origin: (f32, f32), tuning: &ShowTuning, rng: &mut Rng) -> Burst {
        match self {
            Pattern::Circle => circle(origin, tuning, rng),
            Pattern::DoubleCircle => double_circle(origin, tuning, rng),
            Pattern::PlanetCircle => planet_circle(origin, tuning, rng),
            Pattern::FullCircle => full_circle(origin, tuning, rng),
            Pattern::Heart => heart(origin, tuning, rng),
        }
    }
}

/// Particles from one detonation plus the colour of its flash.
#[derive(Debug, Clone)]
pub struct Burst {
    pub particles: Vec<Particle>,
    pub color: Rgb,
}

/// Which life offset a ring gets: `range / 2` or `range / 1.5` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifeBand {
    Short,
    Long,
}

impl LifeBand {
    fn offset(self, range: f32) -> u32 {
        match self {
            LifeBand::Short => (range / 2.0).round() as u32,
            LifeBand::Long => (range / 1.5).round() as u32,
        }
    }
}

struct Ring {
    count: usize,
    gravity: f32,
    color: Rgb,
    life: LifeBand,
    min_size: f32,
}

impl Ring {
    fn new(count: usize, gravity: f32, color: Rgb) -> Self {
        Self {
            count,
            gravity,
            color,
            life: LifeBand::Long,
            min_size: 1.5,
        }
    }

    /// Emit `count` particles at evenly spaced angles; `velocity` maps the
    /// angle to a starting velocity.
    fn emit(
        &self,
        out: &mut Vec<Particle>,
        origin: (f32, f32),
        range: f32,
        rng: &mut Rng,
        mut velocity: impl FnMut(&mut Rng, f32) -> (f32, f32),
    ) {
        out.reserve(self.count);
        for i in 0..self.count {
            let angle = i as f32 * TAU / self.count as f32;
            let vel = velocity(rng, angle);
            let size = rng.f32() + self.min_size;
            let life = (rng.f32() * range / 2.0).round() as u32 + self.life.offset(range);
            out.push(Particle::new(origin, vel, self.gravity, life, size, self.color));
        }
    }
}

#[inline]
fn uniform(rng: &mut Rng, lo: f32, hi: f32) -> f32 {
    lo + rng.f32() * (hi - lo)
}

#[inline]
fn jitter(rng: &mut Rng) -> f32 {
    (rng.f32() - 0.5) * 0.5
}

fn circle(origin: (f32, f32), tuning: &ShowTuning, rng: &mut Rng) -> Burst {
    let color = color::random(rng);
    let speed = uniform(rng, 6.0, 8.0);
    let mut particles = Vec::new();

    let ring = Ring {
        life: LifeBand::Short,
        ..Ring::new(tuning.fire_number * 5, GRAVITY, color)
    };
    ring.emit(&mut particles, origin, tuning.range, rng, |rng, a| {
        (a.cos() * speed + jitter(rng), a.sin() * speed + jitter(rng))
    });

    Burst { particles, color }
}

fn double_circle(origin: (f32, f32), tuning: &ShowTuning, rng: &mut Rng) -> Burst {
    let count = tuning.fire_number * 3;
    let mut particles = Vec::new();

    let outer_color = color::random(rng);
    let speed = uniform(rng, 8.0, 10.0);
    Ring::new(count, GRAVITY, outer_color).emit(&mut particles, origin, tuning.range, rng, |rng, a| {
        (a.cos() * speed + jitter(rng), a.sin() * speed + jitter(rng))
    });

    let inner_color = color::random(rng);
    let speed = uniform(rng, 4.0, 7.0);
    Ring::new(count, GRAVITY, inner_color).emit(&mut particles, origin, tuning.range, rng, |rng, a| {
        (a.cos() * speed + jitter(rng), a.sin() * speed + jitter(rng))
    });

    Burst {
        particles,
        color: inner_color,
    }
}

fn planet_circle(origin: (f32, f32), tuning: &ShowTuning, rng: &mut Rng) -> Burst {
    let n = tuning.fire_number;
    let speed = uniform(rng, 4.0, 6.0);
    let mut particles = Vec::new();

    Ring::new(n * 2, GRAVITY, color::PLANET_RED).emit(&mut particles, origin, tuning.range, rng, |rng, a| {
        (a.cos() * speed + jitter(rng), a.sin() * speed + jitter(rng))
    });

    // Independent scale per component fills the disc instead of a ring
    Ring::new(n * 4, GRAVITY, color::PLANET_RED).emit(&mut particles, origin, tuning.range, rng, |rng, a| {
        (a.cos() * speed * rng.f32(), a.sin() * speed * rng.f32())
    });

    let tilt = rng.f32() * TAU;
    let (sin_t, cos_t) = tilt.sin_cos();
    let sx = speed * (rng.f32() + 2.0);
    let sy = speed * 0.6;
    Ring::new(n * 3, LIGHT_GRAVITY, color::PLANET_RING).emit(&mut particles, origin, tuning.range, rng, |rng, a| {
        let cx = a.cos() * sx + jitter(rng);
        let cy = a.sin() * sy + jitter(rng);
        (cx * cos_t - cy * sin_t, cx * sin_t + cy * cos_t)
    });

    Burst {
        particles,
        color: color::PLANET_RED,
    }
}

fn full_circle(origin: (f32, f32), tuning: &ShowTuning, rng: &mut Rng) -> Burst {
    let n = tuning.fire_number;
    let color = color::random(rng);
    let speed = uniform(rng, 8.0, 16.0);
    let mut particles = Vec::new();

    Ring::new(n * 3, HEAVY_GRAVITY, color).emit(&mut particles, origin, tuning.range, rng, |rng, a| {
        (a.cos() * speed + jitter(rng), a.sin() * speed + jitter(rng))
    });

    let fill = n * uniform(rng, 4.0, 8.0).round() as usize;
    Ring::new(fill, HEAVY_GRAVITY, color).emit(&mut particles, origin, tuning.range, rng, |rng, a| {
        (a.cos() * speed * rng.f32(), a.sin() * speed * rng.f32())
    });

    Burst { particles, color }
}

fn heart(origin: (f32, f32), tuning: &ShowTuning, rng: &mut Rng) -> Burst {
    let base = uniform(rng, 3.0, 6.0);
    let rotate = rng.f32() * TAU;

    let ring = Ring {
        min_size: 2.0,
        ..Ring::new(tuning.fire_number * 5, LIGHT_GRAVITY, color::HEART_RED)
    };
    let mut particles = Vec::new();
    ring.emit(&mut particles, origin, tuning.range, rng, |rng, t| {
        let speed = heart_speed(t, base) + (rng.f32() - 0.5) * 0.25;
        let a = t + rotate;
        (a.cos() * speed, a.sin() * speed)
    });

    Burst {
        particles,
        color: color::HEART_RED,
    }
}

/// Piecewise-linear speed over one turn: up to 2x by the first quarter,
/// back to 1x by the half, down to 0 at three quarters, back to 1x at the
/// full turn. `t` is the angle before the heart's random rotation.
pub fn heart_speed(t: f32, base: f32) -> f32 {
    let t = t.rem_euclid(TAU);
    let segment = ((t / FRAC_PI_2) as usize).min(3);
    let p = (t - segment as f32 * FRAC_PI_2) / FRAC_PI_2;
    match segment {
        0 => base * (1.0 + p),
        1 => base * (2.0 - p),
        2 => base * (1.0 - p),
        _ => base * p,
    }
}
