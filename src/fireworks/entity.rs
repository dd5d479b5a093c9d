//! Live entities and the per-run state that owns them.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use fastrand::Rng;

use crate::color::Rgb;
use crate::config::Config;

/// Alpha above which a particle is drawn at full brightness.
pub const BRIGHT_HOLD: f32 = 0.6;

/// World-space area the show is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// Ascending shell. Detonates once `y` reaches `detonation_height`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rocket {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Horizontal drift, accumulated into `vx` every tick
    pub ax: f32,
    pub size: f32,
    pub color: Rgb,
    pub alpha: f32,
    pub detonation_height: f32,
}

impl Rocket {
    pub fn should_detonate(&self) -> bool {
        self.y <= self.detonation_height
    }

    pub fn ascend(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.vx += self.ax;
    }
}

/// Ember left behind by a burst.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Gravity, accumulated into `vy` every tick
    pub ay: f32,
    pub base_life: u32,
    pub life: u32,
    pub base_size: f32,
    pub size: f32,
    pub alpha: f32,
    pub color: Rgb,
}

impl Particle {
    /// A fresh ember at `origin`. `life` is clamped to at least one tick so
    /// every particle is eventually reaped.
    pub fn new(origin: (f32, f32), velocity: (f32, f32), ay: f32, life: u32, size: f32, color: Rgb) -> Self {
        let life = life.max(1);
        Self {
            x: origin.0,
            y: origin.1,
            vx: velocity.0,
            vy: velocity.1,
            ay,
            base_life: life,
            life,
            base_size: size,
            size,
            alpha: 1.0,
            color,
        }
    }

    /// Alpha for a given remaining life: linear in the life fraction, but
    /// held at full brightness while the fraction is above [`BRIGHT_HOLD`].
    pub fn alpha_for(life: u32, base_life: u32) -> f32 {
        let fraction = life as f32 / base_life.max(1) as f32;
        if fraction > BRIGHT_HOLD { 1.0 } else { fraction.clamp(0.0, 1.0) }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }
}

/// One-frame glow marking a detonation.
#[derive(Debug, Clone, PartialEq)]
pub struct LightFlash {
    pub x: f32,
    pub y: f32,
    pub color: Rgb,
    pub radius: f32,
    pub alpha: f32,
}

/// Everything one run of the show owns.
pub struct SimState {
    pub viewport: Viewport,
    pub config: Config,
    pub rockets: Vec<Rocket>,
    pub particles: Vec<Particle>,
    /// Flashes waiting for the next render pass, oldest first
    pub flashes: Vec<LightFlash>,
    /// Due ticks of replacement rockets
    pending_spawns: BinaryHeap<Reverse<u64>>,
    pub tick: u64,
    pub rng: Rng,
}

impl SimState {
    /// Empty state. Use [`crate::fireworks::scheduler::seed_rockets`] to
    /// put the opening rockets in the air.
    pub fn new(viewport: Viewport, config: Config, rng: Rng) -> Self {
        let capacity = config.show.fire_number * 40;
        Self {
            viewport,
            config,
            rockets: Vec::new(),
            particles: Vec::with_capacity(capacity),
            flashes: Vec::new(),
            pending_spawns: BinaryHeap::new(),
            tick: 0,
            rng,
        }
    }

    pub fn push_rocket(&mut self, rocket: Rocket) {
        self.rockets.push(rocket);
    }

    pub fn extend_particles(&mut self, particles: impl IntoIterator<Item = Particle>) {
        self.particles.extend(particles);
    }

    pub fn push_flash(&mut self, flash: LightFlash) {
        self.flashes.push(flash);
    }

    /// Take the most recently queued flash.
    pub fn pop_flash(&mut self) -> Option<LightFlash> {
        self.flashes.pop()
    }

    pub fn schedule_spawn(&mut self, due_tick: u64) {
        self.pending_spawns.push(Reverse(due_tick));
    }

    /// Remove and count every spawn due at or before the current tick.
    pub fn take_due_spawns(&mut self) -> usize {
        let mut due = 0;
        while let Some(Reverse(at)) = self.pending_spawns.peek() {
            if *at > self.tick {
                break;
            }
            self.pending_spawns.pop();
            due += 1;
        }
        due
    }

    pub fn pending_spawns(&self) -> usize {
        self.pending_spawns.len()
    }

    pub fn next_spawn_due(&self) -> Option<u64> {
        self.pending_spawns.peek().map(|Reverse(at)| *at)
    }

    /// Drop every entity and cancel every pending spawn.
    pub fn clear(&mut self) {
        self.rockets.clear();
        self.particles.clear();
        self.flashes.clear();
        self.pending_spawns.clear();
    }
}
