//! Show tuning.
//!
//! Every field has a default matching the stock show, so a config file only
//! needs the values it wants to change. Loaded from JSON with `--config`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::{self, Rgb};
use crate::error::{Error, Result};
use crate::fireworks::patterns::Pattern;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
    /// Simulation steps per second
    pub ticks_per_second: u32,
    /// World units per surface pixel
    pub world_scale: f32,
    pub show: ShowTuning,
    pub render: RenderTuning,
    /// Patterns eligible for random selection
    pub patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowTuning {
    /// Base distance used for launch bands, particle life and flash radius
    pub range: f32,
    /// Shared density constant; every ring is a multiple of it
    pub fire_number: usize,
    /// Rockets in flight at activation
    pub initial_rockets: usize,
    /// Replacement delay window in milliseconds, inclusive
    pub respawn_delay_ms: (u32, u32),
    /// How far below the bottom edge replacement rockets start
    pub launch_drop: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderTuning {
    /// Surface colour at activation
    #[serde(with = "color::hex")]
    pub background: Rgb,
    /// Colour painted over the previous frame each tick
    #[serde(with = "color::hex")]
    pub fade_color: Rgb,
    /// Opacity of the trailing fade; lower means longer trails
    pub fade_alpha: f32,
    /// Opacity of detonation flashes
    pub flash_alpha: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            ticks_per_second: 60,
            world_scale: 6.0,
            show: ShowTuning::default(),
            render: RenderTuning::default(),
            patterns: Pattern::ALL.to_vec(),
        }
    }
}

impl Default for ShowTuning {
    fn default() -> Self {
        Self {
            range: 100.0,
            fire_number: 10,
            initial_rockets: 5,
            respawn_delay_ms: (500, 1500),
            launch_drop: 100.0,
        }
    }
}

impl Default for RenderTuning {
    fn default() -> Self {
        Self {
            background: color::BLACK,
            fade_color: color::NIGHT,
            fade_alpha: 0.15,
            flash_alpha: 0.03,
        }
    }
}

impl Config {
    /// Read a JSON config file and repair anything out of range.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = serde_json::from_str(&text).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.sanitize();
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Clamp malformed values to the nearest usable ones, logging each repair.
    pub fn sanitize(&mut self) {
        if self.ticks_per_second == 0 {
            log::warn!("ticks_per_second must be positive, using 60");
            self.ticks_per_second = 60;
        }
        if !(self.world_scale > 0.0) || !self.world_scale.is_finite() {
            log::warn!("world_scale {} is not positive, using 1.0", self.world_scale);
            self.world_scale = 1.0;
        }

        let show = &mut self.show;
        if !(show.range > 0.0) || !show.range.is_finite() {
            log::warn!("show.range {} is not positive, using 100", show.range);
            show.range = 100.0;
        }
        if show.fire_number == 0 {
            log::warn!("show.fire_number must be at least 1");
            show.fire_number = 1;
        }
        let (lo, hi) = show.respawn_delay_ms;
        if lo > hi {
            log::warn!("show.respawn_delay_ms [{lo}, {hi}] is inverted, swapping");
            show.respawn_delay_ms = (hi, lo);
        }
        if !show.launch_drop.is_finite() {
            log::warn!("show.launch_drop {} is not finite, using 100", show.launch_drop);
            show.launch_drop = 100.0;
        }

        let render = &mut self.render;
        for (name, alpha) in [
            ("render.fade_alpha", &mut render.fade_alpha),
            ("render.flash_alpha", &mut render.flash_alpha),
        ] {
            if !(0.0..=1.0).contains(&*alpha) {
                let clamped = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
                log::warn!("{name} {alpha} outside [0, 1], using {clamped}");
                *alpha = clamped;
            }
        }

        if self.patterns.is_empty() {
            log::warn!("no patterns enabled, enabling all of them");
            self.patterns = Pattern::ALL.to_vec();
        }
    }

    /// Respawn window converted to whole ticks, never shorter than one tick.
    /// The bounds come back ordered even if the window was never sanitized.
    pub fn respawn_delay_ticks(&self) -> (u64, u64) {
        let (a, b) = self.show.respawn_delay_ms;
        (self.ms_to_ticks(a.min(b)), self.ms_to_ticks(a.max(b)))
    }

    fn ms_to_ticks(&self, ms: u32) -> u64 {
        let ticks = (ms as u64 * self.ticks_per_second as u64 + 500) / 1000;
        ticks.max(1)
    }
}
