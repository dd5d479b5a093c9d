//! Run lifecycle: activation allocates a surface and a fresh state,
//! deactivation drops both, and every tick advances the show one frame.

use fastrand::Rng;

use super::entity::{SimState, Viewport};
use super::{physics, render, scheduler};
use crate::config::Config;
use crate::surface::PixelSurface;

/// One activation's worth of state.
pub struct Run {
    pub state: SimState,
    pub surface: PixelSurface,
}

pub struct Controller {
    config: Config,
    run: Option<Run>,
}

impl Controller {
    /// Out-of-range tuning is repaired here, so every run sees a usable config.
    pub fn new(mut config: Config) -> Self {
        config.sanitize();
        Self { config, run: None }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    /// Feed the activation signal. Only edges do anything; a repeated
    /// `true` keeps the current run and its surface size.
    pub fn set_active(&mut self, active: bool, width: usize, height: usize) {
        match (active, self.is_active()) {
            (true, false) => self.activate(width, height),
            (false, true) => self.deactivate(),
            _ => {}
        }
    }

    /// Start a run on a `width` x `height` pixel surface, replacing any
    /// run already in progress.
    pub fn activate(&mut self, width: usize, height: usize) {
        if self.run.is_some() {
            self.deactivate();
        }

        let scale = self.config.world_scale;
        let viewport = Viewport::new(width as f32 * scale, height as f32 * scale);
        // Fresh seed per run unless pinned, logged so a show can be replayed
        let seed = self.config.seed.unwrap_or_else(|| fastrand::u64(..));

        let mut state = SimState::new(viewport, self.config.clone(), Rng::with_seed(seed));
        scheduler::seed_rockets(&mut state);
        let surface = PixelSurface::new(width, height, self.config.render.background);

        log::info!(
            "Fireworks started on {}x{} surface ({}x{} world), {} rockets, seed {}",
            width,
            height,
            viewport.width,
            viewport.height,
            state.rockets.len(),
            seed
        );
        self.run = Some(Run { state, surface });
    }

    /// Tear the run down. Pending replacement rockets go with it.
    pub fn deactivate(&mut self) {
        if let Some(mut run) = self.run.take() {
            log::info!(
                "Fireworks stopped at tick {} ({} particles, {} pending launches dropped)",
                run.state.tick,
                run.state.particles.len(),
                run.state.pending_spawns()
            );
            run.state.clear();
        }
    }

    /// Advance one frame: launches and detonations, particle physics, then
    /// paint. Returns `false` when there was nothing to advance.
    pub fn tick(&mut self) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };
        if run.surface.is_empty() {
            return false;
        }

        let state = &mut run.state;
        scheduler::step(state);
        physics::step(state);
        render::draw_frame(state, &mut run.surface);
        state.tick += 1;
        true
    }

    pub fn state(&self) -> Option<&SimState> {
        self.run.as_ref().map(|run| &run.state)
    }

    pub fn surface(&self) -> Option<&PixelSurface> {
        self.run.as_ref().map(|run| &run.surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShowTuning;
    use crate::fireworks::patterns::Pattern;

    fn seeded(seed: u64) -> Controller {
        Controller::new(Config {
            seed: Some(seed),
            ..Config::default()
        })
    }

    #[test]
    fn test_inactive_tick_is_noop() {
        let mut c = seeded(1);
        assert!(!c.tick());
        assert!(c.state().is_none());
    }

    #[test]
    fn test_activation_edges() {
        let mut c = seeded(1);
        c.set_active(true, 120, 60);
        assert!(c.is_active());
        assert_eq!(c.state().map(|s| s.rockets.len()), Some(5));

        for _ in 0..10 {
            assert!(c.tick());
        }
        // Repeated high signal keeps the run
        c.set_active(true, 40, 20);
        assert_eq!(c.state().map(|s| s.tick), Some(10));
        assert_eq!(c.surface().map(|s| s.width()), Some(120));

        c.set_active(false, 0, 0);
        assert!(!c.is_active());
    }

    #[test]
    fn test_deactivate_mid_flight_stops_everything() {
        let mut c = seeded(2);
        c.activate(100, 50);
        // Run until something has detonated and a relaunch is pending
        let mut ticks = 0;
        while c.state().map_or(0, |s| s.pending_spawns()) == 0 {
            assert!(c.tick());
            ticks += 1;
            assert!(ticks < 1000, "no detonation");
        }

        c.deactivate();
        let (_, longest) = c.config().respawn_delay_ticks();
        for _ in 0..=longest * 2 {
            assert!(!c.tick());
        }
        assert!(c.state().is_none());
        assert!(c.surface().is_none());
    }

    #[test]
    fn test_reactivation_starts_fresh() {
        let mut c = seeded(3);
        c.activate(100, 50);
        for _ in 0..200 {
            c.tick();
        }
        c.set_active(false, 0, 0);
        c.set_active(true, 80, 40);

        let state = c.state().unwrap();
        assert_eq!(state.tick, 0);
        assert_eq!(state.rockets.len(), 5);
        assert!(state.particles.is_empty());
        assert_eq!(state.pending_spawns(), 0);
        assert_eq!(state.viewport, Viewport::new(480.0, 240.0));
    }

    #[test]
    fn test_zero_sized_surface_skips_ticks() {
        let mut c = seeded(4);
        c.activate(0, 0);
        assert!(c.is_active());
        assert!(!c.tick());
        assert_eq!(c.state().map(|s| s.tick), Some(0));
    }

    #[test]
    fn test_flash_never_survives_a_tick() {
        let mut c = seeded(5);
        c.activate(100, 50);
        for _ in 0..600 {
            c.tick();
            assert_eq!(c.state().map(|s| s.flashes.len()), Some(0));
        }
    }

    #[test]
    fn test_population_stays_bounded() {
        let mut c = seeded(6);
        c.activate(160, 80);
        let mut peak = 0;
        for _ in 0..3000 {
            c.tick();
            let state = c.state().unwrap();
            assert!(state.rockets.len() + state.pending_spawns() <= 5);
            assert!(state.particles.iter().all(|p| p.life > 0));
            peak = peak.max(state.particles.len());
        }
        assert!(peak > 0);
        assert!(peak < 5 * 200);
    }

    #[test]
    fn test_same_seed_same_show() {
        let mut a = seeded(77);
        let mut b = seeded(77);
        a.activate(100, 50);
        b.activate(100, 50);
        for _ in 0..400 {
            a.tick();
            b.tick();
        }
        let (sa, sb) = (a.state().unwrap(), b.state().unwrap());
        assert_eq!(sa.rockets, sb.rockets);
        assert_eq!(sa.particles, sb.particles);
        assert_eq!(sa.pending_spawns(), sb.pending_spawns());
        assert_eq!(a.surface(), b.surface());
    }

    #[test]
    fn test_restricted_patterns() {
        let mut c = Controller::new(Config {
            seed: Some(8),
            patterns: vec![Pattern::Heart],
            ..Config::default()
        });
        c.activate(100, 50);
        let mut seen = 0;
        for _ in 0..400 {
            c.tick();
            let state = c.state().unwrap();
            assert!(state.particles.iter().all(|p| p.color == crate::color::HEART_RED));
            seen += state.particles.len();
        }
        assert!(seen > 0);
    }

    #[test]
    fn test_malformed_tuning_is_repaired() {
        let mut c = Controller::new(Config {
            seed: Some(9),
            show: ShowTuning {
                respawn_delay_ms: (1500, 500),
                fire_number: 0,
                ..ShowTuning::default()
            },
            ..Config::default()
        });
        assert_eq!(c.config().show.respawn_delay_ms, (500, 1500));
        assert_eq!(c.config().show.fire_number, 1);

        c.activate(100, 50);
        let mut detonations = 0;
        for _ in 0..2000 {
            let rockets = c.state().map_or(0, |s| s.rockets.len());
            c.tick();
            let state = c.state().unwrap();
            if state.rockets.len() < rockets {
                detonations += 1;
                // Fresh particles have had exactly one physics step
                assert!(state.particles.iter().any(|p| p.life + 1 == p.base_life));
            }
        }
        assert!(detonations > 0);
    }
}
