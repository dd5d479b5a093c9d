//! Launches, ascent and detonation.
//!
//! Replacement rockets are not timers: a detonation pushes the due tick into
//! the state's spawn queue and [`step`] spawns whatever has come due.

use super::entity::{LightFlash, Rocket, SimState};
use super::patterns::{Burst, Pattern};
use crate::color;

/// Put the opening salvo in the air: rockets start anywhere from the bottom
/// edge to two and a half ranges below it and aim well above center.
pub fn seed_rockets(state: &mut SimState) {
    let range = state.config.show.range;
    let (_, cy) = state.viewport.center();
    for _ in 0..state.config.show.initial_rockets {
        let y = state.viewport.height + state.rng.f32() * range * 2.5;
        let detonation_height = cy - range + state.rng.f32() * range;
        let rocket = launch(state, y, detonation_height);
        state.push_rocket(rocket);
    }
}

/// Replacement rocket: starts `launch_drop` below the bottom edge and aims
/// for the upper half of the band above center.
pub fn spawn_replacement(state: &mut SimState) {
    let range = state.config.show.range;
    let (_, cy) = state.viewport.center();
    let y = state.viewport.height + state.config.show.launch_drop;
    let detonation_height = cy - range + state.rng.f32() * range * 0.5;
    let rocket = launch(state, y, detonation_height);
    log::trace!(
        "tick {}: rocket launched from x={:.1} toward y={:.1}",
        state.tick,
        rocket.x,
        detonation_height
    );
    state.push_rocket(rocket);
}

fn launch(state: &mut SimState, y: f32, detonation_height: f32) -> Rocket {
    let range = state.config.show.range;
    let (cx, _) = state.viewport.center();
    let rng = &mut state.rng;
    Rocket {
        x: cx + rng.f32() * range / 2.0 - range / 4.0,
        y,
        vx: rng.f32() - 0.5,
        vy: -(rng.f32() + 4.0),
        ax: rng.f32() * 0.06 - 0.03,
        size: rng.f32() + 0.5,
        color: color::ROCKET_YELLOW,
        alpha: 1.0,
        detonation_height,
    }
}

/// Detonate the rocket at `index` with a randomly chosen enabled pattern.
pub fn detonate(state: &mut SimState, index: usize) -> Pattern {
    let pattern = Pattern::random(&mut state.rng, &state.config.patterns);
    detonate_with(state, index, pattern);
    pattern
}

/// Detonate the rocket at `index` with `pattern`: the rocket is removed,
/// its burst and one flash are queued and exactly one replacement is
/// scheduled inside the respawn window.
pub fn detonate_with(state: &mut SimState, index: usize, pattern: Pattern) {
    let rocket = state.rockets.remove(index);
    let origin = (rocket.x, rocket.y);

    let Burst { particles, color } = pattern.generate(origin, &state.config.show, &mut state.rng);
    log::debug!(
        "tick {}: {} burst at ({:.1}, {:.1}) with {} particles",
        state.tick,
        pattern.name(),
        origin.0,
        origin.1,
        particles.len()
    );
    state.extend_particles(particles);
    state.push_flash(LightFlash {
        x: origin.0,
        y: origin.1,
        color,
        radius: state.config.show.range * 2.0,
        alpha: state.config.render.flash_alpha,
    });

    let (lo, hi) = state.config.respawn_delay_ticks();
    let delay = state.rng.u64(lo..=hi);
    state.schedule_spawn(state.tick + delay);
}

/// One scheduler tick: spawn due replacements, then ascend or detonate
/// every rocket.
pub fn step(state: &mut SimState) {
    for _ in 0..state.take_due_spawns() {
        spawn_replacement(state);
    }

    let mut i = state.rockets.len();
    while i > 0 {
        i -= 1;
        if state.rockets[i].should_detonate() {
            detonate(state, i);
        } else {
            state.rockets[i].ascend();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fireworks::entity::Viewport;
    use fastrand::Rng;

    fn empty_state(patterns: Vec<Pattern>) -> SimState {
        let config = Config {
            patterns,
            ..Config::default()
        };
        SimState::new(Viewport::new(800.0, 600.0), config, Rng::with_seed(42))
    }

    fn rocket_at(x: f32, y: f32, vy: f32, detonation_height: f32) -> Rocket {
        Rocket {
            x,
            y,
            vx: 0.0,
            vy,
            ax: 0.0,
            size: 1.0,
            color: color::ROCKET_YELLOW,
            alpha: 1.0,
            detonation_height,
        }
    }

    #[test]
    fn test_seed_rockets_bands() {
        let mut state = empty_state(Pattern::ALL.to_vec());
        seed_rockets(&mut state);
        assert_eq!(state.rockets.len(), 5);
        for r in &state.rockets {
            assert!((375.0..=425.0).contains(&r.x));
            assert!((600.0..=850.0).contains(&r.y));
            assert!((200.0..=300.0).contains(&r.detonation_height));
            assert!(r.vy <= -4.0 && r.vy >= -5.0);
            assert!(r.ax.abs() <= 0.03);
        }
    }

    #[test]
    fn test_replacement_bands() {
        let mut state = empty_state(Pattern::ALL.to_vec());
        for _ in 0..20 {
            spawn_replacement(&mut state);
        }
        for r in &state.rockets {
            assert_eq!(r.y, 700.0);
            assert!((200.0..=250.0).contains(&r.detonation_height));
        }
    }

    #[test]
    fn test_detonation_scenario() {
        let mut state = empty_state(vec![Pattern::Circle]);
        state.push_rocket(rocket_at(400.0, 300.0, -10.0, 200.0));

        let mut ticks = 0;
        while !state.rockets.is_empty() {
            step(&mut state);
            state.tick += 1;
            ticks += 1;
            assert!(ticks < 100, "rocket never detonated");
        }

        assert_eq!(state.particles.len(), 50);
        assert_eq!(state.flashes.len(), 1);
        let flash = &state.flashes[0];
        assert_eq!((flash.x, flash.y), (400.0, 200.0));
        assert_eq!(flash.radius, 200.0);
        assert!(state.particles.iter().all(|p| (p.x, p.y) == (400.0, 200.0)));
        assert_eq!(state.pending_spawns(), 1);
    }

    #[test]
    fn test_one_replacement_within_window() {
        let mut state = empty_state(vec![Pattern::Heart]);
        state.push_rocket(rocket_at(400.0, 200.0, -4.0, 200.0));

        step(&mut state);
        assert!(state.rockets.is_empty());
        let detonated_at = state.tick;
        let due = state.next_spawn_due().unwrap();
        assert!((detonated_at + 30..=detonated_at + 90).contains(&due));

        let mut appeared_at = None;
        for _ in 0..90 {
            state.tick += 1;
            step(&mut state);
            if appeared_at.is_none() && !state.rockets.is_empty() {
                appeared_at = Some(state.tick);
            }
        }
        assert_eq!(appeared_at, Some(due));
        assert_eq!(state.rockets.len(), 1);
        assert_eq!(state.pending_spawns(), 0);
    }

    #[test]
    fn test_each_rocket_detonates_once() {
        let mut state = empty_state(vec![Pattern::Circle]);
        state.push_rocket(rocket_at(100.0, 100.0, -4.0, 150.0));
        state.push_rocket(rocket_at(200.0, 500.0, -4.0, 150.0));

        step(&mut state);
        assert_eq!(state.rockets.len(), 1);
        assert_eq!(state.flashes.len(), 1);
        assert_eq!(state.rockets[0].y, 496.0);

        step(&mut state);
        assert_eq!(state.flashes.len(), 1);
        assert_eq!(state.pending_spawns(), 1);
    }

    #[test]
    fn test_ascending_rocket_moves_up() {
        let mut state = empty_state(Pattern::ALL.to_vec());
        seed_rockets(&mut state);
        let before: Vec<f32> = state.rockets.iter().map(|r| r.y).collect();
        step(&mut state);
        for (r, y) in state.rockets.iter().zip(before) {
            assert!(r.y < y);
            assert!(r.vy < 0.0);
        }
    }
}
