//! Per-tick particle integration.

use super::entity::{Particle, SimState};

/// Advance one particle a tick. Returns `false` once its life runs out.
///
/// Alpha and size come from the life value before the decrement, i.e. the
/// value of the frame about to be drawn.
pub fn advance(particle: &mut Particle) -> bool {
    particle.x += particle.vx;
    particle.y += particle.vy;
    particle.vy += particle.ay;

    particle.alpha = Particle::alpha_for(particle.life, particle.base_life);
    particle.size = particle.alpha * particle.base_size;

    particle.life = particle.life.saturating_sub(1);
    particle.is_alive()
}

/// Advance every particle and drop the ones that expired this tick.
pub fn step(state: &mut SimState) {
    state.particles.retain_mut(advance);
}
