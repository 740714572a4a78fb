//! Particle state and motion.
//!
//! Particles live in surface-local pixel coordinates with y growing downward.
//! They move by their velocity once per frame and wrap toroidally at the
//! surface edges, so after every [`Particle::advance`] the position lies in
//! `[0, width) × [0, height)`.

use glam::Vec2;
use rand::Rng;

use crate::config::GroundConfig;

/// A moving point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Pixels per frame.
    pub velocity: Vec2,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    /// Sample a particle uniformly inside `bounds` with a speed drawn from
    /// the configured range on each axis.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, bounds: Vec2, config: &GroundConfig) -> Self {
        let position = Vec2::new(
            wrap(rng.gen::<f32>() * bounds.x, bounds.x),
            wrap(rng.gen::<f32>() * bounds.y, bounds.y),
        );

        let speed_x = rng.gen_range(config.min_speed_x..=config.max_speed_x);
        let speed_y = rng.gen_range(config.min_speed_y..=config.max_speed_y);
        let sign_x = config
            .direction_x
            .sign()
            .unwrap_or_else(|| random_sign(rng));
        let sign_y = config
            .direction_y
            .sign()
            .unwrap_or_else(|| random_sign(rng));

        Self {
            position,
            velocity: Vec2::new(speed_x * sign_x, speed_y * sign_y),
        }
    }

    /// Move one frame and wrap back inside `bounds`.
    pub fn advance(&mut self, bounds: Vec2) {
        self.position += self.velocity;
        self.position = Vec2::new(
            wrap(self.position.x, bounds.x),
            wrap(self.position.y, bounds.y),
        );
    }
}

/// Spawn `count` particles inside `bounds`.
pub fn spawn_particles<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    bounds: Vec2,
    config: &GroundConfig,
) -> Vec<Particle> {
    (0..count)
        .map(|_| Particle::spawn(rng, bounds, config))
        .collect()
}

/// Wrap `value` into `[0, extent)`.
///
/// A particle leaving one edge re-enters at the opposite one, carrying over
/// however far it overshot. A zero-length axis pins the coordinate to 0.
pub fn wrap(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    if (0.0..extent).contains(&value) {
        return value;
    }
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to exactly `extent` for tiny negative inputs
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.gen_bool(0.5) {
        1.0
    } else {
        -1.0
    }
}
