use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::{CHAOS_HEIGHT_SPAN, CHAOS_RADIUS_MIN, CHAOS_RADIUS_SPAN};

/// Kinematic state for a fixed particle population.
///
/// Buffers are sized once at construction and never reallocated.
pub struct ParticleStore {
    /// Free-roaming position used by the chaotic regime
    pub chaos_pos: Vec<Vec3>,
    /// Integrated velocity, shared by both regimes
    pub velocity: Vec<Vec3>,
    /// Authoritative render position
    pub current_pos: Vec<Vec3>,
}

impl ParticleStore {
    /// Scatter `count` particles over a ring-shaped cloud at rest.
    pub fn new<R: Rng>(count: usize, rng: &mut R) -> Self {
        let mut chaos_pos = Vec::with_capacity(count);

        for _ in 0..count {
            let angle = rng.gen::<f32>() * TAU;
            let radius = CHAOS_RADIUS_MIN + rng.gen::<f32>() * CHAOS_RADIUS_SPAN;
            chaos_pos.push(Vec3::new(
                angle.cos() * radius,
                (rng.gen::<f32>() - 0.5) * CHAOS_HEIGHT_SPAN,
                angle.sin() * radius,
            ));
        }

        Self {
            current_pos: chaos_pos.clone(),
            velocity: vec![Vec3::ZERO; count],
            chaos_pos,
        }
    }

    pub fn len(&self) -> usize {
        self.current_pos.len()
    }

    /// Drop all residual momentum.
    pub fn zero_velocities(&mut self) {
        self.velocity.fill(Vec3::ZERO);
    }
}
