//! Per-frame particle integrator with a chaotic and a formed regime.

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{
    CHAOS_DAMPING, DRAG_FALLOFF, DRAG_RADIUS_SQ, DRAG_STRENGTH, DRIFT_AMPLITUDE,
    DRIFT_SPATIAL_FREQ, DRIFT_TIME_FREQ, FORMED_DAMPING, NOISE_EPSILON, POINTER_SPEED_EPSILON,
    PUSH_FALLOFF, PUSH_JITTER, PUSH_RADIUS_SQ, PUSH_STRENGTH, SPRING_PULL, WOBBLE_DEPTH_SPATIAL_FREQ,
    WOBBLE_DEPTH_TIME_FREQ, WOBBLE_SPATIAL_FREQ, WOBBLE_TIME_FREQ, WRAP_HALF_X, WRAP_HALF_Y,
};
use crate::simulation::particles::ParticleStore;
use crate::simulation::targets::TargetSet;

/// Everything the stepper reads for one frame, captured once up front.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    /// Seconds since mount
    pub time: f32,
    /// Snapshot of the formed flag for the whole frame
    pub active: bool,
    /// Eased progress used to pull the chaotic cloud toward the targets
    pub blend: f32,
    /// Formed-regime wobble amplitude
    pub noise: f32,
    /// Smoothed pointer in world units
    pub pointer: Vec2,
    /// Per-frame change of the smoothed pointer (normalized units)
    pub pointer_velocity: Vec2,
    pub pointer_speed: f32,
}

/// Linear falloff that reaches zero at `radius`. Distance 0 gives full strength.
fn falloff(dist: f32, radius: f32) -> f32 {
    (1.0 - dist / radius).max(0.0)
}

/// Wrap a chaotic position back into the visible field.
fn wrap_field(pos: &mut Vec3) {
    if pos.x > WRAP_HALF_X {
        pos.x -= 2.0 * WRAP_HALF_X;
    } else if pos.x < -WRAP_HALF_X {
        pos.x += 2.0 * WRAP_HALF_X;
    }
    if pos.y > WRAP_HALF_Y {
        pos.y -= 2.0 * WRAP_HALF_Y;
    } else if pos.y < -WRAP_HALF_Y {
        pos.y += 2.0 * WRAP_HALF_Y;
    }
}

pub struct SimulationStepper {
    rng: StdRng,
}

impl SimulationStepper {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Advance every particle by one frame. Allocation-free.
    pub fn step(&mut self, input: &FrameInput, store: &mut ParticleStore, targets: &TargetSet) {
        debug_assert_eq!(store.len(), targets.len());

        if input.active {
            self.step_formed(input, store, targets);
        } else {
            step_chaotic(input, store, targets);
        }
    }

    fn step_formed(&mut self, input: &FrameInput, store: &mut ParticleStore, targets: &TargetSet) {
        let wobble_t = input.time * WOBBLE_TIME_FREQ;
        let depth_t = input.time * WOBBLE_DEPTH_TIME_FREQ;
        let has_noise = input.noise > NOISE_EPSILON;
        let pointer_moving = input.pointer_speed > POINTER_SPEED_EPSILON;

        for i in 0..store.len() {
            let (tx, ty) = (targets.x[i], targets.y[i]);
            let mut rest = Vec3::new(tx, ty, 0.0);

            if has_noise {
                let phase = targets.phase[i];
                rest.x += (ty * WOBBLE_SPATIAL_FREQ + wobble_t + phase).sin() * input.noise;
                rest.y += (tx * WOBBLE_SPATIAL_FREQ + wobble_t + phase).cos() * input.noise;
                rest.z += (tx * WOBBLE_DEPTH_SPATIAL_FREQ + depth_t).sin() * input.noise * 2.0;
            }

            let pos = &mut store.current_pos[i];
            let vel = &mut store.velocity[i];

            if pointer_moving {
                let dist_sq = (input.pointer - pos.truncate()).length_squared();
                if dist_sq < PUSH_RADIUS_SQ {
                    let force = falloff(dist_sq.sqrt(), PUSH_FALLOFF);
                    let jitter = Vec3::new(
                        (self.rng.gen::<f32>() - 0.5) * PUSH_JITTER,
                        (self.rng.gen::<f32>() - 0.5) * PUSH_JITTER,
                        (self.rng.gen::<f32>() - 0.5) * PUSH_JITTER,
                    );
                    let push = input.pointer_velocity.extend(0.0) * PUSH_STRENGTH;
                    *vel += (push + jitter) * force;
                }
            }

            *vel *= FORMED_DAMPING;
            *pos += *vel;
            *pos += (rest - *pos) * SPRING_PULL;

            debug_assert!(pos.is_finite(), "particle {} left the finite range", i);
        }
    }
}

fn step_chaotic(input: &FrameInput, store: &mut ParticleStore, targets: &TargetSet) {
    let drift_t = input.time * DRIFT_TIME_FREQ;
    let pointer_moving = input.pointer_speed > POINTER_SPEED_EPSILON;

    for i in 0..store.len() {
        let chaos = &mut store.chaos_pos[i];
        let vel = &mut store.velocity[i];

        let drift = Vec2::new(
            (chaos.y * DRIFT_SPATIAL_FREQ + drift_t).sin(),
            (chaos.x * DRIFT_SPATIAL_FREQ + drift_t).cos(),
        ) * DRIFT_AMPLITUDE;

        if pointer_moving {
            let dist_sq = (input.pointer - chaos.truncate()).length_squared();
            if dist_sq < DRAG_RADIUS_SQ {
                let force = falloff(dist_sq.sqrt(), DRAG_FALLOFF);
                *vel += (input.pointer_velocity * force * DRAG_STRENGTH).extend(0.0);
            }
        }

        *vel = (*vel + drift.extend(0.0)) * CHAOS_DAMPING;
        *chaos += *vel;
        wrap_field(chaos);

        let target = Vec3::new(targets.x[i], targets.y[i], 0.0);
        store.current_pos[i] = chaos.lerp(target, input.blend);

        debug_assert!(store.current_pos[i].is_finite(), "particle {} left the finite range", i);
    }
}
