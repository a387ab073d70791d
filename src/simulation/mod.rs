mod glyph;
mod interaction;
mod mode;
mod particles;
mod stepper;
mod targets;

pub use glyph::FontSpec;
pub use interaction::InteractionTracker;
pub use mode::{ControlSignals, ModeController, Phase};
pub use particles::ParticleStore;
pub use stepper::{FrameInput, SimulationStepper};
pub use targets::{TargetCache, TargetSet};

use std::sync::Arc;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Summary of one simulated frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub progress: f32,
    pub phase: Phase,
}

/// The particle formation engine: owns the population and drives it frame by frame.
///
/// Input is fed through [`Formation::tracker_mut`]; the shell's flags arrive
/// as a [`ControlSignals`] snapshot per frame, so a whole frame always runs
/// in a single regime.
pub struct Formation {
    store: ParticleStore,
    targets: Arc<TargetSet>,
    tracker: InteractionTracker,
    mode: ModeController,
    stepper: SimulationStepper,
    on_complete: Box<dyn FnMut()>,
}

impl Formation {
    pub fn new(targets: Arc<TargetSet>, seed: u64, on_complete: impl FnMut() + 'static) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let store = ParticleStore::new(targets.len(), &mut rng);

        Self {
            store,
            targets,
            tracker: InteractionTracker::new(),
            mode: ModeController::new(),
            stepper: SimulationStepper::new(seed.wrapping_add(1)),
            on_complete: Box::new(on_complete),
        }
    }

    pub fn tracker_mut(&mut self) -> &mut InteractionTracker {
        &mut self.tracker
    }

    #[cfg(test)]
    pub fn mode(&self) -> &ModeController {
        &self.mode
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.store.current_pos
    }

    #[cfg(test)]
    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    /// Run one frame at elapsed time `time` (seconds).
    ///
    /// `scroll_world` shifts the pointer mapping so the field tracks the page.
    pub fn frame(&mut self, time: f32, signals: ControlSignals, scroll_world: f32) -> FrameReport {
        self.tracker.advance();

        let update = self.mode.advance(signals, self.tracker.holding());
        if update.completed {
            log::info!("Formation complete");
            (self.on_complete)();
        }

        if update.entered_formed {
            self.store.zero_velocities();
        }

        let input = FrameInput {
            time,
            active: signals.active,
            blend: update.blend,
            noise: update.noise,
            pointer: self.tracker.world_position(scroll_world),
            pointer_velocity: self.tracker.velocity(),
            pointer_speed: self.tracker.speed(),
        };
        self.stepper.step(&input, &mut self.store, &self.targets);

        FrameReport {
            progress: self.mode.progress(),
            phase: self.mode.phase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use crate::config::{FORMATION_FONT, FORMATION_TEXT, FORMED_NOISE, PARTICLE_COUNT};

    const ARMED: ControlSignals = ControlSignals { ready: true, active: false };
    const FORMED: ControlSignals = ControlSignals { ready: true, active: true };

    fn formation(count: usize) -> (Formation, Rc<Cell<u32>>) {
        let font: FontSpec = FORMATION_FONT.parse().unwrap();
        let targets = TargetCache::new(1).get_or_generate(FORMATION_TEXT, &font, count);
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let formation = Formation::new(targets, 1, move || counter.set(counter.get() + 1));
        (formation, fired)
    }

    fn max_target_distance(formation: &Formation) -> f32 {
        let targets = formation.targets();
        formation
            .positions()
            .iter()
            .enumerate()
            .map(|(i, p)| (*p - Vec3::new(targets.x[i], targets.y[i], 0.0)).length())
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_full_population() {
        let (formation, _) = formation(PARTICLE_COUNT);
        assert_eq!(formation.positions().len(), PARTICLE_COUNT);
    }

    #[test]
    fn test_hold_to_form_end_to_end() {
        let (mut formation, fired) = formation(500);
        let mut time = 0.0;

        formation.tracker_mut().pressed(true, false);
        for frame in 1..=125 {
            formation.frame(time, ARMED, 0.0);
            time += 1.0 / 60.0;
            let expected = if frame < 125 { 0 } else { 1 };
            assert_eq!(fired.get(), expected);
        }
        assert_eq!(formation.mode().progress(), 1.0);

        // At full blend the displayed cloud sits on its targets.
        assert!(max_target_distance(&formation) < 1e-3);

        // Knock the whole cloud off the text; the spring has to bring it back.
        let offset = Vec3::new(8.0, -6.0, 0.0);
        formation.store.current_pos.iter_mut().for_each(|p| *p += offset);
        assert!((max_target_distance(&formation) - offset.length()).abs() < 1e-3);

        for _ in 0..60 {
            let report = formation.frame(time, FORMED, 0.0);
            time += 1.0 / 60.0;
            assert_eq!(report.phase, Phase::Formed);
        }
        assert_eq!(fired.get(), 1);
        // 5% of the displacement is left, plus the wobble around each target.
        let wobble = FORMED_NOISE * 6.0f32.sqrt();
        assert!(max_target_distance(&formation) < offset.length() * 0.05 + wobble);
    }

    #[test]
    fn test_velocities_zeroed_on_activation() {
        let (mut formation, _) = formation(200);
        formation.store.velocity.iter_mut().for_each(|v| *v = Vec3::splat(0.5));

        formation.frame(0.0, FORMED, 0.0);
        // Zeroed on the edge, then stepped once without pointer input.
        assert!(formation.store.velocity.iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn test_release_before_completion() {
        let (mut formation, fired) = formation(200);
        formation.tracker_mut().pressed(true, false);
        for _ in 0..50 {
            formation.frame(0.0, ARMED, 0.0);
        }
        formation.tracker_mut().released();
        for _ in 0..20 {
            formation.frame(0.0, ARMED, 0.0);
        }
        assert_eq!(formation.mode().progress(), 0.0);
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn test_positions_stay_finite_with_pointer_activity() {
        let (mut formation, _) = formation(300);
        formation.tracker_mut().pressed(true, false);
        for frame in 0..400 {
            let angle = frame as f32 * 0.1;
            formation
                .tracker_mut()
                .pointer_moved(glam::Vec2::new(angle.cos(), angle.sin()) * 0.5);
            let signals = if frame < 200 { ARMED } else { FORMED };
            formation.frame(frame as f32 / 60.0, signals, 1.5);
        }
        assert!(formation.positions().iter().all(|p| p.is_finite()));
    }
}
