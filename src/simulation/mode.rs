//! Hold-to-form state machine.
//!
//! The controller is driven by two eased scalars rather than discrete
//! transitions: `progress` rises while the pointer is held and decays when it
//! is released, and `noise` eases toward the formed jitter amplitude once the
//! shell marks formation active. [`Phase`] is derived from those scalars for
//! reporting only.

use std::fmt;

use crate::config::{
    FORMED_NOISE, NOISE_EASE, PROGRESS_FALL_STEPS, PROGRESS_RISE_STEPS, PROGRESS_STEPS,
};

/// Cubic ease-in-out on [0, 1].
pub fn ease_in_out_cubic(x: f32) -> f32 {
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
    }
}

/// Externally owned flags, snapshotted once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlSignals {
    /// The intro gate has been dismissed
    pub ready: bool,
    /// Formation completed and the shell switched to the formed regime
    pub active: bool,
}

/// Conceptual state of the formation gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Armed,
    Forming,
    Releasing,
    Formed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Armed => "armed",
            Phase::Forming => "forming",
            Phase::Releasing => "releasing",
            Phase::Formed => "formed",
        };
        f.write_str(name)
    }
}

/// Result of advancing the controller by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeUpdate {
    /// Eased progress, used as the chaos-to-target blend factor
    pub blend: f32,
    /// Current jitter amplitude for the formed regime
    pub noise: f32,
    /// Progress reached 1 for the first time this frame
    pub completed: bool,
    /// `active` rose from false to true this frame
    pub entered_formed: bool,
}

pub struct ModeController {
    /// Progress in 1/PROGRESS_STEPS increments
    steps: u32,
    noise: f32,
    was_active: bool,
    completion_fired: bool,
    phase: Phase,
}

impl ModeController {
    pub fn new() -> Self {
        Self {
            steps: 0,
            noise: 0.0,
            was_active: false,
            completion_fired: false,
            phase: Phase::Idle,
        }
    }

    pub fn progress(&self) -> f32 {
        self.steps as f32 / PROGRESS_STEPS as f32
    }

    #[cfg(test)]
    pub fn noise(&self) -> f32 {
        self.noise
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn advance(&mut self, signals: ControlSignals, holding: bool) -> ModeUpdate {
        let mut completed = false;

        if !signals.active && signals.ready {
            if holding {
                self.steps = (self.steps + PROGRESS_RISE_STEPS).min(PROGRESS_STEPS);
                if self.steps == PROGRESS_STEPS && !self.completion_fired {
                    self.completion_fired = true;
                    completed = true;
                }
            } else {
                self.steps = self.steps.saturating_sub(PROGRESS_FALL_STEPS);
            }
        }

        let target_noise = if signals.active { FORMED_NOISE } else { 0.0 };
        self.noise += (target_noise - self.noise) * NOISE_EASE;

        let entered_formed = signals.active && !self.was_active;
        self.was_active = signals.active;

        self.update_phase(signals, holding);

        ModeUpdate {
            blend: ease_in_out_cubic(self.progress()),
            noise: self.noise,
            completed,
            entered_formed,
        }
    }

    fn update_phase(&mut self, signals: ControlSignals, holding: bool) {
        let phase = if signals.active {
            Phase::Formed
        } else if !signals.ready {
            Phase::Idle
        } else if holding {
            Phase::Forming
        } else if self.steps > 0 {
            Phase::Releasing
        } else {
            Phase::Armed
        };

        if phase != self.phase {
            log::info!("Mode {} -> {} (progress {:.3})", self.phase, phase, self.progress());
            self.phase = phase;
        }
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARMED: ControlSignals = ControlSignals { ready: true, active: false };
    const FORMED: ControlSignals = ControlSignals { ready: true, active: true };

    #[test]
    fn test_ease_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
        assert!((ease_in_out_cubic(0.25) - 0.0625).abs() < 1e-6);
    }

    #[test]
    fn test_progress_idle_without_ready() {
        let mut mode = ModeController::new();
        for _ in 0..50 {
            mode.advance(ControlSignals::default(), true);
        }
        assert_eq!(mode.progress(), 0.0);
        assert_eq!(mode.phase(), Phase::Idle);
    }

    #[test]
    fn test_progress_rises_by_fixed_step() {
        let mut mode = ModeController::new();
        for frame in 1..=10 {
            mode.advance(ARMED, true);
            assert!((mode.progress() - 0.008 * frame as f32).abs() < 1e-6);
        }
        assert_eq!(mode.phase(), Phase::Forming);
    }

    #[test]
    fn test_hold_completes_once_at_125_frames() {
        let mut mode = ModeController::new();
        let mut completions = 0;
        for frame in 1..=200 {
            let update = mode.advance(ARMED, true);
            if update.completed {
                completions += 1;
                assert_eq!(frame, 125);
            }
            assert!((0.0..=1.0).contains(&mode.progress()));
        }
        assert_eq!(completions, 1);
        assert_eq!(mode.progress(), 1.0);
    }

    #[test]
    fn test_release_decays_without_completion() {
        let mut mode = ModeController::new();
        for _ in 0..50 {
            assert!(!mode.advance(ARMED, true).completed);
        }
        assert!((mode.progress() - 0.4).abs() < 1e-6);

        for frame in 1..=20 {
            assert!(!mode.advance(ARMED, false).completed);
            assert!((mode.progress() - (0.4 - 0.02 * frame as f32)).abs() < 1e-6);
            if frame < 20 {
                assert_eq!(mode.phase(), Phase::Releasing);
            }
        }
        assert_eq!(mode.progress(), 0.0);
        assert_eq!(mode.phase(), Phase::Armed);
    }

    #[test]
    fn test_progress_frozen_while_active() {
        let mut mode = ModeController::new();
        for _ in 0..125 {
            mode.advance(ARMED, true);
        }
        for _ in 0..30 {
            mode.advance(FORMED, false);
        }
        assert_eq!(mode.progress(), 1.0);
        assert_eq!(mode.phase(), Phase::Formed);
    }

    #[test]
    fn test_noise_follows_exact_easing() {
        let mut mode = ModeController::new();
        let mut expected = 0.0f32;
        for _ in 0..100 {
            expected += (FORMED_NOISE - expected) * NOISE_EASE;
            mode.advance(FORMED, false);
            assert_eq!(mode.noise(), expected);
        }
        assert!(mode.noise() > FORMED_NOISE * 0.95);

        for _ in 0..100 {
            mode.advance(ARMED, false);
        }
        assert!(mode.noise() < FORMED_NOISE * 0.05);
    }

    #[test]
    fn test_active_edge_detected_once() {
        let mut mode = ModeController::new();
        assert!(!mode.advance(ARMED, false).entered_formed);
        assert!(mode.advance(FORMED, false).entered_formed);
        assert!(!mode.advance(FORMED, false).entered_formed);
    }

    #[test]
    fn test_blend_is_eased_progress() {
        let mut mode = ModeController::new();
        let mut update = mode.advance(ARMED, true);
        for _ in 0..61 {
            update = mode.advance(ARMED, true);
        }
        assert!((update.blend - ease_in_out_cubic(mode.progress())).abs() < 1e-6);
        assert!(update.blend < mode.progress());
    }
}
