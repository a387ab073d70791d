use glam::Vec2;

use crate::config::{POINTER_SMOOTHING, POINTER_WORLD_SCALE_X, POINTER_WORLD_SCALE_Y};

/// Pointer state consumed by the stepper once per frame.
///
/// Input callbacks write the raw target and the hold flag; the frame step is
/// the only reader. Both run on the event-loop thread.
#[derive(Debug, Default)]
pub struct InteractionTracker {
    /// Latest raw pointer position, normalized to [-1, 1] (y up)
    raw: Vec2,
    /// Exponentially smoothed pointer
    smoothed: Vec2,
    /// Smoothed pointer from the previous frame
    previous: Vec2,
    velocity: Vec2,
    speed: f32,
    holding: bool,
}

impl InteractionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move in normalized device coordinates.
    pub fn pointer_moved(&mut self, ndc: Vec2) {
        self.raw = ndc;
    }

    /// Start a hold, but only while the gate is open and formation hasn't happened.
    pub fn pressed(&mut self, ready: bool, active: bool) {
        if ready && !active {
            self.holding = true;
        }
    }

    pub fn released(&mut self) {
        self.holding = false;
    }

    /// Advance smoothing by one frame and derive pointer velocity.
    pub fn advance(&mut self) {
        self.smoothed += (self.raw - self.smoothed) * POINTER_SMOOTHING;
        self.velocity = self.smoothed - self.previous;
        self.speed = self.velocity.length();
        self.previous = self.smoothed;
    }

    #[cfg(test)]
    pub fn smoothed(&self) -> Vec2 {
        self.smoothed
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Whether a hold is in progress. Meaningless once formation is active.
    pub fn holding(&self) -> bool {
        self.holding
    }

    /// Smoothed pointer in world units, biased vertically by the scroll offset.
    pub fn world_position(&self, scroll_world: f32) -> Vec2 {
        Vec2::new(
            self.smoothed.x * POINTER_WORLD_SCALE_X,
            self.smoothed.y * POINTER_WORLD_SCALE_Y + scroll_world,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_lags_raw() {
        let mut tracker = InteractionTracker::new();
        tracker.pointer_moved(Vec2::new(1.0, -1.0));
        tracker.advance();
        assert!((tracker.smoothed().x - 0.1).abs() < 1e-6);
        assert!((tracker.smoothed().y + 0.1).abs() < 1e-6);
        tracker.advance();
        assert!((tracker.smoothed().x - 0.19).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_is_frame_delta() {
        let mut tracker = InteractionTracker::new();
        tracker.pointer_moved(Vec2::new(1.0, 0.0));
        tracker.advance();
        tracker.advance();
        assert!((tracker.velocity().x - 0.09).abs() < 1e-6);
        assert!((tracker.speed() - 0.09).abs() < 1e-6);
    }

    #[test]
    fn test_idle_pointer_has_no_speed() {
        let mut tracker = InteractionTracker::new();
        for _ in 0..10 {
            tracker.advance();
        }
        assert_eq!(tracker.speed(), 0.0);
    }

    #[test]
    fn test_hold_gated_by_ready_and_active() {
        let mut tracker = InteractionTracker::new();
        tracker.pressed(false, false);
        assert!(!tracker.holding());
        tracker.pressed(true, true);
        assert!(!tracker.holding());
        tracker.pressed(true, false);
        assert!(tracker.holding());
    }

    #[test]
    fn test_release_always_clears() {
        let mut tracker = InteractionTracker::new();
        tracker.pressed(true, false);
        tracker.released();
        assert!(!tracker.holding());
    }

    #[test]
    fn test_world_position_scale_and_scroll() {
        let mut tracker = InteractionTracker::new();
        tracker.pointer_moved(Vec2::new(1.0, 1.0));
        for _ in 0..500 {
            tracker.advance();
        }
        let world = tracker.world_position(2.0);
        assert!((world.x - POINTER_WORLD_SCALE_X).abs() < 1e-3);
        assert!((world.y - (POINTER_WORLD_SCALE_Y + 2.0)).abs() < 1e-3);
    }
}
