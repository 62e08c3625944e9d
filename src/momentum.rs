//! Post-pan inertia as a cancellable, per-frame decaying task.

use crate::constants::*;
use eframe::egui;

/// Decaying pan velocity applied once per frame after a pan gesture ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Momentum {
    velocity: egui::Vec2,
    friction: f32,
    stop_threshold: f32,
    active: bool,
}

impl Default for Momentum {
    fn default() -> Self {
        Self::new(MOMENTUM_FRICTION, MOMENTUM_STOP_THRESHOLD)
    }
}

impl Momentum {
    /// Creates an idle momentum task with custom decay parameters.
    pub fn new(friction: f32, stop_threshold: f32) -> Self {
        Self {
            velocity: egui::Vec2::ZERO,
            friction: friction.clamp(0.0, 0.999),
            stop_threshold: stop_threshold.max(f32::EPSILON),
            active: false,
        }
    }

    /// Starts coasting with `velocity` pixels per frame.
    ///
    /// Releases slower than [`MOMENTUM_START_THRESHOLD`] on both axes do not start.
    pub fn start(&mut self, velocity: egui::Vec2) {
        if !velocity.x.is_finite() || !velocity.y.is_finite() {
            return;
        }
        if velocity.x.abs() <= MOMENTUM_START_THRESHOLD
            && velocity.y.abs() <= MOMENTUM_START_THRESHOLD
        {
            return;
        }
        self.velocity = velocity;
        self.active = true;
    }

    /// Stops immediately. Safe to call when idle.
    pub fn cancel(&mut self) {
        self.velocity = egui::Vec2::ZERO;
        self.active = false;
    }

    /// Whether a frame callback is still pending.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current velocity in pixels per frame.
    pub fn velocity(&self) -> egui::Vec2 {
        self.velocity
    }

    /// Advances one frame, returning the pan delta to apply, or `None` once stopped.
    pub fn step(&mut self) -> Option<egui::Vec2> {
        if !self.active {
            return None;
        }
        self.velocity *= self.friction;
        if self.velocity.length() < self.stop_threshold {
            self.cancel();
            return None;
        }
        Some(self.velocity)
    }
}
