use glam::Vec2;

use super::{OnSuccess, SuccessSignal};
use crate::input::queue::InputEvent;

/// Tuning for the river trace.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Droplets in the order they must be touched (board coordinates).
    pub waypoints: Vec<Vec2>,
    /// How close a pointer must come to the current droplet (board units).
    pub hit_radius: f32,
    pub celebration_delay: f32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        // S-curve river across a 700x400 board.
        let waypoints = [
            (100.0, 200.0),
            (150.0, 180.0),
            (200.0, 200.0),
            (250.0, 240.0),
            (300.0, 260.0),
            (350.0, 240.0),
            (400.0, 200.0),
            (450.0, 180.0),
            (500.0, 200.0),
            (550.0, 220.0),
            (600.0, 200.0),
        ]
        .into_iter()
        .map(|(x, y)| Vec2::new(x, y))
        .collect();
        Self {
            waypoints,
            hit_radius: 30.0,
            celebration_delay: 0.5,
        }
    }
}

/// Outcome of a single touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceResult {
    /// The current droplet was reached.
    Advanced,
    /// The last droplet was reached.
    Completed,
    /// Nowhere near the current droplet.
    Missed,
    /// Already complete.
    Ignored,
}

/// Touch the droplets of a river in order.
///
/// Only the *current* droplet reacts; touching a later one does nothing, so
/// the river can't be skipped through.
pub struct TraceChallenge {
    config: TraceConfig,
    /// Index of the next droplet to reach.
    reached: usize,
    success: SuccessSignal,
}

impl TraceChallenge {
    pub fn new(config: TraceConfig, on_success: OnSuccess) -> Self {
        Self {
            config,
            reached: 0,
            success: SuccessSignal::new(on_success),
        }
    }

    /// Touch at a board position.
    pub fn touch(&mut self, pos: Vec2) -> TraceResult {
        match self.current_waypoint() {
            None => TraceResult::Ignored,
            Some(target) if pos.distance(target) <= self.config.hit_radius => {
                self.advance()
            }
            Some(_) => TraceResult::Missed,
        }
    }

    /// Tap droplet `index` directly (keyboard/accessibility path).
    pub fn reach(&mut self, index: usize) -> TraceResult {
        if self.is_won() {
            return TraceResult::Ignored;
        }
        if index != self.reached {
            return TraceResult::Missed;
        }
        self.advance()
    }

    fn advance(&mut self) -> TraceResult {
        self.reached += 1;
        if self.reached < self.config.waypoints.len() {
            return TraceResult::Advanced;
        }
        log::debug!("trace complete");
        self.success.arm(self.config.celebration_delay);
        TraceResult::Completed
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown { x, y } | InputEvent::PointerMove { x, y } => {
                self.touch(Vec2::new(x, y));
            }
            _ => {}
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.success.tick(dt);
    }

    pub fn current_waypoint(&self) -> Option<Vec2> {
        self.config.waypoints.get(self.reached).copied()
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.config.waypoints
    }

    pub fn reached(&self) -> usize {
        self.reached
    }

    pub fn waypoint_count(&self) -> usize {
        self.config.waypoints.len()
    }

    /// Reached droplets as a fraction (0.0 to 1.0).
    pub fn progress_fraction(&self) -> f32 {
        if self.config.waypoints.is_empty() {
            return 1.0;
        }
        self.reached as f32 / self.config.waypoints.len() as f32
    }

    pub fn is_won(&self) -> bool {
        self.success.is_armed()
    }
}
