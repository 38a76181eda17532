use crate::api::types::FlowEvent;
use crate::input::queue::InputQueue;
use crate::submission::{Outbox, Submission};

/// Configuration for a flow, provided by the flow itself.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Board width in board units, shared by every challenge layout.
    pub world_width: f32,
    /// Board height in board units.
    pub world_height: f32,
    /// Pause after all four elements are mastered before the transition screen.
    pub all_mastered_delay: f32,
    /// Maximum number of events buffered per frame (default: 32).
    pub max_events: usize,
    /// Most fixed steps one frame may run (default: 10).
    pub max_steps_per_frame: u32,
    /// Seed for the flow's random source.
    pub seed: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 700.0,
            world_height: 500.0,
            all_mastered_delay: 0.8,
            max_events: 32,
            max_steps_per_frame: 10,
            seed: 42,
        }
    }
}

/// The contract every page flow fulfills. Mirrors a game loop: configure,
/// init once, then update on every fixed step.
pub trait Flow {
    fn config(&self) -> FlowConfig {
        FlowConfig::default()
    }

    /// Emit the initial state (current view, lock state...).
    fn init(&mut self, ctx: &mut FlowContext);

    /// Apply input, advance timers, emit events.
    fn update(&mut self, ctx: &mut FlowContext, input: &InputQueue);
}

/// Per-frame mutable state handed to `Flow::update`.
pub struct FlowContext {
    /// Seconds covered by this update.
    pub dt: f32,
    pub events: Vec<FlowEvent>,
    /// Submissions waiting for the shell to POST them.
    pub outbox: Outbox,
    max_events: usize,
}

impl FlowContext {
    pub fn new(config: &FlowConfig) -> Self {
        Self {
            dt: config.fixed_dt,
            events: Vec::with_capacity(config.max_events),
            outbox: Outbox::new(),
            max_events: config.max_events,
        }
    }

    pub fn emit_event(&mut self, event: FlowEvent) {
        if self.events.len() >= self.max_events {
            log::warn!("event buffer full, dropping {:?}", event);
            return;
        }
        self.events.push(event);
    }

    /// Queue a submission and tell the shell about it.
    pub fn submit(&mut self, submission: Submission) {
        self.outbox.push(submission);
        self.emit_event(FlowEvent::SubmissionQueued);
    }

    /// Clear per-frame transient data. The outbox survives until drained.
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
    }
}

impl Default for FlowContext {
    fn default() -> Self {
        Self::new(&FlowConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::valentine::View;

    #[test]
    fn event_buffer_is_bounded() {
        let mut ctx = FlowContext::new(&FlowConfig {
            max_events: 2,
            ..FlowConfig::default()
        });
        for _ in 0..5 {
            ctx.emit_event(FlowEvent::ViewChanged(View::Hub));
        }
        assert_eq!(ctx.events.len(), 2);
        ctx.clear_frame_data();
        assert!(ctx.events.is_empty());
    }
}
