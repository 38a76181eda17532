//! Turns the browser's uneven frame times into whole flow steps.

use crate::api::flow::FlowConfig;

/// Banks frame time and pays it out in steps of `FlowConfig::fixed_dt`.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    banked: f32,
    /// Time beyond this many steps is discarded, so a tab coming back from
    /// the background resumes rather than replaying every missed timer.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(step: f32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            banked: 0.0,
            max_steps: 10,
        }
    }

    pub fn for_flow(config: &FlowConfig) -> Self {
        Self {
            max_steps: config.max_steps_per_frame.max(1),
            ..Self::new(config.fixed_dt)
        }
    }

    /// Bank `frame_dt` and return how many whole steps it pays for.
    /// Negative or non-finite frame times bank nothing.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        let budget = self.step * self.max_steps as f32;
        self.banked = (self.banked + frame_dt).min(budget);
        let steps = (self.banked / self.step).floor() as u32;
        self.banked -= steps as f32 * self.step;
        steps
    }

    /// Time carried into the next frame.
    pub fn banked(&self) -> f32 {
        self.banked
    }

    pub fn dt(&self) -> f32 {
        self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_frame_one_step() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn short_frames_carry_over() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(0.008), 0);
        assert!((ts.banked() - 0.008).abs() < 1e-6);
        assert_eq!(ts.accumulate(0.010), 1);
    }

    #[test]
    fn long_pause_is_capped_by_flow_config() {
        let config = FlowConfig {
            max_steps_per_frame: 4,
            ..FlowConfig::default()
        };
        let mut ts = FixedTimestep::for_flow(&config);
        assert_eq!(ts.accumulate(30.0), 4);
        assert_eq!(ts.accumulate(0.0), 0);
    }

    #[test]
    fn bad_frame_times_bank_nothing() {
        let mut ts = FixedTimestep::new(0.1);
        assert_eq!(ts.accumulate(-5.0), 0);
        assert_eq!(ts.accumulate(f32::NAN), 0);
        assert_eq!(ts.banked(), 0.0);
    }
}
