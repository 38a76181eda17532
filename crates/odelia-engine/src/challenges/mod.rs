//! The four element challenges.
//!
//! Each challenge is a self-contained state machine built with nothing but a
//! success callback (plus its random source where it needs one). It owns its
//! positions, progress and timers, reads input, and calls the callback at most
//! once after a short celebratory pause. There is no failure state: wrong
//! moves flip back, restart the round, or simply go unrewarded.

pub mod catch;
pub mod pairs;
pub mod sequence;
pub mod trace;

use crate::content::elements::Category;
use crate::core::rng::RandomSource;
use crate::core::timer::Timers;
use crate::input::queue::InputEvent;

use catch::{CatchChallenge, CatchConfig};
use pairs::{PairsChallenge, PairsConfig};
use sequence::{SequenceChallenge, SequenceConfig};
use trace::{TraceChallenge, TraceConfig};

/// Called once when a challenge is won.
pub type OnSuccess = Box<dyn FnOnce()>;

/// Variant tag for the challenge families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChallengeKind {
    Trace,
    Sequence,
    Match,
    Catch,
}

/// One live challenge, dispatched by variant.
pub enum Challenge {
    Trace(TraceChallenge),
    Sequence(SequenceChallenge),
    Match(PairsChallenge),
    Catch(CatchChallenge),
}

impl Challenge {
    /// Build the canonical challenge for a category with default tuning.
    pub fn for_category(
        category: Category,
        rng: Box<dyn RandomSource>,
        on_success: OnSuccess,
    ) -> Self {
        match category.config().challenge {
            ChallengeKind::Trace => {
                Challenge::Trace(TraceChallenge::new(TraceConfig::default(), on_success))
            }
            ChallengeKind::Sequence => Challenge::Sequence(SequenceChallenge::new(
                SequenceConfig::default(),
                rng,
                on_success,
            )),
            ChallengeKind::Match => Challenge::Match(PairsChallenge::new(
                PairsConfig::default(),
                rng,
                on_success,
            )),
            ChallengeKind::Catch => Challenge::Catch(CatchChallenge::new(
                CatchConfig::default(),
                rng,
                on_success,
            )),
        }
    }

    pub fn kind(&self) -> ChallengeKind {
        match self {
            Challenge::Trace(_) => ChallengeKind::Trace,
            Challenge::Sequence(_) => ChallengeKind::Sequence,
            Challenge::Match(_) => ChallengeKind::Match,
            Challenge::Catch(_) => ChallengeKind::Catch,
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match self {
            Challenge::Trace(c) => c.handle_input(event),
            Challenge::Sequence(c) => c.handle_input(event),
            Challenge::Match(c) => c.handle_input(event),
            Challenge::Catch(c) => c.handle_input(event),
        }
    }

    pub fn tick(&mut self, dt: f32) {
        match self {
            Challenge::Trace(c) => c.tick(dt),
            Challenge::Sequence(c) => c.tick(dt),
            Challenge::Match(c) => c.tick(dt),
            Challenge::Catch(c) => c.tick(dt),
        }
    }

    /// Whether the win condition has been met (the callback may still be pending).
    pub fn is_won(&self) -> bool {
        match self {
            Challenge::Trace(c) => c.is_won(),
            Challenge::Sequence(c) => c.is_won(),
            Challenge::Match(c) => c.is_won(),
            Challenge::Catch(c) => c.is_won(),
        }
    }

    /// Progress as (done, total) for the HUD.
    pub fn progress(&self) -> (u32, u32) {
        match self {
            Challenge::Trace(c) => (c.reached() as u32, c.waypoint_count() as u32),
            Challenge::Sequence(c) => (c.rounds_cleared(), c.round_count()),
            Challenge::Match(c) => (c.matched_count(), c.pair_count()),
            Challenge::Catch(c) => (c.caught(), c.target()),
        }
    }
}

/// Holds the success callback through the celebratory pause.
pub(crate) struct SuccessSignal {
    callback: Option<OnSuccess>,
    timers: Timers<()>,
    armed: bool,
}

impl SuccessSignal {
    pub(crate) fn new(callback: OnSuccess) -> Self {
        Self {
            callback: Some(callback),
            timers: Timers::new(),
            armed: false,
        }
    }

    /// Start the pause. Later calls are no-ops.
    pub(crate) fn arm(&mut self, delay: f32) {
        if self.armed {
            return;
        }
        self.armed = true;
        self.timers.schedule(delay, ());
    }

    pub(crate) fn tick(&mut self, dt: f32) {
        if self.timers.advance(dt).is_empty() {
            return;
        }
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
    }
}
