use glam::Vec2;

use super::dodge::{DodgeConfig, DodgyButton, Rect};
use crate::api::types::Answer;
use crate::core::rng::RandomSource;
use crate::core::timer::Timers;
use crate::input::queue::InputEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionState {
    Idle,
    Selected,
    Animating,
    Complete,
}

/// Effects the shell plays while the answer sinks in.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionCue {
    Ripple,
    Confetti,
    SuccessAnimation,
    Complete,
}

#[derive(Debug, Clone)]
pub struct QuestionTiming {
    pub confetti_delay: f32,
    pub success_delay: f32,
    /// Length of the success animation before the question completes.
    pub success_duration: f32,
}

impl Default for QuestionTiming {
    fn default() -> Self {
        Self {
            confetti_delay: 0.5,
            success_delay: 0.8,
            success_duration: 3.2,
        }
    }
}

/// What was decided, and how hard it was to get there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub answer: Answer,
    pub dodge_count: u32,
    /// Milliseconds from the question appearing to the answer.
    pub time_to_decide_ms: u64,
}

/// "May I be your Valentine?" with a Yes button and a No button that won't
/// hold still.
pub struct QuestionInterface {
    timing: QuestionTiming,
    state: QuestionState,
    yes_button: Rect,
    no_button: DodgyButton,
    /// Seconds since the question appeared.
    elapsed: f32,
    decision: Option<Decision>,
    ripple_at: Option<Vec2>,
    timers: Timers<QuestionCue>,
}

impl QuestionInterface {
    pub fn new(timing: QuestionTiming, yes_button: Rect, no_button: DodgyButton) -> Self {
        Self {
            timing,
            state: QuestionState::Idle,
            yes_button,
            no_button: no_button.avoiding(yes_button),
            elapsed: 0.0,
            decision: None,
            ripple_at: None,
            timers: Timers::new(),
        }
    }

    /// Default layout: buttons side by side on a `viewport`-sized board.
    pub fn with_viewport(viewport: Vec2) -> Self {
        let size = Vec2::new(120.0, 50.0);
        let y = viewport.y * 0.6;
        let yes = Rect::new(viewport.x * 0.5 - size.x - 30.0, y, size.x, size.y);
        let no = Rect::new(viewport.x * 0.5 + 30.0, y, size.x, size.y);
        Self::new(
            QuestionTiming::default(),
            yes,
            DodgyButton::new(DodgeConfig::default(), no, viewport),
        )
    }

    /// Say yes. Only accepted while idle.
    pub fn choose_yes(&mut self, at: Vec2) -> bool {
        if self.state != QuestionState::Idle {
            return false;
        }
        self.state = QuestionState::Selected;
        self.ripple_at = Some(at);
        self.decision = Some(Decision {
            answer: Answer::Yes,
            dodge_count: self.no_button.dodge_count(),
            time_to_decide_ms: (self.elapsed * 1000.0).round() as u64,
        });

        let t = &self.timing;
        self.timers.schedule(0.0, QuestionCue::Ripple);
        self.timers.schedule(t.confetti_delay, QuestionCue::Confetti);
        self.timers.schedule(t.success_delay, QuestionCue::SuccessAnimation);
        self.timers
            .schedule(t.success_delay + t.success_duration, QuestionCue::Complete);
        self.state = QuestionState::Animating;
        true
    }

    pub fn handle_input(&mut self, event: &InputEvent, rng: &mut dyn RandomSource) {
        if self.state != QuestionState::Idle {
            return;
        }
        match *event {
            InputEvent::PointerMove { x, y } => {
                self.no_button.pointer_moved(Vec2::new(x, y), rng);
            }
            InputEvent::PointerDown { x, y } => {
                let p = Vec2::new(x, y);
                if self.yes_button.contains(p) {
                    self.choose_yes(p);
                } else if self.no_button.rect().contains(p) {
                    self.no_button.tapped(rng);
                }
            }
            _ => {}
        }
    }

    /// Advance time; returns the cues that came due.
    pub fn tick(&mut self, dt: f32) -> Vec<QuestionCue> {
        if self.state == QuestionState::Idle {
            self.elapsed += dt;
        }
        self.no_button.tick(dt);
        let cues = self.timers.advance(dt);
        if cues.contains(&QuestionCue::Complete) {
            self.state = QuestionState::Complete;
        }
        cues
    }

    pub fn state(&self) -> QuestionState {
        self.state
    }

    /// Available once the answer is given.
    pub fn decision(&self) -> Option<Decision> {
        self.decision
    }

    pub fn ripple_at(&self) -> Option<Vec2> {
        self.ripple_at
    }

    pub fn yes_button(&self) -> Rect {
        self.yes_button
    }

    pub fn no_button(&self) -> &DodgyButton {
        &self.no_button
    }
}
