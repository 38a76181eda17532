use std::fmt;
use std::str::FromStr;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::content::chapters::ChapterId;
use crate::content::elements::Category;
use crate::flow::date_plan::DateStep;
use crate::flow::mastery::MasteryStage;
use crate::flow::question::QuestionCue;
use crate::flow::valentine::View;

/// The final yes/no decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub fn as_str(self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Answer {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(Answer::Yes),
            "no" => Ok(Answer::No),
            _ => Err(()),
        }
    }
}

// Wire kinds for GameEvent (Rust → page shell).
pub const EVENT_VIEW: f32 = 1.0;
pub const EVENT_MASTERY_STAGE: f32 = 2.0;
pub const EVENT_CHALLENGE_PROGRESS: f32 = 3.0;
pub const EVENT_CATEGORY_MASTERED: f32 = 4.0;
pub const EVENT_QUESTION_CUE: f32 = 5.0;
pub const EVENT_DODGE: f32 = 6.0;
pub const EVENT_DATE_STEP: f32 = 7.0;
pub const EVENT_CHAPTER_COMPLETED: f32 = 8.0;
pub const EVENT_SUBMISSION_QUEUED: f32 = 9.0;

/// Something the page shell should react to (switch screens, fire confetti...).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlowEvent {
    ViewChanged(View),
    MasteryStage { category: Category, stage: MasteryStage },
    ChallengeProgress { category: Category, done: u32, total: u32 },
    CategoryMastered { category: Category, mastered: u32 },
    QuestionCue(QuestionCue),
    ButtonDodged { x: f32, y: f32, count: u32 },
    DateStepChanged(DateStep),
    ChapterCompleted(ChapterId),
    SubmissionQueued,
}

impl FlowEvent {
    /// Flatten into the fixed 4-float layout the shell reads.
    pub fn to_wire(&self) -> GameEvent {
        let ev = |kind: f32, a: f32, b: f32, c: f32| GameEvent { kind, a, b, c };
        match *self {
            FlowEvent::ViewChanged(view) => ev(EVENT_VIEW, view as u8 as f32, 0.0, 0.0),
            FlowEvent::MasteryStage { category, stage } => {
                ev(EVENT_MASTERY_STAGE, category as u8 as f32, stage as u8 as f32, 0.0)
            }
            FlowEvent::ChallengeProgress { category, done, total } => {
                ev(EVENT_CHALLENGE_PROGRESS, category as u8 as f32, done as f32, total as f32)
            }
            FlowEvent::CategoryMastered { category, mastered } => {
                ev(EVENT_CATEGORY_MASTERED, category as u8 as f32, mastered as f32, 0.0)
            }
            FlowEvent::QuestionCue(cue) => ev(EVENT_QUESTION_CUE, cue as u8 as f32, 0.0, 0.0),
            FlowEvent::ButtonDodged { x, y, count } => ev(EVENT_DODGE, x, y, count as f32),
            FlowEvent::DateStepChanged(step) => ev(EVENT_DATE_STEP, step as u8 as f32, 0.0, 0.0),
            FlowEvent::ChapterCompleted(id) => ev(EVENT_CHAPTER_COMPLETED, id as u8 as f32, 0.0, 0.0),
            FlowEvent::SubmissionQueued => ev(EVENT_SUBMISSION_QUEUED, 0.0, 0.0, 0.0),
        }
    }
}

/// A flow event as read by the shell from WASM memory.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GameEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl GameEvent {
    pub const FLOATS: usize = 4;
}
