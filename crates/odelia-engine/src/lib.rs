pub mod api;
pub mod core;
pub mod input;
pub mod content;
pub mod challenges;
pub mod flow;
pub mod progress;
pub mod submission;

// Re-export key types at crate root for convenience
pub use api::flow::{Flow, FlowConfig, FlowContext};
pub use api::types::{Answer, FlowEvent, GameEvent};
pub use core::clock::{Clock, FixedClock, SystemClock, iso_timestamp};
pub use core::rng::{RandomSource, Rng, ScriptedRng, shuffle};
pub use core::time::FixedTimestep;
pub use core::timer::{TimerId, Timers};
pub use input::queue::{InputEvent, InputQueue};
pub use content::elements::{Category, CategoryConfig, Choice, Riddle};
pub use content::chapters::{Chapter, ChapterId, CHAPTERS};
pub use challenges::{Challenge, ChallengeKind, OnSuccess};
pub use challenges::trace::{TraceChallenge, TraceConfig};
pub use challenges::sequence::{SequenceChallenge, SequenceConfig, SequencePhase};
pub use challenges::pairs::{PairsChallenge, PairsConfig};
pub use challenges::catch::{CatchChallenge, CatchConfig};
pub use flow::mastery::{MasteryController, MasteryStage, MasteryState};
pub use flow::valentine::{ValentineFlow, View};
pub use flow::question::{QuestionInterface, QuestionState, QuestionTiming, Decision};
pub use flow::dodge::{DodgyButton, DodgeConfig, Rect};
pub use flow::story::{StoryIntro, StoryStage, StoryTiming};
pub use flow::date_plan::{DatePlanFlow, DateStep};
pub use progress::store::{
    KeyValueStore, MemoryStore, StorageError,
    ProgressStore, ChapterProgress, ChapterRecord, ChapterStatus, CompletionMetadata,
    chapter_status, timeline, PROGRESS_KEY,
};
pub use submission::{
    DecisionRequest, DecisionSubmission, DecisionMetadata,
    DateSelectionRequest, DateSelectionSubmission, Meals,
    Envelope, Outbox, Submission, ValidationError, generate_session_id,
};
