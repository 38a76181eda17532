//! The valentine page: the element hub, one mastery at a time, the
//! transition screen, then the question.

use std::sync::Arc;

use glam::Vec2;

use super::mastery::{MasteryController, MasteryStage, MasteryState};
use super::question::{QuestionCue, QuestionInterface};
use crate::api::flow::{Flow, FlowConfig, FlowContext};
use crate::api::types::FlowEvent;
use crate::content::chapters::ChapterId;
use crate::content::elements::Category;
use crate::core::clock::Clock;
use crate::core::rng::{RandomSource, Rng};
use crate::core::timer::Timers;
use crate::input::queue::{InputEvent, InputQueue};
use crate::progress::store::{KeyValueStore, ProgressStore};
use crate::submission::{generate_session_id, DecisionMetadata, DecisionSubmission, Submission};

// Custom input kinds from the page shell.
/// `a` = category index.
pub const INPUT_SELECT_CATEGORY: u32 = 1;
pub const INPUT_BEGIN: u32 = 2;
pub const INPUT_CONTINUE: u32 = 3;
pub const INPUT_BACK: u32 = 4;
pub const INPUT_ANSWER_YES: u32 = 5;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Hub,
    Mastery,
    Transition,
    Question,
    Complete,
}

pub struct ValentineFlow<S> {
    config: FlowConfig,
    progress: ProgressStore<S>,
    clock: Arc<dyn Clock>,
    rng: Rng,
    view: View,
    mastered: MasteryState,
    controller: Option<MasteryController>,
    question: Option<QuestionInterface>,
    /// Pending move to the transition screen once everything is mastered.
    timers: Timers<View>,
    last_progress: Option<(u32, u32)>,
}

impl<S: KeyValueStore> ValentineFlow<S> {
    pub fn new(config: FlowConfig, progress: ProgressStore<S>, clock: Arc<dyn Clock>) -> Self {
        let rng = Rng::new(config.seed);
        Self {
            config,
            progress,
            clock,
            rng,
            view: View::Hub,
            mastered: MasteryState::new(),
            controller: None,
            question: None,
            timers: Timers::new(),
            last_progress: None,
        }
    }

    fn set_view(&mut self, ctx: &mut FlowContext, view: View) {
        self.view = view;
        ctx.emit_event(FlowEvent::ViewChanged(view));
    }

    /// Open the mastery screen for `category`. Refused outside the hub and
    /// once every element is mastered.
    pub fn select_category(&mut self, ctx: &mut FlowContext, category: Category) -> bool {
        if self.view != View::Hub || self.mastered.is_complete() {
            return false;
        }
        self.controller = Some(MasteryController::new(category));
        self.last_progress = None;
        self.set_view(ctx, View::Mastery);
        ctx.emit_event(FlowEvent::MasteryStage {
            category,
            stage: MasteryStage::Intro,
        });
        true
    }

    fn begin(&mut self, ctx: &mut FlowContext) {
        let seed = self.rng.next_u64();
        let Some(controller) = &mut self.controller else {
            return;
        };
        if controller.begin(Box::new(Rng::new(seed))) {
            ctx.emit_event(FlowEvent::MasteryStage {
                category: controller.category(),
                stage: MasteryStage::Challenge,
            });
        }
    }

    fn continue_pressed(&mut self, ctx: &mut FlowContext) {
        match self.view {
            View::Mastery => {
                let Some(category) = self.controller.as_ref().and_then(|c| c.confirm()) else {
                    return;
                };
                self.controller = None;
                self.mastered.insert(category);
                ctx.emit_event(FlowEvent::CategoryMastered {
                    category,
                    mastered: self.mastered.len() as u32,
                });
                self.set_view(ctx, View::Hub);
                if self.mastered.is_complete() && self.timers.is_empty() {
                    log::info!("all elements mastered");
                    self.timers
                        .schedule(self.config.all_mastered_delay, View::Transition);
                }
            }
            View::Transition => {
                let world = Vec2::new(self.config.world_width, self.config.world_height);
                self.question = Some(QuestionInterface::with_viewport(world));
                self.set_view(ctx, View::Question);
            }
            _ => {}
        }
    }

    /// Leave the mastery screen without mastering.
    fn back(&mut self, ctx: &mut FlowContext) {
        if self.view != View::Mastery {
            return;
        }
        self.controller = None;
        self.set_view(ctx, View::Hub);
    }

    fn handle_event(&mut self, ctx: &mut FlowContext, event: &InputEvent) {
        if let InputEvent::Custom { kind, a, .. } = *event {
            match kind {
                INPUT_SELECT_CATEGORY => match Category::from_index(a as usize) {
                    Some(category) => {
                        self.select_category(ctx, category);
                    }
                    None => log::warn!("no category at index {a}"),
                },
                INPUT_BEGIN => self.begin(ctx),
                INPUT_CONTINUE => self.continue_pressed(ctx),
                INPUT_BACK => self.back(ctx),
                INPUT_ANSWER_YES => {
                    if let Some(q) = &mut self.question {
                        let at = q.yes_button().center();
                        q.choose_yes(at);
                    }
                }
                _ => log::warn!("unknown valentine input {kind}"),
            }
            return;
        }

        match self.view {
            View::Mastery => {
                if let Some(controller) = &mut self.controller {
                    controller.handle_input(event);
                }
            }
            View::Question => {
                let Some(q) = &mut self.question else {
                    return;
                };
                let before = q.no_button().dodge_count();
                q.handle_input(event, &mut self.rng);
                let button = q.no_button();
                if button.dodge_count() != before {
                    let pos = button.rect().min;
                    ctx.emit_event(FlowEvent::ButtonDodged {
                        x: pos.x,
                        y: pos.y,
                        count: button.dodge_count(),
                    });
                }
            }
            _ => {}
        }
    }

    fn tick(&mut self, ctx: &mut FlowContext) {
        let dt = ctx.dt;

        for view in self.timers.advance(dt) {
            self.set_view(ctx, view);
        }

        if let Some(controller) = &mut self.controller {
            let category = controller.category();
            if let Some(stage) = controller.tick(dt) {
                ctx.emit_event(FlowEvent::MasteryStage { category, stage });
            }
            let progress = controller.challenge().map(|c| c.progress());
            if progress.is_some() && progress != self.last_progress {
                if let Some((done, total)) = progress {
                    ctx.emit_event(FlowEvent::ChallengeProgress { category, done, total });
                }
            }
            self.last_progress = progress;
        }

        let Some(q) = &mut self.question else {
            return;
        };
        let cues = q.tick(dt);
        for cue in &cues {
            ctx.emit_event(FlowEvent::QuestionCue(*cue));
        }
        if cues.contains(&QuestionCue::Complete) {
            self.finish(ctx);
        }
    }

    /// The question is answered: record the chapter, queue the decision.
    fn finish(&mut self, ctx: &mut FlowContext) {
        let Some(decision) = self.question.as_ref().and_then(|q| q.decision()) else {
            return;
        };
        self.progress.mark_chapter_complete(ChapterId::Valentine, None);
        ctx.emit_event(FlowEvent::ChapterCompleted(ChapterId::Valentine));

        let session_id = generate_session_id(self.clock.now().timestamp_millis(), &mut self.rng);
        ctx.submit(Submission::Decision(DecisionSubmission {
            answer: decision.answer,
            session_id: Some(session_id),
            metadata: Some(DecisionMetadata {
                dodge_count: Some(decision.dodge_count),
                time_to_decide: Some(decision.time_to_decide_ms),
            }),
        }));
        self.set_view(ctx, View::Complete);
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn mastered(&self) -> &MasteryState {
        &self.mastered
    }

    pub fn controller(&self) -> Option<&MasteryController> {
        self.controller.as_ref()
    }

    pub fn question(&self) -> Option<&QuestionInterface> {
        self.question.as_ref()
    }

    pub fn progress(&self) -> &ProgressStore<S> {
        &self.progress
    }
}

impl<S: KeyValueStore> Flow for ValentineFlow<S> {
    fn config(&self) -> FlowConfig {
        self.config.clone()
    }

    fn init(&mut self, ctx: &mut FlowContext) {
        ctx.emit_event(FlowEvent::ViewChanged(self.view));
    }

    fn update(&mut self, ctx: &mut FlowContext, input: &InputQueue) {
        for event in input.iter() {
            self.handle_event(ctx, event);
        }
        self.tick(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::Answer;
    use crate::core::clock::FixedClock;
    use crate::progress::store::MemoryStore;

    fn make_flow() -> (ValentineFlow<MemoryStore>, FlowContext) {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::from_millis(1_771_093_800_000));
        let config = FlowConfig::default();
        let ctx = FlowContext::new(&config);
        let progress = ProgressStore::new(MemoryStore::new(), clock.clone());
        (ValentineFlow::new(config, progress, clock), ctx)
    }

    fn custom(kind: u32, a: f32) -> InputEvent {
        InputEvent::Custom { kind, a, b: 0.0, c: 0.0 }
    }

    fn step(flow: &mut ValentineFlow<MemoryStore>, ctx: &mut FlowContext, events: Vec<InputEvent>) {
        let input: InputQueue = events.into_iter().collect();
        flow.update(ctx, &input);
    }

    /// Master `category` by reaching straight into the live challenge.
    fn master(flow: &mut ValentineFlow<MemoryStore>, ctx: &mut FlowContext, category: Category) {
        step(flow, ctx, vec![custom(INPUT_SELECT_CATEGORY, category as u8 as f32), custom(INPUT_BEGIN, 0.0)]);
        let inputs = win_inputs(flow);
        step(flow, ctx, inputs);
        for _ in 0..2000 {
            if flow.controller().map(|c| c.stage()) == Some(MasteryStage::Success) {
                break;
            }
            // Sequence and catch need time and reactions between inputs.
            let inputs = win_inputs(flow);
            step(flow, ctx, inputs);
        }
        step(flow, ctx, vec![custom(INPUT_CONTINUE, 0.0)]);
        assert!(flow.mastered().contains(category));
    }

    fn win_inputs(flow: &ValentineFlow<MemoryStore>) -> Vec<InputEvent> {
        use crate::challenges::Challenge;
        let Some(challenge) = flow.controller().and_then(|c| c.challenge()) else {
            return Vec::new();
        };
        let down = |p: Vec2| InputEvent::PointerDown { x: p.x, y: p.y };
        match challenge {
            Challenge::Trace(t) => t.waypoints().iter().map(|p| down(*p)).collect(),
            Challenge::Sequence(s) => {
                if s.phase() == crate::challenges::sequence::SequencePhase::Input {
                    s.sequence().iter().map(|&sym| InputEvent::KeyDown { key_code: 49 + sym }).collect()
                } else {
                    Vec::new()
                }
            }
            Challenge::Match(m) => {
                let mut inputs = Vec::new();
                for symbol in 0..m.pair_count() as usize {
                    for (i, card) in m.deck().iter().enumerate() {
                        if card.symbol == symbol {
                            inputs.push(down(m.card_origin(i) + Vec2::splat(10.0)));
                        }
                    }
                }
                inputs
            }
            Challenge::Catch(c) => c.spirits().iter().map(|s| down(s.pos)).collect(),
        }
    }

    #[test]
    fn starts_on_hub() {
        let (mut flow, mut ctx) = make_flow();
        flow.init(&mut ctx);
        assert_eq!(ctx.events, vec![FlowEvent::ViewChanged(View::Hub)]);
    }

    #[test]
    fn back_discards_mastery_progress() {
        let (mut flow, mut ctx) = make_flow();
        step(&mut flow, &mut ctx, vec![custom(INPUT_SELECT_CATEGORY, 0.0), custom(INPUT_BEGIN, 0.0)]);
        assert_eq!(flow.view(), View::Mastery);
        step(&mut flow, &mut ctx, vec![InputEvent::PointerDown { x: 100.0, y: 200.0 }]);
        step(&mut flow, &mut ctx, vec![custom(INPUT_BACK, 0.0)]);
        assert_eq!(flow.view(), View::Hub);
        assert!(flow.controller().is_none());
        assert!(flow.mastered().is_empty());

        step(&mut flow, &mut ctx, vec![custom(INPUT_SELECT_CATEGORY, 0.0)]);
        assert_eq!(flow.controller().map(|c| c.stage()), Some(MasteryStage::Intro));
    }

    #[test]
    fn progress_events_follow_the_challenge() {
        let (mut flow, mut ctx) = make_flow();
        step(&mut flow, &mut ctx, vec![custom(INPUT_SELECT_CATEGORY, 0.0), custom(INPUT_BEGIN, 0.0)]);
        assert!(ctx.events.contains(&FlowEvent::ChallengeProgress {
            category: Category::Water,
            done: 0,
            total: 11,
        }));
        ctx.clear_frame_data();
        step(&mut flow, &mut ctx, vec![InputEvent::PointerDown { x: 100.0, y: 200.0 }]);
        assert_eq!(
            ctx.events,
            vec![FlowEvent::ChallengeProgress { category: Category::Water, done: 1, total: 11 }]
        );
    }

    #[test]
    fn full_run_ends_with_a_recorded_yes() {
        let (mut flow, mut ctx) = make_flow();
        for category in [Category::Air, Category::Earth, Category::Water, Category::Fire] {
            master(&mut flow, &mut ctx, category);
        }
        assert_eq!(flow.mastered().len(), 4);
        assert!(!flow.select_category(&mut ctx, Category::Water));

        ctx.clear_frame_data();
        for _ in 0..60 {
            step(&mut flow, &mut ctx, Vec::new());
        }
        assert_eq!(flow.view(), View::Transition);

        step(&mut flow, &mut ctx, vec![custom(INPUT_CONTINUE, 0.0)]);
        assert_eq!(flow.view(), View::Question);
        step(&mut flow, &mut ctx, vec![custom(INPUT_ANSWER_YES, 0.0)]);
        for _ in 0..300 {
            step(&mut flow, &mut ctx, Vec::new());
        }
        assert_eq!(flow.view(), View::Complete);
        assert!(flow.progress().is_chapter_completed(ChapterId::Valentine));

        let Some(Submission::Decision(decision)) = ctx.outbox.pop() else {
            panic!("expected a queued decision");
        };
        assert_eq!(decision.answer, Answer::Yes);
        assert!(decision
            .session_id
            .as_deref()
            .is_some_and(|id| id.starts_with("1771093800000-")));
        assert_eq!(decision.metadata.and_then(|m| m.dodge_count), Some(0));
    }

    #[test]
    fn dodges_are_reported() {
        let (mut flow, mut ctx) = make_flow();
        flow.view = View::Transition;
        step(&mut flow, &mut ctx, vec![custom(INPUT_CONTINUE, 0.0)]);
        let Some(no) = flow.question().map(|q| q.no_button().rect().center()) else {
            panic!("question should be up");
        };
        ctx.clear_frame_data();
        step(&mut flow, &mut ctx, vec![InputEvent::PointerMove { x: no.x, y: no.y + 5.0 }]);
        assert!(ctx
            .events
            .iter()
            .any(|e| matches!(e, FlowEvent::ButtonDodged { count: 1, .. })));
    }
}
