use bytemuck::cast_slice;
use serde::Serialize;

use odelia_engine::{Flow, FlowConfig, FlowContext, FixedTimestep, GameEvent, InputEvent, InputQueue};

/// A submission ready for `fetch`: POST `body` (already JSON) to `endpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingRequest {
    pub endpoint: &'static str,
    pub body: String,
}

/// Generic flow runner that wires up the page loop.
///
/// Each page keeps a `thread_local!` FlowRunner and exports free functions
/// via `#[wasm_bindgen]`, because wasm-bindgen cannot export generic structs.
pub struct FlowRunner<F: Flow> {
    flow: F,
    ctx: FlowContext,
    input: InputQueue,
    timestep: FixedTimestep,
    config: FlowConfig,
    initialized: bool,
    /// Wire form of this frame's events for direct memory reads.
    event_buffer: Vec<GameEvent>,
}

impl<F: Flow> FlowRunner<F> {
    pub fn new(flow: F) -> Self {
        let config = flow.config();
        Self {
            ctx: FlowContext::new(&config),
            input: InputQueue::new(),
            timestep: FixedTimestep::for_flow(&config),
            event_buffer: Vec::with_capacity(config.max_events),
            flow,
            config,
            initialized: false,
        }
    }

    /// Initialize the flow. Call once after construction.
    pub fn init(&mut self) {
        self.ctx.clear_frame_data();
        self.flow.init(&mut self.ctx);
        self.initialized = true;
        self.pack_events();
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame: fixed steps of the flow, then pack events.
    ///
    /// Input queued since the last frame is seen by the first step only.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }
        self.ctx.clear_frame_data();

        let steps = self.timestep.accumulate(dt);
        self.ctx.dt = self.timestep.dt();
        let input = InputQueue::from_iter(self.input.drain());
        let empty = InputQueue::new();
        for i in 0..steps {
            let step_input = if i == 0 { &input } else { &empty };
            self.flow.update(&mut self.ctx, step_input);
        }
        if steps == 0 && !input.is_empty() {
            // Not enough time for a step yet: keep the input for the next frame.
            for event in input.iter() {
                self.input.push(*event);
            }
        }

        self.pack_events();
    }

    fn pack_events(&mut self) {
        self.event_buffer.clear();
        self.event_buffer
            .extend(self.ctx.events.iter().map(|e| e.to_wire()));
    }

    /// Next queued submission, if any.
    pub fn take_submission(&mut self) -> Option<OutgoingRequest> {
        let submission = self.ctx.outbox.pop()?;
        match submission.body_json() {
            Ok(body) => Some(OutgoingRequest {
                endpoint: submission.endpoint(),
                body,
            }),
            Err(e) => {
                log::error!("dropping unserializable submission: {e}");
                None
            }
        }
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut F {
        &mut self.flow
    }

    // ---- Accessors for direct memory reads ----

    pub fn events_ptr(&self) -> *const f32 {
        cast_slice::<GameEvent, f32>(&self.event_buffer).as_ptr()
    }

    pub fn events_len(&self) -> u32 {
        self.event_buffer.len() as u32
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.event_buffer
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    pub fn max_events(&self) -> u32 {
        self.config.max_events as u32
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use odelia_engine::api::types::EVENT_DATE_STEP;
    use odelia_engine::flow::date_plan::{INPUT_NEXT, INPUT_TOGGLE_OPTION};
    use odelia_engine::{
        ChapterId, DatePlanFlow, DateStep, FixedClock, MemoryStore, ProgressStore,
    };

    fn runner() -> FlowRunner<DatePlanFlow<MemoryStore>> {
        let clock = Arc::new(FixedClock::from_millis(0));
        let mut progress = ProgressStore::new(MemoryStore::new(), clock);
        progress.mark_chapter_complete(ChapterId::Valentine, None);
        FlowRunner::new(DatePlanFlow::new(progress).with_min_ranked(1))
    }

    fn custom(kind: u32, a: f32) -> InputEvent {
        InputEvent::Custom { kind, a, b: 0.0, c: 0.0 }
    }

    #[test]
    fn init_packs_the_opening_step() {
        let mut r = runner();
        r.tick(1.0);
        assert_eq!(r.events_len(), 0);
        r.init();
        assert_eq!(
            r.events(),
            &[GameEvent { kind: EVENT_DATE_STEP, a: DateStep::Restaurants as u8 as f32, b: 0.0, c: 0.0 }]
        );
    }

    #[test]
    fn input_is_applied_once_per_frame() {
        let mut r = runner();
        r.init();
        r.push_input(custom(INPUT_TOGGLE_OPTION, 0.0));
        r.push_input(custom(INPUT_NEXT, 0.0));
        // Several fixed steps this frame; the toggle must not be replayed.
        r.tick(0.05);
        assert_eq!(r.flow().restaurants(), &["italian"]);
        assert_eq!(r.flow().step(), DateStep::Activities);
        assert_eq!(r.events_len(), 1);
    }

    #[test]
    fn input_waits_for_a_full_step() {
        let mut r = runner();
        r.init();
        r.push_input(custom(INPUT_TOGGLE_OPTION, 1.0));
        r.tick(0.001);
        assert!(r.flow().restaurants().is_empty());
        r.tick(0.02);
        assert_eq!(r.flow().restaurants(), &["sushi"]);
    }

    #[test]
    fn events_pointer_covers_four_floats_per_event() {
        let mut r = runner();
        r.init();
        let floats = cast_slice::<GameEvent, f32>(r.events());
        assert_eq!(floats.len(), r.events_len() as usize * GameEvent::FLOATS);
        assert_eq!(floats.as_ptr(), r.events_ptr());
    }

    #[test]
    fn no_submission_until_confirmed() {
        let mut r = runner();
        r.init();
        assert_eq!(r.take_submission(), None);
    }
}
