//! WASM bridge. One page flow is mounted at a time; the shell calls
//! `valentine_init` or `date_plan_init` when the route mounts, then drives
//! the shared `page_*` exports every animation frame.

pub mod clock;
pub mod runner;
pub mod snapshot;
pub mod storage;

use std::cell::RefCell;
use std::sync::Arc;

use wasm_bindgen::prelude::*;

use odelia_engine::{
    DatePlanFlow, FlowConfig, InputEvent, Meals, ProgressStore, StoryIntro, StoryTiming,
    ValentineFlow,
};

pub use clock::JsClock;
pub use runner::{FlowRunner, OutgoingRequest};
pub use storage::BrowserStorage;

use snapshot::{DatePlanSnapshot, RiddleSnapshot, ValentineSnapshot};

enum Page {
    Valentine(FlowRunner<ValentineFlow<BrowserStorage>>),
    DatePlan(FlowRunner<DatePlanFlow<BrowserStorage>>),
}

/// Run the same expression against whichever runner is mounted.
macro_rules! on_runner {
    ($page:expr, $r:ident => $body:expr) => {
        match $page {
            Page::Valentine($r) => $body,
            Page::DatePlan($r) => $body,
        }
    };
}

thread_local! {
    static PAGE: RefCell<Option<Page>> = RefCell::new(None);
    static STORY: RefCell<Option<StoryIntro>> = RefCell::new(None);
}

fn with_page<R>(f: impl FnOnce(&mut Page) -> R) -> Option<R> {
    PAGE.with(|cell| {
        let mut borrow = cell.borrow_mut();
        match borrow.as_mut() {
            Some(page) => Some(f(page)),
            None => {
                log::debug!("no page mounted");
                None
            }
        }
    })
}

fn mount(page: Page) {
    PAGE.with(|cell| *cell.borrow_mut() = Some(page));
}

fn install_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

fn progress_store() -> ProgressStore<BrowserStorage> {
    ProgressStore::new(BrowserStorage, Arc::new(JsClock))
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("snapshot serialization failed: {e}");
        "null".to_string()
    })
}

// ---- Mounting ----

#[wasm_bindgen]
pub fn valentine_init() {
    install_logging();
    let config = FlowConfig {
        seed: (js_sys::Math::random() * u32::MAX as f64) as u64,
        ..FlowConfig::default()
    };
    let flow = ValentineFlow::new(config, progress_store(), Arc::new(JsClock));
    let mut runner = FlowRunner::new(flow);
    runner.init();
    mount(Page::Valentine(runner));
    log::info!("valentine: mounted");
}

#[wasm_bindgen]
pub fn date_plan_init() {
    install_logging();
    let mut runner = FlowRunner::new(DatePlanFlow::new(progress_store()));
    runner.init();
    mount(Page::DatePlan(runner));
    log::info!("date-plan: mounted");
}

/// Drop the mounted page. Pending timers and challenges go with it.
#[wasm_bindgen]
pub fn page_unmount() {
    PAGE.with(|cell| cell.borrow_mut().take());
}

// ---- Frame loop and input ----

#[wasm_bindgen]
pub fn page_tick(dt: f32) {
    with_page(|p| on_runner!(p, r => r.tick(dt)));
}

fn push(event: InputEvent) {
    with_page(|p| on_runner!(p, r => r.push_input(event)));
}

#[wasm_bindgen]
pub fn page_pointer_down(x: f32, y: f32) {
    push(InputEvent::PointerDown { x, y });
}

#[wasm_bindgen]
pub fn page_pointer_up(x: f32, y: f32) {
    push(InputEvent::PointerUp { x, y });
}

#[wasm_bindgen]
pub fn page_pointer_move(x: f32, y: f32) {
    push(InputEvent::PointerMove { x, y });
}

#[wasm_bindgen]
pub fn page_key_down(key_code: u32) {
    push(InputEvent::KeyDown { key_code });
}

#[wasm_bindgen]
pub fn page_custom_event(kind: u32, a: f32, b: f32, c: f32) {
    push(InputEvent::Custom { kind, a, b, c });
}

// ---- Data accessors ----

#[wasm_bindgen]
pub fn get_events_ptr() -> *const f32 {
    with_page(|p| on_runner!(p, r => r.events_ptr())).unwrap_or(std::ptr::null())
}

#[wasm_bindgen]
pub fn get_events_len() -> u32 {
    with_page(|p| on_runner!(p, r => r.events_len())).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_max_events() -> u32 {
    with_page(|p| on_runner!(p, r => r.max_events())).unwrap_or(0)
}

#[wasm_bindgen]
pub fn get_world_width() -> f32 {
    with_page(|p| on_runner!(p, r => r.world_width())).unwrap_or(0.0)
}

#[wasm_bindgen]
pub fn get_world_height() -> f32 {
    with_page(|p| on_runner!(p, r => r.world_height())).unwrap_or(0.0)
}

/// Next queued submission as `{"endpoint": ..., "body": ...}`, or undefined.
/// The shell POSTs it and ignores the outcome.
#[wasm_bindgen]
pub fn take_submission() -> Option<String> {
    with_page(|p| on_runner!(p, r => r.take_submission()))
        .flatten()
        .map(|request| to_json(&request))
}

/// JSON view of the mounted page's state.
#[wasm_bindgen]
pub fn page_snapshot() -> String {
    with_page(|p| match p {
        Page::Valentine(r) => to_json(&ValentineSnapshot::of(r.flow())),
        Page::DatePlan(r) => to_json(&DatePlanSnapshot::of(r.flow())),
    })
    .unwrap_or_else(|| "null".to_string())
}

/// Free-text meals for the stay-in date. Ignored outside the meals step.
#[wasm_bindgen]
pub fn date_plan_set_meals(breakfast: String, lunch: String, dinner: String) -> bool {
    with_page(|p| match p {
        Page::DatePlan(r) => r.flow_mut().set_meals(Meals {
            breakfast,
            lunch,
            dinner,
        }),
        Page::Valentine(_) => false,
    })
    .unwrap_or(false)
}

// ---- Chapters ----

/// The chapter timeline with each chapter's lock state.
#[wasm_bindgen]
pub fn chapter_timeline() -> String {
    install_logging();
    to_json(&snapshot::timeline_entries(&progress_store().get_progress()))
}

// ---- Story intro ----

#[wasm_bindgen]
pub fn story_init() {
    install_logging();
    STORY.with(|cell| *cell.borrow_mut() = Some(StoryIntro::new(StoryTiming::default())));
}

/// Returns the new stage as its `u8` value when the stage changed, else -1.
#[wasm_bindgen]
pub fn story_tick(dt: f32) -> i32 {
    STORY.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .and_then(|story| story.tick(dt))
            .map_or(-1, |stage| stage as u8 as i32)
    })
}

#[wasm_bindgen]
pub fn story_choose(choice_id: &str) -> bool {
    STORY.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .is_some_and(|story| story.choose(choice_id))
    })
}

/// The riddle as `{question, choices: [{id, label}]}`, or null.
#[wasm_bindgen]
pub fn story_riddle() -> String {
    STORY.with(|cell| {
        cell.borrow()
            .as_ref()
            .and_then(|story| story.riddle())
            .map_or_else(|| "null".to_string(), |r| to_json(&RiddleSnapshot::of(r)))
    })
}

/// Lines for the current stage as a JSON array of strings.
#[wasm_bindgen]
pub fn story_lines() -> String {
    STORY.with(|cell| match cell.borrow().as_ref() {
        Some(story) => to_json(&story.lines()),
        None => "[]".to_string(),
    })
}
