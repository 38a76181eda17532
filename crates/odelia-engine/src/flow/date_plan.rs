//! The date-planning wizard: rank restaurants, rank activities, optionally
//! plan meals at home, review, confirm.

use crate::api::flow::{Flow, FlowContext};
use crate::api::types::FlowEvent;
use crate::content::chapters::ChapterId;
use crate::input::queue::{InputEvent, InputQueue};
use crate::progress::store::{ChapterStatus, CompletionMetadata, KeyValueStore, ProgressStore};
use crate::submission::{DateSelectionSubmission, Meals, Submission};

// Custom input kinds from the page shell.
pub const INPUT_TOGGLE_OPTION: u32 = 1;
pub const INPUT_NEXT: u32 = 2;
pub const INPUT_BACK: u32 = 3;
pub const INPUT_SKIP_MEALS: u32 = 4;
pub const INPUT_CONFIRM: u32 = 5;

/// Most options a ranking can hold.
pub const MAX_RANKED: usize = 5;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStep {
    /// The valentine chapter isn't done yet.
    Locked,
    Restaurants,
    Activities,
    Meals,
    Review,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateOption {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

pub const RESTAURANTS: &[DateOption] = &[
    DateOption {
        id: "italian",
        title: "Italian Trattoria",
        description: "Candlelit pasta and tiramisu",
    },
    DateOption {
        id: "sushi",
        title: "Sushi Bar",
        description: "Omakase at the counter",
    },
    DateOption {
        id: "steakhouse",
        title: "Steakhouse",
        description: "A classic night out",
    },
    DateOption {
        id: "thai",
        title: "Thai Kitchen",
        description: "Spicy, fragrant and cozy",
    },
    DateOption {
        id: "brunch",
        title: "Brunch Cafe",
        description: "Pancakes and mimosas in the sun",
    },
    DateOption {
        id: "tapas",
        title: "Tapas Bar",
        description: "Small plates to share",
    },
];

pub const ACTIVITIES: &[DateOption] = &[
    DateOption {
        id: "movie",
        title: "Movie Night",
        description: "Cozy up for a movie night together",
    },
    DateOption {
        id: "picnic",
        title: "Picnic",
        description: "An outdoor adventure with delicious food",
    },
    DateOption {
        id: "adventure",
        title: "Adventure",
        description: "Something exciting and new to explore together",
    },
    DateOption {
        id: "stay-in",
        title: "Stay-in Night",
        description: "A cozy night in together at home",
    },
    DateOption {
        id: "museum",
        title: "Museum",
        description: "Wander the galleries hand in hand",
    },
];

pub struct DatePlanFlow<S> {
    progress: ProgressStore<S>,
    step: DateStep,
    restaurants: Vec<&'static str>,
    activities: Vec<&'static str>,
    meals: Option<Meals>,
    /// Options needed before a ranking step can advance.
    min_ranked: usize,
    last_emitted: Option<DateStep>,
}

impl<S: KeyValueStore> DatePlanFlow<S> {
    pub fn new(progress: ProgressStore<S>) -> Self {
        let step = match progress.chapter_status(ChapterId::DatePlan) {
            ChapterStatus::Locked => DateStep::Locked,
            _ => DateStep::Restaurants,
        };
        Self {
            progress,
            step,
            restaurants: Vec::new(),
            activities: Vec::new(),
            meals: None,
            min_ranked: 3,
            last_emitted: None,
        }
    }

    pub fn with_min_ranked(mut self, min_ranked: usize) -> Self {
        self.min_ranked = min_ranked.clamp(1, MAX_RANKED);
        self
    }

    /// Options for the current ranking step.
    pub fn catalog(&self) -> &'static [DateOption] {
        match self.step {
            DateStep::Restaurants => RESTAURANTS,
            DateStep::Activities => ACTIVITIES,
            _ => &[],
        }
    }

    /// Tap an option: append it to the ranking, or remove it if already ranked.
    pub fn toggle(&mut self, option_id: &str) -> bool {
        let Some(option) = self.catalog().iter().find(|o| o.id == option_id) else {
            return false;
        };
        let ranking = match self.step {
            DateStep::Restaurants => &mut self.restaurants,
            DateStep::Activities => &mut self.activities,
            _ => return false,
        };
        if let Some(pos) = ranking.iter().position(|id| *id == option.id) {
            ranking.remove(pos);
            return true;
        }
        if ranking.len() >= MAX_RANKED {
            return false;
        }
        ranking.push(option.id);
        true
    }

    pub fn can_advance(&self) -> bool {
        match self.step {
            DateStep::Restaurants => self.restaurants.len() >= self.min_ranked,
            DateStep::Activities => self.activities.len() >= self.min_ranked,
            DateStep::Meals => true,
            _ => false,
        }
    }

    pub fn next(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.step = match self.step {
            DateStep::Restaurants => DateStep::Activities,
            DateStep::Activities => DateStep::Meals,
            DateStep::Meals => DateStep::Review,
            other => other,
        };
        true
    }

    pub fn set_meals(&mut self, meals: Meals) -> bool {
        if self.step != DateStep::Meals {
            return false;
        }
        self.meals = Some(meals).filter(|m| !m.is_blank());
        true
    }

    pub fn skip_meals(&mut self) -> bool {
        if self.step != DateStep::Meals {
            return false;
        }
        self.meals = None;
        self.step = DateStep::Review;
        true
    }

    pub fn back(&mut self) -> bool {
        let prev = match self.step {
            DateStep::Activities => DateStep::Restaurants,
            DateStep::Meals => DateStep::Activities,
            DateStep::Review => DateStep::Meals,
            _ => return false,
        };
        self.step = prev;
        true
    }

    /// Confirm from the review step: record completion and queue the
    /// selection. The chapter completes whether or not delivery succeeds.
    pub fn confirm(&mut self, ctx: &mut FlowContext) -> bool {
        if self.step != DateStep::Review {
            return false;
        }
        let selection = self.selection();
        self.progress.mark_chapter_complete(
            ChapterId::DatePlan,
            Some(CompletionMetadata::selected(selection.top_activity())),
        );
        ctx.emit_event(FlowEvent::ChapterCompleted(ChapterId::DatePlan));
        ctx.submit(Submission::DateSelection(selection));
        self.step = DateStep::Complete;
        true
    }

    pub fn selection(&self) -> DateSelectionSubmission {
        let owned = |ids: &[&str]| ids.iter().map(|s| s.to_string()).collect();
        DateSelectionSubmission {
            restaurants: owned(&self.restaurants),
            activities: owned(&self.activities),
            meals: self.meals.clone(),
        }
    }

    fn handle_event(&mut self, ctx: &mut FlowContext, event: &InputEvent) {
        let InputEvent::Custom { kind, a, .. } = *event else {
            return;
        };
        match kind {
            INPUT_TOGGLE_OPTION => {
                if let Some(option) = self.catalog().get(a as usize) {
                    self.toggle(option.id);
                }
            }
            INPUT_NEXT => {
                self.next();
            }
            INPUT_BACK => {
                self.back();
            }
            INPUT_SKIP_MEALS => {
                self.skip_meals();
            }
            INPUT_CONFIRM => {
                self.confirm(ctx);
            }
            _ => log::warn!("unknown date-plan input {kind}"),
        }
    }

    fn emit_step(&mut self, ctx: &mut FlowContext) {
        if self.last_emitted != Some(self.step) {
            self.last_emitted = Some(self.step);
            ctx.emit_event(FlowEvent::DateStepChanged(self.step));
        }
    }

    pub fn step(&self) -> DateStep {
        self.step
    }

    pub fn restaurants(&self) -> &[&'static str] {
        &self.restaurants
    }

    pub fn activities(&self) -> &[&'static str] {
        &self.activities
    }

    pub fn meals(&self) -> Option<&Meals> {
        self.meals.as_ref()
    }

    pub fn progress(&self) -> &ProgressStore<S> {
        &self.progress
    }
}

impl<S: KeyValueStore> Flow for DatePlanFlow<S> {
    fn init(&mut self, ctx: &mut FlowContext) {
        self.emit_step(ctx);
    }

    fn update(&mut self, ctx: &mut FlowContext, input: &InputQueue) {
        for event in input.iter() {
            self.handle_event(ctx, event);
        }
        self.emit_step(ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::clock::FixedClock;
    use crate::progress::store::MemoryStore;

    fn flow(valentine_done: bool) -> DatePlanFlow<MemoryStore> {
        let clock = Arc::new(FixedClock::from_millis(1_771_093_800_000));
        let mut progress = ProgressStore::new(MemoryStore::new(), clock);
        if valentine_done {
            progress.mark_chapter_complete(ChapterId::Valentine, None);
        }
        DatePlanFlow::new(progress)
    }

    fn rank(flow: &mut DatePlanFlow<MemoryStore>, ids: &[&str]) {
        for id in ids {
            assert!(flow.toggle(id), "toggle {id}");
        }
    }

    #[test]
    fn locked_until_valentine_is_done() {
        let mut f = flow(false);
        assert_eq!(f.step(), DateStep::Locked);
        assert!(!f.toggle("sushi"));
        assert!(!f.next());
        assert_eq!(flow(true).step(), DateStep::Restaurants);
    }

    #[test]
    fn ranking_appends_and_untaps() {
        let mut f = flow(true);
        rank(&mut f, &["sushi", "thai", "tapas"]);
        assert!(f.toggle("thai"));
        assert_eq!(f.restaurants(), &["sushi", "tapas"]);
        assert!(!f.next());
        rank(&mut f, &["italian", "brunch", "steakhouse"]);
        assert_eq!(f.restaurants().len(), 5);
        assert!(!f.toggle("thai"));
        assert!(!f.toggle("movie"));
        assert!(f.next());
        assert_eq!(f.step(), DateStep::Activities);
    }

    #[test]
    fn meals_are_optional_and_back_walks_one_step() {
        let mut f = flow(true);
        rank(&mut f, &["sushi", "thai", "tapas"]);
        f.next();
        rank(&mut f, &["picnic", "movie", "museum"]);
        f.next();
        assert_eq!(f.step(), DateStep::Meals);
        assert!(f.back());
        assert_eq!(f.step(), DateStep::Activities);
        assert_eq!(f.activities(), &["picnic", "movie", "museum"]);
        f.next();
        assert!(f.set_meals(Meals {
            breakfast: "crepes".into(),
            lunch: "ramen".into(),
            dinner: "lasagna".into(),
        }));
        assert!(f.next());
        assert_eq!(f.step(), DateStep::Review);
        assert_eq!(f.meals().map(|m| m.dinner.as_str()), Some("lasagna"));
    }

    #[test]
    fn confirm_completes_chapter_and_queues_selection() {
        let mut f = flow(true);
        let mut ctx = FlowContext::default();
        rank(&mut f, &["sushi", "thai", "tapas"]);
        f.next();
        rank(&mut f, &["adventure", "movie", "picnic"]);
        f.next();
        assert!(f.skip_meals());
        assert!(f.confirm(&mut ctx));
        assert_eq!(f.step(), DateStep::Complete);
        assert!(!f.confirm(&mut ctx));

        let record = f.progress().get_progress().date_plan;
        assert!(record.completed);
        assert_eq!(record.selected_option.as_deref(), Some("adventure"));

        let Some(Submission::DateSelection(sel)) = ctx.outbox.pop() else {
            panic!("expected a date selection");
        };
        assert_eq!(sel.top_restaurant(), "sushi");
        assert_eq!(sel.meals, None);
        assert!(ctx.events.contains(&FlowEvent::ChapterCompleted(ChapterId::DatePlan)));
        assert!(ctx.events.contains(&FlowEvent::SubmissionQueued));
    }

    #[test]
    fn custom_inputs_drive_the_wizard() {
        let mut f = flow(true).with_min_ranked(1);
        let mut ctx = FlowContext::default();
        f.init(&mut ctx);
        assert_eq!(ctx.events, vec![FlowEvent::DateStepChanged(DateStep::Restaurants)]);
        ctx.clear_frame_data();

        let custom = |kind, a| InputEvent::Custom { kind, a, b: 0.0, c: 0.0 };
        let input: InputQueue = [
            custom(INPUT_TOGGLE_OPTION, 1.0),
            custom(INPUT_NEXT, 0.0),
            custom(INPUT_TOGGLE_OPTION, 3.0),
            custom(INPUT_NEXT, 0.0),
            custom(INPUT_SKIP_MEALS, 0.0),
        ]
        .into_iter()
        .collect();
        f.update(&mut ctx, &input);
        assert_eq!(f.restaurants(), &["sushi"]);
        assert_eq!(f.activities(), &["stay-in"]);
        assert_eq!(ctx.events, vec![FlowEvent::DateStepChanged(DateStep::Review)]);
    }
}
