use std::cell::Cell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::challenges::Challenge;
use crate::content::elements::{Category, CategoryConfig};
use crate::core::rng::RandomSource;
use crate::input::queue::InputEvent;

/// Stage of a single element's mastery cycle.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasteryStage {
    /// Lore on screen, waiting for "begin".
    Intro,
    Challenge,
    /// Congratulations on screen, waiting for "continue".
    Success,
}

/// Elements mastered this session. Grows monotonically; iteration follows
/// the fixed category order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasteryState {
    mastered: BTreeSet<Category>,
}

impl MasteryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the category was not mastered before.
    pub fn insert(&mut self, category: Category) -> bool {
        self.mastered.insert(category)
    }

    pub fn contains(&self, category: Category) -> bool {
        self.mastered.contains(&category)
    }

    pub fn len(&self) -> usize {
        self.mastered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mastered.is_empty()
    }

    /// Every category mastered.
    pub fn is_complete(&self) -> bool {
        Category::ALL.iter().all(|c| self.mastered.contains(c))
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.mastered.iter().copied()
    }
}

/// Drives one element through intro, challenge and success.
///
/// Discarded by its owner after `confirm`; re-entering an element builds a
/// fresh controller, so partial progress never carries over.
pub struct MasteryController {
    category: Category,
    stage: MasteryStage,
    challenge: Option<Challenge>,
    /// Set by the challenge's success callback.
    won: Rc<Cell<bool>>,
}

impl MasteryController {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            stage: MasteryStage::Intro,
            challenge: None,
            won: Rc::new(Cell::new(false)),
        }
    }

    /// Leave the intro and start the element's challenge.
    /// Returns false outside the intro stage.
    pub fn begin(&mut self, rng: Box<dyn RandomSource>) -> bool {
        if self.stage != MasteryStage::Intro {
            return false;
        }
        let won = self.won.clone();
        self.challenge = Some(Challenge::for_category(
            self.category,
            rng,
            Box::new(move || won.set(true)),
        ));
        self.stage = MasteryStage::Challenge;
        log::info!("{} challenge started", self.category.as_str());
        true
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        if let Some(challenge) = &mut self.challenge {
            challenge.handle_input(event);
        }
    }

    /// Advance the challenge. Returns the new stage when it changed.
    pub fn tick(&mut self, dt: f32) -> Option<MasteryStage> {
        let challenge = self.challenge.as_mut()?;
        challenge.tick(dt);
        if !self.won.get() {
            return None;
        }
        self.challenge = None;
        self.stage = MasteryStage::Success;
        log::info!("{} mastered", self.category.as_str());
        Some(self.stage)
    }

    /// The "continue" action on the success screen. Yields the mastered
    /// category; `None` in any other stage.
    pub fn confirm(&self) -> Option<Category> {
        (self.stage == MasteryStage::Success).then_some(self.category)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn stage(&self) -> MasteryStage {
        self.stage
    }

    pub fn config(&self) -> &'static CategoryConfig {
        self.category.config()
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }
}
