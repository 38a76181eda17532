//! The narrated opening: water lore, the fire riddle, a reflection on the
//! answer, then the air lore hand-off.

use crate::content::elements::{Category, Choice, Riddle};
use crate::core::timer::Timers;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryStage {
    Opening,
    Riddle,
    Reflection,
    Transition,
    Complete,
}

impl StoryStage {
    /// Element used to theme the stage.
    pub fn category(self) -> Option<Category> {
        match self {
            StoryStage::Opening => Some(Category::Water),
            StoryStage::Riddle => Some(Category::Fire),
            StoryStage::Reflection => Some(Category::Earth),
            StoryStage::Transition => Some(Category::Air),
            StoryStage::Complete => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoryTiming {
    /// Stagger between revealed lines.
    pub line_delay: f32,
    /// Fade-in of the last line.
    pub reveal_pad: f32,
    /// Reading time once every line is out.
    pub read_pause: f32,
    /// Shorter reading time on the closing stage.
    pub closing_pause: f32,
    /// Pause between picking a riddle answer and its reflection.
    pub choice_delay: f32,
}

impl Default for StoryTiming {
    fn default() -> Self {
        Self {
            line_delay: 0.3,
            reveal_pad: 0.8,
            read_pause: 2.0,
            closing_pause: 1.5,
            choice_delay: 0.5,
        }
    }
}

impl StoryTiming {
    /// Seconds a stage of `lines` lines stays up before auto-advancing.
    pub fn stage_time(&self, lines: usize, pause: f32) -> f32 {
        lines as f32 * self.line_delay + self.reveal_pad + pause
    }
}

pub struct StoryIntro {
    timing: StoryTiming,
    stage: StoryStage,
    choice: Option<&'static Choice>,
    timers: Timers<StoryStage>,
}

impl StoryIntro {
    pub fn new(timing: StoryTiming) -> Self {
        let mut timers = Timers::new();
        let opening = timing.stage_time(Category::Water.config().lore.len(), timing.read_pause);
        timers.schedule(opening, StoryStage::Riddle);
        Self {
            timing,
            stage: StoryStage::Opening,
            choice: None,
            timers,
        }
    }

    pub fn riddle(&self) -> Option<&'static Riddle> {
        Category::Fire.config().riddle.as_ref()
    }

    /// Answer the riddle. Only the first valid answer counts.
    pub fn choose(&mut self, choice_id: &str) -> bool {
        if self.stage != StoryStage::Riddle || self.choice.is_some() {
            return false;
        }
        let Some(choice) = self.riddle().and_then(|r| r.choice(choice_id)) else {
            log::warn!("unknown riddle choice {choice_id:?}");
            return false;
        };
        self.choice = Some(choice);
        self.timers.schedule(self.timing.choice_delay, StoryStage::Reflection);
        true
    }

    /// Advance time. Returns the stage entered, if any.
    pub fn tick(&mut self, dt: f32) -> Option<StoryStage> {
        let next = self.timers.advance(dt).into_iter().last()?;
        self.stage = next;
        match next {
            StoryStage::Reflection => {
                let lines = self.choice.map_or(0, |c| c.reflection.len());
                let delay = self.timing.stage_time(lines, self.timing.read_pause);
                self.timers.schedule(delay, StoryStage::Transition);
            }
            StoryStage::Transition => {
                let lines = Category::Air.config().lore.len();
                let delay = self.timing.stage_time(lines, self.timing.closing_pause);
                self.timers.schedule(delay, StoryStage::Complete);
            }
            _ => {}
        }
        Some(next)
    }

    pub fn stage(&self) -> StoryStage {
        self.stage
    }

    pub fn choice(&self) -> Option<&'static Choice> {
        self.choice
    }

    /// Text shown for the current stage.
    pub fn lines(&self) -> &'static [&'static str] {
        match self.stage {
            StoryStage::Opening => Category::Water.config().lore,
            StoryStage::Riddle => &[],
            StoryStage::Reflection => self.choice.map_or(&[], |c| c.reflection),
            StoryStage::Transition => Category::Air.config().lore,
            StoryStage::Complete => &[],
        }
    }

    pub fn is_complete(&self) -> bool {
        self.stage == StoryStage::Complete
    }
}

impl Default for StoryIntro {
    fn default() -> Self {
        Self::new(StoryTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until(story: &mut StoryIntro, stage: StoryStage) -> f32 {
        let mut t = 0.0;
        while story.stage() != stage {
            story.tick(0.1);
            t += 0.1;
            assert!(t < 60.0, "stuck in {:?}", story.stage());
        }
        t
    }

    #[test]
    fn opening_waits_for_lore_to_be_read() {
        let mut story = StoryIntro::default();
        let lines = Category::Water.config().lore.len() as f32;
        let expected = lines * 0.3 + 2.8;
        let t = run_until(&mut story, StoryStage::Riddle);
        assert!((t - expected).abs() < 0.15, "took {t}, expected {expected}");
    }

    #[test]
    fn riddle_waits_for_an_answer() {
        let mut story = StoryIntro::default();
        run_until(&mut story, StoryStage::Riddle);
        for _ in 0..100 {
            assert_eq!(story.tick(0.1), None);
        }
        assert_eq!(story.stage(), StoryStage::Riddle);
    }

    #[test]
    fn full_story_with_courage() {
        let mut story = StoryIntro::default();
        assert!(!story.choose("courage"));
        run_until(&mut story, StoryStage::Riddle);
        assert!(!story.choose("nonsense"));
        assert!(story.choose("courage"));
        assert!(!story.choose("passion"));

        assert_eq!(story.tick(0.5), Some(StoryStage::Reflection));
        assert_eq!(story.lines(), story.choice().unwrap().reflection);
        assert_eq!(story.stage().category(), Some(Category::Earth));

        run_until(&mut story, StoryStage::Transition);
        assert_eq!(story.lines(), Category::Air.config().lore);
        run_until(&mut story, StoryStage::Complete);
        assert!(story.is_complete());
        assert_eq!(story.stage().category(), None);
    }
}
