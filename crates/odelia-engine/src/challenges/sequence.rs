use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;

use super::{OnSuccess, SuccessSignal};
use crate::core::rng::RandomSource;
use crate::core::timer::Timers;
use crate::input::queue::InputEvent;

/// Key code for '1'; pads map to consecutive digit keys.
const KEY_ONE: u32 = 49;

/// Tuning for the flame sequence.
#[derive(Debug, Clone)]
pub struct SequenceConfig {
    /// Number of flame pads.
    pub symbols: u32,
    pub rounds: u32,
    /// Sequence length of the first round.
    pub base_length: usize,
    /// Extra symbols per following round.
    pub length_step: usize,
    /// Seconds each symbol stays lit during playback.
    pub show_step: f32,
    /// Pause after a mistake before the round is replayed.
    pub restart_delay: f32,
    /// Pause between a cleared round and the next playback.
    pub round_pause: f32,
    pub celebration_delay: f32,
    pub pad_center: Vec2,
    pub pad_ring_radius: f32,
    pub pad_radius: f32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            symbols: 4,
            rounds: 3,
            base_length: 3,
            length_step: 1,
            show_step: 0.6,
            restart_delay: 1.0,
            round_pause: 0.8,
            celebration_delay: 0.5,
            pad_center: Vec2::new(350.0, 250.0),
            pad_ring_radius: 150.0,
            pad_radius: 40.0,
        }
    }
}

/// Where the challenge is in its round cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencePhase {
    /// Playing the sequence back; input is ignored.
    Watching,
    /// Waiting for the player to repeat it.
    Input,
    /// Wrong pad; the round replays after a short pause.
    Failed,
    /// Round repeated correctly; next round after a short pause.
    RoundCleared,
    Won,
}

/// Outcome of a pad press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressResult {
    Ignored,
    Correct,
    Mismatch,
    RoundCleared,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ShowNext,
    Restart,
    NextRound,
}

/// Watch the flames light up, then repeat the pattern.
pub struct SequenceChallenge {
    config: SequenceConfig,
    rng: Box<dyn RandomSource>,
    phase: SequencePhase,
    /// Zero-based round index.
    round: u32,
    sequence: Vec<u32>,
    input_pos: usize,
    /// Index into `sequence` currently lit during playback.
    lit: Option<usize>,
    timers: Timers<Step>,
    success: SuccessSignal,
}

impl SequenceChallenge {
    pub fn new(config: SequenceConfig, rng: Box<dyn RandomSource>, on_success: OnSuccess) -> Self {
        let mut challenge = Self {
            config,
            rng,
            phase: SequencePhase::Watching,
            round: 0,
            sequence: Vec::new(),
            input_pos: 0,
            lit: None,
            timers: Timers::new(),
            success: SuccessSignal::new(on_success),
        };
        challenge.start_round();
        challenge
    }

    fn round_length(&self) -> usize {
        (self.config.base_length + self.round as usize * self.config.length_step).max(1)
    }

    /// Generate a fresh sequence for the current round and play it back.
    fn start_round(&mut self) {
        let len = self.round_length();
        let symbols = self.config.symbols.max(1);
        self.sequence = (0..len).map(|_| self.rng.next_int(symbols)).collect();
        self.input_pos = 0;
        self.phase = SequencePhase::Watching;
        self.lit = Some(0);
        self.timers.clear();
        self.timers.schedule(self.config.show_step, Step::ShowNext);
        log::debug!("sequence round {} length {}", self.round + 1, len);
    }

    /// Press pad `symbol` (0-based).
    pub fn press(&mut self, symbol: u32) -> PressResult {
        if self.phase != SequencePhase::Input || symbol >= self.config.symbols {
            return PressResult::Ignored;
        }

        if self.sequence.get(self.input_pos) != Some(&symbol) {
            self.phase = SequencePhase::Failed;
            self.timers.schedule(self.config.restart_delay, Step::Restart);
            return PressResult::Mismatch;
        }

        self.input_pos += 1;
        if self.input_pos < self.sequence.len() {
            return PressResult::Correct;
        }

        if self.round + 1 >= self.config.rounds {
            self.phase = SequencePhase::Won;
            self.success.arm(self.config.celebration_delay);
            PressResult::Won
        } else {
            self.phase = SequencePhase::RoundCleared;
            self.timers.schedule(self.config.round_pause, Step::NextRound);
            PressResult::RoundCleared
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown { x, y } => {
                if let Some(pad) = self.pad_at(Vec2::new(x, y)) {
                    self.press(pad);
                }
            }
            InputEvent::KeyDown { key_code } if key_code >= KEY_ONE => {
                self.press(key_code - KEY_ONE);
            }
            _ => {}
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.success.tick(dt);
        for step in self.timers.advance(dt) {
            match step {
                Step::ShowNext => self.show_next(),
                Step::Restart => self.start_round(),
                Step::NextRound => {
                    self.round += 1;
                    self.start_round();
                }
            }
        }
    }

    fn show_next(&mut self) {
        let next = self.lit.map_or(0, |i| i + 1);
        if next < self.sequence.len() {
            self.lit = Some(next);
            self.timers.schedule(self.config.show_step, Step::ShowNext);
        } else {
            self.lit = None;
            self.phase = SequencePhase::Input;
        }
    }

    /// Centre of pad `index`, arranged on a ring starting at the top.
    pub fn pad_position(&self, index: u32) -> Vec2 {
        let n = self.config.symbols.max(1) as f32;
        let angle = index as f32 / n * TAU - FRAC_PI_2;
        self.config.pad_center + Vec2::new(angle.cos(), angle.sin()) * self.config.pad_ring_radius
    }

    pub fn pad_at(&self, pos: Vec2) -> Option<u32> {
        (0..self.config.symbols)
            .find(|&i| pos.distance(self.pad_position(i)) <= self.config.pad_radius)
    }

    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    /// Zero-based index of the round being played.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn sequence(&self) -> &[u32] {
        &self.sequence
    }

    /// Pad lit right now during playback.
    pub fn lit_symbol(&self) -> Option<u32> {
        self.lit.and_then(|i| self.sequence.get(i).copied())
    }

    pub fn rounds_cleared(&self) -> u32 {
        match self.phase {
            SequencePhase::Won => self.config.rounds,
            SequencePhase::RoundCleared => self.round + 1,
            _ => self.round,
        }
    }

    pub fn round_count(&self) -> u32 {
        self.config.rounds
    }

    pub fn symbol_count(&self) -> u32 {
        self.config.symbols
    }

    pub fn is_won(&self) -> bool {
        self.phase == SequencePhase::Won
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::test_support::counter;
    use crate::core::rng::{Rng, ScriptedRng};

    fn wait_for_input(c: &mut SequenceChallenge) {
        for _ in 0..200 {
            if c.phase() == SequencePhase::Input {
                return;
            }
            c.tick(0.1);
        }
        panic!("never reached input phase, stuck in {:?}", c.phase());
    }

    #[test]
    fn playback_lights_each_symbol_then_accepts_input() {
        let (_, cb) = counter();
        let mut c = SequenceChallenge::new(
            SequenceConfig::default(),
            Box::new(ScriptedRng::new(vec![2, 0, 3])),
            cb,
        );
        assert_eq!(c.sequence(), &[2, 0, 3]);
        assert_eq!(c.phase(), SequencePhase::Watching);
        assert_eq!(c.lit_symbol(), Some(2));
        assert_eq!(c.press(2), PressResult::Ignored);

        c.tick(0.6);
        assert_eq!(c.lit_symbol(), Some(0));
        c.tick(0.6);
        assert_eq!(c.lit_symbol(), Some(3));
        c.tick(0.6);
        assert_eq!(c.lit_symbol(), None);
        assert_eq!(c.phase(), SequencePhase::Input);
    }

    #[test]
    fn three_rounds_grow_and_win() {
        let (hits, cb) = counter();
        let mut c = SequenceChallenge::new(SequenceConfig::default(), Box::new(Rng::new(5)), cb);
        let mut lengths = Vec::new();
        for round in 0..3 {
            wait_for_input(&mut c);
            assert_eq!(c.round(), round);
            lengths.push(c.sequence().len());
            let seq = c.sequence().to_vec();
            for s in seq {
                c.press(s);
            }
        }
        assert_eq!(lengths, vec![3, 4, 5]);
        assert!(c.is_won());
        assert_eq!(c.rounds_cleared(), 3);
        c.tick(0.6);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn mismatch_replays_same_round() {
        let (hits, cb) = counter();
        let mut c = SequenceChallenge::new(
            SequenceConfig::default(),
            Box::new(ScriptedRng::new(vec![1])),
            cb,
        );
        wait_for_input(&mut c);
        assert_eq!(c.press(1), PressResult::Correct);
        assert_eq!(c.press(0), PressResult::Mismatch);
        assert_eq!(c.phase(), SequencePhase::Failed);
        assert_eq!(c.press(1), PressResult::Ignored);

        c.tick(0.5);
        assert_eq!(c.phase(), SequencePhase::Failed);
        c.tick(0.6);
        assert_eq!(c.phase(), SequencePhase::Watching);
        assert_eq!(c.round(), 0);
        assert_eq!(c.sequence().len(), 3);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn cleared_round_pauses_before_next_playback() {
        let (_, cb) = counter();
        let mut c = SequenceChallenge::new(
            SequenceConfig::default(),
            Box::new(ScriptedRng::new(vec![3])),
            cb,
        );
        wait_for_input(&mut c);
        c.press(3);
        c.press(3);
        assert_eq!(c.press(3), PressResult::RoundCleared);
        assert_eq!(c.rounds_cleared(), 1);
        c.tick(0.7);
        assert_eq!(c.phase(), SequencePhase::RoundCleared);
        c.tick(0.2);
        assert_eq!(c.phase(), SequencePhase::Watching);
        assert_eq!(c.round(), 1);
    }

    #[test]
    fn digit_keys_and_pads_press_symbols() {
        let (_, cb) = counter();
        let mut c = SequenceChallenge::new(
            SequenceConfig::default(),
            Box::new(ScriptedRng::new(vec![0, 1, 2])),
            cb,
        );
        wait_for_input(&mut c);
        c.handle_input(&InputEvent::KeyDown { key_code: 49 });
        let pad = c.pad_position(1);
        c.handle_input(&InputEvent::PointerDown { x: pad.x + 10.0, y: pad.y });
        c.handle_input(&InputEvent::KeyDown { key_code: 51 });
        assert_eq!(c.phase(), SequencePhase::RoundCleared);
    }

    #[test]
    fn first_pad_sits_at_the_top() {
        let (_, cb) = counter();
        let c = SequenceChallenge::new(SequenceConfig::default(), Box::new(Rng::new(1)), cb);
        let top = c.pad_position(0);
        assert!((top.x - 350.0).abs() < 1e-3);
        assert!((top.y - 100.0).abs() < 1e-3);
        assert_eq!(c.pad_at(Vec2::new(350.0, 250.0)), None);
    }

    #[test]
    fn out_of_range_symbols_are_ignored() {
        let (_, cb) = counter();
        let mut c = SequenceChallenge::new(SequenceConfig::default(), Box::new(Rng::new(1)), cb);
        wait_for_input(&mut c);
        assert_eq!(c.press(4), PressResult::Ignored);
        c.handle_input(&InputEvent::KeyDown { key_code: 13 });
        assert_eq!(c.phase(), SequencePhase::Input);
    }
}
