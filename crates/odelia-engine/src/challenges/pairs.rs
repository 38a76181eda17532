use glam::Vec2;

use super::{OnSuccess, SuccessSignal};
use crate::core::rng::{shuffle, RandomSource};
use crate::core::timer::Timers;
use crate::input::queue::InputEvent;

/// Tuning for the crystal match.
#[derive(Debug, Clone)]
pub struct PairsConfig {
    /// One entry per pair in the deck.
    pub symbols: Vec<&'static str>,
    /// Seconds a mismatched pair stays face up.
    pub flip_back_delay: f32,
    pub celebration_delay: f32,
    pub columns: usize,
    pub card_size: Vec2,
    pub card_gap: f32,
    /// Top-left corner of the card grid.
    pub origin: Vec2,
}

impl Default for PairsConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["badgermole", "mountain", "crystal"],
            flip_back_delay: 0.8,
            celebration_delay: 0.8,
            columns: 3,
            card_size: Vec2::new(120.0, 150.0),
            card_gap: 20.0,
            origin: Vec2::new(150.0, 90.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFace {
    Down,
    Up,
    Matched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    /// Index into the configured symbols.
    pub symbol: usize,
    pub face: CardFace,
}

/// Outcome of revealing a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealResult {
    /// Out of range, already showing, or waiting for a flip back.
    Ignored,
    /// First card of a pair turned over.
    Revealed,
    Matched,
    /// Second card differs; both flip back after the delay.
    Mismatched,
}

/// Turn over two cards at a time to find every pair.
pub struct PairsChallenge {
    config: PairsConfig,
    deck: Vec<Card>,
    /// Unmatched face-up cards, at most two.
    face_up: Vec<usize>,
    matched: u32,
    /// Pending flip-backs for mismatched pairs.
    timers: Timers<(usize, usize)>,
    success: SuccessSignal,
}

impl PairsChallenge {
    pub fn new(config: PairsConfig, mut rng: Box<dyn RandomSource>, on_success: OnSuccess) -> Self {
        let mut deck: Vec<Card> = (0..config.symbols.len())
            .flat_map(|symbol| {
                let card = Card { symbol, face: CardFace::Down };
                [card, card]
            })
            .collect();
        shuffle(&mut deck, &mut rng);
        Self {
            config,
            deck,
            face_up: Vec::with_capacity(2),
            matched: 0,
            timers: Timers::new(),
            success: SuccessSignal::new(on_success),
        }
    }

    /// Turn over the card at `index`.
    pub fn reveal(&mut self, index: usize) -> RevealResult {
        if self.face_up.len() >= 2 || self.is_won() {
            return RevealResult::Ignored;
        }
        match self.deck.get(index) {
            Some(card) if card.face == CardFace::Down => {}
            _ => return RevealResult::Ignored,
        }

        self.deck[index].face = CardFace::Up;
        self.face_up.push(index);
        if self.face_up.len() < 2 {
            return RevealResult::Revealed;
        }

        let (a, b) = (self.face_up[0], self.face_up[1]);
        if self.deck[a].symbol != self.deck[b].symbol {
            self.timers.schedule(self.config.flip_back_delay, (a, b));
            return RevealResult::Mismatched;
        }

        self.deck[a].face = CardFace::Matched;
        self.deck[b].face = CardFace::Matched;
        self.face_up.clear();
        self.matched += 1;
        if self.matched == self.pair_count() {
            log::debug!("all {} pairs matched", self.matched);
            self.success.arm(self.config.celebration_delay);
        }
        RevealResult::Matched
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        if let InputEvent::PointerDown { x, y } = *event {
            if let Some(index) = self.card_at(Vec2::new(x, y)) {
                self.reveal(index);
            }
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.success.tick(dt);
        for (a, b) in self.timers.advance(dt) {
            for i in [a, b] {
                if let Some(card) = self.deck.get_mut(i) {
                    if card.face == CardFace::Up {
                        card.face = CardFace::Down;
                    }
                }
            }
            self.face_up.retain(|&i| i != a && i != b);
        }
    }

    /// Top-left corner of card `index` in the grid.
    pub fn card_origin(&self, index: usize) -> Vec2 {
        let columns = self.config.columns.max(1);
        let col = (index % columns) as f32;
        let row = (index / columns) as f32;
        let step = self.config.card_size + Vec2::splat(self.config.card_gap);
        self.config.origin + Vec2::new(col * step.x, row * step.y)
    }

    pub fn card_at(&self, pos: Vec2) -> Option<usize> {
        (0..self.deck.len()).find(|&i| {
            let min = self.card_origin(i);
            let max = min + self.config.card_size;
            pos.cmpge(min).all() && pos.cmple(max).all()
        })
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn symbol_name(&self, index: usize) -> Option<&'static str> {
        self.deck
            .get(index)
            .and_then(|card| self.config.symbols.get(card.symbol).copied())
    }

    pub fn matched_count(&self) -> u32 {
        self.matched
    }

    pub fn pair_count(&self) -> u32 {
        self.config.symbols.len() as u32
    }

    pub fn is_won(&self) -> bool {
        self.success.is_armed()
    }
}
