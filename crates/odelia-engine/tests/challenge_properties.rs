use std::cell::Cell;
use std::rc::Rc;

use odelia_engine::challenges::pairs::RevealResult;
use odelia_engine::{
    Category, MasteryState, OnSuccess, PairsChallenge, PairsConfig, Rng, SequenceChallenge,
    SequenceConfig, SequencePhase,
};
use proptest::prelude::*;
use proptest::test_runner::Config;

fn counter() -> (Rc<Cell<u32>>, OnSuccess) {
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    (hits, Box::new(move || h.set(h.get() + 1)))
}

fn wait_for_input(c: &mut SequenceChallenge) {
    for _ in 0..200 {
        if c.phase() == SequencePhase::Input {
            return;
        }
        c.tick(0.1);
    }
    panic!("stuck in {:?}", c.phase());
}

proptest! {
    #![proptest_config(Config::with_cases(64))]

    #[test]
    fn mastery_is_order_independent(
        order in Just(Category::ALL.to_vec()).prop_shuffle(),
        repeats in proptest::collection::vec(0usize..4, 0..6),
    ) {
        let mut state = MasteryState::new();
        for (i, c) in order.iter().enumerate() {
            state.insert(*c);
            if let Some(&r) = repeats.get(i) {
                state.insert(Category::ALL[r]);
            }
        }
        prop_assert_eq!(state.len(), 4);
        prop_assert!(state.is_complete());
    }

    #[test]
    fn exact_sequence_always_wins(seed in any::<u64>()) {
        let (hits, cb) = counter();
        let mut c = SequenceChallenge::new(SequenceConfig::default(), Box::new(Rng::new(seed)), cb);
        for _ in 0..3 {
            wait_for_input(&mut c);
            let seq = c.sequence().to_vec();
            for s in seq {
                c.press(s);
            }
        }
        prop_assert!(c.is_won());
        c.tick(1.0);
        prop_assert_eq!(hits.get(), 1);
    }

    #[test]
    fn one_wrong_symbol_replays_the_same_round(
        seed in any::<u64>(),
        clear_rounds in 0u32..3,
        position in 0usize..5,
    ) {
        let (hits, cb) = counter();
        let mut c = SequenceChallenge::new(SequenceConfig::default(), Box::new(Rng::new(seed)), cb);
        for _ in 0..clear_rounds {
            wait_for_input(&mut c);
            let seq = c.sequence().to_vec();
            for s in seq {
                c.press(s);
            }
        }
        wait_for_input(&mut c);
        let round = c.round();
        let seq = c.sequence().to_vec();
        let i = position % seq.len();
        for &s in &seq[..i] {
            c.press(s);
        }
        c.press((seq[i] + 1) % 4);
        prop_assert_eq!(c.phase(), SequencePhase::Failed);

        c.tick(1.0);
        prop_assert_eq!(c.phase(), SequencePhase::Watching);
        prop_assert_eq!(c.round(), round);
        prop_assert_eq!(c.sequence().len(), seq.len());
        prop_assert_eq!(hits.get(), 0);
    }

    #[test]
    fn matching_pairs_in_any_order_wins_within_deck_size(
        seed in any::<u64>(),
        order in Just(vec![0usize, 1, 2]).prop_shuffle(),
    ) {
        let (hits, cb) = counter();
        let mut c = PairsChallenge::new(PairsConfig::default(), Box::new(Rng::new(seed)), cb);
        let deck_size = c.deck().len();
        let mut reveals = 0;
        for symbol in order {
            let cards: Vec<usize> = c
                .deck()
                .iter()
                .enumerate()
                .filter(|(_, card)| card.symbol == symbol)
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(cards.len(), 2);
            prop_assert_eq!(c.reveal(cards[0]), RevealResult::Revealed);
            prop_assert_eq!(c.reveal(cards[1]), RevealResult::Matched);
            reveals += 2;
        }
        prop_assert_eq!(c.matched_count(), 3);
        prop_assert!(reveals <= deck_size);
        c.tick(1.0);
        prop_assert_eq!(hits.get(), 1);
    }
}
