//! Injectable randomness.
//!
//! Every shuffle, generated sequence and spawn position goes through a
//! [`RandomSource`], so tests can swap in a [`ScriptedRng`] and assert exact
//! outcomes.

/// Source of pseudo-random numbers.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;

    /// Generate a random number in [0, upper_bound). Returns 0 for an empty range.
    fn next_int(&mut self, upper_bound: u32) -> u32 {
        if upper_bound == 0 {
            return 0;
        }
        (self.next_u64() % upper_bound as u64) as u32
    }

    /// Uniform float in [0, 1).
    fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform float in [lo, hi).
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_u64(&mut self) -> u64 {
        (**self).next_u64()
    }
}

/// Seedable pseudo-random number generator (xorshift64).
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }
}

impl RandomSource for Rng {
    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Replays a fixed list of raw values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    values: Vec<u64>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: Vec<u64>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedRng {
    fn next_u64(&mut self) -> u64 {
        if self.values.is_empty() {
            return 0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}

/// Fisher–Yates shuffle, walking from the last index down.
pub fn shuffle<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.next_int(i as u32 + 1) as usize;
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_deterministic() {
        let mut rng1 = Rng::new(42);
        let mut rng2 = Rng::new(42);
        for _ in 0..10 {
            assert_eq!(rng1.next_int(1000), rng2.next_int(1000));
        }
    }

    #[test]
    fn rng_zero_seed_handled() {
        let mut rng = Rng::new(0);
        let _ = rng.next_int(100);
    }

    #[test]
    fn next_f32_stays_in_unit_range() {
        let mut rng = Rng::new(7);
        for _ in 0..1000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "got {v}");
        }
    }

    #[test]
    fn scripted_rng_cycles() {
        let mut rng = ScriptedRng::new(vec![3, 1]);
        assert_eq!(rng.next_int(4), 3);
        assert_eq!(rng.next_int(4), 1);
        assert_eq!(rng.next_int(4), 3);
    }

    #[test]
    fn shuffle_with_zero_script_rotates_predictably() {
        // j = 0 on every step: each element is swapped with the head in turn.
        let mut items = [0, 1, 2, 3];
        shuffle(&mut items, &mut ScriptedRng::new(vec![0]));
        assert_eq!(items, [1, 2, 3, 0]);
    }

    #[test]
    fn shuffle_keeps_every_element() {
        let mut items: Vec<u32> = (0..12).collect();
        shuffle(&mut items, &mut Rng::new(99));
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..12).collect::<Vec<_>>());
    }
}
