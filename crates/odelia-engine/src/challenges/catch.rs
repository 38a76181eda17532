use glam::Vec2;

use super::{OnSuccess, SuccessSignal};
use crate::core::rng::RandomSource;
use crate::core::timer::Timers;
use crate::input::queue::InputEvent;

/// Tuning for the wind-spirit catch.
#[derive(Debug, Clone)]
pub struct CatchConfig {
    /// Spirits to catch.
    pub target: u32,
    /// Seconds between spawns.
    pub spawn_interval: f32,
    /// Board units per second.
    pub fall_speed: f32,
    pub catch_radius: f32,
    /// Horizontal spawn band (15% to 85% of a 700-wide board).
    pub min_x: f32,
    pub max_x: f32,
    pub spawn_y: f32,
    /// Spirits below this line are gone.
    pub floor_y: f32,
    pub celebration_delay: f32,
}

impl Default for CatchConfig {
    fn default() -> Self {
        Self {
            target: 5,
            spawn_interval: 1.2,
            fall_speed: 120.0,
            catch_radius: 45.0,
            min_x: 105.0,
            max_x: 595.0,
            spawn_y: -30.0,
            floor_y: 530.0,
            celebration_delay: 0.5,
        }
    }
}

/// A falling spirit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spirit {
    pub id: u32,
    pub pos: Vec2,
}

/// Tap falling wind spirits before they drift off the board.
pub struct CatchChallenge {
    config: CatchConfig,
    rng: Box<dyn RandomSource>,
    spirits: Vec<Spirit>,
    caught: u32,
    next_id: u32,
    spawn_timer: Timers<()>,
    success: SuccessSignal,
}

impl CatchChallenge {
    pub fn new(config: CatchConfig, rng: Box<dyn RandomSource>, on_success: OnSuccess) -> Self {
        let mut challenge = Self {
            config,
            rng,
            spirits: Vec::new(),
            caught: 0,
            next_id: 1,
            spawn_timer: Timers::new(),
            success: SuccessSignal::new(on_success),
        };
        challenge.spawn();
        challenge
    }

    fn spawn(&mut self) {
        let x = self.rng.range_f32(self.config.min_x, self.config.max_x);
        self.spirits.push(Spirit {
            id: self.next_id,
            pos: Vec2::new(x, self.config.spawn_y),
        });
        self.next_id += 1;
        self.spawn_timer.schedule(self.config.spawn_interval, ());
    }

    /// Try to catch the nearest spirit within reach of `pos`.
    pub fn catch_at(&mut self, pos: Vec2) -> bool {
        if self.is_won() {
            return false;
        }
        let nearest = self
            .spirits
            .iter()
            .enumerate()
            .map(|(i, s)| (i, s.pos.distance(pos)))
            .filter(|&(_, d)| d <= self.config.catch_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let Some((index, _)) = nearest else {
            return false;
        };

        self.spirits.remove(index);
        self.caught += 1;
        if self.caught >= self.config.target {
            log::debug!("caught {} spirits", self.caught);
            self.spirits.clear();
            self.spawn_timer.clear();
            self.success.arm(self.config.celebration_delay);
        }
        true
    }

    pub fn handle_input(&mut self, event: &InputEvent) {
        if let InputEvent::PointerDown { x, y } = *event {
            self.catch_at(Vec2::new(x, y));
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.success.tick(dt);
        if self.is_won() {
            return;
        }

        let fall = self.config.fall_speed * dt;
        for spirit in &mut self.spirits {
            spirit.pos.y += fall;
        }
        let floor = self.config.floor_y;
        self.spirits.retain(|s| s.pos.y <= floor);

        for _ in self.spawn_timer.advance(dt) {
            self.spawn();
        }
    }

    pub fn spirits(&self) -> &[Spirit] {
        &self.spirits
    }

    pub fn caught(&self) -> u32 {
        self.caught
    }

    pub fn target(&self) -> u32 {
        self.config.target
    }

    pub fn is_won(&self) -> bool {
        self.success.is_armed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenges::test_support::counter;
    use crate::core::rng::{Rng, ScriptedRng};

    fn make_challenge() -> (std::rc::Rc<std::cell::Cell<u32>>, CatchChallenge) {
        let (hits, cb) = counter();
        let c = CatchChallenge::new(
            CatchConfig::default(),
            Box::new(ScriptedRng::new(vec![0])),
            cb,
        );
        (hits, c)
    }

    #[test]
    fn first_spirit_appears_immediately() {
        let (_, c) = make_challenge();
        assert_eq!(c.spirits().len(), 1);
        assert_eq!(c.spirits()[0].pos, Vec2::new(105.0, -30.0));
    }

    #[test]
    fn spirits_fall_and_respawn() {
        let (_, mut c) = make_challenge();
        c.tick(0.5);
        assert!((c.spirits()[0].pos.y - 30.0).abs() < 1e-3);
        c.tick(0.8);
        assert_eq!(c.spirits().len(), 2);
        assert_eq!(c.spirits()[1].id, 2);
    }

    #[test]
    fn spirits_leaving_the_board_are_removed() {
        let (_, mut c) = make_challenge();
        let config = CatchConfig {
            spawn_interval: 100.0,
            ..CatchConfig::default()
        };
        c.config = config;
        c.spawn_timer.clear();
        for _ in 0..50 {
            c.tick(0.1);
        }
        assert!(c.spirits().is_empty());
        assert_eq!(c.caught(), 0);
    }

    #[test]
    fn tapping_near_a_spirit_catches_it() {
        let (_, mut c) = make_challenge();
        c.tick(0.5);
        assert!(!c.catch_at(Vec2::new(300.0, 30.0)));
        assert!(c.catch_at(Vec2::new(120.0, 40.0)));
        assert_eq!(c.caught(), 1);
        assert!(c.spirits().is_empty());
    }

    #[test]
    fn reaching_target_fires_success_once() {
        let (hits, mut c) = make_challenge();
        for _ in 0..5 {
            let pos = c.spirits()[0].pos;
            c.handle_input(&InputEvent::PointerDown { x: pos.x, y: pos.y });
            c.tick(1.2);
        }
        assert!(c.is_won());
        assert!(c.spirits().is_empty());
        c.tick(5.0);
        assert!(c.spirits().is_empty());
        assert_eq!(hits.get(), 1);
        assert!(!c.catch_at(Vec2::new(105.0, 0.0)));
    }

    #[test]
    fn spawn_band_is_respected() {
        let (_, cb) = counter();
        let mut c = CatchChallenge::new(CatchConfig::default(), Box::new(Rng::new(11)), cb);
        for _ in 0..20 {
            c.tick(1.2);
        }
        assert!(c.spirits().iter().all(|s| (105.0..595.0).contains(&s.pos.x)));
    }
}
