//! The "No" button that runs away from the pointer.

use glam::Vec2;

use crate::core::rng::RandomSource;

/// Axis-aligned rectangle: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max()).all()
    }

    /// Whether a `size`-sized box at `pos` comes within `buffer` of this rect.
    pub fn overlaps_box(&self, pos: Vec2, size: Vec2, buffer: f32) -> bool {
        let max = self.max();
        !(pos.x + size.x + buffer < self.min.x
            || pos.x > max.x + buffer
            || pos.y + size.y + buffer < self.min.y
            || pos.y > max.y + buffer)
    }
}

#[derive(Debug, Clone)]
pub struct DodgeConfig {
    /// Pointer distance from the button centre that triggers a dodge.
    pub proximity_threshold: f32,
    /// Added to the threshold per dodge so it gets jumpier.
    pub threshold_step: f32,
    pub escape_distance: f32,
    pub escape_step: f32,
    /// Seconds between dodges.
    pub cooldown: f32,
    /// Minimum distance from the viewport edges.
    pub padding: f32,
    /// Clearance kept around the "Yes" button.
    pub overlap_buffer: f32,
    /// Random placements tried before settling for an overlap.
    pub max_attempts: u32,
}

impl Default for DodgeConfig {
    fn default() -> Self {
        Self {
            proximity_threshold: 100.0,
            threshold_step: 10.0,
            escape_distance: 150.0,
            escape_step: 20.0,
            cooldown: 0.5,
            padding: 20.0,
            overlap_buffer: 20.0,
            max_attempts: 10,
        }
    }
}

/// Point `distance` away from `center`, directly away from `cursor`.
/// A cursor exactly on the centre leaves it where it is.
pub fn escape_vector(cursor: Vec2, center: Vec2, distance: f32) -> Vec2 {
    let dir = (center - cursor).normalize_or_zero();
    center + dir * distance
}

/// Clamp a top-left position so a `size` box stays `padding` inside the viewport.
pub fn constrain_to_viewport(pos: Vec2, size: Vec2, viewport: Vec2, padding: f32) -> Vec2 {
    let max = viewport - size - Vec2::splat(padding);
    Vec2::new(
        pos.x.min(max.x).max(padding),
        pos.y.min(max.y).max(padding),
    )
}

pub struct DodgyButton {
    config: DodgeConfig,
    rect: Rect,
    viewport: Vec2,
    /// Area the button must keep clear of (the "Yes" button).
    avoid: Option<Rect>,
    dodges: u32,
    /// Seconds left before the next dodge is allowed.
    cooldown: f32,
}

impl DodgyButton {
    pub fn new(config: DodgeConfig, rect: Rect, viewport: Vec2) -> Self {
        Self {
            config,
            rect,
            viewport,
            avoid: None,
            dodges: 0,
            cooldown: 0.0,
        }
    }

    pub fn avoiding(mut self, rect: Rect) -> Self {
        self.avoid = Some(rect);
        self
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// Desktop path: flee when the cursor gets close. Returns true on a dodge.
    pub fn pointer_moved(&mut self, cursor: Vec2, rng: &mut dyn RandomSource) -> bool {
        if self.cooldown > 0.0 {
            return false;
        }
        let center = self.rect.center();
        let threshold =
            self.config.proximity_threshold + self.dodges as f32 * self.config.threshold_step;
        if cursor.distance(center) >= threshold {
            return false;
        }

        let distance = self.config.escape_distance + self.dodges as f32 * self.config.escape_step;
        let target = escape_vector(cursor, center, distance) - self.rect.size * 0.5;
        let mut pos = constrain_to_viewport(target, self.rect.size, self.viewport, self.config.padding);
        if self.overlaps_avoided(pos) {
            pos = self.random_position(rng);
        }
        self.move_to(pos);
        true
    }

    /// Touch path: a tap sends the button somewhere random.
    pub fn tapped(&mut self, rng: &mut dyn RandomSource) -> Vec2 {
        let pos = self.random_position(rng);
        self.move_to(pos);
        pos
    }

    fn move_to(&mut self, pos: Vec2) {
        self.rect.min = pos;
        self.dodges += 1;
        self.cooldown = self.config.cooldown;
        log::debug!("dodge #{} to ({:.0}, {:.0})", self.dodges, pos.x, pos.y);
    }

    fn overlaps_avoided(&self, pos: Vec2) -> bool {
        self.avoid
            .is_some_and(|r| r.overlaps_box(pos, self.rect.size, self.config.overlap_buffer))
    }

    fn random_position(&self, rng: &mut dyn RandomSource) -> Vec2 {
        let padding = self.config.padding;
        let max = self.viewport - self.rect.size - Vec2::splat(padding);
        let mut pos = self.rect.min;
        for _ in 0..self.config.max_attempts.max(1) {
            pos = Vec2::new(
                rng.next_f32() * (max.x - padding) + padding,
                rng.next_f32() * (max.y - padding) + padding,
            );
            if !self.overlaps_avoided(pos) {
                break;
            }
        }
        pos
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn dodge_count(&self) -> u32 {
        self.dodges
    }
}
