//! Scoped one-shot timers.
//!
//! A component owns its `Timers` and advances them from its own `tick`.
//! Nothing is registered globally: clearing or dropping the owner is the
//! whole cancellation protocol, so a torn-down challenge can never be called
//! back by a stale timer.

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u32);

#[derive(Debug)]
struct Pending<T> {
    id: TimerId,
    remaining: f32,
    payload: T,
}

/// A set of pending one-shot timers carrying payloads of type `T`.
#[derive(Debug)]
pub struct Timers<T> {
    pending: Vec<Pending<T>>,
    next_id: u32,
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Fire `payload` after `delay` seconds of advanced time.
    pub fn schedule(&mut self, delay: f32, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            remaining: delay.max(0.0),
            payload,
        });
        id
    }

    /// Cancel a pending timer. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.pending.iter().position(|p| p.id == id) {
            Some(idx) => {
                self.pending.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance time by `dt` seconds and return the payloads that came due,
    /// earliest first (ties in scheduling order).
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        for p in &mut self.pending {
            p.remaining -= dt;
        }
        if !self.pending.iter().any(|p| p.remaining <= 0.0) {
            return Vec::new();
        }

        let (mut due, rest): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending)
                .into_iter()
                .partition(|p| p.remaining <= 0.0);
        self.pending = rest;

        due.sort_by(|a, b| {
            a.remaining
                .total_cmp(&b.remaining)
                .then(a.id.0.cmp(&b.id.0))
        });
        due.into_iter().map(|p| p.payload).collect()
    }
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}
