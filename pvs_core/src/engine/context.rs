use crate::engine::{SCORE_INF, SCORE_NEG_INF};
use crate::logic::board::Side;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI32, Ordering};

/// Cross-task bound shared by every search task of one root pass.
///
/// Both cells are kept in White's frame: `alpha` is the best score White
/// is known to reach at the root, `beta` the best score Black is known to
/// hold White to. Tasks read them with relaxed loads inside the search
/// loop; a stale value can only miss a cutoff. Writes happen once per
/// finished task, each cell behind its own lock, and only ever tighten.
pub struct SearchContext {
    alpha: AtomicI32,
    beta: AtomicI32,
    alpha_lock: Mutex<()>,
    beta_lock: Mutex<()>,
    shared: bool,
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchContext {
    pub const fn new() -> Self {
        Self {
            alpha: AtomicI32::new(SCORE_NEG_INF),
            beta: AtomicI32::new(SCORE_INF),
            alpha_lock: Mutex::new(()),
            beta_lock: Mutex::new(()),
            shared: true,
        }
    }

    /// A context whose bounds never move: tasks search full windows.
    pub fn strict() -> Self {
        Self {
            shared: false,
            ..Self::new()
        }
    }

    pub const fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn reset(&self) {
        {
            let _guard = self.alpha_lock.lock();
            self.alpha.store(SCORE_NEG_INF, Ordering::Relaxed);
        }
        let _guard = self.beta_lock.lock();
        self.beta.store(SCORE_INF, Ordering::Relaxed);
    }

    /// Best root score known for `side`, from `side`'s point of view.
    pub fn alpha_for(&self, side: Side) -> i32 {
        match side {
            Side::White => self.alpha.load(Ordering::Relaxed),
            Side::Black => -self.beta.load(Ordering::Relaxed),
        }
    }

    /// Root window for a task whose root move was played by `side`.
    pub fn window_for(&self, side: Side) -> (i32, i32) {
        match side {
            Side::White => (
                self.alpha.load(Ordering::Relaxed),
                self.beta.load(Ordering::Relaxed),
            ),
            Side::Black => (
                -self.beta.load(Ordering::Relaxed),
                -self.alpha.load(Ordering::Relaxed),
            ),
        }
    }

    /// Records a finished root score, `score` seen from `side` (the root mover).
    pub fn publish(&self, side: Side, score: i32) {
        if !self.shared {
            return;
        }
        match side {
            Side::White => {
                let _guard = self.alpha_lock.lock();
                let current = self.alpha.load(Ordering::Relaxed);
                self.alpha.store(current.max(score), Ordering::Relaxed);
            }
            Side::Black => {
                let _guard = self.beta_lock.lock();
                let current = self.beta.load(Ordering::Relaxed);
                self.beta.store(current.min(-score), Ordering::Relaxed);
            }
        }
    }
}
