use crate::Slot;
use rand_core::Rng;
use std::collections::VecDeque;

/// Source of backoff draws.
///
/// `draw(window)` returns a value uniformly distributed in `[0, window]`
/// (both ends included). Every [`rand_core::Rng`] is a `Backoff`; the
/// [`ScriptedBackoff`] replays fixed draws for reproducing exact races.
pub trait Backoff {
    fn draw(&mut self, window: Slot) -> Slot;
}

impl<R: Rng + ?Sized> Backoff for R {
    fn draw(&mut self, window: Slot) -> Slot {
        let Some(span) = window.checked_add(1) else {
            return self.next_u64();
        };
        // rejection sampling keeps the draw unbiased for any window
        let zone = u64::MAX - (u64::MAX % span);
        loop {
            let bits = self.next_u64();
            if bits < zone {
                return bits % span;
            }
        }
    }
}

/// Replays a fixed list of backoff draws.
///
/// Each draw is clamped into the requested window; once the script is
/// exhausted every draw is `0`.
///
/// ```
/// # use csma_core::{Backoff, ScriptedBackoff};
/// let mut backoff = ScriptedBackoff::new([3, 9]);
/// assert_eq!(backoff.draw(8), 3);
/// assert_eq!(backoff.draw(4), 4);
/// assert_eq!(backoff.draw(4), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackoff {
    draws: VecDeque<Slot>,
}

impl ScriptedBackoff {
    pub fn new(draws: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }

    /// Number of scripted draws not consumed yet.
    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl Backoff for ScriptedBackoff {
    fn draw(&mut self, window: Slot) -> Slot {
        self.draws.pop_front().unwrap_or(0).min(window)
    }
}
