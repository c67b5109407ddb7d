//! Exogenous packet arrivals.
//!
//! A transmitter consumes its arrivals strictly front to back through an
//! [`ArrivalQueue`]. [`poisson_arrivals`] produces such a sequence for a
//! Poisson process, the traffic model the throughput studies run with.

use crate::{Slot, time::Duration};
use rand_core::Rng;
use std::collections::VecDeque;
use thiserror::Error;

/// Error returned when an arrival sequence goes back in time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("arrival #{index} at slot {slot} comes before the previous arrival at slot {previous}")]
pub struct UnsortedArrivals {
    pub index: usize,
    pub slot: Slot,
    pub previous: Slot,
}

/// FIFO of the packet arrival slots a transmitter has not consumed yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrivalQueue {
    slots: VecDeque<Slot>,
}

impl ArrivalQueue {
    /// Build a queue from a non-decreasing sequence of slots.
    ///
    /// ```
    /// # use csma_core::ArrivalQueue;
    /// let mut queue = ArrivalQueue::new([0, 10, 10, 25]).unwrap();
    /// assert_eq!(queue.pop(), Some(0));
    /// assert_eq!(queue.len(), 3);
    ///
    /// assert!(ArrivalQueue::new([5, 3]).is_err());
    /// ```
    pub fn new(slots: impl IntoIterator<Item = Slot>) -> Result<Self, UnsortedArrivals> {
        let slots: VecDeque<Slot> = slots.into_iter().collect();
        for (index, pair) in slots.iter().zip(slots.iter().skip(1)).enumerate() {
            let (&previous, &slot) = pair;
            if slot < previous {
                return Err(UnsortedArrivals {
                    index: index + 1,
                    slot,
                    previous,
                });
            }
        }
        Ok(Self { slots })
    }

    pub fn pop(&mut self) -> Option<Slot> {
        self.slots.pop_front()
    }

    pub fn peek(&self) -> Option<Slot> {
        self.slots.front().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Generate Poisson arrivals at `rate` frames per second up to `horizon`.
///
/// Inter-arrival times are drawn from the exponential distribution and
/// rounded up to whole slots (at least one slot apart). The `horizon`
/// itself is appended last, so that the transmitter still has an attempt
/// pending when the slot budget runs out instead of falling silent early.
pub fn poisson_arrivals<R: Rng + ?Sized>(
    rng: &mut R,
    rate: f64,
    horizon: Slot,
    slot_duration: Duration,
) -> Vec<Slot> {
    let slot_secs = slot_duration.into_duration().as_secs_f64();
    let mut arrivals = Vec::new();

    if rate > 0.0 && slot_secs > 0.0 {
        let mut now: Slot = 0;
        loop {
            let uniform = unit_interval(rng);
            let seconds = -(1.0 - uniform).ln() / rate;
            let gap = ((seconds / slot_secs).ceil() as Slot).max(1);
            now = now.saturating_add(gap);
            if now >= horizon {
                break;
            }
            arrivals.push(now);
        }
    }

    arrivals.push(horizon);
    arrivals
}

/// Uniform sample in `[0, 1)` from the top 53 bits of a draw.
fn unit_interval<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}
