use crate::{Bandwidth, defaults, time::Duration};
use thiserror::Error;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// A point on the simulation timeline, counted in whole slots.
pub type Slot = u64;

/// The protocol constants every station of a run shares, in slots.
///
/// ```
/// # use csma_core::Timing;
/// let timing = Timing::default();
/// assert_eq!(timing.data, 120);
/// assert!(timing.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timing {
    /// idle-sensing interval before a backoff window opens
    pub difs: Slot,
    /// gap between a data frame and its acknowledgement
    pub sifs: Slot,
    /// on-air duration of an ACK frame
    pub ack: Slot,
    /// initial contention window
    pub cw_min: Slot,
    /// cap of the contention window
    pub cw_max: Slot,
    /// on-air duration of a data frame
    pub data: Slot,
}

/// Error returned when the protocol constants cannot describe a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    #[error("{field} must be at least one slot")]
    Zero { field: &'static str },
    #[error("cw_min ({cw_min}) is greater than cw_max ({cw_max})")]
    InvertedContentionWindow { cw_min: Slot, cw_max: Slot },
    #[error("slot duration must not be zero")]
    ZeroSlotDuration,
    #[error("bandwidth must not be zero")]
    ZeroBandwidth,
}

impl Timing {
    /// Check the constants form a usable timing chain.
    ///
    /// Every constant is at least one slot. A zero `cw_min` would leave
    /// the window at `0` after any number of collisions, so two stations
    /// that collided once would keep colliding for the rest of the run.
    pub fn validate(&self) -> Result<(), TimingError> {
        let constants = [
            ("difs", self.difs),
            ("sifs", self.sifs),
            ("ack", self.ack),
            ("cw_min", self.cw_min),
            ("data", self.data),
        ];
        for (field, value) in constants {
            if value == 0 {
                return Err(TimingError::Zero { field });
            }
        }
        if self.cw_min > self.cw_max {
            return Err(TimingError::InvertedContentionWindow {
                cw_min: self.cw_min,
                cw_max: self.cw_max,
            });
        }
        Ok(())
    }

    /// Upper bound (inclusive) of the backoff draw after `collisions`
    /// consecutive collisions: `min(cw_max, cw_min * 2^collisions)`.
    ///
    /// ```
    /// # use csma_core::Timing;
    /// let timing = Timing { cw_min: 4, cw_max: 32, ..Timing::default() };
    /// assert_eq!(timing.contention_window(0), 4);
    /// assert_eq!(timing.contention_window(2), 16);
    /// assert_eq!(timing.contention_window(10), 32);
    /// ```
    pub fn contention_window(&self, collisions: u32) -> Slot {
        let factor = 1u64.checked_shl(collisions).unwrap_or(u64::MAX);
        self.cw_min.saturating_mul(factor).min(self.cw_max)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Parameters::default().timing()
    }
}

/// The physical description of a run, from which the slot counts of the
/// [`Timing`] and the slot budget are derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub slot_duration: Duration,
    pub simulation_time: Duration,
    pub bandwidth: Bandwidth,
    pub payload_bytes: u64,
    pub difs: Slot,
    pub sifs: Slot,
    pub ack: Slot,
    pub cw_min: Slot,
    pub cw_max: Slot,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            slot_duration: defaults::DEFAULT_SLOT_DURATION,
            simulation_time: defaults::DEFAULT_SIMULATION_TIME,
            bandwidth: defaults::DEFAULT_BANDWIDTH,
            payload_bytes: defaults::DEFAULT_PAYLOAD_BYTES,
            difs: defaults::DEFAULT_DIFS,
            sifs: defaults::DEFAULT_SIFS,
            ack: defaults::DEFAULT_ACK,
            cw_min: defaults::DEFAULT_CW_MIN,
            cw_max: defaults::DEFAULT_CW_MAX,
        }
    }
}

impl Parameters {
    pub fn payload_bits(&self) -> u64 {
        self.payload_bytes * 8
    }

    /// On-air duration of a data frame, rounded up to whole slots.
    ///
    /// ```
    /// # use csma_core::Parameters;
    /// // 1500 bytes over 10 Mbps with 10µs slots
    /// assert_eq!(Parameters::default().data_slots(), 120);
    /// ```
    pub fn data_slots(&self) -> Slot {
        let bits_per_slot_scaled = self.bandwidth.bits_per_second() as u128
            * self.slot_duration.into_duration().as_nanos();
        if bits_per_slot_scaled == 0 {
            return 0;
        }
        let scaled_bits = self.payload_bits() as u128 * NANOS_PER_SECOND;
        scaled_bits.div_ceil(bits_per_slot_scaled) as Slot
    }

    /// Number of slots the run lasts: simulated time over slot length,
    /// rounded to the nearest slot.
    ///
    /// ```
    /// # use csma_core::Parameters;
    /// assert_eq!(Parameters::default().slot_budget(), 1_000);
    /// ```
    pub fn slot_budget(&self) -> Slot {
        let slot = self.slot_duration.into_duration().as_nanos();
        if slot == 0 {
            return 0;
        }
        let time = self.simulation_time.into_duration().as_nanos();
        ((time + slot / 2) / slot) as Slot
    }

    pub fn timing(&self) -> Timing {
        Timing {
            difs: self.difs,
            sifs: self.sifs,
            ack: self.ack,
            cw_min: self.cw_min,
            cw_max: self.cw_max,
            data: self.data_slots(),
        }
    }

    /// Derive and validate the [`Timing`] and the slot budget.
    pub fn resolve(&self) -> Result<(Timing, Slot), TimingError> {
        if self.slot_duration.into_duration().is_zero() {
            return Err(TimingError::ZeroSlotDuration);
        }
        if self.bandwidth.bits_per_second() == 0 {
            return Err(TimingError::ZeroBandwidth);
        }
        let timing = self.timing();
        timing.validate()?;
        Ok((timing, self.slot_budget()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contention_window_doubles_then_caps() {
        let timing = Timing {
            cw_min: 4,
            cw_max: 1_024,
            ..Timing::default()
        };
        let windows: Vec<Slot> = (0..10).map(|c| timing.contention_window(c)).collect();
        assert_eq!(windows, [4, 8, 16, 32, 64, 128, 256, 512, 1_024, 1_024]);
    }

    #[test]
    fn contention_window_survives_huge_collision_counts() {
        let timing = Timing::default();
        assert_eq!(timing.contention_window(200), timing.cw_max);
    }

    #[test]
    fn data_slots_round_up() {
        let parameters = Parameters {
            payload_bytes: 1_501,
            ..Parameters::default()
        };
        assert_eq!(parameters.data_slots(), 121);
    }

    #[test]
    fn resolve_rejects_inverted_window() {
        let parameters = Parameters {
            cw_min: 64,
            cw_max: 16,
            ..Parameters::default()
        };
        assert_eq!(
            parameters.resolve(),
            Err(TimingError::InvertedContentionWindow {
                cw_min: 64,
                cw_max: 16
            })
        );
    }

    #[test]
    fn resolve_rejects_zero_durations() {
        let parameters = Parameters {
            difs: 0,
            ..Parameters::default()
        };
        assert_eq!(
            parameters.resolve(),
            Err(TimingError::Zero { field: "difs" })
        );

        let parameters = Parameters {
            payload_bytes: 0,
            ..Parameters::default()
        };
        assert_eq!(
            parameters.resolve(),
            Err(TimingError::Zero { field: "data" })
        );

        let parameters = Parameters {
            slot_duration: Duration::from_micros(0),
            ..Parameters::default()
        };
        assert_eq!(parameters.resolve(), Err(TimingError::ZeroSlotDuration));
    }

    #[test]
    fn validate_rejects_empty_contention_window() {
        let timing = Timing {
            cw_min: 0,
            cw_max: 0,
            ..Timing::default()
        };
        assert_eq!(timing.validate(), Err(TimingError::Zero { field: "cw_min" }));
        assert_eq!(timing.contention_window(8), 0);

        let timing = Timing {
            sifs: 0,
            ..Timing::default()
        };
        assert_eq!(timing.validate(), Err(TimingError::Zero { field: "sifs" }));
    }

    #[test]
    fn resolve_defaults() {
        let (timing, budget) = Parameters::default().resolve().unwrap();
        assert_eq!(timing.data, 120);
        assert_eq!(timing.difs, 4);
        assert_eq!(budget, 1_000);
    }
}
