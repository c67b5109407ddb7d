use crate::{Bandwidth, time::Duration};

/// Default slot length.
///
/// ```
/// # use csma_core::defaults::*;
/// assert_eq!(DEFAULT_SLOT_DURATION.to_string(), "10µs");
/// ```
pub const DEFAULT_SLOT_DURATION: Duration = Duration::from_micros(10);

/// Default simulated time of a run.
///
/// With the [`DEFAULT_SLOT_DURATION`] this gives a budget of `1_000` slots.
pub const DEFAULT_SIMULATION_TIME: Duration = Duration::from_millis(10);

/// Default raw channel bandwidth.
///
/// ```
/// # use csma_core::defaults::*;
/// assert_eq!(DEFAULT_BANDWIDTH.to_string(), "10mbps");
/// ```
pub const DEFAULT_BANDWIDTH: Bandwidth = Bandwidth::new(10_000_000);

/// Default frame payload, in bytes.
pub const DEFAULT_PAYLOAD_BYTES: u64 = 1_500;

/// DIFS, in slots.
pub const DEFAULT_DIFS: u64 = 4;

/// SIFS, in slots.
pub const DEFAULT_SIFS: u64 = 1;

/// ACK frame duration, in slots.
pub const DEFAULT_ACK: u64 = 2;

/// Initial contention window.
pub const DEFAULT_CW_MIN: u64 = 4;

/// Contention window cap for the truncated binary exponential backoff.
pub const DEFAULT_CW_MAX: u64 = 1_024;
