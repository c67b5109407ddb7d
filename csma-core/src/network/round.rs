use std::fmt;

/// A scheduler decision point.
///
/// One round is one pass of the scheduler: every station declares, the
/// earliest events go on the air and everybody else is told about them.
/// Several rounds can share a slot (an access point draining a backlog of
/// collision markers) and one round can skip many slots.
///
/// ```
/// # use csma_core::network::Round;
/// let first = Round::ZERO.next();
/// assert_eq!(first.into_u64(), 1);
/// assert!(Round::ZERO < first);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Round(u64);

impl Round {
    pub const ZERO: Self = Self(0);

    #[must_use = "rounds are values, the counter is not advanced in place"]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    pub fn into_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
