use std::{fmt, num::ParseIntError, str};

/// The identifier of a station (transmitter or access point) in the
/// [`Network`].
///
/// Identifiers are handed out sequentially by the network, starting at `1`.
///
/// [`Network`]: crate::network::Network
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

/// The identifier of a collision domain.
///
/// Domains are declared on the network with
/// [`Network::add_collision_domain`](crate::network::Network::add_collision_domain)
/// before any station joins them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomainId(u64);

impl NodeId {
    pub const ZERO: Self = NodeId::new(0);
    pub const ONE: Self = NodeId::new(1);

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use = "function does not modify the current value"]
    pub(crate) fn next(self) -> Self {
        Self::new(self.0 + 1)
    }

    #[inline]
    pub fn into_u64(self) -> u64 {
        self.0
    }
}

impl DomainId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub fn into_u64(self) -> u64 {
        self.0
    }
}

impl str::FromStr for NodeId {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl str::FromStr for DomainId {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cd{}", self.0)
    }
}
