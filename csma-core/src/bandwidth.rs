use logos::{Lexer, Logos};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Raw channel capacity, in bits per second.
///
/// Unlike the byte-oriented bandwidth of a wired link, radio channels are
/// quoted with SI (decimal) prefixes: `10mbps` is `10_000_000` bits per
/// second.
///
/// ```
/// # use csma_core::Bandwidth;
/// let bw: Bandwidth = "10mbps".parse().unwrap();
/// assert_eq!(bw.bits_per_second(), 10_000_000);
/// assert_eq!(bw.to_string(), "10mbps");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bandwidth(u64);

/// Error returned when a [`Bandwidth`] cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BandwidthParseError {
    #[error("Expecting to parse a number")]
    ExpectedNumber,
    #[error("Expecting to parse a unit (bps, kbps, mbps, gbps)")]
    ExpectedUnit,
    #[error("Not expecting any other tokens to parse a bandwidth")]
    TrailingInput,
    #[error("Bandwidth overflows 64 bits per second")]
    Overflow,
}

const K: u64 = 1_000;
const M: u64 = 1_000_000;
const G: u64 = 1_000_000_000;

impl Bandwidth {
    pub const fn new(bits_per_second: u64) -> Self {
        Self(bits_per_second)
    }

    #[inline]
    pub fn bits_per_second(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;

        if v >= G && v % G == 0 {
            write!(f, "{}gbps", v / G)
        } else if v >= M && v % M == 0 {
            write!(f, "{}mbps", v / M)
        } else if v >= K && v % K == 0 {
            write!(f, "{}kbps", v / K)
        } else {
            write!(f, "{v}bps")
        }
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum BandwidthToken {
    #[token("bps")]
    Bps,
    #[token("kbps")]
    Kbps,
    #[token("mbps")]
    Mbps,
    #[token("gbps")]
    Gbps,

    #[regex("[0-9]+")]
    Value,
}

impl FromStr for Bandwidth {
    type Err = BandwidthParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::<'_, BandwidthToken>::new(s);

        let Some(Ok(BandwidthToken::Value)) = lex.next() else {
            return Err(BandwidthParseError::ExpectedNumber);
        };
        let number: u64 = lex
            .slice()
            .parse()
            .map_err(|_| BandwidthParseError::Overflow)?;
        let Some(Ok(token)) = lex.next() else {
            return Err(BandwidthParseError::ExpectedUnit);
        };
        let multiplier = match token {
            BandwidthToken::Bps => 1,
            BandwidthToken::Kbps => K,
            BandwidthToken::Mbps => M,
            BandwidthToken::Gbps => G,
            BandwidthToken::Value => return Err(BandwidthParseError::ExpectedUnit),
        };

        if lex.next().is_some() {
            return Err(BandwidthParseError::TrailingInput);
        }

        number
            .checked_mul(multiplier)
            .map(Self)
            .ok_or(BandwidthParseError::Overflow)
    }
}
