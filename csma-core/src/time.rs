use logos::{Lexer, Logos};
use std::{fmt, str::FromStr, time};
use thiserror::Error;

/// A wall-clock [`std::time::Duration`] that can be written and read as
/// text (`"10us"`, `"10ms"`, `"1s 500ms"`, `"0.01s"`).
///
/// Used to describe the physical side of a run (slot length, simulated
/// time) before it is converted into whole slots.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(time::Duration);

/// Error returned when a [`Duration`] cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("Failed to parse `{input}': unexpected character")]
    Lexer { input: String },
    #[error("Expecting duration to start with a number, cannot parse `{input}'")]
    ExpectedNumber { input: String },
    #[error("Expecting a unit (ns, us, ms, s, m) after the number in `{input}'")]
    ExpectedUnit { input: String },
    #[error("Empty duration")]
    Empty,
}

impl Duration {
    pub const fn new(dur: time::Duration) -> Self {
        Self(dur)
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self(time::Duration::from_micros(micros))
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(time::Duration::from_millis(millis))
    }

    #[inline]
    pub fn into_duration(self) -> time::Duration {
        self.0
    }
}

impl From<time::Duration> for Duration {
    fn from(value: time::Duration) -> Self {
        Self(value)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        <time::Duration as fmt::Debug>::fmt(&self.0, f)
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lex = Lexer::new(s);

        let mut total = time::Duration::ZERO;
        let mut parsed_any = false;

        while let Some(next) = lex.next() {
            let token: Token = next.map_err(|()| DurationParseError::Lexer {
                input: s.to_owned(),
            })?;
            if token != Token::Value {
                return Err(DurationParseError::ExpectedNumber {
                    input: s.to_owned(),
                });
            }
            // the lexer only matches digits with an optional fraction
            let number: f64 = lex
                .slice()
                .parse()
                .map_err(|_| DurationParseError::ExpectedNumber {
                    input: s.to_owned(),
                })?;

            let unit = match lex.next() {
                Some(Ok(unit)) => unit,
                Some(Err(())) => {
                    return Err(DurationParseError::Lexer {
                        input: s.to_owned(),
                    });
                }
                None => {
                    return Err(DurationParseError::ExpectedUnit {
                        input: s.to_owned(),
                    });
                }
            };
            let nanos_per_unit: f64 = match unit {
                Token::NanoSeconds => 1.0,
                Token::MicroSeconds => 1_000.0,
                Token::MilliSeconds => 1_000_000.0,
                Token::Seconds => 1_000_000_000.0,
                Token::Minutes => 60_000_000_000.0,
                Token::Value => {
                    return Err(DurationParseError::ExpectedUnit {
                        input: s.to_owned(),
                    });
                }
            };
            total += time::Duration::from_nanos((number * nanos_per_unit).round() as u64);
            parsed_any = true;
        }

        if !parsed_any {
            return Err(DurationParseError::Empty);
        }

        Ok(Self(total))
    }
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\n\f]+")] // Ignore this regex pattern between tokens
enum Token {
    #[token("ns")]
    NanoSeconds,
    // U+03BC and U+00B5; `Display` prints the micro sign
    #[regex("us|μs|µs")]
    MicroSeconds,
    #[token("ms")]
    MilliSeconds,
    #[token("s")]
    Seconds,
    #[token("m")]
    Minutes,

    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Value,
}
