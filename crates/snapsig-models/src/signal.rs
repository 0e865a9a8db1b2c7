use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directional recommendation derived from a model reply.
///
/// `Unknown` is the ordinary outcome when no keyword is recognized, not an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Up,
    Down,
    Wait,
    #[default]
    Unknown,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Up => "up",
            Signal::Down => "down",
            Signal::Wait => "wait",
            Signal::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested holding period in minutes. Only 1 through 5 are representable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct HoldMinutes(u8);

impl HoldMinutes {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(minutes: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&minutes).then_some(Self(minutes))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error(
    "hold minutes must be between {min} and {max}, got {0}",
    min = HoldMinutes::MIN,
    max = HoldMinutes::MAX
)]
pub struct InvalidHoldMinutes(pub u8);

impl TryFrom<u8> for HoldMinutes {
    type Error = InvalidHoldMinutes;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidHoldMinutes(value))
    }
}

impl From<HoldMinutes> for u8 {
    fn from(value: HoldMinutes) -> Self {
        value.0
    }
}

impl fmt::Display for HoldMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} min", self.0)
    }
}

/// The parser's verdict: a signal and an independently extracted duration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SignalReading {
    pub signal: Signal,
    pub minutes: Option<HoldMinutes>,
}

impl SignalReading {
    /// Short label shown in the popup, e.g. `UP — 2 min` or `WAIT`.
    pub fn label(&self) -> String {
        let signal = self.signal.as_str().to_uppercase();
        match self.minutes {
            Some(m) => format!("{signal} — {m}"),
            None => signal,
        }
    }
}
