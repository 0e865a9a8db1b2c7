use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::signal::{HoldMinutes, Signal, SignalReading};

/// One completed analysis cycle, as appended to the journal.
///
/// Field order is the on-disk key order. `minutes` is written as `null` when
/// the reply asserted no duration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisRecord {
    pub time: DateTime<Local>,
    /// Path of the screenshot persisted for this cycle.
    pub image: String,
    pub signal: Signal,
    pub minutes: Option<HoldMinutes>,
    pub raw_ai_response: String,
}

impl AnalysisRecord {
    pub fn new(
        time: DateTime<Local>,
        image: impl Into<String>,
        reading: SignalReading,
        raw_ai_response: impl Into<String>,
    ) -> Self {
        Self {
            time,
            image: image.into(),
            signal: reading.signal,
            minutes: reading.minutes,
            raw_ai_response: raw_ai_response.into(),
        }
    }

    pub fn reading(&self) -> SignalReading {
        SignalReading {
            signal: self.signal,
            minutes: self.minutes,
        }
    }
}
