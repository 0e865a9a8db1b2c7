pub mod config;
pub mod record;
pub mod signal;

pub use config::{
    ApiConfig, CaptureConfig, CaptureRegion, HotkeyConfig, NotifierConfig, NotifierKind,
    OutputConfig, SnapsigConfig,
};
pub use record::AnalysisRecord;
pub use signal::{HoldMinutes, InvalidHoldMinutes, Signal, SignalReading};
