use snapsig_journal::JournalError;
use snapsig_vision::VisionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No primary monitor found")]
    NoPrimaryMonitor,

    #[error("No monitor at index {0}")]
    NoMonitorAt(usize),

    #[error("Screen capture failed: {0}")]
    Backend(String),

    #[error("Capture region {0:?} lies outside the {1}x{2} screen")]
    EmptyRegion(snapsig_models::CaptureRegion, u32, u32),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Notification failed: {0}")]
    Display(String),

    #[error("Notifier task failed: {0}")]
    Task(String),
}

#[derive(Error, Debug)]
pub enum HotkeyError {
    #[error("Invalid hotkey {combo:?}: {reason}")]
    Parse { combo: String, reason: String },

    #[error("Failed to start hotkey listener: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Hotkey listener stopped")]
    ListenerStopped,
}

/// Anything that aborts a single analysis cycle.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Vision error: {0}")]
    Vision(#[from] VisionError),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cycle task failed: {0}")]
    Task(String),
}
