//! Stand-in capture and notifier implementations for exercising the pipeline
//! without a display.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};

use crate::capture::ScreenCapture;
use crate::error::{CaptureError, NotifyError};
use crate::notifier::{Notifier, Popup};

/// Always returns the same synthetic chart, or always fails.
pub struct StaticCapture {
    image: Option<RgbaImage>,
    calls: AtomicUsize,
}

impl StaticCapture {
    pub fn new(width: u32, height: u32) -> Self {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            // a rising diagonal "price line" on dark background
            if y == height.saturating_sub(1 + x * height / width.max(1)) {
                Rgba([46, 204, 113, 255])
            } else {
                Rgba([20, 20, 20, 255])
            }
        });
        Self {
            image: Some(image),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            image: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ScreenCapture for StaticCapture {
    fn capture(&self) -> Result<RgbaImage, CaptureError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.image
            .clone()
            .ok_or_else(|| CaptureError::Backend("no display".to_string()))
    }
}

/// Remembers every popup it was asked to show; optionally fails each time.
#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Popup>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn shown(&self) -> Vec<Popup> {
        self.shown.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, popup: &Popup) -> Result<(), NotifyError> {
        if let Ok(mut shown) = self.shown.lock() {
            shown.push(popup.clone());
        }
        if self.fail {
            return Err(NotifyError::Display("no notification server".to_string()));
        }
        Ok(())
    }
}
