//! Canned vision models for exercising the pipeline without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::VisionError;
use crate::vision::VisionModel;

/// Returns a fixed reply (or a fixed failure) after an optional delay.
pub struct CannedVisionModel {
    reply: Result<String, u16>,
    delay: Duration,
    calls: AtomicUsize,
}

impl CannedVisionModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with an HTTP status error.
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VisionModel for CannedVisionModel {
    fn model(&self) -> &str {
        "canned"
    }

    async fn analyze(&self, png: &[u8]) -> Result<String, VisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if png.is_empty() {
            return Err(VisionError::MalformedResponse("empty image".to_string()));
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Ok(text) => Ok(text.trim().to_string()),
            Err(status) => Err(VisionError::Status {
                status: *status,
                body: "canned failure".to_string(),
            }),
        }
    }
}
