use async_trait::async_trait;

use crate::error::VisionError;

/// A remote model that looks at a chart image and answers in free text.
/// Mockable for testing.
#[async_trait]
pub trait VisionModel: Send + Sync {
    fn model(&self) -> &str;

    /// Send a PNG-encoded screenshot and return the reply text, trimmed.
    async fn analyze(&self, png: &[u8]) -> Result<String, VisionError>;
}
