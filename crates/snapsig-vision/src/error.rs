use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("API key is not set")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vision request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Vision endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed vision response: {0}")]
    MalformedResponse(String),

    #[error("Cannot reach vision service: {0}")]
    Unreachable(String),
}
