pub mod client;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod vision;

pub mod test_support;

pub use client::OpenRouterClient;
pub use error::VisionError;
pub use parser::parse_signal;
pub use vision::VisionModel;
