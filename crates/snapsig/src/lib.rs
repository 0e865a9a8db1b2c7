//! snapsig - screenshot to trading signal
//!
//! Captures the screen on a global hotkey, asks a vision model for an
//! up/down/wait call, shows it briefly, and journals every result.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use snapsig::models::{SnapsigConfig, Signal};
//! use snapsig::vision::{parse_signal, OpenRouterClient, VisionModel};
//! use snapsig::journal::JournalWriter;
//! use snapsig::pipeline::Analyzer;
//! ```

pub use snapsig_journal as journal;
pub use snapsig_models as models;
pub use snapsig_vision as vision;

pub mod capture;
pub mod error;
pub mod hotkey;
pub mod notifier;
pub mod pipeline;

pub mod test_support;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use snapsig_journal::JournalWriter;
use snapsig_models::{ApiConfig, SnapsigConfig};
use snapsig_vision::{OpenRouterClient, VisionError, VisionModel};
use tokio_util::sync::CancellationToken;

use crate::capture::XcapCapture;
use crate::notifier::build_notifier;
use crate::pipeline::Analyzer;

/// Environment variable that overrides `api.key`.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/snapsig.toml";

/// Load configuration from `path`, or from [`DEFAULT_CONFIG_PATH`] if it
/// exists, or fall back to built-in defaults. Then apply the API key override.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SnapsigConfig> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            read_config(Path::new(DEFAULT_CONFIG_PATH))?
        }
        None => {
            tracing::debug!("No config file, using defaults");
            SnapsigConfig::default()
        }
    };
    apply_api_key_override(&mut config, std::env::var(API_KEY_ENV).ok());
    Ok(config)
}

fn read_config(path: &Path) -> anyhow::Result<SnapsigConfig> {
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// A non-blank `key` replaces whatever the file configured.
pub fn apply_api_key_override(config: &mut SnapsigConfig, key: Option<String>) {
    if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
        config.api.key = key;
    }
}

/// Verify the credential is present and the service answers, returning the
/// ready client. Both failures are fatal to startup.
pub async fn startup_check(config: &ApiConfig) -> Result<OpenRouterClient, VisionError> {
    let client = OpenRouterClient::new(config.clone())?;
    client.check_connection().await?;
    tracing::info!(model = %config.model, "Vision service reachable");
    Ok(client)
}

/// Wire the production capture, notifier, and journal around `vision`.
pub fn build_analyzer(
    config: &SnapsigConfig,
    vision: Arc<dyn VisionModel>,
    cancel: CancellationToken,
) -> anyhow::Result<Analyzer> {
    let log_path = config.output.log_path();
    let journal = JournalWriter::open(&log_path)
        .with_context(|| format!("Failed to open journal: {}", log_path.display()))?;

    Ok(Analyzer::new(
        Arc::new(XcapCapture::new(config.capture.clone())),
        vision,
        build_notifier(&config.notifier, cancel),
        Arc::new(journal),
        config.output.clone(),
        Duration::from_secs(config.notifier.display_seconds),
    ))
}
