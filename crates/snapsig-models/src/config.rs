use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration for snapsig.
///
/// Every section falls back to its defaults, so an empty file is a valid
/// configuration (apart from the API key, which is checked at startup).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct SnapsigConfig {
    pub api: ApiConfig,
    pub output: OutputConfig,
    pub hotkey: HotkeyConfig,
    pub capture: CaptureConfig,
    pub notifier: NotifierConfig,
}

/// Remote vision endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Bearer credential. `OPENROUTER_API_KEY` overrides this when set.
    pub key: String,
    pub model: String,
    /// Chat-completion endpoint receiving the screenshot.
    pub endpoint: String,
    /// Models-listing endpoint used by the startup connectivity check.
    pub models_endpoint: String,
    pub request_timeout_seconds: u64,
    pub check_timeout_seconds: u64,
    /// Sent as `HTTP-Referer` for OpenRouter attribution.
    pub referer: Option<String>,
    /// Sent as `X-Title` for OpenRouter attribution.
    pub title: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            model: "qwen/qwen3-vl-32b-instruct".to_string(),
            endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            models_endpoint: "https://openrouter.ai/api/v1/models".to_string(),
            request_timeout_seconds: 60,
            check_timeout_seconds: 10,
            referer: Some("https://openrouter.ai".to_string()),
            title: Some("Screenshot Trading Bot".to_string()),
        }
    }
}

/// Where screenshots and the signal journal are written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Journal file name, relative to `dir`.
    pub log_file: String,
    pub image_prefix: String,
}

impl OutputConfig {
    pub fn log_path(&self) -> PathBuf {
        self.dir.join(&self.log_file)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("screenshots_log"),
            log_file: "signals.log".to_string(),
            image_prefix: "screenshot".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Key combination such as `alt+q` or `ctrl+shift+s`.
    pub combo: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            combo: "alt+q".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct CaptureConfig {
    /// Index into the monitor list. None = primary monitor.
    pub monitor: Option<usize>,
    /// Crop to this rectangle. None = whole screen.
    pub region: Option<CaptureRegion>,
}

/// Screen rectangle in physical pixels, relative to the monitor's origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaptureRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Native desktop notification.
    #[default]
    Desktop,
    /// Log line only, for headless use.
    Log,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifierConfig {
    pub kind: NotifierKind,
    /// How long a popup stays visible before it is dismissed.
    pub display_seconds: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::Desktop,
            display_seconds: 4,
        }
    }
}
