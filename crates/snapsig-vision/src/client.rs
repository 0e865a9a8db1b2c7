use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use snapsig_models::ApiConfig;
use tracing::{debug, warn};

use crate::error::VisionError;
use crate::prompts::{analysis_prompt, SYSTEM_PROMPT};
use crate::vision::VisionModel;

/// Chat-completion client for OpenRouter and other OpenAI-compatible endpoints.
pub struct OpenRouterClient {
    http: reqwest::Client,
    config: ApiConfig,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Inline a PNG as a `data:` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Build the chat-completion payload: system instruction, then a user turn
/// carrying the prompt text and the screenshot.
pub fn build_chat_request<'a>(model: &'a str, png: &[u8]) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: analysis_prompt(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: png_data_uri(png),
                        },
                    },
                ]),
            },
        ],
    }
}

/// Pull the first choice's message content out of a chat-completion body.
pub fn extract_reply(body: &str) -> Result<String, VisionError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| VisionError::MalformedResponse(format!("{e} (length={})", body.len())))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .ok_or_else(|| VisionError::MalformedResponse("no choices[0].message.content".to_string()))
}

impl OpenRouterClient {
    /// Fails with `MissingApiKey` when the credential is empty.
    pub fn new(config: ApiConfig) -> Result<Self, VisionError> {
        if config.key.trim().is_empty() {
            return Err(VisionError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;
        Ok(Self { http, config })
    }

    /// Authenticated GET against the models listing. Anything but 200 counts as
    /// unreachable.
    pub async fn check_connection(&self) -> Result<(), VisionError> {
        let timeout = Duration::from_secs(self.config.check_timeout_seconds);
        debug!(url = %self.config.models_endpoint, "Checking vision service");

        let response = self
            .http
            .get(&self.config.models_endpoint)
            .bearer_auth(&self.config.key)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| VisionError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(VisionError::Unreachable(format!(
                "{} answered {status}",
                self.config.models_endpoint
            )));
        }
        Ok(())
    }

    fn map_send_error(&self, e: reqwest::Error) -> VisionError {
        if e.is_timeout() {
            VisionError::Timeout(self.config.request_timeout_seconds)
        } else {
            VisionError::Http(e)
        }
    }
}

#[async_trait]
impl VisionModel for OpenRouterClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn analyze(&self, png: &[u8]) -> Result<String, VisionError> {
        debug!(model = %self.config.model, bytes = png.len(), "Sending screenshot");

        let mut request = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.key)
            .json(&build_chat_request(&self.config.model, png));
        if let Some(referer) = &self.config.referer {
            request = request.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.config.title {
            request = request.header("X-Title", title);
        }

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            warn!(status = %status, "Vision endpoint rejected request");
            return Err(VisionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_reply(&body)
    }
}
