//! GLM-4.5V chat completion client for describing sampled video frames.

use std::time::Duration;

use base64::prelude::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use zeroize::Zeroizing;

use super::VisionError;

/// Default chat completions endpoint.
pub const GLM_VISION_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";

/// Default vision model.
pub const GLM_VISION_MODEL: &str = "glm-4.5v";

/// Default request timeout.
pub const DEFAULT_VISION_TIMEOUT: Duration = Duration::from_secs(60);

// =============================================================================
// Configuration
// =============================================================================

#[derive(Clone)]
pub struct VisionConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<Zeroizing<String>>,
    pub timeout: Duration,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            url: GLM_VISION_URL.to_string(),
            model: GLM_VISION_MODEL.to_string(),
            api_key: None,
            timeout: DEFAULT_VISION_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionConfig")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

/// Chat completion returned by the vision API.
#[derive(Debug, Clone, Deserialize)]
pub struct VisionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

impl VisionResponse {
    /// Text of the first choice, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Token accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

// =============================================================================
// Client
// =============================================================================

/// Synchronous request/response client for the vision model.
///
/// No retry or rate limiting is applied.
#[derive(Clone)]
pub struct VisionClient {
    config: VisionConfig,
    api_key: Zeroizing<String>,
    http_client: Client,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or(VisionError::MissingApiKey)?;

        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(VisionError::Http)?;

        Ok(Self {
            config,
            api_key,
            http_client,
        })
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Ask the model about `frames` (JPEG), with an optional text `prompt`.
    pub async fn describe(
        &self,
        frames: &[Vec<u8>],
        prompt: &str,
    ) -> Result<VisionResponse, VisionError> {
        let mut content = Vec::with_capacity(frames.len() + 1);
        if !prompt.is_empty() {
            content.push(ContentPart::Text {
                text: prompt.to_string(),
            });
        }
        content.extend(frames.iter().map(|frame| ContentPart::ImageUrl {
            image_url: ImageUrl {
                url: format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(frame)),
            },
        }));

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content,
            }],
        };

        debug!(
            model = %self.config.model,
            frames = frames.len(),
            "Sending vision request"
        );

        let response = self
            .http_client
            .post(&self.config.url)
            .header("Authorization", format!("Bearer {}", self.api_key.as_str()))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = status.as_u16(), "Vision API error: {}", body);
            return Err(VisionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| VisionError::InvalidResponse(e.to_string()))
    }
}

impl std::fmt::Debug for VisionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            VisionClient::new(VisionConfig::default()),
            Err(VisionError::MissingApiKey)
        ));

        let empty = VisionConfig {
            api_key: Some(Zeroizing::new(String::new())),
            ..Default::default()
        };
        assert!(matches!(
            VisionClient::new(empty),
            Err(VisionError::MissingApiKey)
        ));
    }

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            model: GLM_VISION_MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: "What is shown?".to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: "data:image/jpeg;base64,AAA=".to_string(),
                        },
                    },
                ],
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "glm-4.5v");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"][0]["type"], "text");
        assert_eq!(value["messages"][0]["content"][1]["type"], "image_url");
        assert_eq!(
            value["messages"][0]["content"][1]["image_url"]["url"],
            "data:image/jpeg;base64,AAA="
        );
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{
            "id": "chat-1",
            "created": 1700000000,
            "model": "glm-4.5v",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "A cat."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 100, "completion_tokens": 5, "total_tokens": 105}
        }"#;
        let response: VisionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.content(), Some("A cat."));
        assert_eq!(response.usage.total_tokens, 105);
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = VisionConfig {
            api_key: Some(Zeroizing::new("zhipu-secret".to_string())),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("zhipu-secret"));
    }
}
