use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::AnalysisGenerationError;
use crate::config::AnalyzerConfig;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Ask the model to constrain its output to a JSON object.
    pub json_mode: bool,
}

/// A text generation backend.
///
/// Implementations return the raw text of the model's reply. Errors are
/// reserved for calls that could not be made or were refused.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, request: &CompletionRequest)
        -> Result<String, AnalysisGenerationError>;
}

// --- OpenAI-compatible serde structs ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat completions client for OpenAI and compatible endpoints.
pub struct OpenAiClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalysisGenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.model_timeout_secs))
            .build()
            .map_err(|e| AnalysisGenerationError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.credential().map(str::to_string),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl CompletionModel for OpenAiClient {
    async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<String, AnalysisGenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AnalysisGenerationError::MissingCredential)?;

        let payload = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        debug!(
            "Calling {}/chat/completions with model {}",
            self.api_base, self.model
        );
        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AnalysisGenerationError::RequestError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AnalysisGenerationError::RequestError(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(AnalysisGenerationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(chat) => Ok(chat
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .unwrap_or_default()),
            Err(e) => {
                // left to the response parser, which falls back when it finds no analysis
                warn!("Model reply is not a chat completion envelope: {}", e);
                Ok(body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{chat_completion, start_test_server};

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "system".to_string(),
            prompt: "prompt".to_string(),
            temperature: 0.5,
            max_tokens: 1500,
            json_mode: true,
        }
    }

    fn config_for(api_base: String, api_key: Option<&str>) -> AnalyzerConfig {
        AnalyzerConfig {
            api_base,
            api_key: api_key.map(str::to_string),
            ..AnalyzerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_complete_sends_json_mode_request() {
        let server = start_test_server(vec![(
            "/v1/chat/completions",
            200,
            chat_completion("{\"ok\": true}"),
        )])
        .await;
        let client = OpenAiClient::new(&config_for(server.url("/v1/"), Some("sk-test"))).unwrap();

        let text = client.complete(&request()).await.unwrap();
        assert_eq!(text, "{\"ok\": true}");

        let sent: serde_json::Value =
            serde_json::from_str(&server.requests()[0].body).unwrap();
        assert_eq!(sent["response_format"]["type"], "json_object");
        assert_eq!(sent["max_tokens"], 1500);
        assert_eq!(sent["messages"][0]["role"], "system");
        assert_eq!(sent["messages"][1]["content"], "prompt");
        assert!((sent["temperature"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_complete_reports_api_errors() {
        let server = start_test_server(vec![(
            "/v1/chat/completions",
            401,
            r#"{"error": {"message": "Incorrect API key provided"}}"#.to_string(),
        )])
        .await;
        let client = OpenAiClient::new(&config_for(server.url("/v1"), Some("sk-bad"))).unwrap();

        match client.complete(&request()).await {
            Err(AnalysisGenerationError::ApiError { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_complete_without_credential_makes_no_request() {
        let server = start_test_server(vec![]).await;
        let client = OpenAiClient::new(&config_for(server.url("/v1"), None)).unwrap();

        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, AnalysisGenerationError::MissingCredential));
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_complete_with_empty_choices() {
        let server = start_test_server(vec![(
            "/v1/chat/completions",
            200,
            r#"{"choices": []}"#.to_string(),
        )])
        .await;
        let client = OpenAiClient::new(&config_for(server.url("/v1"), Some("sk-test"))).unwrap();
        assert_eq!(client.complete(&request()).await.unwrap(), "");
    }
}
