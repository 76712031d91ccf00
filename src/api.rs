//! Summarizer API interaction.
//!
//! This module sends the aggregated feed text to an OpenAI-compatible chat
//! completions endpoint (DeepSeek by default) and returns the model's reply
//! as unstructured text.
//!
//! # Architecture
//!
//! - [`Summarizer`]: Trait the pipeline depends on
//! - [`ChatCompletionClient`]: Production implementation over `reqwest`
//!
//! The credential is an explicit constructor argument, so a missing key is
//! reported before any feed is fetched. Requests are not retried.

use crate::config::AiConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Instant;
use thiserror::Error;
use tracing::{error, info, instrument};

pub const DEFAULT_API_BASE_URL: &str = "https://api.deepseek.com/v1";

/// Failures of the summarizer call. All of them fail the whole analysis request.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("DEEPSEEK_API_KEY environment variable is not set")]
    MissingCredential,
    #[error("summarizer request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("summarizer returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("summarizer response contained no message")]
    EmptyResponse,
}

/// Something that turns aggregated feed text into a free-form analysis.
pub trait Summarizer: Send + Sync {
    /// Send `content` to the summarizer and return its reply.
    fn summarize(&self, content: &str) -> impl Future<Output = Result<String, AnalysisError>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Compose the user-role message: prompt prefix, blank line, feed content.
pub fn user_message(prompt: &str, content: &str) -> String {
    format!("{prompt}\n\n{content}")
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    ai: AiConfig,
}

impl fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.ai.model())
            .finish_non_exhaustive()
    }
}

impl ChatCompletionClient {
    /// Build a client.
    ///
    /// # Arguments
    ///
    /// * `http` - Shared HTTP client
    /// * `base_url` - API root, e.g. `https://api.deepseek.com/v1`
    /// * `api_key` - Bearer credential; `None` or empty is rejected
    /// * `ai` - Prompt and sampling settings
    ///
    /// # Errors
    ///
    /// [`AnalysisError::MissingCredential`] when no usable key is supplied.
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: Option<SecretString>,
        ai: AiConfig,
    ) -> Result<Self, AnalysisError> {
        let api_key = api_key
            .filter(|k| !k.expose_secret().is_empty())
            .ok_or(AnalysisError::MissingCredential)?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key,
            ai,
        })
    }

    async fn request(&self, content: &str) -> Result<String, AnalysisError> {
        let user = user_message(self.ai.user_prompt(), content);
        let body = ChatRequest {
            model: self.ai.model(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.ai.system_prompt(),
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            temperature: self.ai.temperature(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AnalysisError::EmptyResponse)
    }
}

impl Summarizer for ChatCompletionClient {
    #[instrument(level = "info", skip_all, fields(model = %self.ai.model(), bytes = content.len()))]
    async fn summarize(&self, content: &str) -> Result<String, AnalysisError> {
        info!("Requesting analysis from summarizer");
        let t0 = Instant::now();
        let res = self.request(content).await;
        let dt = t0.elapsed();

        match &res {
            Ok(text) => info!(
                elapsed_ms = dt.as_millis() as u64,
                chars = text.len(),
                "Summarizer call succeeded"
            ),
            Err(e) => error!(elapsed_ms = dt.as_millis() as u64, error = %e, "Summarizer call failed"),
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_SYSTEM_PROMPT, DEFAULT_USER_PROMPT};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base_url: &str, ai: AiConfig) -> ChatCompletionClient {
        ChatCompletionClient::new(
            reqwest::Client::new(),
            base_url,
            Some(SecretString::from("test-key")),
            ai,
        )
        .unwrap()
    }

    #[test]
    fn test_missing_credential_rejected() {
        let err = ChatCompletionClient::new(
            reqwest::Client::new(),
            DEFAULT_API_BASE_URL,
            None,
            AiConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCredential));

        let err = ChatCompletionClient::new(
            reqwest::Client::new(),
            DEFAULT_API_BASE_URL,
            Some(SecretString::from("")),
            AiConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingCredential));
    }

    #[test]
    fn test_debug_hides_key() {
        let c = client("https://api.example/v1/", AiConfig::default());
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("test-key"));
        assert!(dbg.contains("https://api.example/v1/chat/completions"));
    }

    #[test]
    fn test_user_message_layout() {
        assert_eq!(user_message("Prompt", "T1\nL1"), "Prompt\n\nT1\nL1");
    }

    #[tokio::test]
    async fn test_summarize_sends_prompts_and_returns_content() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(serde_json::json!({
                "model": "deepseek-chat",
                "messages": [
                    {"role": "system", "content": DEFAULT_SYSTEM_PROMPT},
                    {"role": "user", "content": format!("{DEFAULT_USER_PROMPT}\n\nT1\nL1")}
                ],
                "temperature": 0.3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "### **World**"}}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let text = client(&mock_server.uri(), AiConfig::default())
            .summarize("T1\nL1")
            .await
            .unwrap();
        assert_eq!(text, "### **World**");
    }

    #[tokio::test]
    async fn test_summarize_uses_configured_settings() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({
                "model": "deepseek-reasoner",
                "messages": [
                    {"role": "system", "content": "Be brief"},
                    {"role": "user", "content": "Pick three\n\nbody"}
                ],
                "temperature": 0.0
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .mount(&mock_server)
            .await;

        let ai = AiConfig {
            model: Some("deepseek-reasoner".to_string()),
            system_prompt: Some("Be brief".to_string()),
            user_prompt: Some("Pick three".to_string()),
            temperature: Some(0.0),
        };
        let text = client(&mock_server.uri(), ai).summarize("body").await.unwrap();
        assert_eq!(text, "ok");
    }

    #[tokio::test]
    async fn test_summarize_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server.uri(), AiConfig::default())
            .summarize("x")
            .await
            .unwrap_err();
        match err {
            AnalysisError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_summarize_without_choices() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server.uri(), AiConfig::default())
            .summarize("x")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
    }
}
