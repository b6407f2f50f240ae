//! Chat-completion client for OpenAI-compatible endpoints (Groq by default).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use replidocs_shared::{LlmConfig, RepliDocsError, Result, read_api_key};

// ---------------------------------------------------------------------------
// Wire types (OpenAI chat-completions schema)
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, serde::Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, serde::Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Client trait
// ---------------------------------------------------------------------------

/// One system + user turn with its sampling settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Anything that can turn a prompt into a single text completion.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Return the text of the first choice, or an empty string if there is none.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

/// Bearer-authenticated client for `<base_url>/chat/completions`.
pub struct GroqClient {
    client: Client,
    endpoint: String,
    api_key_env: String,
    api_key: Option<String>,
    model: String,
}

impl GroqClient {
    /// Build a client from the `[llm]` config section.
    ///
    /// The API key is not read here; see [`read_api_key`].
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RepliDocsError::Model(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key_env: config.api_key_env.clone(),
            api_key: None,
            model: config.model.clone(),
        })
    }

    /// Use `key` instead of reading the configured environment variable.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatClient for GroqClient {
    #[instrument(skip_all, fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let api_key = match &self.api_key {
            Some(key) => key.clone(),
            None => read_api_key(&self.api_key_env)?,
        };

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RepliDocsError::Model(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let detail: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            return Err(RepliDocsError::Model(format!("HTTP {status}: {detail}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| RepliDocsError::Model(format!("invalid completion response: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        debug!(chars = text.len(), "completion received");

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "You are terse.".into(),
            user: "Say hi".into(),
            max_tokens: 100,
            temperature: 0.14,
        }
    }

    fn config_for(server: &MockServer, key_env: &str) -> LlmConfig {
        LlmConfig {
            base_url: format!("{}/openai/v1/", server.uri()),
            api_key_env: key_env.into(),
            model: "test-model".into(),
            ..LlmConfig::default()
        }
    }

    #[test]
    fn request_serializes_as_openai_schema() {
        let body = ChatRequest {
            model: "m",
            messages: vec![ChatMessage {
                role: "system",
                content: "s",
            }],
            max_tokens: 100,
            temperature: 0.5,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""model":"m""#));
        assert!(json.contains(r#""role":"system""#));
        assert!(json.contains(r#""max_tokens":100"#));
    }

    #[test]
    fn response_without_content_deserializes() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[tokio::test]
    async fn test_complete_with_mock_server() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "max_tokens": 100,
                "messages": [
                    {"role": "system", "content": "You are terse."},
                    {"role": "user", "content": "Say hi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "hi"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GroqClient::new(&config_for(&server, "RD_TEST_KEY_UNUSED"))
            .unwrap()
            .with_api_key("sk-test");
        assert_eq!(client.model(), "test-model");
        let text = client.complete(request()).await.unwrap();
        assert_eq!(text, "hi");
    }

    #[tokio::test]
    async fn test_empty_choices_yield_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let client = GroqClient::new(&config_for(&server, "RD_TEST_KEY_UNUSED"))
            .unwrap()
            .with_api_key("sk-test");
        assert_eq!(client.complete(request()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_http_error_is_model_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = GroqClient::new(&config_for(&server, "RD_TEST_KEY_UNUSED"))
            .unwrap()
            .with_api_key("sk-test");
        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, RepliDocsError::Model(_)));
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_missing_key_makes_no_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = GroqClient::new(&config_for(&server, "RD_TEST_KEY_NEVER_SET_98765")).unwrap();
        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, RepliDocsError::MissingCredential { .. }));
    }

    #[tokio::test]
    async fn test_explicit_key_skips_environment() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sk-explicit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GroqClient::new(&config_for(&server, "RD_TEST_KEY_NEVER_SET_98765"))
            .unwrap()
            .with_api_key("sk-explicit");
        assert_eq!(client.complete(request()).await.unwrap(), "ok");
    }
}
