//! GeminiGenerator -- concrete [`TextGenerator`] for Google Gemini.
//!
//! Sends one `generateContent` request per prompt. The user's text is
//! prefixed with the persona prompt and sent as a single user part; the reply
//! is the text of the first part of the first candidate.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and only exposed when
//! building the request header. It never appears in logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use postpilot_core::generation::generator::TextGenerator;
use postpilot_types::config::GenerationConfig;
use postpilot_types::error::GenerationError;

use super::persona::{DEFAULT_SYSTEM_PROMPT, compose_prompt};
use super::types::{GeminiErrorResponse, GenerateContentRequest, GenerateContentResponse};

/// Google Gemini text generator.
///
/// Intentionally does not derive Debug; the client holds the API key.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    system_prompt: String,
}

impl GeminiGenerator {
    /// Header carrying the API key, so the key stays out of request URLs.
    const API_KEY_HEADER: &'static str = "x-goog-api-key";

    /// Default upstream endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    /// Create a generator for `model` with the given request timeout.
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        })
    }

    /// Build a generator from the `[generation]` config section.
    pub fn from_config(
        config: &GenerationConfig,
        api_key: SecretString,
    ) -> Result<Self, GenerationError> {
        let mut generator = Self::new(
            api_key,
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?
        .with_base_url(config.base_url.clone());

        if let Some(prompt) = config.system_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            generator = generator.with_system_prompt(prompt);
        }
        Ok(generator)
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Replace the persona prompt.
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// The model this generator calls.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

/// Map a non-success provider status to a `GenerationError`.
fn status_error(status: reqwest::StatusCode, body: &str) -> GenerationError {
    match status.as_u16() {
        401 | 403 => GenerationError::AuthenticationFailed,
        429 => GenerationError::RateLimited,
        code => {
            let message = serde_json::from_str::<GeminiErrorResponse>(body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.to_string());
            GenerationError::Provider {
                status: code,
                message,
            }
        }
    }
}

impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateContentRequest::user_text(compose_prompt(&self.system_prompt, prompt));

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Sending generateContent request");

        let response = self
            .client
            .post(self.url())
            .header(Self::API_KEY_HEADER, self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Transport(format!("request timed out: {e}"))
                } else {
                    GenerationError::Transport(format!("HTTP request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let err = status_error(status, &error_body);
            warn!(status = status.as_u16(), error = %err, "Gemini request failed");
            return Err(err);
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            GenerationError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        parsed.first_text().ok_or(GenerationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::Json;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};

    #[derive(Debug, Clone)]
    struct Captured {
        path: String,
        api_key: Option<String>,
        body: Value,
    }

    /// Serve a canned reply on an ephemeral port, recording each request.
    async fn mock_provider(
        status: StatusCode,
        reply: Value,
        delay: Duration,
    ) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);

        let app = axum::Router::new().route(
            "/v1beta/models/{*rest}",
            post(
                move |Path(rest): Path<String>, headers: HeaderMap, Json(body): Json<Value>| {
                    let recorder = Arc::clone(&recorder);
                    let reply = reply.clone();
                    async move {
                        recorder.lock().unwrap().push(Captured {
                            path: rest,
                            api_key: headers
                                .get("x-goog-api-key")
                                .and_then(|v| v.to_str().ok())
                                .map(str::to_string),
                            body,
                        });
                        tokio::time::sleep(delay).await;
                        (status, Json(reply))
                    }
                },
            ),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), seen)
    }

    fn generator(base_url: &str, timeout: Duration) -> GeminiGenerator {
        GeminiGenerator::new(SecretString::from("test-key"), "gemini-test", timeout)
            .unwrap()
            .with_base_url(base_url)
    }

    fn text_reply(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_generate_returns_first_candidate_text() {
        let (url, seen) =
            mock_provider(StatusCode::OK, text_reply("Here is your post"), Duration::ZERO).await;
        let generator = generator(&url, Duration::from_secs(5));

        let reply = generator.generate("write about rust").await.unwrap();
        assert_eq!(reply, "Here is your post");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "gemini-test:generateContent");
        assert_eq!(seen[0].api_key.as_deref(), Some("test-key"));

        let sent = seen[0].body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap();
        assert!(sent.starts_with("You are PostPilot"));
        assert!(sent.ends_with("\n\nUser Input: write about rust"));
        assert_eq!(seen[0].body["contents"][0]["role"], "user");
    }

    #[tokio::test]
    async fn test_custom_system_prompt_is_used() {
        let (url, seen) = mock_provider(StatusCode::OK, text_reply("ok"), Duration::ZERO).await;
        let generator = generator(&url, Duration::from_secs(5)).with_system_prompt("Be brief.");

        generator.generate("hi").await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            seen[0].body["contents"][0]["parts"][0]["text"],
            "Be brief.\n\nUser Input: hi"
        );
    }

    #[tokio::test]
    async fn test_empty_candidates_is_empty_response() {
        let (url, _) = mock_provider(StatusCode::OK, json!({ "candidates": [] }), Duration::ZERO).await;
        let err = generator(&url, Duration::from_secs(5))
            .generate("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let (url, _) = mock_provider(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": { "code": 429, "message": "quota" } }),
            Duration::ZERO,
        )
        .await;
        let err = generator(&url, Duration::from_secs(5))
            .generate("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::RateLimited));
    }

    #[tokio::test]
    async fn test_bad_key_is_authentication_failure() {
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let (url, _) = mock_provider(status, json!({}), Duration::ZERO).await;
            let err = generator(&url, Duration::from_secs(5))
                .generate("hi")
                .await
                .unwrap_err();
            assert!(matches!(err, GenerationError::AuthenticationFailed));
        }
    }

    #[tokio::test]
    async fn test_server_error_carries_provider_message() {
        let (url, _) = mock_provider(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": { "code": 500, "message": "backend exploded" } }),
            Duration::ZERO,
        )
        .await;
        let err = generator(&url, Duration::from_secs(5))
            .generate("hi")
            .await
            .unwrap_err();
        match err {
            GenerationError::Provider { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "backend exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_provider_times_out() {
        let (url, _) =
            mock_provider(StatusCode::OK, text_reply("late"), Duration::from_secs(3)).await;
        let err = generator(&url, Duration::from_millis(200))
            .generate("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_transport_error() {
        let err = generator("http://127.0.0.1:1", Duration::from_secs(2))
            .generate("hi")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Transport(_)));
    }

    #[test]
    fn test_from_config_applies_overrides() {
        let config = GenerationConfig {
            base_url: "http://localhost:9999/".to_string(),
            model: "gemini-custom".to_string(),
            timeout_secs: 5,
            system_prompt: Some("Custom persona".to_string()),
        };
        let generator = GeminiGenerator::from_config(&config, SecretString::from("k")).unwrap();
        assert_eq!(generator.model(), "gemini-custom");
        assert_eq!(
            generator.url(),
            "http://localhost:9999/v1beta/models/gemini-custom:generateContent"
        );
        assert_eq!(generator.system_prompt, "Custom persona");
        assert_eq!(generator.name(), "gemini");
    }
}
