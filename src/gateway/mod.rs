/**
 * Generation Gateway
 *
 * Thin client over the external completion endpoints. Every provider-side
 * failure (transport error, timeout, non-2xx status, malformed response
 * body) is normalized into a single opaque `GatewayError` so callers have
 * exactly one failure signal to handle. No retries, no backoff.
 *
 * The HTTP client is shared and carries the process-wide request timeout,
 * so a hung provider call expires instead of suspending the handler
 * indefinitely.
 */

use serde_json::{json, Value};
use thiserror::Error;

use crate::server::config::AppConfig;

/// Chat model used for text and code completion
const CHAT_MODEL: &str = "gpt-3.5-turbo";

/// Model used for speech synthesis
const SPEECH_MODEL: &str = "tts-1";

/// Default image size requested from the provider
pub const DEFAULT_IMAGE_SIZE: &str = "512x512";

/// Default token budget for plain text generation
pub const DEFAULT_TEXT_TOKENS: u32 = 1000;

/// Token budget for code generation
const CODE_TOKENS: u32 = 2000;

/// Uniform "generation failed" signal
///
/// Callers surface this as a generic server error; the message is logged
/// but carries no provider internals worth branching on.
#[derive(Debug, Error)]
#[error("generation request failed: {message}")]
pub struct GatewayError {
    message: String,
}

impl GatewayError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Construct an error directly, for exercising failure paths in tests
    #[cfg(test)]
    pub(crate) fn for_tests(message: &str) -> Self {
        Self::new(message)
    }
}

/// Client for the external generative AI provider
#[derive(Clone)]
pub struct GenerationGateway {
    api_base: String,
    api_key: String,
    client: reqwest::Client,
}

impl GenerationGateway {
    /// Create a gateway from explicit connection parameters
    ///
    /// The base URL is taken without a trailing slash; the client is the
    /// shared timeout-bearing HTTP client built at startup.
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        let api_base = api_base.into();
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create a gateway from application configuration
    pub fn from_config(config: &AppConfig, client: reqwest::Client) -> Self {
        Self::new(&config.openai_api_base, &config.openai_api_key, client)
    }

    /// Generate free-form text for a prompt
    pub async fn generate_text(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        self.chat_completion("You are a helpful assistant.", prompt, max_tokens)
            .await
    }

    /// Generate source code for a prompt in the given language
    pub async fn generate_code(
        &self,
        prompt: &str,
        language: &str,
    ) -> Result<String, GatewayError> {
        let system = format!(
            "You are an expert {} programmer. Provide only code without explanation.",
            language
        );
        self.chat_completion(&system, prompt, CODE_TOKENS).await
    }

    /// Generate an image and return the provider-hosted URL
    pub async fn generate_image(&self, prompt: &str, size: &str) -> Result<String, GatewayError> {
        let endpoint = format!("{}/images/generations", self.api_base);
        let payload = json!({
            "prompt": prompt,
            "n": 1,
            "size": size,
        });

        let body = self.post_json(&endpoint, &payload).await?;
        body["data"][0]["url"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                tracing::warn!("image response carried no URL");
                GatewayError::new("image response carried no URL")
            })
    }

    /// Synthesize speech audio for the given text and voice
    ///
    /// Returns raw audio bytes (mp3). Failure here is handled by the speech
    /// builder, which degrades to a placeholder artifact.
    pub async fn synthesize_speech(
        &self,
        text: &str,
        voice: &str,
    ) -> Result<Vec<u8>, GatewayError> {
        let endpoint = format!("{}/audio/speech", self.api_base);
        let payload = json!({
            "model": SPEECH_MODEL,
            "input": text,
            "voice": voice,
        });

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("speech request failed: {}", e);
                GatewayError::new(format!("speech request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("speech endpoint returned {}", status);
            return Err(GatewayError::new(format!(
                "speech endpoint returned {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GatewayError::new(format!("failed to read audio body: {}", e)))?;
        Ok(bytes.to_vec())
    }

    async fn chat_completion(
        &self,
        system: &str,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, GatewayError> {
        let endpoint = format!("{}/chat/completions", self.api_base);
        let payload = json!({
            "model": CHAT_MODEL,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "max_tokens": max_tokens,
        });

        let body = self.post_json(&endpoint, &payload).await?;
        body["choices"][0]["message"]["content"]
            .as_str()
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                tracing::warn!("completion response carried no content");
                GatewayError::new("completion response carried no content")
            })
    }

    async fn post_json(&self, endpoint: &str, payload: &Value) -> Result<Value, GatewayError> {
        let response = self
            .client
            .post(endpoint)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("provider request to {} failed: {}", endpoint, e);
                GatewayError::new(format!("provider request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::warn!("provider endpoint {} returned {}", endpoint, status);
            return Err(GatewayError::new(format!(
                "provider endpoint returned {}",
                status
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::new(format!("malformed provider response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let gateway = GenerationGateway::new(
            "https://api.example.com/v1/",
            "key",
            reqwest::Client::new(),
        );
        assert_eq!(gateway.api_base, "https://api.example.com/v1");
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::new("provider endpoint returned 429");
        assert!(err.to_string().contains("generation request failed"));
        assert!(err.to_string().contains("429"));
    }
}
