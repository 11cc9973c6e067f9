use crate::error::{DiagramError, Result};
use crate::generator::DiagramGenerator;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_API_KEY_ENV: &str = "GROQ_API_KEY";

const SYSTEM_PROMPT: &str = "You generate clean, valid Mermaid flowchart code. \
Use the node id prefix you are given and reply with Mermaid code only.";

/// Settings for an OpenAI-compatible chat completions endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    DEFAULT_LLM_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_LLM_MODEL.to_string()
}

fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl LlmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(DiagramError::InvalidConfig("llm.base_url is empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(DiagramError::InvalidConfig("llm.model is empty".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(DiagramError::InvalidConfig(format!(
                "llm.temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }
        if self.timeout_secs == 0 {
            return Err(DiagramError::InvalidConfig(
                "llm.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// [`DiagramGenerator`] backed by a hosted chat completions API.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    config: LlmConfig,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            config,
            api_key: api_key.into(),
        })
    }

    /// Build a client reading the API key from `config.api_key_env`.
    pub fn from_env(config: LlmConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DiagramError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(config, api_key)
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

#[async_trait]
impl DiagramGenerator for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
        };

        log::debug!(
            "Requesting completion from {} (model {}, {} prompt chars)",
            self.config.base_url,
            self.config.model,
            prompt.len()
        );

        let response = self
            .http
            .post(self.config.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiagramError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| DiagramError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DiagramError::MalformedResponse("no choices in response".into()))?
            .message
            .content
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(DiagramError::EmptyCompletion);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LlmConfig::default();
        config.validate().unwrap();
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(
            config.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let hot = LlmConfig {
            temperature: 2.5,
            ..LlmConfig::default()
        };
        assert!(hot.validate().is_err());

        let instant = LlmConfig {
            timeout_secs: 0,
            ..LlmConfig::default()
        };
        assert!(instant.validate().is_err());
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let config = LlmConfig {
            base_url: "http://localhost:8080/v1/".into(),
            ..LlmConfig::default()
        };
        assert_eq!(
            config.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LlmConfig = serde_json::from_str(r#"{"model": "local"}"#).unwrap();
        assert_eq!(config.model, "local");
        assert_eq!(config.api_key_env, DEFAULT_API_KEY_ENV);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_missing_key_reported_by_name() {
        let config = LlmConfig {
            api_key_env: "CODEFLOW_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..LlmConfig::default()
        };
        match ChatCompletionsClient::from_env(config) {
            Err(DiagramError::MissingApiKey(name)) => {
                assert_eq!(name, "CODEFLOW_TEST_KEY_THAT_IS_NEVER_SET");
            }
            other => panic!("expected MissingApiKey, got {:?}", other.err()),
        }
    }
}
