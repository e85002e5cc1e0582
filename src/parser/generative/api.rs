//! Transport for the generative extractor
//!
//! Any provider that takes a prompt and answers with text satisfies
//! [`CompletionClient`]. The HTTP client speaks the OpenAI-compatible chat
//! completions protocol, which OpenAI, X.AI (Grok) and DeepSeek all accept.

use crate::config::{LLMProvider, LanguageModelConfig};
use crate::env_manager;
use crate::error::GenerativeError;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use std::time::Duration;

/// One prompt in, one text completion out
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GenerativeError>;
}

/// Chat completions over HTTP
#[derive(Debug)]
pub struct HttpCompletionClient {
    client: Client,
    provider: LLMProvider,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Option<SecretString>,
}

impl HttpCompletionClient {
    /// Build a client from config, reading the provider's API key from the environment.
    ///
    /// A missing key is not an error here; every request then fails with
    /// [`GenerativeError::MissingApiKey`] and the caller falls back.
    pub fn from_config(config: &LanguageModelConfig) -> Result<Self, GenerativeError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        info!("Using {:?} model '{}' for event extraction", config.provider, config.model());

        Ok(Self {
            client,
            provider: config.provider,
            endpoint: config.endpoint(),
            model: config.model(),
            temperature: config.temperature,
            api_key: env_manager::api_key(config.provider),
        })
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    fn request_body(&self, system: &str, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt }
            ],
            "temperature": self.temperature,
            "max_tokens": 400,
            "response_format": { "type": "json_object" }
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GenerativeError> {
        let api_key =
            self.api_key.as_ref().ok_or(GenerativeError::MissingApiKey(self.provider.api_key_var()))?;

        debug!("Making API call to {}", self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
            .json(&self.request_body(system, prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerativeError::Status(response.status()));
        }

        let response_json: Value = response.json().await?;
        message_content(&response_json)
    }
}

/// Text of the first choice in a chat completions response
pub fn message_content(response: &Value) -> Result<String, GenerativeError> {
    response["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| GenerativeError::InvalidResponse("no message content in first choice".to_string()))
}
