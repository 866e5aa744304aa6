use async_trait::async_trait;
use reqwest::Client;

use sketch_core::config::{
    Config, DEFAULT_API_BASE, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};

use crate::error::{GenerationError, Result};
use crate::openai_compat::{build_chat_body, error_message_from_body, parse_completion_content};
use crate::provider::DiagramProvider;
use crate::types::ChatMessage;

#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAIProvider {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_base_url(&config.api_base)
            .with_model(&config.model)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl DiagramProvider for OpenAIProvider {
    async fn complete(&self, api_key: &str, messages: &[ChatMessage]) -> Result<String> {
        let body = build_chat_body(&self.model, messages, self.temperature, self.max_tokens);

        tracing::debug!("Sending request to {} (model '{}')", self.completions_url(), self.model);

        let response = self
            .client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = error_message_from_body(status, &text);
            tracing::error!("Chat completion failed with {}: {}", status, message);
            return Err(GenerationError::remote(message));
        }

        parse_completion_content(&text)
    }
}
