//! Prompt in, Mermaid markup out.

use std::sync::Arc;
use std::time::Duration;

use sketch_core::{Config, CredentialStore};

use crate::error::{GenerationError, Result};
use crate::extract::extract_diagram;
use crate::mock::MockGenerator;
use crate::prompt::build_messages;
use crate::provider::DiagramProvider;
use crate::providers::OpenAIProvider;

pub struct DiagramGenerator {
    credentials: CredentialStore,
    provider: Arc<dyn DiagramProvider>,
    mock: MockGenerator,
}

impl DiagramGenerator {
    pub fn new(credentials: CredentialStore, provider: Arc<dyn DiagramProvider>) -> Self {
        Self {
            credentials,
            provider,
            mock: MockGenerator::new(),
        }
    }

    /// Generator backed by [`OpenAIProvider`] with settings from `config`.
    pub fn from_config(credentials: CredentialStore, config: &Config) -> Self {
        Self::new(credentials, Arc::new(OpenAIProvider::from_config(config))).with_mock(
            MockGenerator::new().with_delay(Duration::from_millis(config.effective_mock_delay_ms())),
        )
    }

    pub fn with_mock(mut self, mock: MockGenerator) -> Self {
        self.mock = mock;
        self
    }

    /// Produce diagram markup for `prompt`.
    ///
    /// Without a stored API key the offline generator answers after its delay; otherwise a
    /// single chat completion request is made and the markup between backticks is returned
    /// (the whole reply when the model used none).
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::Validation(
                "Please enter a description of the diagram you want to create".to_string(),
            ));
        }

        let Some(api_key) = self.credentials.get().await else {
            tracing::info!("No API key stored, using offline generator");
            return Ok(self.mock.generate(prompt).await);
        };

        tracing::debug!("Requesting diagram from remote provider");
        let completion = self
            .provider
            .complete(&api_key, &build_messages(prompt))
            .await
            .inspect_err(|e| tracing::error!("Error in API call: {}", e))?;

        let diagram = extract_diagram(&completion);
        if diagram.trim().is_empty() {
            return Err(GenerationError::remote("The model returned an empty diagram"));
        }

        Ok(diagram)
    }
}
