pub mod ollama;
pub mod openai;
pub mod scripted;

use std::sync::Arc;

use marquee_core::config::{LlmConfig, LlmProvider};

use crate::llm::{CapabilityError, LlmClient};

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
pub use scripted::{ScriptedClient, ScriptedReply};

/// Builds the configured provider. `Disabled` yields `None`: the pipeline then runs on
/// local heuristics only.
pub fn create_client(config: &LlmConfig) -> Result<Option<Arc<dyn LlmClient>>, CapabilityError> {
    match config.provider {
        LlmProvider::Disabled => Ok(None),
        LlmProvider::OpenAi => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                CapabilityError::Unavailable("openai provider requires an api key".to_owned())
            })?;
            Ok(Some(Arc::new(OpenAiClient::new(
                api_key,
                config.base_url.as_deref(),
                config.model.clone(),
                config.temperature,
            ))))
        }
        LlmProvider::Ollama => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                CapabilityError::Unavailable("ollama provider requires a base url".to_owned())
            })?;
            let client = OllamaClient::new(base_url, config.model.clone(), config.temperature);
            Ok(Some(Arc::new(client)))
        }
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::config::{AppConfig, LlmProvider};

    use crate::providers::create_client;

    #[test]
    fn disabled_provider_has_no_client() {
        let config = AppConfig::default();
        assert!(matches!(create_client(&config.llm), Ok(None)));
    }

    #[test]
    fn ollama_provider_requires_base_url() {
        let mut config = AppConfig::default();
        config.llm.provider = LlmProvider::Ollama;
        assert!(create_client(&config.llm).is_err());

        config.llm.base_url = Some("http://localhost:11434".to_owned());
        let client = create_client(&config.llm).expect("client").expect("configured");
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn openai_provider_requires_api_key() {
        let mut config = AppConfig::default();
        config.llm.provider = LlmProvider::OpenAi;
        assert!(create_client(&config.llm).is_err());

        config.llm.api_key = Some("sk-test".to_owned().into());
        let client = create_client(&config.llm).expect("client").expect("configured");
        assert_eq!(client.provider_name(), "openai");
    }
}
