use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("reasoning call timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),
    #[error("reasoning capability unavailable: {0}")]
    Unavailable(String),
}

/// A remote or scripted completion backend.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider_name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, CapabilityError>;
}

/// Shared handle that bounds every completion with the configured response timeout.
#[derive(Clone)]
pub struct ReasoningHandle {
    client: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl ReasoningHandle {
    pub fn new(client: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, CapabilityError> {
        self.complete_within(prompt, self.timeout).await
    }

    pub async fn complete_within(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, CapabilityError> {
        match tokio::time::timeout(timeout, self.client.complete(prompt)).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(error)) => {
                warn!(
                    event_name = "capability.call_failed",
                    provider = self.client.provider_name(),
                    error = %error,
                    "reasoning call failed"
                );
                Err(error)
            }
            Err(_) => {
                warn!(
                    event_name = "capability.call_timed_out",
                    provider = self.client.provider_name(),
                    timeout_ms = timeout.as_millis() as u64,
                    "reasoning call timed out"
                );
                Err(CapabilityError::Timeout(timeout))
            }
        }
    }
}

impl std::fmt::Debug for ReasoningHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReasoningHandle")
            .field("provider", &self.client.provider_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::llm::{CapabilityError, ReasoningHandle};
    use crate::providers::ScriptedClient;

    #[tokio::test]
    async fn completion_within_timeout_returns_text() {
        let client = ScriptedClient::new().with_default_reply("analytics");
        let handle = ReasoningHandle::new(Arc::new(client), Duration::from_secs(1));

        assert_eq!(handle.complete("classify this").await, Ok("analytics".to_owned()));
    }

    #[tokio::test]
    async fn hanging_client_is_reported_as_timeout() {
        let client = ScriptedClient::new().hanging();
        let handle = ReasoningHandle::new(Arc::new(client), Duration::from_millis(20));

        let result = handle.complete("judge this").await;
        assert_eq!(result, Err(CapabilityError::Timeout(Duration::from_millis(20))));
    }
}
