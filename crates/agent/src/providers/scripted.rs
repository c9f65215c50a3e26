use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::{CapabilityError, LlmClient};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptedReply {
    Text(String),
    Fail(String),
    /// Never resolves; exercises the caller's timeout.
    Hang,
}

/// Deterministic client for tests and offline demos.
///
/// Rules are matched in insertion order against the prompt text; the first rule whose
/// needle appears in the prompt decides the reply.
#[derive(Debug)]
pub struct ScriptedClient {
    rules: Vec<(String, ScriptedReply)>,
    default_reply: ScriptedReply,
    prompts: Mutex<Vec<String>>,
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            default_reply: ScriptedReply::Fail("no scripted reply".to_owned()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_rule(mut self, needle: impl Into<String>, reply: ScriptedReply) -> Self {
        self.rules.push((needle.into(), reply));
        self
    }

    pub fn reply_when(self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_rule(needle, ScriptedReply::Text(text.into()))
    }

    pub fn hang_when(self, needle: impl Into<String>) -> Self {
        self.with_rule(needle, ScriptedReply::Hang)
    }

    pub fn fail_when(self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.with_rule(needle, ScriptedReply::Fail(message.into()))
    }

    pub fn with_default_reply(mut self, text: impl Into<String>) -> Self {
        self.default_reply = ScriptedReply::Text(text.into());
        self
    }

    pub fn hanging(mut self) -> Self {
        self.default_reply = ScriptedReply::Hang;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        match self.prompts.lock() {
            Ok(prompts) => prompts.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts().len()
    }

    fn reply_for(&self, prompt: &str) -> ScriptedReply {
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.default_reply.clone())
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, CapabilityError> {
        match self.prompts.lock() {
            Ok(mut prompts) => prompts.push(prompt.to_owned()),
            Err(poisoned) => poisoned.into_inner().push(prompt.to_owned()),
        }

        match self.reply_for(prompt) {
            ScriptedReply::Text(text) => Ok(text),
            ScriptedReply::Fail(message) => Err(CapabilityError::Unavailable(message)),
            ScriptedReply::Hang => std::future::pending().await,
        }
    }
}
