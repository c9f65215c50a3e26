//! Query pipeline for the catalog assistant.
//!
//! A question flows through four stages, each in its own module:
//! 1. **Classification** (`classifier`) - keyword heuristics or a delegated label
//! 2. **Dispatch** (`dispatcher`, `handlers`) - category handlers compute evidence from the catalog
//! 3. **Review** (`guardrails`) - content-safety, quality, business-logic and bias validators
//! 4. **Assembly** (`assembler`) - the decision becomes a success, rejection or error response
//!
//! `AgentRuntime` drives the stages and owns the request counters.
//!
//! The reasoning capability (`llm`, `providers`) only labels, rephrases and judges. Every
//! figure in an answer is computed locally from the catalog.

pub mod assembler;
pub mod classifier;
pub mod dispatcher;
pub mod guardrails;
pub mod handlers;
pub mod llm;
pub mod prompts;
pub mod providers;
pub mod runtime;
pub mod text;

pub use assembler::{assemble, AssemblyError};
pub use classifier::{Classification, ClassificationError, IntentClassifier};
pub use dispatcher::Dispatcher;
pub use guardrails::{EvaluationContext, GuardrailChain, Validator};
pub use llm::{CapabilityError, LlmClient, ReasoningHandle};
pub use runtime::{AgentRuntime, RequestStats, RuntimeBuilder, RuntimeError, StatsSnapshot};

impl From<CapabilityError> for marquee_core::errors::PipelineError {
    fn from(error: CapabilityError) -> Self {
        Self::CapabilityUnavailable(error.to_string())
    }
}
