use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use marquee_core::audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, TracingAuditSink,
};
use marquee_core::config::{AppConfig, FeatureFlags, GuardrailThresholds};
use marquee_core::dataset::Catalog;
use marquee_core::domain::{Decision, Query, QueryContext, Response};
use marquee_core::errors::PipelineError;
use marquee_core::pipeline::{QueryEvent, QueryLifecycle};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::assembler::assemble;
use crate::classifier::IntentClassifier;
use crate::dispatcher::Dispatcher;
use crate::guardrails::{EvaluationContext, GuardrailChain, Judge};
use crate::llm::{CapabilityError, LlmClient, ReasoningHandle};
use crate::prompts::{PromptError, PromptLibrary};
use crate::providers::create_client;

const ACTOR: &str = "marquee-agent";
const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// Process-wide request counters.
#[derive(Debug, Default)]
pub struct RequestStats {
    served: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    errored: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub requests_served: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub errored: u64,
}

impl RequestStats {
    fn record(&self, response: &Response) {
        let counter = match response {
            Response::Success { .. } => &self.accepted,
            Response::Rejected { .. } => &self.rejected,
            Response::Error { .. } => &self.errored,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests_served: self.served.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            errored: self.errored.load(Ordering::Relaxed),
        }
    }
}

pub struct RuntimeBuilder {
    catalog: Catalog,
    client: Option<Arc<dyn LlmClient>>,
    thresholds: GuardrailThresholds,
    features: FeatureFlags,
    response_timeout: Duration,
    audit: Arc<dyn AuditSink>,
}

impl RuntimeBuilder {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            client: None,
            thresholds: GuardrailThresholds::default(),
            features: FeatureFlags { multi_agent_enabled: true, guardrails_enabled: true },
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
            audit: Arc::new(TracingAuditSink),
        }
    }

    pub fn client(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn thresholds(mut self, thresholds: GuardrailThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn build(self) -> Result<AgentRuntime, RuntimeError> {
        let prompts = Arc::new(PromptLibrary::new()?);
        let reasoning =
            self.client.map(|client| ReasoningHandle::new(client, self.response_timeout));

        let mut classifier = IntentClassifier::keywords();
        let mut dispatcher = Dispatcher::new(self.catalog);
        if let (true, Some(reasoning)) = (self.features.multi_agent_enabled, &reasoning) {
            classifier = IntentClassifier::delegated(prompts.clone(), reasoning.clone());
            dispatcher = dispatcher.with_rephraser(prompts.clone(), reasoning.clone());
        }

        let guardrails = self.features.guardrails_enabled.then(|| {
            let judge =
                reasoning.as_ref().map(|reasoning| Judge::new(prompts.clone(), reasoning.clone()));
            GuardrailChain::new(&self.thresholds, judge)
        });

        Ok(AgentRuntime {
            classifier,
            dispatcher,
            guardrails,
            audit: self.audit,
            stats: RequestStats::default(),
            provider: reasoning.map(|reasoning| reasoning.provider_name().to_owned()),
        })
    }
}

/// Runs one query through classify, dispatch, evaluate and assemble. Every path ends
/// in a `Response`.
pub struct AgentRuntime {
    classifier: IntentClassifier,
    dispatcher: Dispatcher,
    guardrails: Option<GuardrailChain>,
    audit: Arc<dyn AuditSink>,
    stats: RequestStats,
    provider: Option<String>,
}

impl AgentRuntime {
    pub fn builder(catalog: Catalog) -> RuntimeBuilder {
        RuntimeBuilder::new(catalog)
    }

    /// Loads the catalog and the configured reasoning provider.
    pub fn from_config(config: &AppConfig) -> Result<Self, RuntimeError> {
        let mut builder = RuntimeBuilder::new(Catalog::load(&config.dataset))
            .thresholds(config.guardrails)
            .features(config.features)
            .response_timeout(config.response_timeout());
        if let Some(client) = create_client(&config.llm)? {
            builder = builder.client(client);
        }
        builder.build()
    }

    pub fn catalog(&self) -> &Catalog {
        self.dispatcher.catalog()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reasoning_provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    pub fn guardrails_enabled(&self) -> bool {
        self.guardrails.is_some()
    }

    pub async fn handle(&self, text: &str, context: QueryContext) -> Response {
        self.stats.served.fetch_add(1, Ordering::Relaxed);

        let query = match Query::new(text, context) {
            Ok(query) => query,
            Err(input_error) => {
                info!(
                    event_name = "query.rejected_input",
                    reason = input_error.reason(),
                    "query rejected before entering the pipeline"
                );
                let response = Response::error(None, input_error.reason());
                self.stats.record(&response);
                return response;
            }
        };

        let audit = AuditContext::new(query.request_id().as_str(), ACTOR);
        self.audit.emit(
            AuditEvent::new(
                audit.correlation_id.clone(),
                "query.received",
                AuditCategory::Ingress,
                ACTOR,
                AuditOutcome::Success,
            )
            .with_metadata("audience", query.audience().as_str()),
        );

        let mut lifecycle = QueryLifecycle::new();
        let response = match self.run(&query, &mut lifecycle, &audit).await {
            Ok(response) => response,
            Err(pipeline_error) => {
                error!(
                    event_name = "query.failed",
                    correlation_id = %query.request_id(),
                    state = lifecycle.state().as_str(),
                    reason = pipeline_error.reason(),
                    detail = %pipeline_error,
                    "query ended with an error response"
                );
                if !lifecycle.state().is_terminal() {
                    let _ =
                        lifecycle.advance_with_audit(QueryEvent::Failed, self.audit.as_ref(), &audit);
                }
                Response::error(Some(query.request_id().clone()), pipeline_error.reason())
            }
        };

        self.stats.record(&response);
        info!(
            event_name = "query.completed",
            correlation_id = %query.request_id(),
            status = response.status(),
            category = response.category().map(|category| category.as_str()).unwrap_or("none"),
            "query completed"
        );
        response
    }

    async fn run(
        &self,
        query: &Query,
        lifecycle: &mut QueryLifecycle,
        audit: &AuditContext,
    ) -> Result<Response, PipelineError> {
        let sink = self.audit.as_ref();

        let classification = self.classifier.classify_or_fallback(query.text()).await;
        lifecycle.advance_with_audit(QueryEvent::Classified, sink, audit)?;
        info!(
            event_name = "query.classified",
            correlation_id = %query.request_id(),
            category = classification.category.as_str(),
            method = classification.method.as_str(),
            "query classified"
        );

        let mut draft = self.dispatcher.dispatch(classification.category, query).await?;
        if let Some(note) = classification.note {
            draft.add_note(note);
        }
        lifecycle.advance_with_audit(QueryEvent::Dispatched, sink, audit)?;

        let decision = match &self.guardrails {
            Some(chain) => chain.evaluate(&draft, &EvaluationContext::new(query)).await,
            None => Decision::unchecked(),
        };
        for verdict in &decision.verdicts {
            sink.emit(
                AuditEvent::new(
                    audit.correlation_id.clone(),
                    "guardrail.verdict",
                    AuditCategory::Guardrail,
                    ACTOR,
                    if verdict.passed { AuditOutcome::Success } else { AuditOutcome::Rejected },
                )
                .with_metadata("guardrail", verdict.kind.as_str())
                .with_metadata("score", format!("{:.2}", verdict.score))
                .with_metadata("threshold", format!("{:.2}", verdict.threshold)),
            );
        }
        lifecycle.advance_with_audit(QueryEvent::Evaluated, sink, audit)?;

        let response = assemble(query.request_id().clone(), draft, decision)?;
        lifecycle.advance_with_audit(QueryEvent::Assembled, sink, audit)?;
        Ok(response)
    }
}
