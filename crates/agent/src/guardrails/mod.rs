//! Ordered validator chain. Every validator scores every draft; the decision is
//! computed from all four verdicts.

pub mod bias;
pub mod business_logic;
pub mod content_safety;
pub mod judge;
pub mod quality;

use async_trait::async_trait;
use futures::future::join_all;
use marquee_core::config::GuardrailThresholds;
use marquee_core::domain::{Audience, Decision, DraftAnswer, GuardrailKind, GuardrailVerdict, Query};
use tracing::{debug, warn};

use crate::llm::CapabilityError;

pub use bias::BiasValidator;
pub use business_logic::BusinessLogicValidator;
pub use content_safety::ContentSafetyValidator;
pub use judge::{parse_judgement, Judge, Judgement};
pub use quality::QualityValidator;

/// What a validator may look at besides the draft.
#[derive(Clone, Copy, Debug)]
pub struct EvaluationContext<'a> {
    pub query: &'a Query,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(query: &'a Query) -> Self {
        Self { query }
    }

    pub fn audience(&self) -> Audience {
        self.query.audience()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Score {
    pub value: f64,
    pub reason: String,
}

impl Score {
    pub fn new(value: f64, reason: impl Into<String>) -> Self {
        Self { value, reason: reason.into() }
    }

    pub fn clean(reason: impl Into<String>) -> Self {
        Self::new(1.0, reason)
    }
}

#[async_trait]
pub trait Validator: Send + Sync {
    fn kind(&self) -> GuardrailKind;

    fn threshold(&self) -> f64;

    /// `Err` means the validator could not score at all; the chain records a forced fail.
    async fn score(
        &self,
        draft: &DraftAnswer,
        context: &EvaluationContext<'_>,
    ) -> Result<Score, CapabilityError>;
}

/// Combines the local score with the judge's, when one is configured: the lower wins.
pub(crate) async fn with_judgement(
    judge: Option<&Judge>,
    kind: GuardrailKind,
    local: Score,
    draft: &DraftAnswer,
    context: &EvaluationContext<'_>,
) -> Result<Score, CapabilityError> {
    let Some(judge) = judge else {
        return Ok(local);
    };
    let judgement = judge.assess(kind, draft, context).await?;
    if judgement.score < local.value {
        Ok(Score::new(judgement.score, format!("judge: {}", judgement.explanation)))
    } else {
        Ok(local)
    }
}

pub struct GuardrailChain {
    validators: Vec<Box<dyn Validator>>,
}

impl GuardrailChain {
    /// The four validators in chain order, with thresholds from configuration.
    pub fn new(thresholds: &GuardrailThresholds, judge: Option<Judge>) -> Self {
        Self {
            validators: vec![
                Box::new(ContentSafetyValidator::new(thresholds.content_safety, judge.clone())),
                Box::new(QualityValidator::new(thresholds.quality, judge.clone())),
                Box::new(BusinessLogicValidator::new(thresholds.business_logic, judge.clone())),
                Box::new(BiasValidator::new(thresholds.bias, judge)),
            ],
        }
    }

    /// Validators run concurrently; verdicts keep chain order.
    pub async fn evaluate(&self, draft: &DraftAnswer, context: &EvaluationContext<'_>) -> Decision {
        let scored = self.validators.iter().map(|validator| async move {
            let kind = validator.kind();
            let threshold = validator.threshold();
            match validator.score(draft, context).await {
                Ok(score) => GuardrailVerdict::new(kind, score.value, threshold, score.reason),
                Err(error) => {
                    warn!(
                        event_name = "guardrail.validator_unavailable",
                        correlation_id = %context.query.request_id(),
                        guardrail = kind.as_str(),
                        error = %error,
                        "validator could not score; recording a failure"
                    );
                    let reason = format!("could not be scored: {error}");
                    GuardrailVerdict::forced_fail(kind, threshold, reason)
                }
            }
        });
        let verdicts = join_all(scored).await;

        for verdict in &verdicts {
            debug!(
                event_name = "guardrail.verdict",
                correlation_id = %context.query.request_id(),
                guardrail = verdict.kind.as_str(),
                score = verdict.score,
                threshold = verdict.threshold,
                passed = verdict.passed,
                "guardrail scored"
            );
        }
        Decision::from_verdicts(verdicts)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use marquee_core::config::GuardrailThresholds;
    use marquee_core::domain::{
        Audience, Category, DraftAnswer, Evidence, EvidenceValue, GuardrailKind, Outcome, Query,
        QueryContext,
    };

    use super::{EvaluationContext, GuardrailChain, Judge};
    use crate::llm::ReasoningHandle;
    use crate::prompts::PromptLibrary;
    use crate::providers::ScriptedClient;

    fn grounded_draft() -> DraftAnswer {
        DraftAnswer::new(
            Category::Analytics,
            "20% of the catalog is Korean content (200 of 1000 titles): 120 movies and 80 TV shows.",
            Evidence::new()
                .with("matching_titles", EvidenceValue::Count(200))
                .with("total_titles", EvidenceValue::Count(1000))
                .with("percentage", EvidenceValue::Percentage(20.0)),
        )
    }

    fn judge(client: ScriptedClient) -> Judge {
        Judge::new(
            Arc::new(PromptLibrary::new().expect("templates")),
            ReasoningHandle::new(Arc::new(client), Duration::from_millis(50)),
        )
    }

    #[tokio::test]
    async fn clean_grounded_draft_is_accepted_with_four_verdicts() {
        let query = Query::new("What percentage is Korean?", QueryContext::default()).expect("query");
        let chain = GuardrailChain::new(&GuardrailThresholds::default(), None);

        let decision = chain.evaluate(&grounded_draft(), &EvaluationContext::new(&query)).await;

        assert_eq!(decision.outcome, Outcome::Accept, "{decision:?}");
        let kinds: Vec<GuardrailKind> = decision.verdicts.iter().map(|verdict| verdict.kind).collect();
        assert_eq!(kinds, GuardrailKind::ORDER.to_vec());
    }

    #[tokio::test]
    async fn unsafe_title_for_kids_is_rejected_by_content_safety() {
        let query = Query::new(
            "Is Squid Game good for my kids?",
            QueryContext::for_audience(Audience::Kids),
        )
        .expect("query");
        let draft = DraftAnswer::new(
            Category::Discovery,
            "Found 1 matching titles (terms=squid game). Top results: Squid Game (2021) - TV Thrillers.",
            Evidence::new().with("match_count", EvidenceValue::Count(1)),
        );
        let chain = GuardrailChain::new(&GuardrailThresholds::default(), None);

        let decision = chain.evaluate(&draft, &EvaluationContext::new(&query)).await;

        match &decision.outcome {
            Outcome::Reject { reason, failed_checks } => {
                assert!(reason.starts_with("content-safety check failed"), "{reason}");
                assert!(failed_checks.contains(&GuardrailKind::ContentSafety));
            }
            Outcome::Accept => panic!("expected rejection"),
        }
        let safety = decision.verdict(GuardrailKind::ContentSafety).expect("verdict");
        assert!(safety.score < 0.8);
        assert_eq!(decision.verdicts.len(), 4);
    }

    #[tokio::test]
    async fn timed_out_judge_forces_a_failure_but_keeps_the_decision() {
        let query = Query::new("What percentage is Korean?", QueryContext::default()).expect("query");
        let client = ScriptedClient::new()
            .hang_when("quality assurance judge")
            .reply_when("content safety judge", "SAFE - fine")
            .reply_when("business strategy judge", "SOUND figures")
            .reply_when("bias detection judge", "FAIR and balanced");
        let chain = GuardrailChain::new(&GuardrailThresholds::default(), Some(judge(client)));

        let decision = chain.evaluate(&grounded_draft(), &EvaluationContext::new(&query)).await;

        let quality = decision.verdict(GuardrailKind::Quality).expect("quality verdict");
        assert_eq!(quality.score, 0.0);
        assert!(!quality.passed);
        assert!(quality.reason.contains("timed out"));
        assert_eq!(decision.verdicts.len(), 4);
        assert!(matches!(decision.outcome, Outcome::Reject { .. }));
        assert!(decision.verdict(GuardrailKind::Bias).is_some_and(|verdict| verdict.passed));
    }

    #[tokio::test]
    async fn judge_can_only_lower_the_local_score() {
        let query = Query::new("What percentage is Korean?", QueryContext::default()).expect("query");
        let client = ScriptedClient::new().with_default_reply("UNSAFE, BIASED, POOR and UNREALISTIC");
        let chain = GuardrailChain::new(&GuardrailThresholds::default(), Some(judge(client)));

        let decision = chain.evaluate(&grounded_draft(), &EvaluationContext::new(&query)).await;

        assert_eq!(decision.verdict(GuardrailKind::ContentSafety).map(|v| v.score), Some(0.1));
        assert_eq!(decision.verdict(GuardrailKind::Quality).map(|v| v.score), Some(0.2));
        assert!(decision.verdicts.iter().all(|verdict| !verdict.passed));
    }
}
