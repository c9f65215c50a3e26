use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailKind {
    ContentSafety,
    Quality,
    BusinessLogic,
    Bias,
}

impl GuardrailKind {
    /// Evaluation order of the chain.
    pub const ORDER: [GuardrailKind; 4] =
        [Self::ContentSafety, Self::Quality, Self::BusinessLogic, Self::Bias];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContentSafety => "content_safety",
            Self::Quality => "quality",
            Self::BusinessLogic => "business_logic",
            Self::Bias => "bias",
        }
    }

    /// Human-readable name used in rejection reasons.
    pub fn label(self) -> &'static str {
        match self {
            Self::ContentSafety => "content-safety",
            Self::Quality => "quality",
            Self::BusinessLogic => "business-logic",
            Self::Bias => "bias",
        }
    }
}

impl fmt::Display for GuardrailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardrailVerdict {
    pub kind: GuardrailKind,
    pub score: f64,
    pub threshold: f64,
    pub passed: bool,
    pub reason: String,
}

impl GuardrailVerdict {
    /// Scores are clamped to `[0, 1]`; NaN counts as zero. Equality with the threshold passes.
    pub fn new(kind: GuardrailKind, score: f64, threshold: f64, reason: impl Into<String>) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self { kind, score, threshold, passed: score >= threshold, reason: reason.into() }
    }

    /// Verdict recorded when a validator could not produce a score at all.
    pub fn forced_fail(kind: GuardrailKind, threshold: f64, reason: impl Into<String>) -> Self {
        Self { kind, score: 0.0, threshold, passed: false, reason: reason.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Accept,
    Reject { reason: String, failed_checks: Vec<GuardrailKind> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub verdicts: Vec<GuardrailVerdict>,
    pub outcome: Outcome,
}

impl Decision {
    pub fn new(verdicts: Vec<GuardrailVerdict>, outcome: Outcome) -> Self {
        Self { verdicts, outcome }
    }

    /// Accept iff every verdict passed. The first failing verdict, in chain order,
    /// supplies the rejection reason.
    pub fn from_verdicts(verdicts: Vec<GuardrailVerdict>) -> Self {
        let failed: Vec<&GuardrailVerdict> =
            verdicts.iter().filter(|verdict| !verdict.passed).collect();

        let outcome = match failed.first() {
            None => Outcome::Accept,
            Some(first) => Outcome::Reject {
                reason: format!(
                    "{} check failed (score {:.2} < {:.2}): {}",
                    first.kind.label(),
                    first.score,
                    first.threshold,
                    first.reason
                ),
                failed_checks: failed.iter().map(|verdict| verdict.kind).collect(),
            },
        };

        Self { verdicts, outcome }
    }

    /// Decision used when guardrails are switched off.
    pub fn unchecked() -> Self {
        Self { verdicts: Vec::new(), outcome: Outcome::Accept }
    }

    pub fn verdict(&self, kind: GuardrailKind) -> Option<&GuardrailVerdict> {
        self.verdicts.iter().find(|verdict| verdict.kind == kind)
    }
}
