use async_trait::async_trait;
use marquee_core::domain::{DraftAnswer, GuardrailKind};

use crate::guardrails::{with_judgement, EvaluationContext, Judge, Score, Validator};
use crate::llm::CapabilityError;

const MIN_ANSWER_CHARS: usize = 50;

const ERROR_MARKERS: &[&str] = &[
    "traceback",
    "stack trace",
    "internal error",
    "something went wrong",
    "unable to process",
    "i cannot answer",
    "as an ai language model",
    "lorem ipsum",
];

pub struct QualityValidator {
    threshold: f64,
    judge: Option<Judge>,
}

impl QualityValidator {
    pub fn new(threshold: f64, judge: Option<Judge>) -> Self {
        Self { threshold, judge }
    }
}

/// Each defect caps the score; the lowest cap wins.
pub fn local_score(draft: &DraftAnswer) -> Score {
    let text = draft.text.trim();
    if text.is_empty() {
        return Score::new(0.0, "empty answer");
    }

    let mut score = 1.0_f64;
    let mut defects = Vec::new();
    if text.chars().count() < MIN_ANSWER_CHARS {
        score = score.min(0.6);
        defects.push("answer is too short");
    }
    if !draft.is_grounded() {
        score = score.min(0.5);
        defects.push("answer is not grounded in catalog evidence");
    }
    let lowered = text.to_lowercase();
    if ERROR_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        score = score.min(0.3);
        defects.push("answer reads like an error message");
    }

    if defects.is_empty() {
        Score::clean("answer is complete and grounded")
    } else {
        Score::new(score, defects.join("; "))
    }
}

#[async_trait]
impl Validator for QualityValidator {
    fn kind(&self) -> GuardrailKind {
        GuardrailKind::Quality
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    async fn score(
        &self,
        draft: &DraftAnswer,
        context: &EvaluationContext<'_>,
    ) -> Result<Score, CapabilityError> {
        with_judgement(self.judge.as_ref(), self.kind(), local_score(draft), draft, context).await
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::domain::{Category, DraftAnswer, Evidence, EvidenceValue};

    use super::local_score;

    fn evidence() -> Evidence {
        Evidence::new().with("match_count", EvidenceValue::Count(3))
    }

    #[test]
    fn quality_cases() {
        struct Case {
            text: &'static str,
            evidence: Evidence,
            score: f64,
        }

        let cases = vec![
            Case {
                text: "Found 3 matching titles. Top results: A (2021); B (2020); C (2019).",
                evidence: evidence(),
                score: 1.0,
            },
            Case { text: "   ", evidence: evidence(), score: 0.0 },
            Case { text: "Found 3.", evidence: evidence(), score: 0.6 },
            Case {
                text: "Korean content is very popular in the catalog these days, trust me.",
                evidence: Evidence::new(),
                score: 0.5,
            },
            Case {
                text: "Something went wrong while computing the catalog statistics for you.",
                evidence: evidence(),
                score: 0.3,
            },
        ];

        for case in cases {
            let draft = DraftAnswer::new(Category::Analytics, case.text, case.evidence);
            assert_eq!(local_score(&draft).value, case.score, "{}", case.text);
        }
    }
}
