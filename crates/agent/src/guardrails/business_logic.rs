use std::sync::LazyLock;

use async_trait::async_trait;
use marquee_core::dataset::percentage;
use marquee_core::domain::{DraftAnswer, EvidenceValue, GuardrailKind};
use regex::Regex;

use crate::guardrails::{with_judgement, EvaluationContext, Judge, Score, Validator};
use crate::llm::CapabilityError;

const PERCENTAGE_TOLERANCE: f64 = 0.01;

/// Percentage evidence derived from `matching_titles / total_titles`.
const SHARE_KEYS: &[&str] = &["percentage", "catalog_share"];

const SPECULATION_PHRASES: &[&str] = &[
    "guaranteed",
    "guarantee success",
    "will definitely",
    "100% certain",
    "risk-free",
    "risk free",
    "cannot fail",
    "can't fail",
    "no risk",
    "sure thing",
];

static SHARE_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*%\s+of\b").unwrap());

pub struct BusinessLogicValidator {
    threshold: f64,
    judge: Option<Judge>,
}

impl BusinessLogicValidator {
    pub fn new(threshold: f64, judge: Option<Judge>) -> Self {
        Self { threshold, judge }
    }
}

fn out_of_range(value: f64) -> bool {
    !value.is_finite() || !(0.0..=100.0).contains(&value)
}

pub fn local_score(draft: &DraftAnswer) -> Score {
    for (key, value) in draft.evidence.iter() {
        if let EvidenceValue::Percentage(value) = value {
            if out_of_range(*value) {
                return Score::new(0.1, format!("percentage `{key}` = {value} is outside [0, 100]"));
            }
        }
    }

    if let (Some(matching), Some(total)) =
        (draft.evidence.count("matching_titles"), draft.evidence.count("total_titles"))
    {
        if matching > total {
            return Score::new(0.1, format!("{matching} matching titles exceed the {total} total"));
        }
        for key in SHARE_KEYS {
            if let Some(reported) = draft.evidence.percentage(key) {
                let expected = percentage(matching, total);
                if (reported - expected).abs() > PERCENTAGE_TOLERANCE {
                    return Score::new(
                        0.1,
                        format!("`{key}` = {reported} does not match {matching}/{total} = {expected}"),
                    );
                }
            }
        }
    }

    for capture in SHARE_IN_TEXT.captures_iter(&draft.text) {
        let value = capture.get(1).and_then(|found| found.as_str().parse::<f64>().ok());
        if value.is_some_and(out_of_range) {
            return Score::new(0.1, "answer states a share above 100%");
        }
    }

    let lowered = draft.text.to_lowercase();
    let speculative: Vec<&str> =
        SPECULATION_PHRASES.iter().copied().filter(|phrase| lowered.contains(phrase)).collect();
    if !speculative.is_empty() {
        return Score::new(0.5, format!("over-confident claims: {}", speculative.join(", ")));
    }

    Score::clean("figures are consistent")
}

#[async_trait]
impl Validator for BusinessLogicValidator {
    fn kind(&self) -> GuardrailKind {
        GuardrailKind::BusinessLogic
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

    use super::{local_score, SHARE_IN_TEXT};

    #[test]
    fn share_pattern_captures_the_stated_figure() {
        let capture = SHARE_IN_TEXT.captures("Nearly 140.5% of the catalog").expect("share");
        assert_eq!(capture.get(1).map(|found| found.as_str()), Some("140.5"));
    }

    fn share(matching: u64, total: u64, reported: f64) -> Evidence {
        Evidence::new()
            .with("matching_titles", EvidenceValue::Count(matching))
            .with("total_titles", EvidenceValue::Count(total))
            .with("percentage", EvidenceValue::Percentage(reported))
    }

    #[test]
    fn business_logic_cases() {
        struct Case {
            text: &'static str,
            evidence: Evidence,
            score: f64,
        }

        let cases = vec![
            Case { text: "20% of the catalog is Korean.", evidence: share(200, 1000, 20.0), score: 1.0 },
            Case { text: "33.33% of the catalog.", evidence: share(1, 3, 33.33), score: 1.0 },
            Case { text: "25% of the catalog is Korean.", evidence: share(200, 1000, 25.0), score: 0.1 },
            Case { text: "Share.", evidence: share(10, 5, 200.0), score: 0.1 },
            Case { text: "Fine.", evidence: share(1200, 1000, 100.0), score: 0.1 },
            Case { text: "Nearly 140% of the catalog is new.", evidence: Evidence::new(), score: 0.1 },
            Case { text: "Titles grew by 150% in three years.", evidence: Evidence::new(), score: 1.0 },
            Case {
                text: "Investing in anime is guaranteed to pay off.",
                evidence: Evidence::new(),
                score: 0.5,
            },
        ];

        for case in cases {
            let draft = DraftAnswer::new(Category::Strategy, case.text, case.evidence);
            assert_eq!(local_score(&draft).value, case.score, "{}", case.text);
        }
    }
}
