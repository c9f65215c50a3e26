use std::sync::Arc;

use marquee_core::domain::{Audience, DraftAnswer, GuardrailKind};

use crate::guardrails::EvaluationContext;
use crate::llm::{CapabilityError, ReasoningHandle};
use crate::prompts::{judge_vocabulary, PromptLibrary};
use crate::text::{matches_keyword, normalize_text};

const EXPLANATION_CHARS: usize = 200;

/// Semantic scoring through the reasoning capability.
#[derive(Clone, Debug)]
pub struct Judge {
    prompts: Arc<PromptLibrary>,
    reasoning: ReasoningHandle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Judgement {
    pub score: f64,
    pub passed: bool,
    pub explanation: String,
}

impl Judge {
    pub fn new(prompts: Arc<PromptLibrary>, reasoning: ReasoningHandle) -> Self {
        Self { prompts, reasoning }
    }

    pub fn provider_name(&self) -> &str {
        self.reasoning.provider_name()
    }

    pub async fn assess(
        &self,
        kind: GuardrailKind,
        draft: &DraftAnswer,
        context: &EvaluationContext<'_>,
    ) -> Result<Judgement, CapabilityError> {
        let prompt = self
            .prompts
            .judge(kind, context.audience(), context.query.text(), &draft.text)
            .map_err(|error| CapabilityError::Unavailable(error.to_string()))?;
        let reply = self.reasoning.complete(&prompt).await?;
        Ok(parse_judgement(kind, &reply, context.audience()))
    }
}

/// A negative word outweighs a positive one; a reply with neither fails.
pub fn parse_judgement(kind: GuardrailKind, reply: &str, audience: Audience) -> Judgement {
    let vocabulary = judge_vocabulary(kind);
    let normalized = normalize_text(reply);
    let mentions = |words: &[&str]| {
        words.iter().any(|word| matches_keyword(&normalized, normalize_text(word).trim()))
    };

    let passed = !mentions(vocabulary.negative) && mentions(vocabulary.positive);
    let mut score = if passed { vocabulary.high_score } else { vocabulary.low_score };
    match audience {
        Audience::Kids if !passed => score = (score - 0.1).max(0.05),
        Audience::Family if passed => score = (score + 0.05).min(1.0),
        _ => {}
    }

    Judgement {
        score,
        passed,
        explanation: reply.trim().chars().take(EXPLANATION_CHARS).collect(),
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::domain::{Audience, GuardrailKind};

    use super::parse_judgement;

    #[test]
    fn judgement_cases() {
        struct Case {
            kind: GuardrailKind,
            reply: &'static str,
            audience: Audience,
            score: f64,
            passed: bool,
        }

        let cases = vec![
            Case { kind: GuardrailKind::ContentSafety, reply: "SAFE. Nothing mature.", audience: Audience::General, score: 0.9, passed: true },
            Case { kind: GuardrailKind::ContentSafety, reply: "UNSAFE for children", audience: Audience::General, score: 0.1, passed: false },
            Case { kind: GuardrailKind::ContentSafety, reply: "Unsafe", audience: Audience::Kids, score: 0.05, passed: false },
            Case { kind: GuardrailKind::ContentSafety, reply: "SAFE", audience: Audience::Family, score: 0.95, passed: true },
            Case { kind: GuardrailKind::Quality, reply: "HIGH QUALITY answer", audience: Audience::General, score: 0.85, passed: true },
            Case { kind: GuardrailKind::Quality, reply: "GOOD but also INADEQUATE", audience: Audience::General, score: 0.2, passed: false },
            Case { kind: GuardrailKind::BusinessLogic, reply: "UNREALISTIC projections", audience: Audience::General, score: 0.2, passed: false },
            Case { kind: GuardrailKind::Bias, reply: "UNBIASED and inclusive", audience: Audience::General, score: 0.85, passed: true },
            Case { kind: GuardrailKind::Bias, reply: "I cannot tell", audience: Audience::General, score: 0.3, passed: false },
        ];

        for case in cases {
            let judgement = parse_judgement(case.kind, case.reply, case.audience);
            assert_eq!(judgement.passed, case.passed, "{}", case.reply);
            assert!((judgement.score - case.score).abs() < 1e-9, "{} -> {}", case.reply, judgement.score);
        }
    }
}
