use async_trait::async_trait;
use marquee_core::domain::{Audience, DraftAnswer, GuardrailKind};

use crate::guardrails::{with_judgement, EvaluationContext, Judge, Score, Validator};
use crate::llm::CapabilityError;
use crate::text::normalize_text;

const MATURE_TITLES: &[&str] = &[
    "squid game",
    "dahmer",
    "ozark",
    "money heist",
    "the witcher",
    "stranger things",
    "black mirror",
    "mindhunter",
    "narcos",
    "breaking bad",
    "dexter",
    "hannibal",
    "american horror",
];

const ADULT_INDICATORS: &[&str] = &[
    "mature themes",
    "graphic violence",
    "sexual content",
    "drug use",
    "psychological thriller",
    "horror",
    "true crime",
    "rated r",
    "tv ma",
    "explicit language",
    "disturbing content",
];

const PROBLEMATIC_PHRASES: &[&str] = &[
    "not suitable for children",
    "adult only",
    "mature audiences only",
    "contains graphic",
    "explicit content",
];

const TEEN_EXTREME_CONTENT: &[&str] =
    &["graphic violence", "explicit sexual content", "extreme drug use"];

pub struct ContentSafetyValidator {
    threshold: f64,
    judge: Option<Judge>,
}

impl ContentSafetyValidator {
    pub fn new(threshold: f64, judge: Option<Judge>) -> Self {
        Self { threshold, judge }
    }
}

fn hits<'a>(normalized: &str, phrases: &[&'a str]) -> Vec<&'a str> {
    phrases.iter().copied().filter(|phrase| normalized.contains(&format!(" {phrase} "))).collect()
}

/// Audience-aware keyword scan over the draft text and the question together.
pub fn local_score(answer: &str, question: &str, audience: Audience) -> Score {
    let normalized = normalize_text(&format!("{answer} {question}"));

    match audience {
        Audience::Kids | Audience::Family => {
            let mut found = hits(&normalized, MATURE_TITLES);
            found.extend(hits(&normalized, ADULT_INDICATORS));
            found.extend(hits(&normalized, PROBLEMATIC_PHRASES));
            if found.is_empty() {
                return Score::clean(format!("no mature content for a {audience} audience"));
            }
            let penalty = 0.1 * (found.len() - 1) as f64;
            Score::new(
                (0.4 - penalty).max(0.1),
                format!("mature content for a {audience} audience: {}", found.join(", ")),
            )
        }
        Audience::Teen => {
            let found = hits(&normalized, TEEN_EXTREME_CONTENT);
            if found.is_empty() {
                Score::clean("no extreme content for a teen audience")
            } else {
                Score::new(0.4, format!("extreme content for a teen audience: {}", found.join(", ")))
            }
        }
        Audience::General | Audience::Adult => Score::clean("no audience restrictions apply"),
    }
}

#[async_trait]
impl Validator for ContentSafetyValidator {
    fn kind(&self) -> GuardrailKind {
        GuardrailKind::ContentSafety
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    async fn score(
        &self,
        draft: &DraftAnswer,
        context: &EvaluationContext<'_>,
    ) -> Result<Score, CapabilityError> {
        let local = local_score(&draft.text, context.query.text(), context.audience());
        with_judgement(self.judge.as_ref(), self.kind(), local, draft, context).await
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::domain::Audience;

    use super::local_score;

    #[test]
    fn content_safety_cases() {
        struct Case {
            answer: &'static str,
            question: &'static str,
            audience: Audience,
            score: f64,
        }

        let cases = vec![
            Case {
                answer: "Here are 5 picks for a kids audience: Paddington (2014) [PG].",
                question: "recommend something for my kids",
                audience: Audience::Kids,
                score: 1.0,
            },
            Case {
                answer: "Top results: Squid Game (2021).",
                question: "find shows",
                audience: Audience::Kids,
                score: 0.4,
            },
            Case {
                answer: "Stranger Things mixes horror with graphic violence.",
                question: "is squid game ok?",
                audience: Audience::Family,
                score: 0.1,
            },
            Case {
                answer: "Stranger Things (2016) - TV Horror.",
                question: "find shows",
                audience: Audience::Adult,
                score: 1.0,
            },
            Case {
                answer: "Includes graphic violence throughout.",
                question: "is this fine",
                audience: Audience::Teen,
                score: 0.4,
            },
            Case {
                answer: "Rated TV-MA for mature themes.",
                question: "what rating",
                audience: Audience::Kids,
                score: 0.3,
            },
        ];

        for case in cases {
            let score = local_score(case.answer, case.question, case.audience);
            assert!((score.value - case.score).abs() < 1e-9, "{} -> {:?}", case.answer, score);
        }
    }

    #[test]
    fn titles_match_on_word_boundaries() {
        let score = local_score("Dexterity puzzles for everyone.", "games", Audience::Kids);
        assert_eq!(score.value, 1.0);
    }
}
