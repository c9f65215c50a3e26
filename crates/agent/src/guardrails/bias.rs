use std::sync::LazyLock;

use async_trait::async_trait;
use marquee_core::domain::{DraftAnswer, GuardrailKind};
use regex::Regex;

use crate::guardrails::{with_judgement, EvaluationContext, Judge, Score, Validator};
use crate::llm::CapabilityError;

const AGE_GROUPS: &[&str] =
    &["young people", "old people", "elderly", "teens", "teenagers", "adults", "seniors", "kids", "children"];
const GENDER_GROUPS: &[&str] = &["men", "women", "males", "females", "boys", "girls"];
const ETHNIC_GROUPS: &[&str] = &[
    "asians", "black people", "white people", "hispanics", "latinos", "latinas", "africans",
];
const NATIONAL_GROUPS: &[&str] = &[
    "koreans", "japanese", "indians", "spanish", "americans", "europeans", "foreigners",
    "immigrants", "british", "french", "germans", "mexicans", "brazilians",
];
const SOCIOECONOMIC_GROUPS: &[&str] =
    &["rich people", "poor people", "the wealthy", "the poor", "low-income families", "upper-class"];

/// Phrasing that turns a group into a single trait.
const GENERALIZING_VERBS: &str =
    r"(?:are|always|never|only|all|prefer|like|love|hate|can't|cannot|don't|won't|tend to)";

static GENERALIZATION: LazyLock<Regex> = LazyLock::new(|| {
    let groups: Vec<String> = [AGE_GROUPS, GENDER_GROUPS, ETHNIC_GROUPS, NATIONAL_GROUPS, SOCIOECONOMIC_GROUPS]
        .iter()
        .flat_map(|groups| groups.iter())
        .map(|group| regex::escape(group))
        .collect();
    let pattern = format!(
        r"(?i)\b(?:all|every|most|typical)\s+(?:\w+\s+)?(?P<group>{})\s+(?:\w+\s+)?{GENERALIZING_VERBS}\b",
        groups.join("|")
    );
    Regex::new(&pattern).unwrap()
});

static INNATE_TRAIT: LazyLock<Regex> = LazyLock::new(|| {
    let groups: Vec<String> = [GENDER_GROUPS, ETHNIC_GROUPS, NATIONAL_GROUPS]
        .iter()
        .flat_map(|groups| groups.iter())
        .map(|group| regex::escape(group))
        .collect();
    let pattern = format!(
        r"(?i)\b(?P<group>{})\s+are\s+(?:naturally|inherently|born|genetically)\b",
        groups.join("|")
    );
    Regex::new(&pattern).unwrap()
});

pub struct BiasValidator {
    threshold: f64,
    judge: Option<Judge>,
}

impl BiasValidator {
    pub fn new(threshold: f64, judge: Option<Judge>) -> Self {
        Self { threshold, judge }
    }
}

pub fn local_score(text: &str) -> Score {
    for pattern in [&*GENERALIZATION, &*INNATE_TRAIT] {
        if let Some(found) = pattern.captures(text) {
            let group = found.name("group").map(|group| group.as_str()).unwrap_or_default();
            return Score::new(0.3, format!("stereotyped generalisation about {group}"));
        }
    }
    Score::clean("no group generalisations")
}

#[async_trait]
impl Validator for BiasValidator {
    fn kind(&self) -> GuardrailKind {
        GuardrailKind::Bias
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    async fn score(
        &self,
        draft: &DraftAnswer,
        context: &EvaluationContext<'_>,
    ) -> Result<Score, CapabilityError> {
        let local = local_score(&draft.text);
        with_judgement(self.judge.as_ref(), self.kind(), local, draft, context).await
    }
}
