use marquee_core::domain::{Audience, Category, DraftAnswer, EvidenceValue, GuardrailKind};
use tera::{Context, Tera};
use thiserror::Error;

const CLASSIFY: &str = "classify";
const REPHRASE: &str = "rephrase";
const JUDGE: &str = "judge";

const CLASSIFY_TEMPLATE: &str = "\
You route questions for a streaming-catalog business assistant.
Pick exactly one category for the question below:
- discovery: finding or searching for specific titles
- analytics: statistics, percentages, trends and distributions over the catalog
- recommendation: personalised suggestions of what to watch
- support: plans, billing, downloads, accounts and other help topics
- strategy: business, investment and market decisions
Reply with the category name only.

Question: {{ query }}
";

const REPHRASE_TEMPLATE: &str = "\
You are the {{ agent }} of a streaming-catalog business assistant.
Rewrite the draft answer below so it reads naturally for the user.
Keep every number exactly as written and do not add facts that are not listed.

Question: {{ query }}
Draft answer: {{ draft }}
Facts:
{% for fact in facts %}- {{ fact }}
{% endfor %}";

const JUDGE_TEMPLATE: &str = "\
You are a {{ role }} for a streaming-catalog assistant.
Evaluate whether the response meets: {{ criteria }}.
{{ instructions }}
Respond with '{{ positive }}' or '{{ negative }}' first, followed by a short explanation.

Audience: {{ audience }}
User question: {{ query }}
Response: {{ response }}
";

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt templates failed to compile: {0}")]
    Compile(#[source] tera::Error),
    #[error("prompt template `{name}` failed to render: {source}")]
    Render { name: &'static str, source: tera::Error },
}

/// Judgement words a judge is asked to answer with, per guardrail kind.
pub struct JudgeVocabulary {
    pub positive: &'static [&'static str],
    pub negative: &'static [&'static str],
    pub high_score: f64,
    pub low_score: f64,
}

pub fn judge_vocabulary(kind: GuardrailKind) -> JudgeVocabulary {
    match kind {
        GuardrailKind::ContentSafety => JudgeVocabulary {
            positive: &["SAFE"],
            negative: &["UNSAFE", "INAPPROPRIATE", "HARMFUL"],
            high_score: 0.9,
            low_score: 0.1,
        },
        GuardrailKind::Quality => JudgeVocabulary {
            positive: &["GOOD", "EXCELLENT", "HIGH QUALITY"],
            negative: &["POOR", "LOW QUALITY", "INADEQUATE"],
            high_score: 0.85,
            low_score: 0.2,
        },
        GuardrailKind::BusinessLogic => JudgeVocabulary {
            positive: &["VIABLE", "REALISTIC", "SOUND"],
            negative: &["UNREALISTIC", "UNFEASIBLE", "POOR STRATEGY"],
            high_score: 0.8,
            low_score: 0.2,
        },
        GuardrailKind::Bias => JudgeVocabulary {
            positive: &["FAIR", "UNBIASED", "INCLUSIVE"],
            negative: &["BIASED", "DISCRIMINATORY", "EXCLUSIVE"],
            high_score: 0.85,
            low_score: 0.3,
        },
    }
}

#[derive(Debug)]
pub struct PromptLibrary {
    tera: Tera,
}

impl PromptLibrary {
    pub fn new() -> Result<Self, PromptError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            (CLASSIFY, CLASSIFY_TEMPLATE),
            (REPHRASE, REPHRASE_TEMPLATE),
            (JUDGE, JUDGE_TEMPLATE),
        ])
        .map_err(PromptError::Compile)?;
        Ok(Self { tera })
    }

    pub fn classify(&self, query: &str) -> Result<String, PromptError> {
        let mut context = Context::new();
        context.insert("query", query);
        self.render(CLASSIFY, &context)
    }

    pub fn rephrase(&self, query: &str, draft: &DraftAnswer) -> Result<String, PromptError> {
        let facts: Vec<String> =
            draft.evidence.iter().map(|(key, value)| format!("{key}: {}", describe(value))).collect();

        let mut context = Context::new();
        context.insert("agent", agent_name(draft.category));
        context.insert("query", query);
        context.insert("draft", &draft.text);
        context.insert("facts", &facts);
        self.render(REPHRASE, &context)
    }

    pub fn judge(
        &self,
        kind: GuardrailKind,
        audience: Audience,
        query: &str,
        response: &str,
    ) -> Result<String, PromptError> {
        let vocabulary = judge_vocabulary(kind);
        let (role, instructions) = judge_role(kind);

        let mut context = Context::new();
        context.insert("role", role);
        context.insert("criteria", judge_criteria(kind, audience));
        context.insert("instructions", instructions);
        context.insert("positive", vocabulary.positive[0]);
        context.insert("negative", vocabulary.negative[0]);
        context.insert("audience", audience.as_str());
        context.insert("query", query);
        context.insert("response", response);
        self.render(JUDGE, &context)
    }

    fn render(&self, name: &'static str, context: &Context) -> Result<String, PromptError> {
        self.tera.render(name, context).map_err(|source| PromptError::Render { name, source })
    }
}

fn agent_name(category: Category) -> &'static str {
    match category {
        Category::Discovery => "content discovery agent",
        Category::Analytics => "data analytics agent",
        Category::Recommendation => "recommendation agent",
        Category::Support => "customer support agent",
        Category::Strategy => "business strategy agent",
    }
}

fn judge_role(kind: GuardrailKind) -> (&'static str, &'static str) {
    match kind {
        GuardrailKind::ContentSafety => (
            "content safety judge",
            "Consider age-appropriateness and family-friendly standards. Be strict about titles suggested to children and families.",
        ),
        GuardrailKind::Quality => (
            "quality assurance judge",
            "Assess accuracy, helpfulness, completeness and whether the data quoted is plausible.",
        ),
        GuardrailKind::BusinessLogic => (
            "business strategy judge",
            "Consider whether figures are internally consistent and whether conclusions are commercially sound.",
        ),
        GuardrailKind::Bias => (
            "bias detection judge",
            "Identify cultural, demographic, regional or genre stereotypes and unfair generalisations.",
        ),
    }
}

fn judge_criteria(kind: GuardrailKind, audience: Audience) -> &'static str {
    match (kind, audience) {
        (GuardrailKind::ContentSafety, Audience::Kids) => {
            "content is safe and appropriate for children under 13 with no mature themes"
        }
        (GuardrailKind::ContentSafety, Audience::Family) => {
            "content is suitable for the whole family with no mature themes"
        }
        (GuardrailKind::ContentSafety, Audience::Teen) => {
            "content is appropriate for teenagers aged 13-17 with minimal mature content"
        }
        (GuardrailKind::ContentSafety, Audience::Adult) => {
            "content follows mature content guidelines with appropriate age restrictions"
        }
        (GuardrailKind::ContentSafety, Audience::General) => {
            "content is appropriate for general audiences and follows community guidelines"
        }
        (GuardrailKind::Quality, _) => {
            "the response is accurate, complete, well-formatted and answers the question"
        }
        (GuardrailKind::BusinessLogic, _) => {
            "figures are consistent and conclusions are realistic for a streaming business"
        }
        (GuardrailKind::Bias, _) => {
            "the response avoids cultural, demographic, regional and genre bias"
        }
    }
}

fn describe(value: &EvidenceValue) -> String {
    match value {
        EvidenceValue::Count(count) => count.to_string(),
        EvidenceValue::Percentage(value) => format!("{value}%"),
        EvidenceValue::Number(value) => value.to_string(),
        EvidenceValue::Text(text) => text.clone(),
        EvidenceValue::List(items) => items.join("; "),
        EvidenceValue::Breakdown(entries) => entries
            .iter()
            .map(|(name, count)| format!("{name} ({count})"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

#[cfg(test)]
mod tests {
    use marquee_core::domain::{
        Audience, Category, DraftAnswer, Evidence, EvidenceValue, GuardrailKind,
    };

    use super::PromptLibrary;

    #[test]
    fn classify_prompt_lists_every_category_and_the_question() {
        let prompts = PromptLibrary::new().expect("templates compile");
        let prompt = prompts.classify("How many Korean titles are there?").expect("render");

        for label in ["discovery", "analytics", "recommendation", "support", "strategy"] {
            assert!(prompt.contains(label), "missing {label}");
        }
        assert!(prompt.contains("How many Korean titles are there?"));
    }

    #[test]
    fn rephrase_prompt_carries_facts() {
        let prompts = PromptLibrary::new().expect("templates compile");
        let draft = DraftAnswer::new(
            Category::Analytics,
            "20% of the catalog is Korean.",
            Evidence::new().with("percentage", EvidenceValue::Percentage(20.0)),
        );
        let prompt = prompts.rephrase("korean share?", &draft).expect("render");

        assert!(prompt.contains("data analytics agent"));
        assert!(prompt.contains("- percentage: 20%"));
    }

    #[test]
    fn judge_prompt_is_audience_aware() {
        let prompts = PromptLibrary::new().expect("templates compile");
        let prompt = prompts
            .judge(GuardrailKind::ContentSafety, Audience::Kids, "q", "some response")
            .expect("render");

        assert!(prompt.contains("children under 13"));
        assert!(prompt.contains("'SAFE' or 'UNSAFE'"));
    }
}
