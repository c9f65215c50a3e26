use std::sync::Arc;

use marquee_core::domain::Category;
use marquee_core::errors::PipelineError;
use thiserror::Error;
use tracing::debug;

use crate::llm::{CapabilityError, ReasoningHandle};
use crate::prompts::PromptLibrary;
use crate::text::{count_keywords, normalize_text};

const DISCOVERY_KEYWORDS: &[&str] = &[
    "find",
    "search*",
    "looking for",
    "show me",
    "discover*",
    "browse",
    "what movies",
    "what shows",
    "list",
    "titles with",
];

const RECOMMENDATION_KEYWORDS: &[&str] = &[
    "recommend*",
    "suggest*",
    "what should i watch",
    "preference*",
    "for me",
    "personali*",
    "similar to",
    "something to watch",
];

const ANALYTICS_KEYWORDS: &[&str] = &[
    "trend*",
    "analy*",
    "data",
    "statistic*",
    "percent*",
    "how many",
    "distribution",
    "performance",
    "insight*",
    "growth",
    "market share",
    "proportion",
    "breakdown",
    "popular genres",
    "top genres",
    "countr*",
    "compare*",
];

const SUPPORT_KEYWORDS: &[&str] = &[
    "plan",
    "plans",
    "subscri*",
    "price",
    "pricing",
    "cancel*",
    "help",
    "support",
    "faq",
    "billing",
    "account*",
    "download*",
    "password",
    "parental",
    "streaming quality",
];

const STRATEGY_KEYWORDS: &[&str] = &[
    "strateg*",
    "business",
    "invest*",
    "market",
    "acqui*",
    "compet*",
    "roi",
    "budget",
    "content planning",
    "should we",
    "momentum",
];

pub fn keywords_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Discovery => DISCOVERY_KEYWORDS,
        Category::Recommendation => RECOMMENDATION_KEYWORDS,
        Category::Analytics => ANALYTICS_KEYWORDS,
        Category::Support => SUPPORT_KEYWORDS,
        Category::Strategy => STRATEGY_KEYWORDS,
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("empty query")]
    EmptyQuery,
    #[error("classifier returned an unknown label `{0}`")]
    UnknownLabel(String),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error("classification prompt could not be rendered: {0}")]
    Prompt(String),
}

impl From<ClassificationError> for PipelineError {
    fn from(error: ClassificationError) -> Self {
        match error {
            ClassificationError::EmptyQuery => PipelineError::EmptyQuery,
            other => PipelineError::Classification(other.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassificationMethod {
    Keywords,
    Delegated,
    Fallback,
}

impl ClassificationMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Keywords => "keywords",
            Self::Delegated => "delegated",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub method: ClassificationMethod,
    pub note: Option<String>,
}

#[derive(Clone, Default)]
pub struct IntentClassifier {
    delegate: Option<(Arc<PromptLibrary>, ReasoningHandle)>,
}

impl IntentClassifier {
    /// Deterministic keyword classifier.
    pub fn keywords() -> Self {
        Self { delegate: None }
    }

    /// Asks the reasoning capability for a label.
    pub fn delegated(prompts: Arc<PromptLibrary>, reasoning: ReasoningHandle) -> Self {
        Self { delegate: Some((prompts, reasoning)) }
    }

    pub fn is_delegated(&self) -> bool {
        self.delegate.is_some()
    }

    /// Highest keyword score wins; ties break by category priority; no hit means analytics.
    pub fn classify_keywords(&self, text: &str) -> Result<Category, ClassificationError> {
        if text.trim().is_empty() {
            return Err(ClassificationError::EmptyQuery);
        }
        let normalized = normalize_text(text);

        let mut best = (Category::FALLBACK, 0usize);
        for category in Category::PRIORITY {
            let hits = count_keywords(&normalized, keywords_for(category));
            if hits > best.1 {
                best = (category, hits);
            }
        }
        debug!(category = best.0.as_str(), hits = best.1, "keyword classification");
        Ok(best.0)
    }

    pub async fn classify(&self, text: &str) -> Result<Category, ClassificationError> {
        if text.trim().is_empty() {
            return Err(ClassificationError::EmptyQuery);
        }

        let Some((prompts, reasoning)) = &self.delegate else {
            return self.classify_keywords(text);
        };

        let prompt = prompts
            .classify(text)
            .map_err(|error| ClassificationError::Prompt(error.to_string()))?;
        let reply = reasoning.complete(&prompt).await?;
        parse_label(&reply)
    }

    /// Never fails: any classification error degrades to analytics with a note.
    pub async fn classify_or_fallback(&self, text: &str) -> Classification {
        let method = if self.is_delegated() {
            ClassificationMethod::Delegated
        } else {
            ClassificationMethod::Keywords
        };

        match self.classify(text).await {
            Ok(category) => Classification { category, method, note: None },
            Err(error) => Classification {
                category: Category::FALLBACK,
                method: ClassificationMethod::Fallback,
                note: Some(format!("{error}; defaulted to analytics")),
            },
        }
    }
}

fn parse_label(reply: &str) -> Result<Category, ClassificationError> {
    let trimmed = reply.trim();
    if let Ok(category) = trimmed.parse::<Category>() {
        return Ok(category);
    }
    let first_word = trimmed.split_whitespace().next().unwrap_or_default();
    first_word
        .parse::<Category>()
        .map_err(|_| ClassificationError::UnknownLabel(trimmed.chars().take(40).collect()))
}
