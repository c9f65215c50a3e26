use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::PipelineError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Age-rating context a query is asked in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    General,
    Kids,
    Family,
    Teen,
    Adult,
}

impl Audience {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Kids => "kids",
            Self::Family => "family",
            Self::Teen => "teen",
            Self::Adult => "adult",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown audience `{0}` (expected general|kids|family|teen|adult)")]
pub struct ParseAudienceError(pub String);

impl FromStr for Audience {
    type Err = ParseAudienceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "general" | "all" | "" => Ok(Self::General),
            "kids" | "kid" | "children" | "child" => Ok(Self::Kids),
            "family" => Ok(Self::Family),
            "teen" | "teens" | "teenager" => Ok(Self::Teen),
            "adult" | "adults" | "mature" => Ok(Self::Adult),
            other => Err(ParseAudienceError(other.to_owned())),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    pub audience: Option<Audience>,
    pub locale: Option<String>,
}

impl QueryContext {
    pub fn for_audience(audience: Audience) -> Self {
        Self { audience: Some(audience), locale: None }
    }

    pub fn audience(&self) -> Audience {
        self.audience.unwrap_or_default()
    }
}

/// A single user question. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    request_id: RequestId,
    text: String,
    context: QueryContext,
}

impl Query {
    pub fn new(text: impl AsRef<str>, context: QueryContext) -> Result<Self, PipelineError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        Ok(Self { request_id: RequestId::generate(), text: trimmed.to_owned(), context })
    }

    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    pub fn audience(&self) -> Audience {
        self.context.audience()
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::query::{Audience, Query, QueryContext};
    use crate::errors::PipelineError;

    #[test]
    fn whitespace_only_text_is_an_empty_query() {
        let result = Query::new("   \n\t", QueryContext::default());
        assert!(matches!(result, Err(PipelineError::EmptyQuery)));
    }

    #[test]
    fn query_text_is_trimmed_and_gets_a_request_id() {
        let query = Query::new("  top genres?  ", QueryContext::default()).expect("valid query");

        assert_eq!(query.text(), "top genres?");
        assert_eq!(query.request_id().as_str().len(), 36);
        assert_eq!(query.audience(), Audience::General);
    }

    #[test]
    fn audience_parsing_accepts_common_aliases() {
        assert_eq!("Children".parse::<Audience>(), Ok(Audience::Kids));
        assert_eq!("teens".parse::<Audience>(), Ok(Audience::Teen));
        assert_eq!("mature".parse::<Audience>(), Ok(Audience::Adult));
        assert!("toddlers".parse::<Audience>().is_err());
    }
}
