use serde::Serialize;

use crate::domain::answer::DraftAnswer;
use crate::domain::category::Category;
use crate::domain::evidence::Evidence;
use crate::domain::query::RequestId;
use crate::domain::verdict::{GuardrailKind, GuardrailVerdict};

/// Terminal artifact of every query.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Success {
        request_id: RequestId,
        category: Category,
        answer: String,
        evidence: Evidence,
        verdicts: Vec<GuardrailVerdict>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        notes: Vec<String>,
    },
    Rejected {
        request_id: RequestId,
        category: Category,
        reason: String,
        failed_checks: Vec<GuardrailKind>,
        verdicts: Vec<GuardrailVerdict>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        notes: Vec<String>,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<RequestId>,
        reason: String,
    },
}

impl Response {
    pub fn error(request_id: Option<RequestId>, reason: impl Into<String>) -> Self {
        Self::Error { request_id, reason: reason.into() }
    }

    pub fn success(
        request_id: RequestId,
        draft: DraftAnswer,
        verdicts: Vec<GuardrailVerdict>,
    ) -> Self {
        Self::Success {
            request_id,
            category: draft.category,
            answer: draft.text,
            evidence: draft.evidence,
            verdicts,
            notes: draft.notes,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Rejected { .. } => "rejected",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Rejected { reason, .. } | Self::Error { reason, .. } => Some(reason),
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            Self::Success { category, .. } | Self::Rejected { category, .. } => Some(*category),
            Self::Error { .. } => None,
        }
    }

    pub fn verdicts(&self) -> &[GuardrailVerdict] {
        match self {
            Self::Success { verdicts, .. } | Self::Rejected { verdicts, .. } => verdicts,
            Self::Error { .. } => &[],
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            r#"{"status":"error","reason":"response serialization failed"}"#.to_owned()
        })
    }
}
