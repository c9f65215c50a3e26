use serde::Serialize;

use crate::domain::category::Category;
use crate::domain::evidence::Evidence;

/// Handler output before guardrail review.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DraftAnswer {
    pub category: Category,
    pub text: String,
    pub evidence: Evidence,
    pub notes: Vec<String>,
}

impl DraftAnswer {
    pub fn new(category: Category, text: impl Into<String>, evidence: Evidence) -> Self {
        Self { category, text: text.into(), evidence, notes: Vec::new() }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn is_grounded(&self) -> bool {
        !self.evidence.is_empty()
    }
}
