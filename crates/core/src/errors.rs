use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::DatasetError;
use crate::pipeline::TransitionError;

/// How far an error is allowed to travel before it is absorbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Rejected before the query enters the pipeline.
    Input,
    /// Absorbed with a safe default and surfaced as a note.
    Recoverable,
    /// Ends the current request with an error response.
    Fatal,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("empty query")]
    EmptyQuery,
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("classification failed: {0}")]
    Classification(String),
    #[error("no matching data: {0}")]
    NoMatchingData(String),
    #[error("reasoning capability unavailable: {0}")]
    CapabilityUnavailable(String),
    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

impl PipelineError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::EmptyQuery => Severity::Input,
            Self::Classification(_) | Self::NoMatchingData(_) | Self::CapabilityUnavailable(_) => {
                Severity::Recoverable
            }
            Self::Dataset(_) | Self::InternalConsistency(_) | Self::Transition(_) => {
                Severity::Fatal
            }
        }
    }

    /// Stable, user-facing reason. Never includes paths or provider details.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyQuery => "empty query",
            Self::Dataset(_) => "dataset unavailable",
            Self::Classification(_) => "classification failed",
            Self::NoMatchingData(_) => "no matching data",
            Self::CapabilityUnavailable(_) => "reasoning capability unavailable",
            Self::InternalConsistency(_) | Self::Transition(_) => "internal consistency violation",
        }
    }
}
