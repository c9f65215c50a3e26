pub mod audit;
pub mod config;
pub mod dataset;
pub mod domain;
pub mod errors;
pub mod pipeline;

pub use config::{AppConfig, ConfigError, GuardrailThresholds, LoadOptions};
pub use dataset::{Catalog, DatasetError, DetailLevel, Table};
pub use domain::{
    Audience, Category, Decision, DraftAnswer, Evidence, EvidenceValue, GuardrailKind,
    GuardrailVerdict, Outcome, Query, QueryContext, RequestId, Response,
};
pub use errors::{PipelineError, Severity};
pub use pipeline::{QueryEvent, QueryLifecycle, QueryState};
