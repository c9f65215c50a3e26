pub mod loader;
pub mod sample;
pub mod summary;
pub mod table;
pub mod title;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{error, warn};

use crate::config::DatasetConfig;

pub use loader::{load_csv, read_titles, COLUMNS};
pub use sample::sample_table;
pub use summary::{describe, DatasetInfo, DetailLevel};
pub use table::{percentage, round2, DatasetSource, GroupBy, LoadReport, Metric, Table};
pub use title::{Title, TitleKind};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset file `{path}` was not found")]
    NotFound { path: PathBuf },
    #[error("could not open dataset `{path}`: {source}")]
    Open { path: PathBuf, source: std::io::Error },
    #[error("could not parse dataset `{path}` at line {line}: {source}")]
    Parse { path: PathBuf, line: usize, source: csv::Error },
    #[error("dataset `{path}` is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: String },
    #[error("dataset `{path}` contains no usable rows")]
    Empty { path: PathBuf },
    #[error("dataset unavailable: {0}")]
    Unavailable(String),
}

/// Process-wide handle to the catalog. Loaded once, then shared read-only.
#[derive(Clone, Debug)]
pub enum Catalog {
    Loaded(Arc<Table>),
    Unavailable(String),
}

impl Catalog {
    /// Never fails: a load failure without sample fallback yields `Unavailable`.
    pub fn load(config: &DatasetConfig) -> Self {
        match load_csv(&config.path) {
            Ok(table) => Self::Loaded(Arc::new(table)),
            Err(load_error) if config.sample_fallback => {
                warn!(
                    event_name = "dataset.sample_fallback",
                    path = %config.path.display(),
                    error = %load_error,
                    "using built-in sample catalog"
                );
                Self::Loaded(Arc::new(sample_table()))
            }
            Err(load_error) => {
                error!(
                    event_name = "dataset.unavailable",
                    path = %config.path.display(),
                    error = %load_error,
                    "catalog could not be loaded"
                );
                Self::Unavailable(load_error.to_string())
            }
        }
    }

    pub fn from_table(table: Table) -> Self {
        Self::Loaded(Arc::new(table))
    }

    pub fn table(&self) -> Result<&Arc<Table>, DatasetError> {
        match self {
            Self::Loaded(table) => Ok(table),
            Self::Unavailable(detail) => Err(DatasetError::Unavailable(detail.clone())),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}
