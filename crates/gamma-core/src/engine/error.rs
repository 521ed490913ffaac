use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::table::TableError;
use crate::core::training::TrainingError;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Training(#[from] TrainingError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(
        "No confident decoy artifact for protein '{protein}' with parameters '{param_string}'\n{details}"
    )]
    Resolution {
        protein: String,
        param_string: String,
        details: String,
    },

    #[error(
        "Feature table '{path}' has {found} feature column(s) but the phi list declares {expected}",
        path = path.display()
    )]
    FeatureCountMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Non-finite values in {0}; refusing to write artifacts")]
    NonFiniteResult(&'static str),

    #[error("Failed to access directory '{path}': {source}", path = path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
