use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error(
        "Training set contains {count} proteins, but decoy resolution assumes a single \
         representative protein; pass allow_multi_protein to average natives over all of them"
    )]
    MultiProteinTrainingSet { count: usize },

    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter {
        name: &'static str,
        message: String,
    },
}

/// Default manual eigenvalue cutoff.
pub const DEFAULT_MANUAL_CUTOFF: usize = 25;
/// Default number of rows accumulated per batch by the moment aggregator.
pub const DEFAULT_BATCH_SIZE: usize = 2000;
/// Default number of noise-injection trials for the dynamic cutoff.
pub const DEFAULT_NOISE_TRIALS: usize = 8;
/// Default relative-deviation threshold for the dynamic cutoff.
pub const DEFAULT_RELATIVE_ERROR_THRESHOLD: f64 = 0.06;

/// How the eigenvalue truncation point is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CutoffPolicy {
    /// A fixed index, clamped to `[1, num_features - 1]` before use.
    Manual(usize),
    /// Noise-aware estimation: the smallest index destabilized by repeated
    /// Gaussian perturbation of the second-moment diagonal, floored at 3.
    Dynamic {
        trials: usize,
        relative_error_threshold: f64,
    },
}

impl Default for CutoffPolicy {
    fn default() -> Self {
        CutoffPolicy::Manual(DEFAULT_MANUAL_CUTOFF)
    }
}

impl CutoffPolicy {
    pub fn dynamic() -> Self {
        CutoffPolicy::Dynamic {
            trials: DEFAULT_NOISE_TRIALS,
            relative_error_threshold: DEFAULT_RELATIVE_ERROR_THRESHOLD,
        }
    }
}

/// Everything one solver invocation needs, assembled up front. The original
/// tool kept these as module-level constants; they are explicit here so runs
/// with different parameterizations are plain values, not edits.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Training-set listing: whitespace-delimited protein identifiers.
    pub training_set_path: PathBuf,
    /// Phi list: one functional + parameter tuple per line.
    pub phi_list_path: PathBuf,
    /// Directory holding native phi vectors and decoy feature matrices.
    pub phis_dir: PathBuf,
    /// Directory receiving the fitted gamma family of artifacts.
    pub gammas_dir: PathBuf,
    pub cutoff: CutoffPolicy,
    pub batch_size: usize,
    /// Permit >1 training-set proteins despite the single-representative
    /// decoy-resolution assumption.
    pub allow_multi_protein: bool,
}

#[derive(Default)]
pub struct SolverConfigBuilder {
    training_set_path: Option<PathBuf>,
    phi_list_path: Option<PathBuf>,
    phis_dir: Option<PathBuf>,
    gammas_dir: Option<PathBuf>,
    cutoff: Option<CutoffPolicy>,
    batch_size: Option<usize>,
    allow_multi_protein: Option<bool>,
}

impl SolverConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn training_set_path(mut self, path: PathBuf) -> Self {
        self.training_set_path = Some(path);
        self
    }
    pub fn phi_list_path(mut self, path: PathBuf) -> Self {
        self.phi_list_path = Some(path);
        self
    }
    pub fn phis_dir(mut self, path: PathBuf) -> Self {
        self.phis_dir = Some(path);
        self
    }
    pub fn gammas_dir(mut self, path: PathBuf) -> Self {
        self.gammas_dir = Some(path);
        self
    }
    pub fn cutoff(mut self, policy: CutoffPolicy) -> Self {
        self.cutoff = Some(policy);
        self
    }
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }
    pub fn allow_multi_protein(mut self, allow: bool) -> Self {
        self.allow_multi_protein = Some(allow);
        self
    }

    pub fn build(self) -> Result<SolverConfig, ConfigError> {
        let batch_size = self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "batch_size",
                message: "must be at least 1".to_string(),
            });
        }

        if let Some(CutoffPolicy::Dynamic {
            trials,
            relative_error_threshold,
        }) = self.cutoff
        {
            if trials == 0 {
                return Err(ConfigError::InvalidParameter {
                    name: "noise_trials",
                    message: "must be at least 1".to_string(),
                });
            }
            if !(relative_error_threshold > 0.0) {
                return Err(ConfigError::InvalidParameter {
                    name: "relative_error_threshold",
                    message: format!("must be positive, got {relative_error_threshold}"),
                });
            }
        }

        Ok(SolverConfig {
            training_set_path: self
                .training_set_path
                .ok_or(ConfigError::MissingParameter("training_set_path"))?,
            phi_list_path: self
                .phi_list_path
                .ok_or(ConfigError::MissingParameter("phi_list_path"))?,
            phis_dir: self
                .phis_dir
                .ok_or(ConfigError::MissingParameter("phis_dir"))?,
            gammas_dir: self
                .gammas_dir
                .ok_or(ConfigError::MissingParameter("gammas_dir"))?,
            cutoff: self.cutoff.unwrap_or_default(),
            batch_size,
            allow_multi_protein: self.allow_multi_protein.unwrap_or(false),
        })
    }
}
