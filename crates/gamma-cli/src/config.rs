use crate::cli::SolveArgs;
use crate::error::{CliError, Result};
use gammafit::engine::config::{
    CutoffPolicy, DEFAULT_MANUAL_CUTOFF, DEFAULT_NOISE_TRIALS, DEFAULT_RELATIVE_ERROR_THRESHOLD,
    SolverConfig, SolverConfigBuilder,
};
use gammafit::engine::error::EngineError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// On-disk run configuration. Every field is optional; CLI flags override
/// file values, and the library builder enforces what is still missing.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct PartialSolveConfig {
    #[serde(rename = "training-set")]
    pub training_set: Option<PathBuf>,
    #[serde(rename = "phi-list")]
    pub phi_list: Option<PathBuf>,
    #[serde(rename = "phis-dir")]
    pub phis_dir: Option<PathBuf>,
    #[serde(rename = "gammas-dir")]
    pub gammas_dir: Option<PathBuf>,
    #[serde(rename = "batch-size")]
    pub batch_size: Option<usize>,
    #[serde(rename = "allow-multi-protein")]
    pub allow_multi_protein: Option<bool>,
    pub cutoff: Option<FileCutoff>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileCutoff {
    pub mode: CutoffMode,
    /// Fixed cutoff index; manual mode only.
    pub value: Option<usize>,
    #[serde(rename = "noise-trials")]
    pub noise_trials: Option<usize>,
    #[serde(rename = "relative-error-threshold")]
    pub relative_error_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CutoffMode {
    Manual,
    Dynamic,
}

impl PartialSolveConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        debug!("Loaded run configuration from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn merge_with_cli(self, args: &SolveArgs) -> Result<SolverConfig> {
        let mut builder = SolverConfigBuilder::new();

        if let Some(path) = args.training_set.clone().or(self.training_set) {
            builder = builder.training_set_path(path);
        }
        if let Some(path) = args.phi_list.clone().or(self.phi_list) {
            builder = builder.phi_list_path(path);
        }
        if let Some(dir) = args.phis_dir.clone().or(self.phis_dir) {
            builder = builder.phis_dir(dir);
        }
        if let Some(dir) = args.gammas_dir.clone().or(self.gammas_dir) {
            builder = builder.gammas_dir(dir);
        }
        if let Some(size) = args.batch_size.or(self.batch_size) {
            builder = builder.batch_size(size);
        }
        if args.allow_multi_protein || self.allow_multi_protein.unwrap_or(false) {
            builder = builder.allow_multi_protein(true);
        }

        builder = builder.cutoff(resolve_cutoff(args, self.cutoff.as_ref())?);

        builder
            .build()
            .map_err(EngineError::from)
            .map_err(CliError::from)
    }
}

fn resolve_cutoff(args: &SolveArgs, file: Option<&FileCutoff>) -> Result<CutoffPolicy> {
    // CLI flags take precedence over the file's [cutoff] table.
    if let Some(k) = args.cutoff {
        return Ok(CutoffPolicy::Manual(k));
    }
    if args.dynamic_cutoff {
        return Ok(CutoffPolicy::Dynamic {
            trials: args.noise_trials.unwrap_or(DEFAULT_NOISE_TRIALS),
            relative_error_threshold: args
                .relative_error_threshold
                .unwrap_or(DEFAULT_RELATIVE_ERROR_THRESHOLD),
        });
    }

    match file {
        Some(cutoff) => match cutoff.mode {
            CutoffMode::Manual => Ok(CutoffPolicy::Manual(
                cutoff.value.unwrap_or(DEFAULT_MANUAL_CUTOFF),
            )),
            CutoffMode::Dynamic => {
                if cutoff.value.is_some() {
                    return Err(CliError::Argument(
                        "cutoff.value is only meaningful with mode = \"manual\"".to_string(),
                    ));
                }
                Ok(CutoffPolicy::Dynamic {
                    trials: cutoff.noise_trials.unwrap_or(DEFAULT_NOISE_TRIALS),
                    relative_error_threshold: cutoff
                        .relative_error_threshold
                        .unwrap_or(DEFAULT_RELATIVE_ERROR_THRESHOLD),
                })
            }
        },
        None => Ok(CutoffPolicy::default()),
    }
}
