use crate::core::io::table;
use crate::core::training::{PhiList, TrainingSet};
use crate::engine::config::{ConfigError, CutoffPolicy, SolverConfig};
use crate::engine::error::EngineError;
use crate::engine::moments::{self, DecoyMoments};
use crate::engine::resolve;
use crate::engine::spectral;
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Summary of one completed gamma-fitting run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// Filename of the decoy feature matrix the resolver selected.
    pub decoy_artifact: String,
    pub num_decoys: usize,
    pub num_features: usize,
    /// Effective (clamped) eigenvalue cutoff used for truncation.
    pub cutoff: usize,
    /// Common prefix of the gamma artifact family written by this run.
    pub output_prefix: PathBuf,
    /// The fitted weight vector, as written to `<prefix>_gamma`.
    pub gamma: DVector<f64>,
}

/// Runs a complete gamma-fitting pass and writes all output artifacts.
///
/// Uses thread-local randomness for the dynamic cutoff policy; tests inject
/// a seeded generator through [`run_with_rng`].
pub fn run(config: &SolverConfig) -> Result<SolveReport, EngineError> {
    run_with_rng(config, &mut rand::thread_rng())
}

#[instrument(skip_all, name = "gamma_workflow")]
pub fn run_with_rng(config: &SolverConfig, rng: &mut impl Rng) -> Result<SolveReport, EngineError> {
    let phi_list = PhiList::load(&config.phi_list_path)?;
    let training_set = TrainingSet::load(&config.training_set_path)?;

    // Decoy resolution assumes the first protein represents the training set
    // while the native summary averages over all of them. That mismatch is
    // inherited from the original pipeline; multi-protein sets are rejected
    // unless the caller opts in explicitly.
    if training_set.len() > 1 {
        if !config.allow_multi_protein {
            return Err(ConfigError::MultiProteinTrainingSet {
                count: training_set.len(),
            }
            .into());
        }
        warn!(
            proteins = training_set.len(),
            representative = training_set.representative(),
            "multi-protein training set: decoys are resolved for the representative only"
        );
    }

    for dir in [&config.phis_dir, &config.gammas_dir] {
        fs::create_dir_all(dir).map_err(|source| EngineError::Directory {
            path: dir.clone(),
            source,
        })?;
    }

    let param = phi_list.primary();
    info!(
        param = %param.full_name(),
        proteins = training_set.len(),
        "starting gamma fit"
    );

    let decoy_artifact =
        resolve::resolve(&config.phis_dir, training_set.representative(), param)?;

    let native_mean = load_native_mean(config, &phi_list, &training_set)?;
    let num_features = native_mean.len();
    if num_features != phi_list.total_features() {
        warn!(
            found = num_features,
            canonical = phi_list.total_features(),
            "native phi length differs from the registry's canonical feature count"
        );
    }

    let decoy_path = config.phis_dir.join(&decoy_artifact);
    let decoys = table::read_matrix(&decoy_path)?;
    if decoys.ncols() != num_features {
        return Err(EngineError::FeatureCountMismatch {
            path: decoy_path,
            expected: num_features,
            found: decoys.ncols(),
        });
    }
    info!(
        decoys = decoys.nrows(),
        features = num_features,
        artifact = %decoy_artifact,
        "decoy feature matrix loaded"
    );

    let moments = moments::aggregate(&decoys, config.batch_size);

    let base_name = base_name(config);
    table::write_vector(
        &config.phis_dir.join(format!("{base_name}_native_summary.txt")),
        &native_mean,
    )?;
    table::write_vector(
        &config.phis_dir.join(format!("{base_name}_decoy_summary.txt")),
        &moments.mean,
    )?;

    let b = &moments.half - &moments.other;
    let b = (&b + b.transpose()) * 0.5;
    let a = &moments.mean - &native_mean;

    let spectrum = spectral::sorted_eigen(&b);
    let cutoff = effective_cutoff(config, &spectrum.eigenvalues, &moments, rng);
    let regularized = spectral::regularized_inverse(&spectrum, cutoff);
    let gamma = &regularized.inverse * &a;

    if !gamma.iter().all(|v| v.is_finite()) {
        return Err(EngineError::NonFiniteResult("the fitted gamma vector"));
    }

    let output_prefix = config
        .gammas_dir
        .join(format!("{base_name}_{}", param.full_name()));
    write_artifacts(&output_prefix, &gamma, &a, &b, &spectrum, &regularized)?;

    info!(cutoff, prefix = %output_prefix.display(), "gamma fit complete");
    Ok(SolveReport {
        decoy_artifact,
        num_decoys: moments.num_decoys,
        num_features,
        cutoff,
        output_prefix,
        gamma,
    })
}

fn base_name(config: &SolverConfig) -> String {
    config
        .training_set_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("training_set")
        .to_string()
}

/// Averages the per-protein native phi vectors, concatenating the phi-list
/// entries of each protein in order. All proteins must agree on the length.
fn load_native_mean(
    config: &SolverConfig,
    phi_list: &PhiList,
    training_set: &TrainingSet,
) -> Result<DVector<f64>, EngineError> {
    let mut sum: Option<DVector<f64>> = None;
    for protein in training_set.proteins() {
        let mut values: Vec<f64> = Vec::new();
        for param in phi_list.entries() {
            let path = config.phis_dir.join(param.native_artifact_name(protein));
            let vector = table::read_vector(&path)?;
            values.extend(vector.iter());
        }
        let native = DVector::from_vec(values);
        sum = match sum {
            None => Some(native),
            Some(acc) => {
                if acc.len() != native.len() {
                    return Err(EngineError::FeatureCountMismatch {
                        path: config.phis_dir.clone(),
                        expected: acc.len(),
                        found: native.len(),
                    });
                }
                Some(acc + native)
            }
        };
    }
    // TrainingSet::load guarantees at least one protein.
    let sum = sum.expect("training set is non-empty");
    Ok(sum / training_set.len() as f64)
}

fn effective_cutoff(
    config: &SolverConfig,
    eigenvalues: &DVector<f64>,
    moments: &DecoyMoments,
    rng: &mut impl Rng,
) -> usize {
    let n = eigenvalues.len();
    let requested = match config.cutoff {
        CutoffPolicy::Manual(k) => k,
        CutoffPolicy::Dynamic {
            trials,
            relative_error_threshold,
        } => spectral::estimate_dynamic_cutoff(
            eigenvalues,
            moments,
            trials,
            relative_error_threshold,
            rng,
        ),
    };
    spectral::clamp_cutoff(requested, n)
}

fn write_artifacts(
    prefix: &Path,
    gamma: &DVector<f64>,
    a: &DVector<f64>,
    b: &DMatrix<f64>,
    spectrum: &spectral::Spectrum,
    regularized: &spectral::Regularized,
) -> Result<(), EngineError> {
    let with_suffix = |suffix: &str| {
        let mut name = prefix.file_name().unwrap_or_default().to_os_string();
        name.push(suffix);
        prefix.with_file_name(name)
    };

    table::write_vector(&with_suffix("_gamma"), gamma)?;
    table::write_vector(&with_suffix("_A"), a)?;
    table::write_matrix(&with_suffix("_B"), b)?;
    table::write_vector(&with_suffix("_lamb"), &spectrum.eigenvalues)?;
    table::write_vector(&with_suffix("_lamb_filtered"), &regularized.filtered_eigenvalues)?;
    // Written twice under both names for compatibility with downstream
    // consumers that read the `_filtered` spelling.
    table::write_vector(&with_suffix("_gamma_filtered"), gamma)?;
    Ok(())
}
