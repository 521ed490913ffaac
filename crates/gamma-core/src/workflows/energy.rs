use crate::core::io::table;
use crate::engine::error::EngineError;
use std::path::Path;
use tracing::info;

/// Energies of a phi ensemble under a fitted gamma vector.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyReport {
    /// `gamma . phi` for every row of the scored matrix.
    pub decoy_energies: Vec<f64>,
    pub decoy_mean: f64,
    /// Population standard deviation of the decoy energies.
    pub decoy_std: f64,
    pub native_energy: Option<f64>,
    /// `(E_native - mean(E_decoy)) / std(E_decoy)`; the quantity the fit
    /// maximizes in magnitude. `None` without a native vector or with zero
    /// decoy spread.
    pub z_score: Option<f64>,
}

/// Scores a decoy phi matrix (and optionally the native phi vector) against
/// a fitted gamma artifact. Read-only diagnostics over solver outputs.
pub fn score_artifacts(
    gamma_path: &Path,
    decoy_phi_path: &Path,
    native_phi_path: Option<&Path>,
) -> Result<EnergyReport, EngineError> {
    let gamma = table::read_vector(gamma_path)?;
    let decoys = table::read_matrix(decoy_phi_path)?;
    if decoys.ncols() != gamma.len() {
        return Err(EngineError::FeatureCountMismatch {
            path: decoy_phi_path.to_path_buf(),
            expected: gamma.len(),
            found: decoys.ncols(),
        });
    }

    let decoy_energies: Vec<f64> = (0..decoys.nrows())
        .map(|i| decoys.row(i).transpose().dot(&gamma))
        .collect();

    let n = decoy_energies.len() as f64;
    let decoy_mean = decoy_energies.iter().sum::<f64>() / n;
    let decoy_std = (decoy_energies
        .iter()
        .map(|e| (e - decoy_mean).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();

    let native_energy = match native_phi_path {
        Some(path) => {
            let native = table::read_vector(path)?;
            if native.len() != gamma.len() {
                return Err(EngineError::FeatureCountMismatch {
                    path: path.to_path_buf(),
                    expected: gamma.len(),
                    found: native.len(),
                });
            }
            Some(native.dot(&gamma))
        }
        None => None,
    };

    let z_score = match native_energy {
        Some(e_native) if decoy_std > 0.0 => Some((e_native - decoy_mean) / decoy_std),
        _ => None,
    };

    info!(
        decoys = decoy_energies.len(),
        decoy_mean,
        decoy_std,
        ?native_energy,
        ?z_score,
        "scored phi ensemble"
    );

    Ok(EnergyReport {
        decoy_energies,
        decoy_mean,
        decoy_std,
        native_energy,
        z_score,
    })
}
