use super::moments::DecoyMoments;
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::{debug, warn};

/// Guard against division by zero in relative-deviation comparisons.
const RELATIVE_EPSILON: f64 = 1e-12;
/// The dynamic cutoff never retains fewer than this many modes.
const MIN_DYNAMIC_CUTOFF: usize = 3;

/// Eigenvalues and eigenvectors of the symmetrized covariance-like matrix,
/// sorted by eigenvalue descending.
///
/// The ordering is load-bearing: truncation always flattens the tail of the
/// sorted spectrum (indices >= cutoff), so "largest first" must hold exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    pub eigenvalues: DVector<f64>,
    pub eigenvectors: DMatrix<f64>,
}

/// The truncated pseudo-inverse and the plateaued eigenvalue vector it was
/// built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Regularized {
    pub inverse: DMatrix<f64>,
    pub filtered_eigenvalues: DVector<f64>,
}

/// Whether `matrix` equals its transpose within `tolerance`.
pub fn is_symmetric(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    matrix.nrows() == matrix.ncols()
        && (matrix - matrix.transpose()).abs().max() <= tolerance
}

/// Eigendecomposes symmetric `b` and sorts the spectrum largest-first,
/// permuting eigenvector columns consistently.
pub fn sorted_eigen(b: &DMatrix<f64>) -> Spectrum {
    debug_assert!(is_symmetric(b, 1e-9), "spectral input must be symmetrized");

    let eigen = SymmetricEigen::new(b.clone());
    let n = eigen.eigenvalues.len();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eigen.eigenvalues[j].total_cmp(&eigen.eigenvalues[i]));

    let eigenvalues = DVector::from_fn(n, |i, _| eigen.eigenvalues[order[i]]);
    let eigenvectors =
        DMatrix::from_fn(n, n, |row, col| eigen.eigenvectors[(row, order[col])]);

    Spectrum {
        eigenvalues,
        eigenvectors,
    }
}

/// Clamps a requested cutoff to the valid range `[1, num_features - 1]`.
pub fn clamp_cutoff(cutoff: usize, num_features: usize) -> usize {
    cutoff.max(1).min(num_features.saturating_sub(1).max(1))
}

/// Estimates the eigenvalue cutoff by noise injection.
///
/// Each trial draws a Gaussian perturbation of the second-moment diagonal
/// (scaled by `std / num_decoys`, or by raw `std` when there are no decoys),
/// subtracts the mean-outer-product diagonal, splices it over the tail of the
/// sorted eigenvalue vector, and records the first index whose relative
/// deviation exceeds `relative_error_threshold`. The minimum index over all
/// trials is returned, floored at 3: if any trial destabilizes a mode, that
/// mode and everything below it is flattened.
pub fn estimate_dynamic_cutoff(
    eigenvalues: &DVector<f64>,
    moments: &DecoyMoments,
    trials: usize,
    relative_error_threshold: f64,
    rng: &mut impl Rng,
) -> usize {
    let n = eigenvalues.len();
    let diag_len = moments.half.nrows();
    let tail_len = diag_len.min(n);

    let mut cutoffs = Vec::with_capacity(trials);
    for _ in 0..trials {
        let mut noisy = eigenvalues.clone();
        for t in 0..tail_len {
            let k = diag_len - tail_len + t;
            let location = moments.half[(k, k)];
            let scale = if moments.num_decoys > 0 {
                moments.std[(k, k)] / moments.num_decoys as f64
            } else {
                moments.std[(k, k)]
            };
            let draw = match Normal::new(location, scale) {
                Ok(normal) => normal.sample(rng),
                // Zero or degenerate spread collapses to the location itself.
                Err(_) => location,
            };
            noisy[n - tail_len + t] = draw - moments.other[(k, k)];
        }

        let mut trial_cutoff = n - 1;
        for i in 0..n {
            let deviation =
                (eigenvalues[i] - noisy[i]).abs() / (eigenvalues[i].abs() + RELATIVE_EPSILON);
            if deviation > relative_error_threshold {
                trial_cutoff = i;
                break;
            }
        }
        cutoffs.push(trial_cutoff);
    }

    let cutoff = cutoffs
        .into_iter()
        .min()
        .unwrap_or(n.saturating_sub(1))
        .max(MIN_DYNAMIC_CUTOFF);
    debug!(cutoff, trials, relative_error_threshold, "dynamic cutoff estimated");
    cutoff
}

/// Builds the regularized inverse `P diag(1/lamb_f) P^T`.
///
/// Eigenvalues at indices >= `cutoff` are replaced with the value at
/// `cutoff - 1` rather than zeroed: near-zero or negative tail modes would
/// otherwise blow up under inversion, while discarding them entirely would
/// lose their (bounded) contribution. Non-finite reciprocals from an exactly
/// zero plateau are clamped to zero.
pub fn regularized_inverse(spectrum: &Spectrum, cutoff: usize) -> Regularized {
    let n = spectrum.eigenvalues.len();
    let cutoff = clamp_cutoff(cutoff, n);

    let mut filtered = spectrum.eigenvalues.clone();
    let plateau = filtered[cutoff - 1];
    for i in cutoff..n {
        filtered[i] = plateau;
    }

    let mut clamped = 0usize;
    let inverse_diagonal = DVector::from_fn(n, |i, _| {
        let reciprocal = 1.0 / filtered[i];
        if reciprocal.is_finite() {
            reciprocal
        } else {
            clamped += 1;
            0.0
        }
    });
    if clamped > 0 {
        warn!(clamped, "zero eigenvalues encountered; their inverse modes were dropped");
    }

    // Eigenvectors of a symmetric matrix are orthonormal, so the inverse of
    // P is its transpose.
    let p = &spectrum.eigenvectors;
    let inverse = p * DMatrix::from_diagonal(&inverse_diagonal) * p.transpose();

    Regularized {
        inverse,
        filtered_eigenvalues: filtered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::moments::aggregate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TOL: f64 = 1e-12;

    fn diag(values: &[f64]) -> DMatrix<f64> {
        DMatrix::from_diagonal(&DVector::from_row_slice(values))
    }

    #[test]
    fn eigenvalues_are_sorted_descending() {
        let b = diag(&[1.0, 5.0, 3.0, -2.0]);
        let spectrum = sorted_eigen(&b);
        for i in 1..spectrum.eigenvalues.len() {
            assert!(spectrum.eigenvalues[i - 1] >= spectrum.eigenvalues[i]);
        }
        assert!((spectrum.eigenvalues[0] - 5.0).abs() < TOL);
        assert!((spectrum.eigenvalues[3] + 2.0).abs() < TOL);
    }

    #[test]
    fn eigenvector_columns_follow_the_sort() {
        let b = diag(&[1.0, 5.0, 3.0]);
        let spectrum = sorted_eigen(&b);
        // Largest eigenvalue 5 belongs to basis vector e1.
        let top = spectrum.eigenvectors.column(0);
        assert!((top[1].abs() - 1.0).abs() < 1e-9);
        assert!(top[0].abs() < 1e-9 && top[2].abs() < 1e-9);
    }

    #[test]
    fn reconstruction_matches_original_matrix() {
        let b = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
        let spectrum = sorted_eigen(&b);
        let reconstructed = &spectrum.eigenvectors
            * DMatrix::from_diagonal(&spectrum.eigenvalues)
            * spectrum.eigenvectors.transpose();
        assert!((&b - reconstructed).abs().max() < 1e-9);
    }

    #[test]
    fn symmetry_check_distinguishes_inputs() {
        let symmetric = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 1.0]);
        let skewed = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 2.1, 1.0]);
        assert!(is_symmetric(&symmetric, TOL));
        assert!(!is_symmetric(&skewed, TOL));
    }

    #[test]
    fn cutoff_clamps_into_valid_range() {
        assert_eq!(clamp_cutoff(0, 10), 1);
        assert_eq!(clamp_cutoff(5, 10), 5);
        assert_eq!(clamp_cutoff(25, 10), 9);
        assert_eq!(clamp_cutoff(0, 1), 1);
    }

    #[test]
    fn truncated_tail_plateaus_at_the_cutoff_value() {
        let spectrum = sorted_eigen(&diag(&[8.0, 4.0, 2.0, 1.0, 0.5]));
        let regularized = regularized_inverse(&spectrum, 2);
        let filtered = &regularized.filtered_eigenvalues;
        assert!((filtered[0] - 8.0).abs() < TOL);
        assert!((filtered[1] - 4.0).abs() < TOL);
        for i in 2..5 {
            assert_eq!(filtered[i], filtered[1]);
        }
    }

    #[test]
    fn zero_eigenvalue_does_not_produce_non_finite_inverse() {
        let spectrum = sorted_eigen(&diag(&[0.0, 0.0, 0.0]));
        let regularized = regularized_inverse(&spectrum, 1);
        assert!(regularized.inverse.iter().all(|v| v.is_finite()));
        assert!(regularized.inverse.abs().max() < TOL);
    }

    #[test]
    fn inverse_of_well_conditioned_matrix_is_exact_below_cutoff() {
        let b = diag(&[4.0, 2.0]);
        let spectrum = sorted_eigen(&b);
        let regularized = regularized_inverse(&spectrum, 1);
        // Mode 0 inverts exactly; mode 1 is flattened onto eigenvalue 4.
        let product = &b * &regularized.inverse;
        assert!((product[(0, 0)] - 1.0).abs() < 1e-9);
        assert!((product[(1, 1)] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn dynamic_cutoff_is_floored_at_three() {
        let decoys = DMatrix::from_row_slice(4, 4, &[
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ]);
        let moments = aggregate(&decoys, 2000);
        let b = &moments.half - &moments.other;
        let spectrum = sorted_eigen(&((&b + b.transpose()) * 0.5));

        let mut rng = StdRng::seed_from_u64(7);
        let cutoff = estimate_dynamic_cutoff(&spectrum.eigenvalues, &moments, 8, 0.06, &mut rng);
        assert!(cutoff >= 3);
        assert!(cutoff <= spectrum.eigenvalues.len() - 1);
    }

    #[test]
    fn dynamic_cutoff_with_zero_noise_keeps_stable_modes() {
        // Identical decoys give zero spread; with no noise the relative
        // deviation between the spliced diagonal and itself decides alone.
        let decoys = DMatrix::from_element(6, 4, 1.5);
        let moments = aggregate(&decoys, 2000);
        let b = &moments.half - &moments.other;
        let spectrum = sorted_eigen(&((&b + b.transpose()) * 0.5));

        let mut rng = StdRng::seed_from_u64(42);
        let cutoff = estimate_dynamic_cutoff(&spectrum.eigenvalues, &moments, 4, 0.06, &mut rng);
        assert!(cutoff >= 3);
    }

    #[test]
    fn dynamic_cutoff_is_reproducible_under_a_fixed_seed() {
        let decoys = DMatrix::from_fn(50, 5, |i, j| ((i * 13 + j * 5) % 17) as f64 / 4.0);
        let moments = aggregate(&decoys, 10);
        let b = &moments.half - &moments.other;
        let spectrum = sorted_eigen(&((&b + b.transpose()) * 0.5));

        let run = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            estimate_dynamic_cutoff(&spectrum.eigenvalues, &moments, 8, 0.06, &mut rng)
        };
        assert_eq!(run(11), run(11));
    }
}
