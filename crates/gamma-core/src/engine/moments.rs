use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// First and second moments of a decoy feature ensemble.
///
/// With feature vectors `x` over `n` decoys:
/// - `half[i][j]  = mean(x_i * x_j)` - the outer-product mean,
/// - `std[i][j]   = population standard deviation of the `x_i * x_j` samples,
/// - `other[i][j] = mean(x_i) * mean(x_j)` - the outer product of the mean,
/// - `mean        = mean(x)`.
///
/// The covariance-like matrix fed to the regularizer is `half - other`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoyMoments {
    pub half: DMatrix<f64>,
    pub std: DMatrix<f64>,
    pub other: DMatrix<f64>,
    pub mean: DVector<f64>,
    pub num_decoys: usize,
}

/// Accumulates the moments of `decoys` (rows = decoys, columns = features)
/// in batches of `batch_size` rows.
///
/// Batching bounds the live working set to the O(num_features^2) accumulators
/// plus one batch of rows; the accumulated sums are identical regardless of
/// batch size, up to ordinary double-precision summation order. Decoy counts
/// reach tens of thousands while feature counts stay in the low hundreds, so
/// the num_decoys x num_features^2 product loop dominates the cost.
pub fn aggregate(decoys: &DMatrix<f64>, batch_size: usize) -> DecoyMoments {
    let num_decoys = decoys.nrows();
    let num_features = decoys.ncols();
    debug!(num_decoys, num_features, batch_size, "accumulating decoy moments");

    let mut sum_products = DMatrix::<f64>::zeros(num_features, num_features);
    let mut sum_squared_products = DMatrix::<f64>::zeros(num_features, num_features);
    let mut sum_rows = DVector::<f64>::zeros(num_features);

    let batch = batch_size.max(1);
    let mut start = 0;
    while start < num_decoys {
        let end = (start + batch).min(num_decoys);
        for row_index in start..end {
            let row = decoys.row(row_index);
            for i in 0..num_features {
                let xi = row[i];
                sum_rows[i] += xi;
                for j in 0..num_features {
                    let product = xi * row[j];
                    sum_products[(i, j)] += product;
                    sum_squared_products[(i, j)] += product * product;
                }
            }
        }
        start = end;
    }

    let inv_n = 1.0 / num_decoys as f64;
    let half = &sum_products * inv_n;
    let mean = &sum_rows * inv_n;
    let other = &mean * mean.transpose();

    // Population variance via E[p^2] - E[p]^2; tiny negative residuals from
    // cancellation are clamped before the square root.
    let std = DMatrix::from_fn(num_features, num_features, |i, j| {
        let variance = sum_squared_products[(i, j)] * inv_n - half[(i, j)] * half[(i, j)];
        variance.max(0.0).sqrt()
    });

    DecoyMoments {
        half,
        std,
        other,
        mean,
        num_decoys,
    }
}
