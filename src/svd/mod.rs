//! # Singular value decomposition
//!
//! The decomposition itself is an external collaborator behind the
//! [`SvdSolver`] trait: it receives a compressed-column matrix and a rank `k` and
//! returns `k` singular triplets. [`LanczosSolver`] is the default
//! implementation, delegating to the Lanczos (LAS2) routine of `single-svdlib`.

use log::{debug, info};
use nalgebra_sparse::CscMatrix;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use single_svdlib::lanczos::svd_las2;

use crate::error::{AlgebraError, AlgebraResult};

/// Smallest decomposition `svd_las2` accepts.
const MIN_LANCZOS_DIMENSIONS: usize = 2;

/// Singular values at or below this fraction of the largest count as zero.
const RANK_TOLERANCE: f64 = 1.0e-10;

/// Left singular vectors, right singular vectors and singular values, each
/// vector stored as one row so they can be written out row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct SingularTriplets {
    left: Array2<f64>,
    right: Array2<f64>,
    values: Array1<f64>,
}

impl SingularTriplets {
    /// # Errors
    /// - `IncompatibleLengths` when the number of left vectors, right vectors and
    ///   values disagree.
    pub fn new(left: Array2<f64>, right: Array2<f64>, values: Array1<f64>) -> AlgebraResult<Self> {
        if left.nrows() != values.len() {
            return Err(AlgebraError::IncompatibleLengths {
                left: left.nrows(),
                right: values.len(),
            });
        }
        if right.nrows() != values.len() {
            return Err(AlgebraError::IncompatibleLengths {
                left: right.nrows(),
                right: values.len(),
            });
        }
        Ok(Self {
            left,
            right,
            values,
        })
    }

    /// Number of triplets.
    pub fn rank(&self) -> usize {
        self.values.len()
    }

    /// `k × nrows`, one left singular vector per row.
    pub fn left(&self) -> ArrayView2<'_, f64> {
        self.left.view()
    }

    /// `k × ncols`, one right singular vector per row.
    pub fn right(&self) -> ArrayView2<'_, f64> {
        self.right.view()
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }
}

pub trait SvdSolver {
    /// Computes `rank` singular triplets of `matrix`.
    ///
    /// # Errors
    /// - `InsufficientRank` when `rank` exceeds what the matrix can provide.
    /// - `Solver` for failures inside the decomposition routine.
    fn decompose(&self, matrix: &CscMatrix<f64>, rank: usize) -> AlgebraResult<SingularTriplets>;
}

/// Rejects a zero rank and ranks above `min(nrows, ncols)` before a solver runs.
pub fn check_rank(nrows: usize, ncols: usize, rank: usize) -> AlgebraResult<()> {
    if rank == 0 {
        return Err(AlgebraError::Configuration(
            "rank must be at least 1".to_string(),
        ));
    }
    let available = nrows.min(ncols);
    if rank > available {
        return Err(AlgebraError::InsufficientRank {
            requested: rank,
            available,
        });
    }
    Ok(())
}

/// Lanczos solver settings.
#[derive(Debug, Clone, PartialEq)]
pub struct LanczosSolver {
    iterations: Option<usize>,
    end_interval: [f64; 2],
    kappa: f64,
    random_seed: u32,
}

impl Default for LanczosSolver {
    fn default() -> Self {
        Self {
            iterations: None,
            end_interval: [-1.0e-30, 1.0e30],
            kappa: 1.0e-6,
            random_seed: 42,
        }
    }
}

impl LanczosSolver {
    /// Creates a solver with default settings.
    ///
    /// Default values:
    /// - `iterations`: `min(nrows, ncols)` of the decomposed matrix
    /// - `end_interval`: `[-1e-30, 1e30]`
    /// - `kappa`: 1e-6
    /// - `random_seed`: 42
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on Lanczos steps.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = Some(iterations);
        self
    }

    /// Interval of unwanted eigenvalues to skip.
    pub fn end_interval(mut self, end_interval: [f64; 2]) -> Self {
        self.end_interval = end_interval;
        self
    }

    /// Relative accuracy of the Ritz values.
    pub fn kappa(mut self, kappa: f64) -> Self {
        self.kappa = kappa;
        self
    }

    pub fn random_seed(mut self, seed: u32) -> Self {
        self.random_seed = seed;
        self
    }
}

impl SvdSolver for LanczosSolver {
    fn decompose(&self, matrix: &CscMatrix<f64>, rank: usize) -> AlgebraResult<SingularTriplets> {
        let (nrows, ncols) = (matrix.nrows(), matrix.ncols());
        check_rank(nrows, ncols, rank)?;
        let available = nrows.min(ncols);
        if available < MIN_LANCZOS_DIMENSIONS {
            return Err(AlgebraError::Solver(format!(
                "Lanczos needs at least a {0} x {0} matrix, got {1} x {2}",
                MIN_LANCZOS_DIMENSIONS, nrows, ncols
            )));
        }

        // las2 refuses fewer than two dimensions; a smaller rank is sliced afterwards
        let dimensions = rank.max(MIN_LANCZOS_DIMENSIONS);
        let iterations = self.iterations.unwrap_or(available).max(dimensions);
        info!("Starting SVD using algorithm LAS2");
        debug!(
            "  Input shape: {} x {} ({} non-zeros), rank {}, iterations {}, kappa {}, seed {}",
            nrows,
            ncols,
            matrix.nnz(),
            rank,
            iterations,
            self.kappa,
            self.random_seed
        );

        let res = svd_las2(
            matrix,
            dimensions,
            iterations,
            &self.end_interval,
            self.kappa,
            self.random_seed,
        )
        .map_err(|e| AlgebraError::Solver(e.to_string()))?;

        let found = effective_rank(res.s.view());
        debug!("  {} of {} singular values are significant", found, res.s.len());
        if found < rank {
            return Err(AlgebraError::InsufficientRank {
                requested: rank,
                available: found,
            });
        }

        let order = descending_order(res.s.view());
        let picked = &order[..rank];
        let left = res.ut.select(Axis(0), picked);
        let right = res.vt.select(Axis(0), picked);
        let values = res.s.select(Axis(0), picked);
        SingularTriplets::new(left, right, values)
    }
}

/// Number of singular values above the numerical noise floor of the largest one.
fn effective_rank(values: ArrayView1<f64>) -> usize {
    let largest = values.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()));
    if largest == 0.0 {
        return 0;
    }
    let floor = largest * RANK_TOLERANCE;
    values.iter().filter(|v| v.abs() > floor).count()
}

/// Positions of `values` sorted by decreasing magnitude.
fn descending_order(values: ArrayView1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].abs().total_cmp(&values[a].abs()));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use nalgebra_sparse::CooMatrix;
    use ndarray::array;

    fn diagonal(values: &[f64]) -> CscMatrix<f64> {
        let n = values.len();
        let mut coo = CooMatrix::new(n, n);
        for (i, &v) in values.iter().enumerate() {
            coo.push(i, i, v);
        }
        CscMatrix::from(&coo)
    }

    #[test]
    fn test_check_rank() {
        assert!(check_rank(3, 5, 3).is_ok());
        assert!(matches!(
            check_rank(3, 5, 4),
            Err(AlgebraError::InsufficientRank {
                requested: 4,
                available: 3
            })
        ));
        assert!(matches!(
            check_rank(3, 5, 0),
            Err(AlgebraError::Configuration(_))
        ));
    }

    #[test]
    fn test_lanczos_rejects_excess_rank_before_solving() {
        let solver = LanczosSolver::new();
        let result = solver.decompose(&diagonal(&[2.0, 1.0]), 1000);
        assert!(matches!(
            result,
            Err(AlgebraError::InsufficientRank {
                requested: 1000,
                available: 2
            })
        ));
    }

    #[test]
    fn test_lanczos_leading_singular_value() {
        let solver = LanczosSolver::new().random_seed(7);
        let triplets = solver.decompose(&diagonal(&[3.0, 2.0, 1.0]), 1).unwrap();
        assert_eq!(triplets.rank(), 1);
        assert_eq!(triplets.left().dim(), (1, 3));
        assert_eq!(triplets.right().dim(), (1, 3));
        assert_abs_diff_eq!(triplets.values()[0], 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(triplets.left()[[0, 0]].abs(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_lanczos_two_leading_triplets() {
        let triplets = LanczosSolver::new()
            .decompose(&diagonal(&[1.0, 4.0, 9.0]), 2)
            .unwrap();
        assert_eq!(triplets.rank(), 2);
        assert_abs_diff_eq!(triplets.values()[0], 9.0, epsilon = 1e-6);
        assert_abs_diff_eq!(triplets.values()[1], 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(triplets.left()[[0, 2]].abs(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(triplets.right()[[1, 1]].abs(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_lanczos_rejects_single_cell_matrix() {
        let result = LanczosSolver::new().decompose(&diagonal(&[5.0]), 1);
        match result {
            Err(AlgebraError::Solver(message)) => assert!(message.contains("1 x 1")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_effective_rank_and_order() {
        assert_eq!(effective_rank(array![4.0, 1.0e-14, 2.0].view()), 2);
        assert_eq!(effective_rank(array![0.0, 0.0].view()), 0);
        assert_eq!(descending_order(array![1.0, 3.0, 2.0].view()), vec![1, 2, 0]);
    }

    #[test]
    fn test_triplets_shape_check() {
        let left = array![[1.0, 0.0]];
        let right = array![[0.0, 1.0]];
        assert!(SingularTriplets::new(left.clone(), right.clone(), array![2.0]).is_ok());
        assert!(matches!(
            SingularTriplets::new(left, right, array![2.0, 1.0]),
            Err(AlgebraError::IncompatibleLengths { .. })
        ));
    }
}
