use std::fs;
use std::path::Path;

use approx::assert_abs_diff_eq;
use nalgebra_sparse::CscMatrix;
use ndarray::{Array1, Array2};
use spectral_map::io::{read_dense_matrix, read_file, read_values};
use spectral_map::pipeline::{Pipeline, PipelineConfigBuilder, PipelinePaths};
use spectral_map::sparse::IndexBase;
use spectral_map::svd::{check_rank, SingularTriplets, SvdSolver};
use spectral_map::{AlgebraError, AlgebraResult};

/// Returns the first `rank` columns of the matrix as "singular vectors" and
/// their column sums as "singular values", so outputs are predictable.
struct ColumnSolver;

impl SvdSolver for ColumnSolver {
    fn decompose(&self, matrix: &CscMatrix<f64>, rank: usize) -> AlgebraResult<SingularTriplets> {
        check_rank(matrix.nrows(), matrix.ncols(), rank)?;
        let mut left = Array2::zeros((rank, matrix.nrows()));
        let mut right = Array2::zeros((rank, matrix.ncols()));
        let mut values = Array1::zeros(rank);
        for c in 0..rank {
            let col = matrix.col(c);
            for (&r, &v) in col.row_indices().iter().zip(col.values()) {
                left[[c, r]] = v;
                values[c] += v;
            }
            right[[c, c]] = 1.0;
        }
        SingularTriplets::new(left, right, values)
    }
}

fn paths_in(dir: &Path) -> PipelinePaths {
    PipelinePaths::from_args(
        ["td.txt", "co.txt", "u.txt", "v.txt", "s.txt"]
            .iter()
            .map(|name| dir.join(name)),
    )
    .unwrap()
}

#[test]
fn test_pipeline_writes_all_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());
    // two documents, three terms, one-based with labels
    fs::write(&paths.term_document, "d1 1:2.0 3:1.0\nd2 2:1.0 3:3.0\n").unwrap();

    let config = PipelineConfigBuilder::new().rank(2).build().unwrap();
    let report = Pipeline::with_solver(config, ColumnSolver).run(&paths).unwrap();

    assert_eq!(report.index_base, IndexBase::One);
    assert_eq!(report.documents, 2);
    assert_eq!(report.terms, 3);
    assert_eq!(report.co_occurrence_nnz, 7);
    assert_eq!(report.rank, 2);

    let co = fs::read_to_string(&paths.co_occurrence).unwrap();
    assert_eq!(co, "4.0 0.0 2.0\n0.0 1.0 3.0\n2.0 3.0 10.0\n");

    let left = read_file(&paths.left_singular_vectors, read_dense_matrix).unwrap();
    assert_eq!(left.dim(), (2, 3));
    assert_eq!(left.row(0).to_vec(), vec![4.0, 0.0, 2.0]);

    let right = read_file(&paths.right_singular_vectors, read_dense_matrix).unwrap();
    assert_eq!(right.dim(), (2, 3));

    let values = read_file(&paths.singular_values, read_values).unwrap();
    assert_eq!(values.to_vec(), vec![6.0, 4.0]);
    assert_eq!(fs::read_to_string(&paths.singular_values).unwrap(), "6.0\n4.0\n");
}

#[test]
fn test_pipeline_zero_based_input_with_delimiter() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());
    fs::write(&paths.term_document, "0:1.0 1:1.0\n\n1:2.0\n").unwrap();

    let config = PipelineConfigBuilder::new().rank(1).delimiter(",").build().unwrap();
    let report = Pipeline::with_solver(config, ColumnSolver).run(&paths).unwrap();

    assert_eq!(report.index_base, IndexBase::Zero);
    assert_eq!(report.documents, 2);
    let co = fs::read_to_string(&paths.co_occurrence).unwrap();
    assert_eq!(co, "1.0,1.0\n1.0,5.0\n");
}

#[test]
fn test_pipeline_excess_rank_aborts_before_results() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());
    fs::write(&paths.term_document, "1:1.0 2:1.0\n").unwrap();

    let config = PipelineConfigBuilder::new().build().unwrap();
    let err = Pipeline::with_solver(config, ColumnSolver).run(&paths).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AlgebraError>(),
        Some(AlgebraError::InsufficientRank {
            requested: 1000,
            available: 2
        })
    ));
    assert!(err.to_string().contains("decomposition stage failed"));
    assert!(!paths.left_singular_vectors.exists());
    assert!(!paths.singular_values.exists());
}

#[test]
fn test_pipeline_malformed_input_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());
    fs::write(&paths.term_document, "1:1.0 2:oops\n").unwrap();

    let config = PipelineConfigBuilder::new().rank(1).build().unwrap();
    let err = Pipeline::with_solver(config, ColumnSolver).run(&paths).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AlgebraError>(),
        Some(AlgebraError::Parse { line: 1, .. })
    ));
    assert!(!paths.co_occurrence.exists());
}

#[test]
fn test_pipeline_missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());

    let config = PipelineConfigBuilder::new().rank(1).build().unwrap();
    let err = Pipeline::with_solver(config, ColumnSolver).run(&paths).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AlgebraError>(),
        Some(AlgebraError::Io(_))
    ));
}

#[test]
fn test_pipeline_with_lanczos_solver() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());
    // one term per document, so the co-occurrence matrix is diag(1, 4, 9)
    fs::write(&paths.term_document, "1:1.0\n2:2.0\n3:3.0\n").unwrap();

    let config = PipelineConfigBuilder::new().rank(2).build().unwrap();
    let report = Pipeline::new(config).run(&paths).unwrap();
    assert_eq!(report.terms, 3);
    assert_eq!(report.rank, 2);

    let values = read_file(&paths.singular_values, read_values).unwrap();
    assert_eq!(values.len(), 2);
    assert_abs_diff_eq!(values[0], 9.0, epsilon = 1e-6);
    assert_abs_diff_eq!(values[1], 4.0, epsilon = 1e-6);

    let left = read_file(&paths.left_singular_vectors, read_dense_matrix).unwrap();
    let right = read_file(&paths.right_singular_vectors, read_dense_matrix).unwrap();
    assert_eq!(left.dim(), (2, 3));
    assert_eq!(right.dim(), (2, 3));
    assert_abs_diff_eq!(left[[0, 2]].abs(), 1.0, epsilon = 1e-6);
    assert_abs_diff_eq!(left[[1, 1]].abs(), 1.0, epsilon = 1e-6);
}

#[test]
fn test_pipeline_with_lanczos_solver_rank_one() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());
    fs::write(&paths.term_document, "1:1.0\n2:2.0\n3:3.0\n").unwrap();

    let config = PipelineConfigBuilder::new().rank(1).build().unwrap();
    Pipeline::new(config).run(&paths).unwrap();

    let values = read_file(&paths.singular_values, read_values).unwrap();
    assert_eq!(values.len(), 1);
    assert_abs_diff_eq!(values[0], 9.0, epsilon = 1e-6);
    let left = read_file(&paths.left_singular_vectors, read_dense_matrix).unwrap();
    assert_eq!(left.dim(), (1, 3));
}

#[test]
fn test_pipeline_with_lanczos_solver_rank_deficient() {
    let dir = tempfile::tempdir().unwrap();
    let paths = paths_in(dir.path());
    // two documents over three terms: the 3 x 3 co-occurrence matrix has rank 2
    fs::write(&paths.term_document, "d1 1:2.0 3:1.0\nd2 2:1.0 3:3.0\n").unwrap();

    let config = PipelineConfigBuilder::new().rank(3).build().unwrap();
    let err = Pipeline::new(config).run(&paths).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AlgebraError>(),
        Some(AlgebraError::InsufficientRank { requested: 3, .. })
    ));
    assert!(paths.co_occurrence.exists());
    assert!(!paths.singular_values.exists());
}
