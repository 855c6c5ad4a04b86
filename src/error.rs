use thiserror::Error;

/// Error codes returned at every dimension-sensitive or fallible boundary of the
/// algebra, the text formats and the solver bridge.
#[derive(Error, Debug)]
pub enum AlgebraError {
    /// Two dense vectors were combined element-wise but differ in length.
    #[error("Vector lengths are incompatible: {left} vs {right}")]
    IncompatibleLengths { left: usize, right: usize },
    /// Two matrices do not share the same column dimension.
    #[error("Matrix shapes are incompatible: {left} columns vs {right} columns")]
    IncompatibleShapes { left: usize, right: usize },
    #[error("Index {index} is out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// More singular triplets were requested than the matrix can provide.
    #[error(
        "Insufficient rank: requested {requested} singular triplets, only {available} available"
    )]
    InsufficientRank { requested: usize, available: usize },
    #[error("Vector has zero norm")]
    ZeroNorm,
    #[error("Maximum value is zero, cannot rescale")]
    ZeroMaximum,
    #[error("Input is empty")]
    EmptyInput,
    #[error("Sparse entries are not in strictly ascending index order at index {index}")]
    UnsortedEntries { index: usize },
    #[error("Invalid compressed-column layout: {0}")]
    InvalidLayout(String),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("SVD computation failed: {0}")]
    Solver(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type AlgebraResult<T> = Result<T, AlgebraError>;
