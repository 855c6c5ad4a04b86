//! # Row-major sparse storage
//!
//! A [`SparseMatrix`] is a sequence of optional [`SparseVector`] rows, each an
//! ascending run of [`SparseElement`]s. Matrices are always stored zero-based;
//! one-based input is shifted once at ingestion by [`SparseMatrix::normalize`],
//! which reports the detected [`IndexBase`].

use std::fmt;

mod matrix;
mod vector;

pub use matrix::SparseMatrix;
pub use vector::SparseVector;

/// One non-zero entry of a sparse vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparseElement<T> {
    pub index: usize,
    pub value: T,
}

impl<T> SparseElement<T> {
    pub fn new(index: usize, value: T) -> Self {
        Self { index, value }
    }
}

impl<T: fmt::Display> fmt::Display for SparseElement<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.value)
    }
}

/// Index convention of a sparse input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBase {
    Zero,
    One,
}

impl IndexBase {
    /// A matrix is zero-based exactly when its smallest column index is 0.
    /// Matrices without entries fall back to one-based, which has no effect on them.
    pub fn detect(min_column_index: Option<usize>) -> Self {
        match min_column_index {
            Some(0) => IndexBase::Zero,
            _ => IndexBase::One,
        }
    }

    pub fn offset(self) -> usize {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

impl fmt::Display for IndexBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexBase::Zero => write!(f, "zero-based"),
            IndexBase::One => write!(f, "one-based"),
        }
    }
}
