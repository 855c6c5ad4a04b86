//! # Format bridge
//!
//! Conversions out of the row-major [`SparseMatrix`]:
//! - [`to_dense`] materialises every cell into an `ndarray::Array2`.
//! - [`to_compressed_column`] builds the compressed-column layout the sparse SVD
//!   solver consumes, one extracted column at a time.
//! - [`CompressedColumn::into_csc`] hands that layout to `nalgebra_sparse`.

use log::debug;
use nalgebra_sparse::CscMatrix;
use ndarray::Array2;
use rayon::prelude::*;

use crate::error::{AlgebraError, AlgebraResult};
use crate::sparse::{SparseMatrix, SparseVector};
use crate::FloatOps;

/// Dense `nrows × ncols` copy of `matrix`. Absent or empty rows become zero rows.
pub fn to_dense<T: FloatOps>(matrix: &SparseMatrix<T>) -> Array2<T> {
    let mut dense = Array2::zeros((matrix.nrows(), matrix.ncols()));
    for (i, row) in matrix.rows().iter().enumerate() {
        let Some(row) = row else { continue };
        for e in row {
            dense[[i, e.index]] = e.value;
        }
    }
    dense
}

/// Compressed-column sparse layout: column `c` owns the entries
/// `col_offsets[c]..col_offsets[c + 1]` of `row_indices` and `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedColumn<T> {
    nrows: usize,
    ncols: usize,
    col_offsets: Vec<usize>,
    row_indices: Vec<usize>,
    values: Vec<T>,
}

impl<T: FloatOps> CompressedColumn<T> {
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn col_offsets(&self) -> &[usize] {
        &self.col_offsets
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Row indices and values of column `c`.
    pub fn column(&self, c: usize) -> AlgebraResult<(&[usize], &[T])> {
        if c >= self.ncols {
            return Err(AlgebraError::IndexOutOfRange {
                index: c,
                len: self.ncols,
            });
        }
        let range = self.col_offsets[c]..self.col_offsets[c + 1];
        Ok((&self.row_indices[range.clone()], &self.values[range]))
    }

    /// Converts into the `nalgebra_sparse` matrix handed to the solver.
    pub fn into_csc(self) -> AlgebraResult<CscMatrix<T>> {
        CscMatrix::try_from_csc_data(
            self.nrows,
            self.ncols,
            self.col_offsets,
            self.row_indices,
            self.values,
        )
        .map_err(|e| AlgebraError::InvalidLayout(e.to_string()))
    }
}

/// Compressed-column copy of `matrix`.
///
/// Columns are extracted independently (in parallel) and appended in ascending
/// order, so the result is identical to a sequential column-by-column scan.
pub fn to_compressed_column<T: FloatOps>(matrix: &SparseMatrix<T>) -> CompressedColumn<T> {
    let (nnz, max_column) = matrix
        .rows()
        .iter()
        .flatten()
        .fold((0usize, None::<usize>), |(nnz, max), row| {
            (nnz + row.len(), max.max(row.max_index()))
        });
    let ncols = max_column.map_or(0, |m| m + 1);

    let columns: Vec<SparseVector<T>> = (0..ncols)
        .into_par_iter()
        .map(|c| matrix.extract_column(c))
        .collect();

    let mut col_offsets = Vec::with_capacity(ncols + 1);
    let mut row_indices = Vec::with_capacity(nnz);
    let mut values = Vec::with_capacity(nnz);
    for column in &columns {
        col_offsets.push(row_indices.len());
        for e in column {
            row_indices.push(e.index);
            values.push(e.value);
        }
    }
    col_offsets.push(row_indices.len());

    debug!(
        "Compressed {} x {} matrix with {} non-zeros",
        matrix.nrows(),
        ncols,
        values.len()
    );

    CompressedColumn {
        nrows: matrix.nrows(),
        ncols,
        col_offsets,
        row_indices,
        values,
    }
}
