use log::debug;
use rayon::prelude::*;

use crate::error::{AlgebraError, AlgebraResult};
use crate::FloatOps;

use super::{IndexBase, SparseVector};

/// Row-major sparse matrix. Column indices are zero-based and the column
/// dimension is derived from the largest index present.
///
/// Rows are `Option`s: `None` is an absent row (nothing was ever stored there,
/// e.g. a term that never co-occurs), `Some` of an empty vector is a row that was
/// read but carried no entries. Both behave as all-zero rows in the algebra.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SparseMatrix<T> {
    rows: Vec<Option<SparseVector<T>>>,
}

impl<T: FloatOps> SparseMatrix<T> {
    /// Wraps rows whose column indices are already zero-based.
    pub fn from_rows(rows: Vec<Option<SparseVector<T>>>) -> Self {
        Self { rows }
    }

    pub fn from_vectors(rows: Vec<SparseVector<T>>) -> Self {
        Self {
            rows: rows.into_iter().map(Some).collect(),
        }
    }

    /// Ingests rows in either index convention and shifts them to zero-based.
    ///
    /// The base is detected from the smallest column index over all rows: 0 means
    /// the rows are zero-based, anything else is read as one-based. This is the
    /// only place the convention is inspected; every matrix derived afterwards is
    /// zero-based by construction.
    pub fn normalize(rows: Vec<Option<SparseVector<T>>>) -> (Self, IndexBase) {
        let base = IndexBase::detect(min_index_of(&rows));
        let offset = base.offset();
        if offset == 0 {
            return (Self { rows }, base);
        }
        let rows = rows
            .into_iter()
            .map(|row| {
                row.map(|v| {
                    // every index is >= offset once the base was detected as one-based
                    v.shifted_down(offset).unwrap_or_default()
                })
            })
            .collect();
        (Self { rows }, base)
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    /// Column dimension: largest column index plus one, 0 without entries.
    pub fn ncols(&self) -> usize {
        self.max_column_index().map_or(0, |max| max + 1)
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().flatten().map(SparseVector::len).sum()
    }

    /// Row `i`, `None` when absent or out of range.
    pub fn row(&self, i: usize) -> Option<&SparseVector<T>> {
        self.rows.get(i).and_then(Option::as_ref)
    }

    pub fn rows(&self) -> &[Option<SparseVector<T>>] {
        &self.rows
    }

    /// Smallest column index over all rows, `None` when the matrix holds no
    /// entries. Callers must not confuse `None` with a legitimate index 0.
    pub fn min_column_index(&self) -> Option<usize> {
        min_index_of(&self.rows)
    }

    pub fn max_column_index(&self) -> Option<usize> {
        self.rows
            .iter()
            .flatten()
            .filter_map(SparseVector::max_index)
            .max()
    }

    /// Moves every column index `k` positions to the right.
    pub fn shift_columns(&self, k: usize) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .map(|row| row.as_ref().map(|v| v.shifted(k)))
                .collect(),
        }
    }

    /// Column `column` as a sparse vector indexed by row number.
    pub fn extract_column(&self, column: usize) -> SparseVector<T> {
        let mut result = SparseVector::new();
        for (i, row) in self.rows.iter().enumerate() {
            if let Some(value) = row.as_ref().and_then(|v| v.get(column)) {
                result.insert_or_accumulate(i, value);
            }
        }
        result
    }

    /// Transpose; the result has `ncols()` rows and columns are the original row
    /// numbers. Output rows that receive no entries are absent.
    pub fn transpose(&self) -> Self {
        let mut rows: Vec<Option<SparseVector<T>>> = vec![None; self.ncols()];
        for (i, row) in self.rows.iter().enumerate() {
            let Some(row) = row else { continue };
            for e in row {
                rows[e.index]
                    .get_or_insert_with(SparseVector::new)
                    .insert_or_accumulate(i, e.value);
            }
        }
        Self { rows }
    }

    /// `C = A · Bᵀ`, i.e. `C[i][j] = dot(A[i], B[j])`, keeping only non-zero products.
    ///
    /// # Errors
    /// - `IncompatibleShapes` when the two operands have different column
    ///   dimensions.
    pub fn multiply_with_transpose(&self, other: &Self) -> AlgebraResult<Self> {
        let (left, right) = (self.ncols(), other.ncols());
        if left != right {
            return Err(AlgebraError::IncompatibleShapes { left, right });
        }
        Ok(self.products_with(other))
    }

    /// Term co-occurrence of a documents × terms matrix: transposes to
    /// terms × documents and multiplies that with its own transpose, giving the
    /// symmetric terms × terms matrix `Aᵀ·A`.
    pub fn co_occurrence(&self) -> Self {
        let terms = self.transpose();
        debug!(
            "Transposed to {} terms x {} documents ({} non-zeros)",
            terms.nrows(),
            terms.ncols(),
            terms.nnz()
        );
        terms.products_with(&terms)
    }

    fn products_with(&self, other: &Self) -> Self {
        let rows = self
            .rows
            .par_iter()
            .map(|left| {
                let left = left.as_ref()?;
                let mut out = SparseVector::new();
                for (j, right) in other.rows.iter().enumerate() {
                    let Some(right) = right else { continue };
                    let value = left.dot(right);
                    if value != T::zero() {
                        out.insert_or_accumulate(j, value);
                    }
                }
                if out.is_empty() {
                    None
                } else {
                    Some(out)
                }
            })
            .collect();
        Self { rows }
    }
}

fn min_index_of<T: FloatOps>(rows: &[Option<SparseVector<T>>]) -> Option<usize> {
    rows.iter().flatten().filter_map(SparseVector::min_index).min()
}
