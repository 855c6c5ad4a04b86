//! Dense vector analytics used for co-occurrence export and for ranking terms
//! against singular vectors.

use ndarray::{Array1, ArrayView1};

use crate::error::{AlgebraError, AlgebraResult};
use crate::FloatOps;

/// Largest value, `-inf` for an empty vector. NaNs are skipped.
pub fn max<T: FloatOps>(x: ArrayView1<T>) -> T {
    x.iter()
        .fold(T::neg_infinity(), |acc, &v| if acc < v { v } else { acc })
}

pub fn norm<T: FloatOps>(x: ArrayView1<T>) -> T {
    x.iter().map(|&v| v * v).sum::<T>().sqrt()
}

/// # Errors
/// - `IncompatibleLengths` when `x` and `y` differ in length.
pub fn dot<T: FloatOps>(x: ArrayView1<T>, y: ArrayView1<T>) -> AlgebraResult<T> {
    if x.len() != y.len() {
        return Err(AlgebraError::IncompatibleLengths {
            left: x.len(),
            right: y.len(),
        });
    }
    Ok(x.iter().zip(y.iter()).map(|(&a, &b)| a * b).sum())
}

/// `dot(x, y) / (‖x‖ · ‖y‖)`.
///
/// # Errors
/// - `IncompatibleLengths` when the lengths differ.
/// - `ZeroNorm` when either vector is all zeros.
pub fn cosine_similarity<T: FloatOps>(x: ArrayView1<T>, y: ArrayView1<T>) -> AlgebraResult<T> {
    let product = dot(x, y)?;
    let norms = norm(x) * norm(y);
    if norms == T::zero() {
        return Err(AlgebraError::ZeroNorm);
    }
    Ok(product / norms)
}

/// Indices of the `k` largest values, largest first.
///
/// Each round scans the values not picked yet and takes the first maximum it
/// meets, so ties resolve to the lower index. NaN ranks below every number.
///
/// # Errors
/// - `IndexOutOfRange` when `k` exceeds the number of values.
pub fn arg_max_k<T: FloatOps>(values: ArrayView1<T>, k: usize) -> AlgebraResult<Vec<usize>> {
    if k > values.len() {
        return Err(AlgebraError::IndexOutOfRange {
            index: k,
            len: values.len(),
        });
    }
    let mut taken = vec![false; values.len()];
    let mut result = Vec::with_capacity(k);
    for _ in 0..k {
        let mut best: Option<usize> = None;
        for (j, &v) in values.iter().enumerate() {
            if taken[j] {
                continue;
            }
            best = match best {
                None => Some(j),
                Some(b) if v > values[b] || (values[b].is_nan() && !v.is_nan()) => Some(j),
                keep => keep,
            };
        }
        if let Some(b) = best {
            taken[b] = true;
            result.push(b);
        }
    }
    Ok(result)
}

/// Linear rescaling `low + v · (high − low) / max(values)`.
///
/// # Errors
/// - `EmptyInput` for an empty vector.
/// - `ZeroMaximum` when the largest value is zero.
pub fn scale_to_range<T: FloatOps>(
    values: ArrayView1<T>,
    low: T,
    high: T,
) -> AlgebraResult<Array1<T>> {
    if values.is_empty() {
        return Err(AlgebraError::EmptyInput);
    }
    let max = max(values);
    if max == T::zero() {
        return Err(AlgebraError::ZeroMaximum);
    }
    let factor = (high - low) / max;
    Ok(values.mapv(|v| low + v * factor))
}
