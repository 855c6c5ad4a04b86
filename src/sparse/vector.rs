use std::slice::Iter;

use crate::error::{AlgebraError, AlgebraResult};
use crate::FloatOps;

use super::SparseElement;

/// Sparse vector kept sorted by index with no duplicate indices.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseVector<T> {
    entries: Vec<SparseElement<T>>,
}

impl<T> Default for SparseVector<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: FloatOps> SparseVector<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Wraps entries that are already in strictly ascending index order.
    ///
    /// # Errors
    /// - `UnsortedEntries` naming the first index that breaks the order (this
    ///   includes repeated indices).
    pub fn from_sorted(entries: Vec<SparseElement<T>>) -> AlgebraResult<Self> {
        if let Some(window) = entries.windows(2).find(|w| w[0].index >= w[1].index) {
            return Err(AlgebraError::UnsortedEntries {
                index: window[1].index,
            });
        }
        Ok(Self { entries })
    }

    /// Adds `value` at `index`, summing into an existing entry or inserting a new
    /// one at its sorted position.
    pub fn insert_or_accumulate(&mut self, index: usize, value: T) {
        match self.entries.last() {
            None => {
                self.entries.push(SparseElement::new(index, value));
                return;
            }
            Some(last) if last.index < index => {
                self.entries.push(SparseElement::new(index, value));
                return;
            }
            _ => {}
        }
        match self.entries.binary_search_by_key(&index, |e| e.index) {
            Ok(pos) => self.entries[pos].value += value,
            Err(pos) => self.entries.insert(pos, SparseElement::new(index, value)),
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.entries
            .binary_search_by_key(&index, |e| e.index)
            .ok()
            .map(|pos| self.entries[pos].value)
    }

    /// Merge-style dot product; only matching indices contribute.
    pub fn dot(&self, other: &Self) -> T {
        let (x, y) = (&self.entries, &other.entries);
        let mut sum = T::zero();
        let (mut i, mut j) = (0, 0);
        while i < x.len() && j < y.len() {
            if x[i].index == y[j].index {
                sum += x[i].value * y[j].value;
                i += 1;
                j += 1;
            } else if x[i].index > y[j].index {
                j += 1;
            } else {
                i += 1;
            }
        }
        sum
    }

    pub fn norm_squared(&self) -> T {
        self.entries.iter().map(|e| e.value * e.value).sum()
    }

    pub fn norm(&self) -> T {
        self.norm_squared().sqrt()
    }

    pub fn min_index(&self) -> Option<usize> {
        self.entries.first().map(|e| e.index)
    }

    pub fn max_index(&self) -> Option<usize> {
        self.entries.last().map(|e| e.index)
    }

    /// Copy with every index moved `k` positions to the right.
    pub fn shifted(&self, k: usize) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| SparseElement::new(e.index + k, e.value))
                .collect(),
        }
    }

    /// Copy with every index moved `k` positions to the left, `None` if an index
    /// would drop below zero.
    pub(crate) fn shifted_down(&self, k: usize) -> Option<Self> {
        let entries = self
            .entries
            .iter()
            .map(|e| {
                e.index
                    .checked_sub(k)
                    .map(|index| SparseElement::new(index, e.value))
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, SparseElement<T>> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[SparseElement<T>] {
        &self.entries
    }
}

impl<T: FloatOps> FromIterator<(usize, T)> for SparseVector<T> {
    /// Collects `(index, value)` pairs in any order, summing repeated indices.
    fn from_iter<I: IntoIterator<Item = (usize, T)>>(iter: I) -> Self {
        let mut vector = SparseVector::new();
        for (index, value) in iter {
            vector.insert_or_accumulate(index, value);
        }
        vector
    }
}

impl<'a, T> IntoIterator for &'a SparseVector<T> {
    type Item = &'a SparseElement<T>;
    type IntoIter = Iter<'a, SparseElement<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn indices(v: &SparseVector<f64>) -> Vec<usize> {
        v.iter().map(|e| e.index).collect()
    }

    #[test]
    fn test_insert_into_empty() {
        let mut v = SparseVector::new();
        v.insert_or_accumulate(4, 2.5);
        assert_eq!(v.len(), 1);
        assert_eq!(v.get(4), Some(2.5));
    }

    #[test]
    fn test_insert_keeps_ascending_order() {
        let mut v = SparseVector::new();
        for &(i, x) in &[(5, 1.0), (1, 2.0), (3, 3.0), (9, 4.0), (0, 5.0)] {
            v.insert_or_accumulate(i, x);
        }
        assert_eq!(indices(&v), vec![0, 1, 3, 5, 9]);
        assert_eq!(v.get(3), Some(3.0));
        assert_eq!(v.get(2), None);
    }

    #[test]
    fn test_repeated_accumulation_has_no_duplicates() {
        let mut v = SparseVector::new();
        v.insert_or_accumulate(2, 1.0);
        v.insert_or_accumulate(7, 1.0);
        v.insert_or_accumulate(2, 0.5);
        v.insert_or_accumulate(7, 2.0);
        v.insert_or_accumulate(2, 0.25);
        assert_eq!(indices(&v), vec![2, 7]);
        assert_relative_eq!(v.get(2).unwrap(), 1.75);
        assert_relative_eq!(v.get(7).unwrap(), 3.0);
    }

    #[test]
    fn test_from_iterator_sums_duplicates() {
        let v: SparseVector<f64> = vec![(3, 1.0), (1, 1.0), (3, 2.0)].into_iter().collect();
        assert_eq!(indices(&v), vec![1, 3]);
        assert_eq!(v.get(3), Some(3.0));
    }

    #[test]
    fn test_from_sorted_rejects_unsorted_and_duplicates() {
        let ok = SparseVector::from_sorted(vec![
            SparseElement::new(1, 1.0),
            SparseElement::new(4, 2.0),
        ]);
        assert!(ok.is_ok());

        let unsorted = SparseVector::from_sorted(vec![
            SparseElement::new(4, 1.0),
            SparseElement::new(1, 2.0),
        ]);
        assert!(matches!(unsorted, Err(AlgebraError::UnsortedEntries { index: 1 })));

        let duplicate = SparseVector::from_sorted(vec![
            SparseElement::new(2, 1.0),
            SparseElement::new(2, 2.0),
        ]);
        assert!(matches!(duplicate, Err(AlgebraError::UnsortedEntries { index: 2 })));
    }

    #[test]
    fn test_dot_product_matches_only_shared_indices() {
        let x: SparseVector<f64> = vec![(0, 1.0), (2, 2.0), (5, 3.0)].into_iter().collect();
        let y: SparseVector<f64> = vec![(1, 7.0), (2, 4.0), (5, -1.0), (8, 9.0)]
            .into_iter()
            .collect();
        assert_relative_eq!(x.dot(&y), 2.0 * 4.0 - 3.0);
        assert_eq!(x.dot(&y), y.dot(&x));
    }

    #[test]
    fn test_dot_product_with_empty_is_zero() {
        let x: SparseVector<f64> = vec![(0, 1.0)].into_iter().collect();
        let empty = SparseVector::new();
        assert_eq!(x.dot(&empty), 0.0);
        assert_eq!(empty.dot(&x), 0.0);
    }

    #[test]
    fn test_dot_product_disjoint_is_zero() {
        let x: SparseVector<f64> = vec![(0, 1.0), (2, 1.0)].into_iter().collect();
        let y: SparseVector<f64> = vec![(1, 1.0), (3, 1.0)].into_iter().collect();
        assert_eq!(x.dot(&y), 0.0);
    }

    #[test]
    fn test_norm_and_bounds() {
        let x: SparseVector<f64> = vec![(2, 3.0), (6, 4.0)].into_iter().collect();
        assert_relative_eq!(x.norm(), 5.0);
        assert_eq!(x.min_index(), Some(2));
        assert_eq!(x.max_index(), Some(6));
        assert_eq!(SparseVector::<f64>::new().min_index(), None);
    }

    #[test]
    fn test_shifts() {
        let x: SparseVector<f64> = vec![(1, 3.0), (4, 4.0)].into_iter().collect();
        assert_eq!(indices(&x.shifted(2)), vec![3, 6]);
        assert_eq!(indices(&x.shifted_down(1).unwrap()), vec![0, 3]);
        assert!(x.shifted_down(2).is_none());
    }
}
