//! Ranking index terms against singular vectors.

use ndarray::parallel::prelude::*;
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::dense::{arg_max_k, cosine_similarity, scale_to_range};
use crate::error::{AlgebraError, AlgebraResult};
use crate::FloatOps;

/// Lower and upper end of the visible spectrum in nanometres.
pub const VISIBLE_RANGE: (f64, f64) = (400.0, 700.0);

pub const DEFAULT_TOP_K: usize = 20;

/// Similarity below which a component is not considered related to a term.
pub const DEFAULT_CUTOFF: f64 = 0.05;

pub trait SimilarityMeasure {
    fn calculate<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> AlgebraResult<T>;
}

pub struct CosineSimilarity;

impl SimilarityMeasure for CosineSimilarity {
    fn calculate<T: FloatOps>(&self, a: ArrayView1<T>, b: ArrayView1<T>) -> AlgebraResult<T> {
        cosine_similarity(a, b)
    }
}

/// Sorted, lower-cased vocabulary whose positions match the rows of the
/// term matrices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermIndex {
    words: Vec<String>,
}

impl TermIndex {
    pub fn new(words: Vec<String>) -> Self {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort();
        Self { words }
    }

    /// Row of `term`, looked up case-insensitively.
    pub fn position(&self, term: &str) -> Option<usize> {
        self.words.binary_search(&term.to_lowercase()).ok()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// One singular vector ranked for a term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedComponent {
    pub component: usize,
    pub similarity: f64,
    pub significant: bool,
}

/// Scores a term's co-occurrence row against every singular vector.
pub struct TermRanker<S: SimilarityMeasure = CosineSimilarity> {
    co_occurrence: Array2<f64>,
    singular_vectors: Array2<f64>,
    measure: S,
    top_k: usize,
    cutoff: f64,
}

impl TermRanker<CosineSimilarity> {
    /// # Errors
    /// - `IncompatibleShapes` when the co-occurrence rows and the singular
    ///   vectors have different lengths.
    pub fn new(co_occurrence: Array2<f64>, singular_vectors: Array2<f64>) -> AlgebraResult<Self> {
        Self::with_measure(co_occurrence, singular_vectors, CosineSimilarity)
    }
}

impl<S: SimilarityMeasure> TermRanker<S> {
    pub fn with_measure(
        co_occurrence: Array2<f64>,
        singular_vectors: Array2<f64>,
        measure: S,
    ) -> AlgebraResult<Self> {
        if co_occurrence.ncols() != singular_vectors.ncols() {
            return Err(AlgebraError::IncompatibleShapes {
                left: co_occurrence.ncols(),
                right: singular_vectors.ncols(),
            });
        }
        Ok(Self {
            co_occurrence,
            singular_vectors,
            measure,
            top_k: DEFAULT_TOP_K,
            cutoff: DEFAULT_CUTOFF,
        })
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }
}

impl<S: SimilarityMeasure + Sync> TermRanker<S> {
    /// Similarity of term `term` with each singular vector, in component order.
    pub fn similarities(&self, term: usize) -> AlgebraResult<Array1<f64>> {
        if term >= self.co_occurrence.nrows() {
            return Err(AlgebraError::IndexOutOfRange {
                index: term,
                len: self.co_occurrence.nrows(),
            });
        }
        let row = self.co_occurrence.row(term);
        self.singular_vectors
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|v| self.measure.calculate(row, v))
            .collect::<AlgebraResult<Vec<f64>>>()
            .map(Array1::from)
    }

    /// The `top_k` most similar components (fewer if there are fewer vectors),
    /// most similar first. Components under the cutoff are kept but flagged.
    pub fn rank(&self, term: usize) -> AlgebraResult<Vec<RankedComponent>> {
        let similarities = self.similarities(term)?;
        let k = self.top_k.min(similarities.len());
        Ok(arg_max_k(similarities.view(), k)?
            .into_iter()
            .map(|component| RankedComponent {
                component,
                similarity: similarities[component],
                significant: similarities[component] >= self.cutoff,
            })
            .collect())
    }
}

/// Wavelengths of the significant ranked components, obtained by scaling all
/// singular values into [`VISIBLE_RANGE`].
///
/// # Errors
/// - `IndexOutOfRange` when a ranked component has no singular value.
/// - whatever [`scale_to_range`] reports for the singular values.
pub fn visible_spectrum(
    singular_values: ArrayView1<f64>,
    ranked: &[RankedComponent],
) -> AlgebraResult<Vec<f64>> {
    let (low, high) = VISIBLE_RANGE;
    let spectrum = scale_to_range(singular_values, low, high)?;
    ranked
        .iter()
        .filter(|r| r.significant)
        .map(|r| {
            spectrum
                .get(r.component)
                .copied()
                .ok_or(AlgebraError::IndexOutOfRange {
                    index: r.component,
                    len: spectrum.len(),
                })
        })
        .collect()
}
