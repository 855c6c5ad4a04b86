//! # Co-occurrence and decomposition pipeline
//!
//! Runs the stages `Load → Transpose → CoOccur → ExportCoOccur → Decompose →
//! ExportResults` in order. Each stage consumes the previous one's output and
//! any failure aborts the run; nothing is retried or resumed.
//!
//! The input is read as documents × terms (one document per line, term indices
//! as columns). The co-occurrence matrix is therefore the terms × terms product
//! `Aᵀ·A`: the input is transposed to terms × documents and that matrix is
//! multiplied with its own transpose.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use log::info;

use crate::bridge::to_compressed_column;
use crate::error::{AlgebraError, AlgebraResult};
use crate::io::{
    read_sparse_matrix, write_dense_matrix, write_file, write_sparse_as_dense, write_values,
    DEFAULT_DELIMITER,
};
use crate::sparse::{IndexBase, SparseMatrix};
use crate::svd::{check_rank, LanczosSolver, SingularTriplets, SvdSolver};

pub const DEFAULT_RANK: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Load,
    Transpose,
    CoOccur,
    ExportCoOccur,
    Decompose,
    ExportResults,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::Transpose => "transpose",
            Stage::CoOccur => "co-occurrence",
            Stage::ExportCoOccur => "co-occurrence export",
            Stage::Decompose => "decomposition",
            Stage::ExportResults => "result export",
        };
        f.write_str(name)
    }
}

/// The five files the pipeline reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub term_document: PathBuf,
    pub co_occurrence: PathBuf,
    pub left_singular_vectors: PathBuf,
    pub right_singular_vectors: PathBuf,
    pub singular_values: PathBuf,
}

impl PipelinePaths {
    /// Takes exactly five positional paths, in the order of the fields.
    ///
    /// # Errors
    /// - `Configuration` for any other argument count.
    pub fn from_args<I, S>(args: I) -> AlgebraResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<PathBuf>,
    {
        let args: Vec<PathBuf> = args.into_iter().map(Into::into).collect();
        let paths: [PathBuf; 5] = args.try_into().map_err(|args: Vec<PathBuf>| {
            AlgebraError::Configuration(format!(
                "There were {} arguments, instead of the expected 5.",
                args.len()
            ))
        })?;
        let [term_document, co_occurrence, left, right, values] = paths;
        Ok(Self {
            term_document,
            co_occurrence,
            left_singular_vectors: left,
            right_singular_vectors: right,
            singular_values: values,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    rank: usize,
    delimiter: String,
}

impl PipelineConfig {
    /// Number of singular triplets requested from the solver.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Separator between values in dense output.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rank: DEFAULT_RANK,
            delimiter: DEFAULT_DELIMITER.to_string(),
        }
    }
}

/// Builder for [`PipelineConfig`].
///
/// ```ignore
/// let config = PipelineConfigBuilder::new()
///     .rank(300)
///     .delimiter(",")
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Default values:
    /// - `rank`: 1000
    /// - `delimiter`: a single space
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the number of singular triplets computed.
    pub fn rank(mut self, rank: usize) -> Self {
        self.config.rank = rank;
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.config.delimiter = delimiter.into();
        self
    }

    /// # Errors
    /// - `Configuration` for a zero rank or an empty delimiter.
    pub fn build(self) -> AlgebraResult<PipelineConfig> {
        if self.config.rank == 0 {
            return Err(AlgebraError::Configuration(
                "rank must be at least 1".to_string(),
            ));
        }
        if self.config.delimiter.is_empty() {
            return Err(AlgebraError::Configuration(
                "delimiter must not be empty".to_string(),
            ));
        }
        Ok(self.config)
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub index_base: IndexBase,
    pub documents: usize,
    pub terms: usize,
    pub co_occurrence_nnz: usize,
    pub rank: usize,
}

pub struct Pipeline<S: SvdSolver = LanczosSolver> {
    config: PipelineConfig,
    solver: S,
}

impl Pipeline<LanczosSolver> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_solver(config, LanczosSolver::default())
    }
}

impl<S: SvdSolver> Pipeline<S> {
    pub fn with_solver(config: PipelineConfig, solver: S) -> Self {
        Self { config, solver }
    }

    pub fn run(&self, paths: &PipelinePaths) -> anyhow::Result<PipelineReport> {
        let (documents, index_base) = self
            .load(&paths.term_document)
            .with_context(|| stage_failed(Stage::Load))?;

        info!("Calculating co-occurrence matrix");
        let terms = documents.transpose();
        info!(
            "[{}] {} terms x {} documents",
            Stage::Transpose,
            terms.nrows(),
            terms.ncols()
        );
        let co_occurrence = terms
            .multiply_with_transpose(&terms)
            .with_context(|| stage_failed(Stage::CoOccur))?;
        info!(
            "[{}] {} x {} with {} non-zeros",
            Stage::CoOccur,
            co_occurrence.nrows(),
            co_occurrence.nrows(),
            co_occurrence.nnz()
        );

        self.export_co_occurrence(&co_occurrence, &paths.co_occurrence)
            .with_context(|| stage_failed(Stage::ExportCoOccur))?;

        let triplets = self
            .decompose(&co_occurrence)
            .with_context(|| stage_failed(Stage::Decompose))?;

        self.export_results(&triplets, paths)
            .with_context(|| stage_failed(Stage::ExportResults))?;

        Ok(PipelineReport {
            index_base,
            documents: documents.nrows(),
            terms: terms.nrows(),
            co_occurrence_nnz: co_occurrence.nnz(),
            rank: triplets.rank(),
        })
    }

    fn load(&self, path: &Path) -> AlgebraResult<(SparseMatrix<f64>, IndexBase)> {
        info!("[{}] reading {}", Stage::Load, path.display());
        let (documents, base) = read_sparse_matrix(path)?;
        info!(
            "[{}] {} documents, {} terms, {} non-zeros ({})",
            Stage::Load,
            documents.nrows(),
            documents.ncols(),
            documents.nnz(),
            base
        );
        Ok((documents, base))
    }

    fn export_co_occurrence(
        &self,
        co_occurrence: &SparseMatrix<f64>,
        path: &Path,
    ) -> AlgebraResult<()> {
        info!("[{}] writing {}", Stage::ExportCoOccur, path.display());
        write_file(path, |w| {
            write_sparse_as_dense(w, co_occurrence, &self.config.delimiter)
        })
    }

    /// Converts the co-occurrence matrix to compressed-column form and runs the
    /// solver on it.
    pub fn decompose(&self, co_occurrence: &SparseMatrix<f64>) -> AlgebraResult<SingularTriplets> {
        info!("Converting matrix");
        let compressed = to_compressed_column(co_occurrence);
        check_rank(compressed.nrows(), compressed.ncols(), self.config.rank)?;
        let csc = compressed.into_csc()?;
        let triplets = self.solver.decompose(&csc, self.config.rank)?;
        info!(
            "[{}] computed {} singular triplets",
            Stage::Decompose,
            triplets.rank()
        );
        Ok(triplets)
    }

    fn export_results(
        &self,
        triplets: &SingularTriplets,
        paths: &PipelinePaths,
    ) -> AlgebraResult<()> {
        let delimiter = &self.config.delimiter;
        info!(
            "[{}] writing {}, {} and {}",
            Stage::ExportResults,
            paths.left_singular_vectors.display(),
            paths.right_singular_vectors.display(),
            paths.singular_values.display()
        );
        write_file(&paths.left_singular_vectors, |w| {
            write_dense_matrix(w, triplets.left(), delimiter)
        })?;
        write_file(&paths.right_singular_vectors, |w| {
            write_dense_matrix(w, triplets.right(), delimiter)
        })?;
        write_file(&paths.singular_values, |w| write_values(w, triplets.values()))
    }
}

fn stage_failed(stage: Stage) -> String {
    format!("{} stage failed", stage)
}
