//! Builds the co-occurrence matrix of a term-document matrix and its singular
//! value decomposition.
//!
//! Usage: `decompose <term-document> <co-occurrence> <left-vectors> <right-vectors> <values>`
//!
//! The rank defaults to 1000 and can be overridden with `SPECTRAL_MAP_RANK`.

use std::env;

use log::info;
use spectral_map::pipeline::{Pipeline, PipelineConfigBuilder, PipelinePaths};
use spectral_map::{AlgebraError, AlgebraResult};

const RANK_VARIABLE: &str = "SPECTRAL_MAP_RANK";

fn rank_from_env() -> AlgebraResult<Option<usize>> {
    match env::var(RANK_VARIABLE) {
        Ok(value) => value.trim().parse::<usize>().map(Some).map_err(|e| {
            AlgebraError::Configuration(format!("{}='{}': {}", RANK_VARIABLE, value, e))
        }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(AlgebraError::Configuration(format!("{}: {}", RANK_VARIABLE, e))),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths = PipelinePaths::from_args(env::args_os().skip(1))?;
    let mut builder = PipelineConfigBuilder::new();
    if let Some(rank) = rank_from_env()? {
        builder = builder.rank(rank);
    }
    let config = builder.build()?;

    let report = Pipeline::new(config).run(&paths)?;
    info!(
        "Done: {} documents, {} terms, {} co-occurrence non-zeros, {} singular triplets",
        report.documents, report.terms, report.co_occurrence_nnz, report.rank
    );
    Ok(())
}
