//! Ranks the singular vectors most similar to one index term and reports where
//! they fall in the visible spectrum.
//!
//! Usage: `term_spectrum <co-occurrence> <singular-vectors> <singular-values> <word-list> <term>`

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use log::{info, warn};
use spectral_map::io::{read_dense_matrix, read_file, read_values, read_word_list};
use spectral_map::similarity::{visible_spectrum, TermIndex, TermRanker};

#[derive(Debug)]
struct Arguments {
    co_occurrence: PathBuf,
    vectors: PathBuf,
    values: PathBuf,
    words: PathBuf,
    term: String,
}

fn parse_arguments(args: Vec<OsString>) -> anyhow::Result<Arguments> {
    let [co_occurrence, vectors, values, words, term]: [OsString; 5] = match args.try_into() {
        Ok(args) => args,
        Err(args) => bail!(
            "There were {} arguments, instead of the expected 5.",
            args.len()
        ),
    };
    let term = term
        .into_string()
        .map_err(|term| anyhow!("Term {:?} is not valid UTF-8", term))?;
    Ok(Arguments {
        co_occurrence: co_occurrence.into(),
        vectors: vectors.into(),
        values: values.into(),
        words: words.into(),
        term,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Arguments {
        co_occurrence: co_path,
        vectors: vectors_path,
        values: values_path,
        words: words_path,
        term,
    } = parse_arguments(env::args_os().skip(1).collect())?;

    let words = read_file(&words_path, read_word_list).context("reading word list")?;
    let index = TermIndex::new(words);
    let Some(term_index) = index.position(&term) else {
        bail!("Term '{}' is not in the word list", term);
    };

    let co_occurrence =
        read_file(&co_path, read_dense_matrix).context("reading co-occurrence matrix")?;
    let vectors = read_file(&vectors_path, read_dense_matrix).context("reading singular vectors")?;
    let singular_values =
        read_file(&values_path, read_values).context("reading singular values")?;
    if co_occurrence.nrows() != index.len() {
        warn!(
            "Word list has {} terms but the co-occurrence matrix has {} rows",
            index.len(),
            co_occurrence.nrows()
        );
    }

    let ranked = TermRanker::new(co_occurrence, vectors)?.rank(term_index)?;
    let line: Vec<String> = ranked
        .iter()
        .map(|r| format!("{}:{}", r.component, r.similarity))
        .collect();
    println!("{}", line.join(" "));

    let wavelengths = visible_spectrum(singular_values.view(), &ranked)?;
    info!("{} significant components for '{}'", wavelengths.len(), term);
    for w in wavelengths {
        println!("{:.1}", w);
    }
    Ok(())
}
