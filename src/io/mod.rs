//! Plain-text matrix formats.
//!
//! - Sparse input: one row per line, tokens split on whitespace, `[`, `:` and
//!   `]`. An odd token count means a leading label, which is dropped; the rest
//!   are `index value` pairs in ascending index order.
//! - Dense output: one row per line, values joined by a delimiter.
//! - Value lists: one value per line.
//! - Word lists: one term per line, lower-cased, blank lines skipped, sorted.
//!
//! Every reader and writer takes ownership of its file only for the duration
//! of the call.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::{AlgebraError, AlgebraResult};
use crate::sparse::{IndexBase, SparseElement, SparseMatrix, SparseVector};

pub const DEFAULT_DELIMITER: &str = " ";

fn parse_error(line: usize, message: impl Into<String>) -> AlgebraError {
    AlgebraError::Parse {
        line,
        message: message.into(),
    }
}

/// Parses one sparse row. `line` is only used for error reporting.
pub fn parse_sparse_row(text: &str, line: usize) -> AlgebraResult<SparseVector<f64>> {
    let mut tokens: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || matches!(c, '[' | ':' | ']'))
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.len() % 2 != 0 {
        tokens.remove(0);
    }

    let mut entries = Vec::with_capacity(tokens.len() / 2);
    for pair in tokens.chunks_exact(2) {
        let index = pair[0]
            .parse::<usize>()
            .map_err(|e| parse_error(line, format!("invalid index '{}': {}", pair[0], e)))?;
        let value = pair[1]
            .parse::<f64>()
            .map_err(|e| parse_error(line, format!("invalid value '{}': {}", pair[1], e)))?;
        entries.push(SparseElement::new(index, value));
    }
    SparseVector::from_sorted(entries).map_err(|e| parse_error(line, e.to_string()))
}

/// Reads sparse rows as written, without index-base normalisation. Empty lines
/// are skipped; a line without pairs yields an empty (present) row.
pub fn read_sparse_rows<R: BufRead>(reader: R) -> AlgebraResult<Vec<Option<SparseVector<f64>>>> {
    let mut rows = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        rows.push(Some(parse_sparse_row(&line, i + 1)?));
    }
    Ok(rows)
}

/// Reads a sparse matrix file and normalises it to zero-based indices.
pub fn read_sparse_matrix<P: AsRef<Path>>(
    path: P,
) -> AlgebraResult<(SparseMatrix<f64>, IndexBase)> {
    let reader = BufReader::new(File::open(path)?);
    let rows = read_sparse_rows(reader)?;
    Ok(SparseMatrix::normalize(rows))
}

/// Formats a value the way the existing corpora print doubles: plain decimal
/// with at least one fractional digit for magnitudes in `[1e-3, 1e7)`,
/// `d.dddE±n` outside it.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if magnitude == 0.0 || (1.0e-3..1.0e7).contains(&magnitude) {
        return format!("{:?}", value);
    }
    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            format!("{}E{}", mantissa, exponent)
        }
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => formatted,
    }
}

fn write_row<'a, W, I>(writer: &mut W, values: I, delimiter: &str) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a f64>,
{
    for (j, &v) in values.into_iter().enumerate() {
        if j > 0 {
            writer.write_all(delimiter.as_bytes())?;
        }
        writer.write_all(format_value(v).as_bytes())?;
    }
    writer.write_all(b"\n")
}

/// Writes one line per row, no header.
pub fn write_dense_matrix<W: Write>(
    writer: &mut W,
    matrix: ArrayView2<f64>,
    delimiter: &str,
) -> std::io::Result<()> {
    for row in matrix.rows() {
        write_row(writer, row.iter(), delimiter)?;
    }
    Ok(())
}

/// Writes `matrix` in the dense text layout one row at a time, without
/// materialising the dense array. Output matches
/// `write_dense_matrix(&mut w, to_dense(matrix).view(), delimiter)`.
pub fn write_sparse_as_dense<W: Write>(
    writer: &mut W,
    matrix: &SparseMatrix<f64>,
    delimiter: &str,
) -> std::io::Result<()> {
    let ncols = matrix.ncols();
    let mut buffer = vec![0.0; ncols];
    for row in matrix.rows() {
        buffer.iter_mut().for_each(|v| *v = 0.0);
        if let Some(row) = row {
            for e in row {
                buffer[e.index] = e.value;
            }
        }
        write_row(writer, buffer.iter(), delimiter)?;
    }
    Ok(())
}

/// Writes one value per line.
pub fn write_values<W: Write>(writer: &mut W, values: ArrayView1<f64>) -> std::io::Result<()> {
    for &v in values.iter() {
        writeln!(writer, "{}", format_value(v))?;
    }
    Ok(())
}

/// Creates (truncating) `path` and runs `write` against a buffered writer,
/// flushing before the file is closed.
pub fn write_file<P, F>(path: P, write: F) -> AlgebraResult<()>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Reads a dense matrix whose values are separated by commas and/or spaces.
///
/// # Errors
/// - `Parse` for unparsable values or rows whose length differs from the first row.
pub fn read_dense_matrix<R: BufRead>(reader: R) -> AlgebraResult<Array2<f64>> {
    let mut values = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let before = values.len();
        for token in line.split([',', ' ']).filter(|t| !t.is_empty()) {
            let v = token
                .parse::<f64>()
                .map_err(|e| parse_error(i + 1, format!("invalid value '{}': {}", token, e)))?;
            values.push(v);
        }
        let width = values.len() - before;
        match ncols {
            None => ncols = Some(width),
            Some(expected) if expected != width => {
                return Err(parse_error(
                    i + 1,
                    format!("expected {} values, found {}", expected, width),
                ));
            }
            _ => {}
        }
        nrows += 1;
    }
    Array2::from_shape_vec((nrows, ncols.unwrap_or(0)), values)
        .map_err(|e| AlgebraError::InvalidLayout(e.to_string()))
}

/// Reads one value per line.
pub fn read_values<R: BufRead>(reader: R) -> AlgebraResult<Array1<f64>> {
    let mut values = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let v = token
            .parse::<f64>()
            .map_err(|e| parse_error(i + 1, format!("invalid value '{}': {}", token, e)))?;
        values.push(v);
    }
    Ok(Array1::from(values))
}

/// Reads a word list: lower-cased, blank lines skipped, sorted ascending.
pub fn read_word_list<R: BufRead>(reader: R) -> AlgebraResult<Vec<String>> {
    let mut words = Vec::new();
    for line in reader.lines() {
        let word = line?.to_lowercase();
        if !word.is_empty() {
            words.push(word);
        }
    }
    words.sort();
    Ok(words)
}

/// Opens `path` and runs `read` against a buffered reader.
pub fn read_file<P, F, T>(path: P, read: F) -> AlgebraResult<T>
where
    P: AsRef<Path>,
    F: FnOnce(BufReader<File>) -> AlgebraResult<T>,
{
    read(BufReader::new(File::open(path)?))
}
