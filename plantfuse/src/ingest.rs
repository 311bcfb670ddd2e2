//! Sparse feature file reader
//!
//! **Format:** one sample per line,
//! `<label><d><index>:<value><d><index>:<value>...` where `<d>` is the
//! configured delimiter (a space by default). Indices are 1-based and span
//! `[1, 3F]`: `[1, F]` is the entire-plant channel, `[F+1, 2F]` leaf and
//! `[2F+1, 3F]` flower. Indices not listed are 0.
//!
//! `F` is not declared anywhere in the file; it is the largest index found
//! anywhere in it, divided by 3. The file is therefore read in two passes:
//! one to find `F`, one to fill the table.

use crate::table::{Organ, Sample, SampleTable};
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info};

/// Read a sample table from a file
///
/// A file that cannot be opened is reported as malformed input naming the path.
pub fn read_table<P: AsRef<Path>>(path: P, delimiter: char) -> Result<SampleTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::MalformedInput(format!("Cannot open data file {}: {}", path.display(), e))
    })?;

    info!("Reading data from {}", path.display());
    parse_table(BufReader::new(file), delimiter)
}

/// Parse a sample table from any buffered reader
pub fn parse_table<R: BufRead>(reader: R, delimiter: char) -> Result<SampleTable> {
    let lines = reader
        .lines()
        .map(|line| line.map(|l| strip_line_ending(l, delimiter)))
        .collect::<std::io::Result<Vec<String>>>()?;

    let feature_count = scan_feature_count(&lines, delimiter)?;
    debug!(
        "{} lines, {} features per organ",
        lines.len(),
        feature_count
    );

    let mut table = SampleTable::with_capacity(feature_count, lines.len());
    for (i, line) in lines.iter().enumerate() {
        let sample = parse_sample(line, i + 1, feature_count, delimiter)?;
        table.push(sample)?;
    }

    info!(
        "Loaded {} samples with {} classes",
        table.len(),
        table.feature_count()
    );
    Ok(table)
}

/// Drop a `\r` left by CRLF files and one trailing delimiter
fn strip_line_ending(mut line: String, delimiter: char) -> String {
    if line.ends_with('\r') {
        line.pop();
    }
    if line.ends_with(delimiter) {
        line.pop();
    }
    line
}

/// First pass: derive the per-organ feature count
///
/// Every pair's index counts towards the maximum; values and labels are left
/// to the second pass.
fn scan_feature_count(lines: &[String], delimiter: char) -> Result<usize> {
    if lines.is_empty() {
        return Err(Error::MalformedInput("No data found".to_string()));
    }

    let mut max_index = 0;
    for (i, line) in lines.iter().enumerate() {
        let line_no = i + 1;
        let (_, pairs) = line
            .split_once(delimiter)
            .ok_or_else(|| Error::line(line_no, "no feature pairs"))?;

        for pair in pairs.split(delimiter) {
            let (index, _) = pair
                .split_once(':')
                .ok_or_else(|| Error::line(line_no, format!("expected index:value, found '{}'", pair)))?;
            let index: usize = index
                .parse()
                .map_err(|_| Error::line(line_no, format!("invalid feature index '{}'", index)))?;

            max_index = max_index.max(index);
        }
    }

    if max_index == 0 {
        return Err(Error::MalformedInput("No feature data found".to_string()));
    }
    if max_index % 3 != 0 {
        return Err(Error::MalformedInput(format!(
            "Invalid feature count: highest index {} is not a multiple of 3",
            max_index
        )));
    }

    Ok(max_index / 3)
}

/// Second pass: parse one line into a sample
fn parse_sample(line: &str, line_no: usize, feature_count: usize, delimiter: char) -> Result<Sample> {
    let (label, pairs) = line
        .split_once(delimiter)
        .ok_or_else(|| Error::line(line_no, "no feature pairs"))?;

    if label.contains(':') {
        return Err(Error::line(line_no, format!("missing label before '{}'", label)));
    }
    let label: usize = label
        .parse()
        .map_err(|_| Error::line(line_no, format!("invalid label '{}'", label)))?;

    let mut sample = Sample::new(label, feature_count);
    let max_index = feature_count * 3;

    for pair in pairs.split(delimiter) {
        let (index, value) = pair
            .split_once(':')
            .ok_or_else(|| Error::line(line_no, format!("expected index:value, found '{}'", pair)))?;

        if index.is_empty() {
            return Err(Error::line(line_no, format!("missing feature index in '{}'", pair)));
        }
        if value.is_empty() {
            return Err(Error::line(line_no, format!("missing feature value in '{}'", pair)));
        }
        if value.contains(':') {
            return Err(Error::line(line_no, format!("too many ':' in '{}'", pair)));
        }

        let index: usize = index
            .parse()
            .map_err(|_| Error::line(line_no, format!("invalid feature index '{}'", index)))?;
        if index == 0 || index > max_index {
            return Err(Error::line(
                line_no,
                format!("feature index {} out of range [1, {}]", index, max_index),
            ));
        }

        let value: f64 = value
            .parse()
            .map_err(|_| Error::line(line_no, format!("invalid feature value '{}'", value)))?;
        if !value.is_finite() {
            return Err(Error::line(line_no, format!("non-finite feature value '{}'", value)));
        }

        let organ = Organ::from_channel((index - 1) / feature_count)
            .ok_or_else(|| Error::line(line_no, format!("feature index {} has no organ", index)))?;
        sample.set_organ_score(organ, (index - 1) % feature_count, value);
    }

    Ok(sample)
}
