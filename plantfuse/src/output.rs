//! Prediction file writer
//!
//! One line per sample in input order:
//! `<label> <predicted> <score_1> ... <score_F>` with scores at 2 decimals.

use crate::table::SampleTable;
use crate::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write the table's current predictions and fused scores
pub fn write_predictions<W: Write>(table: &SampleTable, mut writer: W) -> Result<()> {
    for sample in table {
        write!(writer, "{} {}", sample.label, sample.predicted)?;
        for score in sample.final_scores() {
            write!(writer, " {:.2}", score)?;
        }
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write predictions to a file, replacing any existing content
pub fn write_predictions_file<P: AsRef<Path>>(table: &SampleTable, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Writing predictions to {}", path.display());
    let file = File::create(path)?;
    write_predictions(table, BufWriter::new(file))
}
