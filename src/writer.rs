use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{InkReplayError, kinematics::KinematicSeries};

/// Write an encoded document as UTF-8 bytes
pub fn write_document(file: &Path, document: &str) -> Result<(), InkReplayError> {
    let output_file = File::create(file).map_err(|e| InkReplayError::WriterError { source: e })?;
    let mut output_writer = BufWriter::new(output_file);
    output_writer
        .write_all(document.as_bytes())
        .map_err(|e| InkReplayError::WriterError { source: e })?;
    output_writer
        .flush()
        .map_err(|e| InkReplayError::WriterError { source: e })?;
    info!("Wrote {} bytes to {:?}", document.len(), file);
    Ok(())
}

/// Write kinematic series as pretty JSON for an external chart renderer
pub fn write_series(file: &Path, series: &KinematicSeries) -> Result<(), InkReplayError> {
    let output_file = File::create(file).map_err(|e| InkReplayError::WriterError { source: e })?;
    let mut output_writer = BufWriter::new(output_file);
    serde_json::to_writer_pretty(&mut output_writer, series)
        .map_err(|e| InkReplayError::SeriesSerializeError { source: e })?;
    output_writer
        .flush()
        .map_err(|e| InkReplayError::WriterError { source: e })?;
    Ok(())
}
