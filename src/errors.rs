// Error types for inkreplay

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum InkReplayError {
    // Errors while capturing and encoding strokes
    #[snafu(display("Not enough points to encode: found {found}, need at least {minimum}"))]
    InsufficientInput { found: usize, minimum: usize },
    #[snafu(display("Invalid stroke: {reason}"))]
    InvalidStroke { reason: String },

    // Errors while analyzing an encoded document
    #[snafu(display("Error reading animation document"))]
    DocumentReadError { source: io::Error },
    #[snafu(display("Malformed animation document: {reason}"))]
    MalformedDocument { reason: String },

    // Errors reported by the replay collaborator
    #[snafu(display("Playback refused seek: {reason}"))]
    ExternalSeekFailure { reason: String },

    // Capture file errors
    #[snafu(display("Error reading capture file"))]
    CaptureFileError { source: io::Error },
    #[snafu(display("Invalid capture file: {path}"))]
    InvalidCaptureFile { path: String },

    // Errors for the document writer
    #[snafu(display("Error writing output file"))]
    WriterError { source: io::Error },
    #[snafu(display("Error serializing kinematic series"))]
    SeriesSerializeError { source: serde_json::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },
}
