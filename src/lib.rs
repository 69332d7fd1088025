// Library interface for inkreplay
// This allows integration tests and benches to access internal modules

pub mod capture;
pub mod codec;
pub mod config;
pub mod errors;
pub mod kinematics;
pub mod writer;

// Re-export commonly used types
pub use capture::{CaptureSession, Point, Stroke};
pub use codec::{
    AnalysisRecord, AnimatedDocument, DocumentAnalysis, DocumentSerializer, SegmentEncoder,
    analyze, encode, serialize,
};
pub use config::AppConfig;
pub use errors::InkReplayError;
pub use kinematics::{
    ChartKind, KinematicSeries, LinearScale, PlaybackSeeker, ScrubberSync, VelocityDomain,
    build_series,
};
