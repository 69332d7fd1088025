// Temporal stroke codec
// Encodes strokes into time-gated SVG segments and decodes such documents back
// into per-segment kinematics

pub mod analyzer;
pub mod encoder;
pub mod serializer;

// Re-export commonly used types
pub use analyzer::{AnalysisRecord, DocumentAnalysis, analyze, try_analyze};
pub use encoder::{
    AnimatedDocument, DEFAULT_FIXED_SEGMENT_COUNT, DocumentStyle, Segment, SegmentEncoder, SegmentationConfig,
    SegmentationStrategy, VisibilityWindow, encode,
};
pub use serializer::{DocumentLayout, DocumentSerializer, SignatureMetadata, serialize};
