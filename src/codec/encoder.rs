// Segment encoder for turning captured strokes into independently time-gated segments

use itertools::{Itertools, MinMaxResult};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::capture::{Point, Stroke};
use crate::errors::InkReplayError;

/// Strokes shorter than this are too short to animate and get dropped
pub const MIN_POINTS_PER_SEGMENT: usize = 3;
pub const MAX_POINTS_PER_SEGMENT: usize = 10;
pub const TARGET_SEGMENTS_PER_STROKE: usize = 20;
/// Minimum session size for the fixed-count strategy
pub const MIN_POINTS_FIXED_COUNT: usize = 2;
pub const DEFAULT_FIXED_SEGMENT_COUNT: usize = 100;

/// How strokes are cut into segments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SegmentationStrategy {
    /// Per-stroke windows sized from the stroke length
    Adaptive,
    /// A fixed number of windows over the whole session, split at stroke boundaries
    FixedCount {
        #[serde(default = "default_fixed_segment_count")]
        segments: usize,
    },
}

fn default_fixed_segment_count() -> usize {
    DEFAULT_FIXED_SEGMENT_COUNT
}

/// Configuration for segment generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub strategy: SegmentationStrategy,
    pub min_points_per_segment: usize,
    pub max_points_per_segment: usize,
    pub target_segments_per_stroke: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            strategy: SegmentationStrategy::Adaptive,
            min_points_per_segment: MIN_POINTS_PER_SEGMENT,
            max_points_per_segment: MAX_POINTS_PER_SEGMENT,
            target_segments_per_stroke: TARGET_SEGMENTS_PER_STROKE,
        }
    }
}

/// Presentation shared by every segment of a document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentStyle {
    /// Canvas width in pixels, also the width of the coordinate space
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    pub stroke_color: String,
    pub stroke_width: f64,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            width: 600,
            height: 300,
            stroke_color: "blue".to_string(),
            stroke_width: 1.5,
        }
    }
}

/// Normalized interval in which a segment switches from hidden to visible.
/// Both ends lie in `[0, 1]` and `start <= end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VisibilityWindow {
    pub start: f64,
    pub end: f64,
}

impl VisibilityWindow {
    fn normalized(
        segment_start_ms: f64,
        segment_end_ms: f64,
        session_start_ms: f64,
        safe_duration_s: f64,
    ) -> Self {
        let t1 = ((segment_start_ms - session_start_ms) / 1000. / safe_duration_s).clamp(0., 1.);
        let t2 = ((segment_end_ms - session_start_ms) / 1000. / safe_duration_s).clamp(t1, 1.);
        Self { start: t1, end: t2 }
    }
}

/// A bounded run of one stroke's points. Every segment after the first in a stroke
/// starts with the last point of the segment before it.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Index of the source stroke in the capture session
    pub stroke_index: usize,
    pub points: Vec<Point>,
    pub window: VisibilityWindow,
}

impl Segment {
    pub fn start_time(&self) -> f64 {
        self.points.first().map(|p| p.time).unwrap_or_default()
    }

    pub fn end_time(&self) -> f64 {
        self.points.last().map(|p| p.time).unwrap_or_default()
    }
}

/// In-memory form of an encoded capture, rendered to text only when serialized
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedDocument {
    pub style: DocumentStyle,
    pub segments: Vec<Segment>,
    /// Seconds between the first and last sample of the session, never negative
    pub total_duration: f64,
}

impl AnimatedDocument {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Encoder from strokes to an animated document
pub struct SegmentEncoder {
    config: SegmentationConfig,
    style: DocumentStyle,
}

impl SegmentEncoder {
    /// Create an encoder with the adaptive strategy and the default canvas
    pub fn new() -> Self {
        Self {
            config: SegmentationConfig::default(),
            style: DocumentStyle::default(),
        }
    }

    pub fn with_config(config: SegmentationConfig, style: DocumentStyle) -> Self {
        Self { config, style }
    }

    /// Smallest session that can be encoded with the configured strategy
    pub fn minimum_points(&self) -> usize {
        match self.config.strategy {
            SegmentationStrategy::Adaptive => self.config.min_points_per_segment,
            SegmentationStrategy::FixedCount { .. } => MIN_POINTS_FIXED_COUNT,
        }
    }

    /// Encode the strokes of a capture session.
    ///
    /// Fails with `InsufficientInput` when the session holds fewer points than the
    /// strategy needs. Strokes too short to segment are silently left out, so a
    /// session made only of short strokes encodes into an empty document.
    pub fn encode(&self, strokes: &[Stroke]) -> Result<AnimatedDocument, InkReplayError> {
        self.validate_config()?;

        let point_count: usize = strokes.iter().map(Stroke::len).sum();
        let minimum = self.minimum_points();
        if point_count < minimum {
            return Err(InkReplayError::InsufficientInput {
                found: point_count,
                minimum,
            });
        }

        let (session_start, session_end) = match strokes
            .iter()
            .flat_map(|s| s.points())
            .map(|p| p.time)
            .minmax_by(|a, b| a.total_cmp(b))
        {
            MinMaxResult::NoElements => {
                return Err(InkReplayError::InsufficientInput {
                    found: 0,
                    minimum,
                });
            }
            MinMaxResult::OneElement(t) => (t, t),
            MinMaxResult::MinMax(start, end) => (start, end),
        };
        let total_duration = ((session_end - session_start) / 1000.).max(0.);
        let safe_duration = if total_duration > 0. {
            total_duration
        } else {
            debug!("Capture has zero duration, every segment will show immediately");
            1.
        };

        let windows = match self.config.strategy {
            SegmentationStrategy::Adaptive => self.adaptive_windows(strokes),
            SegmentationStrategy::FixedCount { segments } => fixed_count_windows(strokes, segments),
        };

        let segments = windows
            .into_iter()
            .map(|(stroke_index, points)| {
                let mut segment = Segment {
                    stroke_index,
                    points,
                    window: VisibilityWindow::default(),
                };
                segment.window = VisibilityWindow::normalized(
                    segment.start_time(),
                    segment.end_time(),
                    session_start,
                    safe_duration,
                );
                segment
            })
            .collect_vec();

        if segments.is_empty() {
            warn!(
                "No stroke in the session was long enough to animate ({} points over {} strokes)",
                point_count,
                strokes.len()
            );
        }
        info!(
            "Encoded {} strokes into {} segments over {:.2}s",
            strokes.len(),
            segments.len(),
            total_duration
        );

        Ok(AnimatedDocument {
            style: self.style.clone(),
            segments,
            total_duration,
        })
    }

    /// Points per segment for a stroke of the given length. Short strokes get a
    /// few large segments, long strokes many small ones.
    pub fn points_per_segment(&self, stroke_len: usize) -> usize {
        let target =
            (stroke_len as f64 / self.config.target_segments_per_stroke as f64).round() as usize;
        target.clamp(
            self.config.min_points_per_segment,
            self.config.max_points_per_segment,
        )
    }

    fn adaptive_windows(&self, strokes: &[Stroke]) -> Vec<(usize, Vec<Point>)> {
        let mut windows = Vec::new();
        for (stroke_index, stroke) in strokes.iter().enumerate() {
            if stroke.len() < self.config.min_points_per_segment {
                debug!(
                    "Dropping stroke {} with only {} points",
                    stroke_index,
                    stroke.len()
                );
                continue;
            }
            let size = self.points_per_segment(stroke.len());
            windows.extend(
                split_stroke(stroke.points(), size)
                    .into_iter()
                    .map(|window| (stroke_index, window)),
            );
        }
        windows
    }

    fn validate_config(&self) -> Result<(), InkReplayError> {
        let config = &self.config;
        if config.min_points_per_segment < 2 {
            return Err(InkReplayError::InvalidUserInput {
                field: "min_points_per_segment".to_string(),
                reason: format!("{} is below 2", config.min_points_per_segment),
            });
        }
        if config.max_points_per_segment < config.min_points_per_segment {
            return Err(InkReplayError::InvalidUserInput {
                field: "max_points_per_segment".to_string(),
                reason: format!(
                    "{} is below the minimum of {}",
                    config.max_points_per_segment, config.min_points_per_segment
                ),
            });
        }
        if config.target_segments_per_stroke == 0 {
            return Err(InkReplayError::InvalidUserInput {
                field: "target_segments_per_stroke".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if let SegmentationStrategy::FixedCount { segments: 0 } = config.strategy {
            return Err(InkReplayError::InvalidUserInput {
                field: "segments".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for SegmentEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode with the default adaptive strategy and canvas
pub fn encode(strokes: &[Stroke]) -> Result<AnimatedDocument, InkReplayError> {
    SegmentEncoder::new().encode(strokes)
}

/// Cut one stroke into windows of `size` points, each window after the first
/// prefixed with the last point of the previous one.
fn split_stroke(points: &[Point], size: usize) -> Vec<Vec<Point>> {
    points
        .chunks(size)
        .enumerate()
        .filter_map(|(i, chunk)| {
            let mut window = Vec::with_capacity(chunk.len() + 1);
            if i > 0 {
                window.push(points[i * size - 1]);
            }
            window.extend_from_slice(chunk);
            (window.len() >= 2).then_some(window)
        })
        .collect()
}

/// Split the flattened session into `segments` windows with boundaries at
/// `floor(i * total / segments)`. Windows crossing a stroke boundary are cut in two,
/// and each run borrows the preceding point of its own stroke.
fn fixed_count_windows(strokes: &[Stroke], segments: usize) -> Vec<(usize, Vec<Point>)> {
    let located = strokes
        .iter()
        .enumerate()
        .flat_map(|(stroke_index, stroke)| (0..stroke.len()).map(move |i| (stroke_index, i)))
        .collect_vec();
    let total = located.len();

    let mut windows = Vec::new();
    for i in 0..segments {
        let start = i * total / segments;
        let end = (i + 1) * total / segments;
        if start >= end {
            continue;
        }
        let runs = located[start..end].iter().chunk_by(|(stroke_index, _)| *stroke_index);
        for (stroke_index, run) in &runs {
            let indices = run.map(|(_, point_index)| *point_index).collect_vec();
            let first = indices[0].saturating_sub(1);
            let last = indices[indices.len() - 1];
            let window = strokes[stroke_index].points()[first..=last].to_vec();
            if window.len() >= 2 {
                windows.push((stroke_index, window));
            }
        }
    }
    windows
}
