// Decoder that recovers per-segment timing and kinematics from an animation document

use kurbo::{BezPath, ParamCurveArclen};
use log::{debug, info, warn};
use roxmltree::{Document, Node, ParsingOptions};
use serde::{Deserialize, Serialize};

use crate::errors::InkReplayError;

/// Accuracy for curved path segments. Straight lines are measured exactly.
const ARCLEN_ACCURACY: f64 = 1e-6;

/// Decoded kinematic summary of one segment
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub index: usize,
    /// Seconds from the start of playback at which the segment starts showing
    pub start_time: f64,
    /// Seconds from the start of playback at which the segment is fully shown
    pub end_time: f64,
    /// Arc length of the segment path in canvas units
    pub distance: f64,
    /// Canvas units per second, 0 when the segment has no duration
    pub velocity: f64,
    /// Running sum of `distance` up to and including this record
    pub cumulative_distance: f64,
}

/// Result of one analysis pass. A new parse always produces a new value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub records: Vec<AnalysisRecord>,
    /// Longest animation duration seen on any segment, in seconds
    pub total_duration: f64,
}

impl DocumentAnalysis {
    pub fn total_distance(&self) -> f64 {
        self.records
            .last()
            .map(|r| r.cumulative_distance)
            .unwrap_or_default()
    }
}

/// Timing and geometry read off a single animated path
struct SegmentReading {
    start_time: f64,
    end_time: f64,
    duration: f64,
    distance: f64,
}

/// Analyze a document, returning `None` when it holds no usable animated segment
pub fn analyze(text: &str) -> Option<DocumentAnalysis> {
    match try_analyze(text) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            warn!("Nothing to analyze: {}", e);
            None
        }
    }
}

/// Analyze a document, reporting why nothing could be recovered.
///
/// Segments missing their geometry or their visibility animation are skipped; the
/// document is only rejected when no segment survives.
pub fn try_analyze(text: &str) -> Result<DocumentAnalysis, InkReplayError> {
    let mut options = ParsingOptions::default();
    options.allow_dtd = true;
    let document =
        Document::parse_with_options(text, options).map_err(|e| InkReplayError::MalformedDocument {
            reason: format!("not a well-formed document: {}", e),
        })?;

    let mut analysis = DocumentAnalysis::default();
    let mut cumulative_distance = 0.;
    let mut skipped = 0;

    for (i, node) in document
        .descendants()
        .filter(|n| is_element(n, "path"))
        .enumerate()
    {
        let reading = match read_segment(&node) {
            Ok(reading) => reading,
            Err(reason) => {
                debug!("Skipping path {}: {}", i, reason);
                skipped += 1;
                continue;
            }
        };

        let interval = reading.end_time - reading.start_time;
        let velocity = if interval > 0. {
            reading.distance / interval
        } else {
            0.
        };
        cumulative_distance += reading.distance;
        analysis.total_duration = analysis.total_duration.max(reading.duration);
        analysis.records.push(AnalysisRecord {
            index: analysis.records.len(),
            start_time: reading.start_time,
            end_time: reading.end_time,
            distance: reading.distance,
            velocity,
            cumulative_distance,
        });
    }

    if analysis.records.is_empty() {
        return Err(InkReplayError::MalformedDocument {
            reason: format!("no animated segments found ({} paths skipped)", skipped),
        });
    }

    info!(
        "Analyzed {} segments ({} skipped), {:.2} units over {:.2}s",
        analysis.records.len(),
        skipped,
        cumulative_distance,
        analysis.total_duration
    );
    Ok(analysis)
}

fn is_element(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn read_segment(node: &Node) -> Result<SegmentReading, String> {
    let d = node.attribute("d").ok_or("missing path data")?;
    let animation = node
        .children()
        .find(|c| is_element(c, "animate") && c.attribute("attributeName") == Some("visibility"))
        .ok_or("missing visibility animation")?;

    let key_times = animation
        .attribute("keyTimes")
        .ok_or("missing keyTimes")?
        .split(';')
        .map(|k| k.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("bad keyTimes: {}", e))?;
    if key_times.len() < 3 {
        return Err(format!("expected at least 3 keyTimes, got {}", key_times.len()));
    }
    let (t1, t2) = (key_times[1], key_times[2]);
    if !(t1.is_finite() && t2.is_finite() && 0. <= t1 && t1 <= t2 && t2 <= 1.) {
        return Err(format!("keyTimes window [{}, {}] is not within [0, 1]", t1, t2));
    }

    let dur = animation.attribute("dur").ok_or("missing dur")?;
    let duration = parse_clock_value(dur).ok_or_else(|| format!("bad dur: {:?}", dur))?;

    Ok(SegmentReading {
        start_time: t1 * duration,
        end_time: t2 * duration,
        duration,
        distance: path_length(d)?,
    })
}

/// SMIL clock value in seconds: `0.60s`, `600ms` or a bare number of seconds
fn parse_clock_value(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let seconds = if let Some(ms) = raw.strip_suffix("ms") {
        ms.trim().parse::<f64>().ok()? / 1000.
    } else if let Some(s) = raw.strip_suffix('s') {
        s.trim().parse::<f64>().ok()?
    } else {
        raw.parse::<f64>().ok()?
    };
    (seconds.is_finite() && seconds >= 0.).then_some(seconds)
}

/// Arc length of an SVG path
pub fn path_length(d: &str) -> Result<f64, String> {
    let path = BezPath::from_svg(d).map_err(|e| format!("bad path data: {}", e))?;
    let mut segments = path.segments().peekable();
    if segments.peek().is_none() {
        return Err("path has no drawable segments".to_string());
    }
    let length: f64 = segments.map(|seg| seg.arclen(ARCLEN_ACCURACY)).sum();
    if !length.is_finite() {
        return Err(format!("path length is not finite: {}", length));
    }
    Ok(length)
}
