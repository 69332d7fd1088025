// Stroke capture model
// Points and strokes recorded between pointer-down and pointer-up, owned by an
// explicit capture session

pub mod loader;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::InkReplayError;

pub use loader::{CaptureEvent, load_capture, save_capture};

/// A single pointer sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Milliseconds from an arbitrary session-local origin. Never assume an epoch.
    pub time: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, time: f64) -> Self {
        Self { x, y, time }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Coordinates and time are all finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.time.is_finite()
    }
}

/// One continuous pointer-down to pointer-up sample sequence.
///
/// A stroke always holds at least one finite point and its timestamps never decrease.
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    /// Build a sealed stroke from recorded samples
    pub fn new(points: Vec<Point>) -> Result<Self, InkReplayError> {
        if points.is_empty() {
            return Err(InkReplayError::InvalidStroke {
                reason: "a stroke needs at least one point".to_string(),
            });
        }
        if let Some(pos) = points.iter().position(|p| !p.is_finite()) {
            return Err(InkReplayError::InvalidStroke {
                reason: format!("sample {} is not a finite point: {:?}", pos, points[pos]),
            });
        }
        if let Some(pos) = points.windows(2).position(|w| w[1].time < w[0].time) {
            return Err(InkReplayError::InvalidStroke {
                reason: format!(
                    "sample {} goes back in time ({:.3} < {:.3})",
                    pos + 1,
                    points[pos + 1].time,
                    points[pos].time
                ),
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> &Point {
        &self.points[0]
    }

    pub fn last(&self) -> &Point {
        &self.points[self.points.len() - 1]
    }
}

/// The in-progress capture. A new session or a reset replaces everything that was
/// drawn before; there is no merging.
#[derive(Clone, Debug, Default)]
pub struct CaptureSession {
    strokes: Vec<Stroke>,
    active: Option<Vec<Point>>,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new stroke. A stroke still open is sealed first.
    /// A non-finite sample opens nothing.
    pub fn pointer_down(&mut self, point: Point) {
        self.pointer_up();
        if !point.is_finite() {
            debug!("Ignoring non-finite pointer down {:?}", point);
            return;
        }
        self.active = Some(vec![point]);
    }

    /// Append a sample to the open stroke, if any. Non-finite samples are dropped.
    pub fn pointer_move(&mut self, mut point: Point) {
        let Some(points) = self.active.as_mut() else {
            return;
        };
        if !point.is_finite() {
            debug!("Dropping non-finite sample {:?}", point);
            return;
        }
        if let Some(previous) = points.last() {
            if point.time < previous.time {
                debug!(
                    "Clamping out of order sample time {:.3} to {:.3}",
                    point.time, previous.time
                );
                point.time = previous.time;
            }
        }
        points.push(point);
    }

    /// Seal the open stroke
    pub fn pointer_up(&mut self) {
        if let Some(points) = self.active.take() {
            // points is never empty here, pointer_down always seeds it
            self.strokes.push(Stroke { points });
        }
    }

    pub fn reset(&mut self) {
        self.strokes.clear();
        self.active = None;
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Sealed strokes, in capture order
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn into_strokes(mut self) -> Vec<Stroke> {
        self.pointer_up();
        self.strokes
    }

    /// Number of samples across all sealed strokes
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }
}
