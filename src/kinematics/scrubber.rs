// Scrubber sync between the time-domain and distance-domain charts

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{KinematicSeries, LinearScale};
use crate::codec::AnalysisRecord;
use crate::errors::InkReplayError;

/// Chart a pointer event came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Time,
    Distance,
}

/// Cursor x positions on both charts, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CursorPositions {
    pub time_chart_x: f64,
    pub distance_chart_x: f64,
}

/// Where a scrub landed
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrubOutcome {
    pub record_index: usize,
    /// Seconds to seek the replay to
    pub playback_time: f64,
    /// Cumulative distance of the resolved record
    pub distance: f64,
    pub cursors: CursorPositions,
}

/// The replay that follows the scrubber. Implemented outside the codec.
pub trait PlaybackSeeker {
    fn seek(&mut self, time_s: f64) -> Result<(), InkReplayError>;
}

/// Maps chart pointer positions to playback time and keeps both chart cursors in step
pub struct ScrubberSync<'a> {
    records: &'a [AnalysisRecord],
    total_duration: f64,
    time_scale: LinearScale,
    distance_scale: LinearScale,
    last_cursor: Option<CursorPositions>,
}

impl<'a> ScrubberSync<'a> {
    pub fn new(
        records: &'a [AnalysisRecord],
        total_duration: f64,
        time_scale: LinearScale,
        distance_scale: LinearScale,
    ) -> Self {
        Self {
            records,
            total_duration,
            time_scale,
            distance_scale,
            last_cursor: None,
        }
    }

    pub fn from_series(
        records: &'a [AnalysisRecord],
        total_duration: f64,
        series: &KinematicSeries,
    ) -> Self {
        Self::new(
            records,
            total_duration,
            series.time_scale,
            series.distance_scale,
        )
    }

    /// Cursor positions after the last successful scrub
    pub fn last_cursor(&self) -> Option<CursorPositions> {
        self.last_cursor
    }

    /// Resolve a pointer position without touching cursors or playback.
    ///
    /// Returns `None` when there are no records or the pointer is off the chart.
    pub fn resolve(&self, chart: ChartKind, pixel: f64) -> Option<ScrubOutcome> {
        if self.records.is_empty() || !pixel.is_finite() {
            return None;
        }
        match chart {
            ChartKind::Time => {
                if !self.time_scale.range_contains(pixel) {
                    return None;
                }
                let time = self
                    .time_scale
                    .invert(pixel)
                    .clamp(0., self.total_duration.max(0.));
                let index = nearest_index(self.records, time, |r| r.end_time)?;
                let record = &self.records[index];
                Some(ScrubOutcome {
                    record_index: index,
                    playback_time: time,
                    distance: record.cumulative_distance,
                    cursors: CursorPositions {
                        time_chart_x: self.time_scale.map(time),
                        distance_chart_x: self.distance_scale.map(record.cumulative_distance),
                    },
                })
            }
            ChartKind::Distance => {
                if !self.distance_scale.range_contains(pixel) {
                    return None;
                }
                let distance = self.distance_scale.invert(pixel);
                let index = nearest_index(self.records, distance, |r| r.cumulative_distance)?;
                let record = &self.records[index];
                Some(ScrubOutcome {
                    record_index: index,
                    playback_time: record.end_time,
                    distance: record.cumulative_distance,
                    cursors: CursorPositions {
                        time_chart_x: self.time_scale.map(record.end_time),
                        distance_chart_x: self.distance_scale.map(record.cumulative_distance),
                    },
                })
            }
        }
    }

    /// Resolve a pointer position, move both cursors and seek the replay.
    ///
    /// A refused seek is logged and does not affect the cursors.
    pub fn scrub(
        &mut self,
        chart: ChartKind,
        pixel: f64,
        seeker: &mut dyn PlaybackSeeker,
    ) -> Option<ScrubOutcome> {
        let Some(outcome) = self.resolve(chart, pixel) else {
            debug!("Scrub at {:.1}px on {:?} chart resolved to nothing", pixel, chart);
            return None;
        };
        self.last_cursor = Some(outcome.cursors);
        if let Err(e) = seeker.seek(outcome.playback_time) {
            warn!(
                "Replay refused seek to {:.3}s: {}",
                outcome.playback_time, e
            );
        }
        Some(outcome)
    }
}

/// Left-bisect `records` on a non-decreasing key, then pick the nearer of the
/// bisection point and its predecessor. Ties go to the bisection point.
fn nearest_index(
    records: &[AnalysisRecord],
    target: f64,
    key: impl Fn(&AnalysisRecord) -> f64,
) -> Option<usize> {
    if records.is_empty() {
        return None;
    }
    let i = records.partition_point(|r| key(r) < target);
    if i == 0 {
        return Some(0);
    }
    if i == records.len() {
        return Some(records.len() - 1);
    }
    let before = target - key(&records[i - 1]);
    let after = key(&records[i]) - target;
    Some(if before < after { i - 1 } else { i })
}
