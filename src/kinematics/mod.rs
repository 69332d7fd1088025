// Kinematic series and chart scales derived from analysis records

pub mod scrubber;

use serde::{Deserialize, Serialize};

use crate::codec::AnalysisRecord;

pub use scrubber::{ChartKind, CursorPositions, PlaybackSeeker, ScrubOutcome, ScrubberSync};

/// Pixel tolerance used when deciding whether a pointer lies on a chart
const RANGE_EPSILON: f64 = 1e-9;

/// Independent variable of the velocity chart
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelocityDomain {
    #[default]
    Time,
    Distance,
}

/// Invertible linear mapping from a value domain to a pixel range
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// `[0, 1]` onto `[0, 1]`, used when there is nothing to chart
    pub fn identity() -> Self {
        Self::new((0., 1.), (0., 1.))
    }

    /// Value to pixel. A zero-width domain maps everything to the start of the range.
    pub fn map(&self, value: f64) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span == 0. {
            return self.range.0;
        }
        self.range.0 + (value - self.domain.0) / span * (self.range.1 - self.range.0)
    }

    /// Pixel to value. A zero-width range inverts to the start of the domain.
    pub fn invert(&self, pixel: f64) -> f64 {
        let span = self.range.1 - self.range.0;
        if span == 0. || self.domain.1 == self.domain.0 {
            return self.domain.0;
        }
        self.domain.0 + (pixel - self.range.0) / span * (self.domain.1 - self.domain.0)
    }

    /// Whether a pixel lies on the range, regardless of its direction
    pub fn range_contains(&self, pixel: f64) -> bool {
        let (low, high) = if self.range.0 <= self.range.1 {
            (self.range.0, self.range.1)
        } else {
            (self.range.1, self.range.0)
        };
        pixel >= low - RANGE_EPSILON && pixel <= high + RANGE_EPSILON
    }
}

/// Pixel extents of the two charts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub time_range: (f64, f64),
    pub distance_range: (f64, f64),
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            time_range: (0., 600.),
            distance_range: (0., 600.),
        }
    }
}

/// Data series and scales ready to hand to a chart renderer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KinematicSeries {
    /// `(end_time, cumulative_distance)` per record
    pub displacement: Vec<[f64; 2]>,
    /// `(start_time | cumulative_distance, velocity)` per record
    pub velocity: Vec<[f64; 2]>,
    pub velocity_domain: VelocityDomain,
    pub time_scale: LinearScale,
    pub distance_scale: LinearScale,
}

impl KinematicSeries {
    pub fn is_empty(&self) -> bool {
        self.displacement.is_empty()
    }
}

pub fn displacement_series(records: &[AnalysisRecord]) -> Vec<[f64; 2]> {
    records
        .iter()
        .map(|r| [r.end_time, r.cumulative_distance])
        .collect()
}

pub fn velocity_series(records: &[AnalysisRecord], domain: VelocityDomain) -> Vec<[f64; 2]> {
    records
        .iter()
        .map(|r| match domain {
            VelocityDomain::Time => [r.start_time, r.velocity],
            VelocityDomain::Distance => [r.cumulative_distance, r.velocity],
        })
        .collect()
}

/// Build the displacement and velocity series plus the time and distance scales.
///
/// With no records the series are empty and both scales are identities; callers
/// should not render in that case.
pub fn build_series(
    records: &[AnalysisRecord],
    total_duration: f64,
    velocity_domain: VelocityDomain,
    charts: &ChartConfig,
) -> KinematicSeries {
    if records.is_empty() {
        return KinematicSeries {
            displacement: Vec::new(),
            velocity: Vec::new(),
            velocity_domain,
            time_scale: LinearScale::identity(),
            distance_scale: LinearScale::identity(),
        };
    }

    let max_distance = records
        .iter()
        .map(|r| r.cumulative_distance)
        .fold(0., f64::max);

    KinematicSeries {
        displacement: displacement_series(records),
        velocity: velocity_series(records, velocity_domain),
        velocity_domain,
        time_scale: LinearScale::new((0., total_duration.max(0.)), charts.time_range),
        distance_scale: LinearScale::new((0., max_distance), charts.distance_range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, start: f64, end: f64, distance: f64, cumulative: f64) -> AnalysisRecord {
        AnalysisRecord {
            index,
            start_time: start,
            end_time: end,
            distance,
            velocity: if end > start { distance / (end - start) } else { 0. },
            cumulative_distance: cumulative,
        }
    }

    fn sample_records() -> Vec<AnalysisRecord> {
        vec![
            record(0, 0., 0.5, 10., 10.),
            record(1, 0.5, 1., 30., 40.),
            record(2, 1., 2., 20., 60.),
        ]
    }

    #[test]
    fn test_linear_scale_round_trip() {
        let scale = LinearScale::new((0., 2.), (40., 440.));
        assert_eq!(scale.map(0.), 40.);
        assert_eq!(scale.map(1.), 240.);
        assert_eq!(scale.map(2.), 440.);
        assert_eq!(scale.invert(240.), 1.);
        assert!(scale.range_contains(40.));
        assert!(scale.range_contains(440.));
        assert!(!scale.range_contains(441.));
    }

    #[test]
    fn test_reversed_range() {
        let scale = LinearScale::new((0., 100.), (300., 0.));
        assert_eq!(scale.map(0.), 300.);
        assert_eq!(scale.map(100.), 0.);
        assert_eq!(scale.invert(150.), 50.);
        assert!(scale.range_contains(10.));
    }

    #[test]
    fn test_degenerate_domain() {
        let scale = LinearScale::new((0., 0.), (0., 600.));
        assert_eq!(scale.map(5.), 0.);
        assert_eq!(scale.invert(300.), 0.);
    }

    #[test]
    fn test_build_series_time_domain() {
        let records = sample_records();
        let series = build_series(&records, 2., VelocityDomain::Time, &ChartConfig::default());

        assert_eq!(
            series.displacement,
            vec![[0.5, 10.], [1., 40.], [2., 60.]]
        );
        assert_eq!(series.velocity, vec![[0., 20.], [0.5, 60.], [1., 20.]]);
        assert_eq!(series.time_scale.domain, (0., 2.));
        assert_eq!(series.distance_scale.domain, (0., 60.));
        assert_eq!(series.distance_scale.range, (0., 600.));
    }

    #[test]
    fn test_build_series_distance_domain() {
        let records = sample_records();
        let series = build_series(
            &records,
            2.,
            VelocityDomain::Distance,
            &ChartConfig::default(),
        );
        assert_eq!(series.velocity, vec![[10., 20.], [40., 60.], [60., 20.]]);
        assert_eq!(series.velocity_domain, VelocityDomain::Distance);
    }

    #[test]
    fn test_build_series_without_records() {
        let series = build_series(&[], 0., VelocityDomain::Time, &ChartConfig::default());
        assert!(series.is_empty());
        assert!(series.velocity.is_empty());
        assert_eq!(series.time_scale, LinearScale::identity());
        assert_eq!(series.distance_scale, LinearScale::identity());
    }

    #[test]
    fn test_displacement_is_monotone() {
        let series = displacement_series(&sample_records());
        for pair in series.windows(2) {
            assert!(pair[0][0] <= pair[1][0]);
            assert!(pair[0][1] <= pair[1][1]);
        }
    }
}
