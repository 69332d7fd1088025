use inkreplay::capture::{CaptureSession, Point, Stroke, load_capture, save_capture};
use inkreplay::codec::{
    DocumentLayout, DocumentSerializer, SegmentEncoder, SegmentationConfig, SegmentationStrategy,
    SignatureMetadata, analyze, encode, serialize, try_analyze,
};
use inkreplay::kinematics::{ChartConfig, ChartKind, PlaybackSeeker, ScrubberSync, build_series};
use inkreplay::writer::write_document;
use inkreplay::{InkReplayError, VelocityDomain};
use proptest::prelude::*;
use tempfile::TempDir;

/// Twelve evenly spaced points on a horizontal line from (0,0) to (110,0) over 600ms
fn straight_line_stroke() -> Stroke {
    let points = (0..12)
        .map(|i| Point::new(i as f64 * 10., 0., i as f64 * 600. / 11.))
        .collect();
    Stroke::new(points).unwrap()
}

fn wavy_session(strokes: usize, points_per_stroke: usize) -> Vec<Stroke> {
    (0..strokes)
        .map(|s| {
            let base = s as f64 * 2000.;
            let points = (0..points_per_stroke)
                .map(|i| {
                    let t = i as f64;
                    Point::new(10. + t * 3., 150. + (t / 4.).sin() * 40., base + t * 16.)
                })
                .collect();
            Stroke::new(points).unwrap()
        })
        .collect()
}

#[derive(Default)]
struct RecordingSeeker {
    seeks: Vec<f64>,
}

impl PlaybackSeeker for RecordingSeeker {
    fn seek(&mut self, time_s: f64) -> Result<(), InkReplayError> {
        self.seeks.push(time_s);
        Ok(())
    }
}

#[test]
fn test_straight_line_round_trip() {
    let document = encode(&[straight_line_stroke()]).unwrap();
    assert_eq!(document.segments.len(), 4);

    let svg = serialize(&document);
    let analysis = analyze(&svg).expect("encoded document should analyze");

    assert_eq!(analysis.records.len(), 4);
    assert!((analysis.total_duration - 0.6).abs() < 0.005);
    assert!((analysis.total_distance() - 110.).abs() < 0.1);

    let last = analysis.records.last().unwrap();
    assert!((last.cumulative_distance - 110.).abs() < 0.1);
    assert!((last.end_time - 0.6).abs() < 0.005);
    assert_eq!(analysis.records[0].start_time, 0.);
}

#[test]
fn test_cumulative_distance_is_monotone_and_sums_segments() {
    let document = encode(&wavy_session(3, 57)).unwrap();
    let analysis = analyze(&serialize(&document)).unwrap();

    let mut running = 0.;
    for pair in analysis.records.windows(2) {
        assert!(pair[1].cumulative_distance >= pair[0].cumulative_distance);
    }
    for record in &analysis.records {
        running += record.distance;
        assert!((record.cumulative_distance - running).abs() < 1e-6);
        assert!(record.velocity >= 0.);
    }
}

#[test]
fn test_zero_duration_session_is_safe() {
    let points = (0..6).map(|i| Point::new(i as f64 * 5., 0., 42.)).collect();
    let document = encode(&[Stroke::new(points).unwrap()]).unwrap();
    assert_eq!(document.total_duration, 0.);

    let svg = serialize(&document);
    assert!(!svg.contains("NaN"));
    assert!(!svg.contains("inf"));

    let analysis = analyze(&svg).unwrap();
    assert_eq!(analysis.total_duration, 0.);
    assert!(analysis.records.iter().all(|r| r.velocity == 0.));
    assert!((analysis.total_distance() - 25.).abs() < 0.1);
}

#[test]
fn test_short_strokes_encode_to_empty_document() {
    let strokes = vec![
        Stroke::new(vec![Point::new(0., 0., 0.), Point::new(1., 1., 10.)]).unwrap(),
        Stroke::new(vec![Point::new(5., 5., 20.)]).unwrap(),
    ];
    let document = encode(&strokes).unwrap();
    assert!(document.is_empty());

    assert!(analyze(&serialize(&document)).is_none());

    let series = build_series(&[], 0., VelocityDomain::Time, &ChartConfig::default());
    assert!(series.is_empty());
}

#[test]
fn test_empty_input_is_rejected() {
    assert!(matches!(
        encode(&[]),
        Err(InkReplayError::InsufficientInput { .. })
    ));
}

#[test]
fn test_scrub_through_full_pipeline() {
    let document = encode(&wavy_session(2, 40)).unwrap();
    let analysis = analyze(&serialize(&document)).unwrap();
    let series = build_series(
        &analysis.records,
        analysis.total_duration,
        VelocityDomain::Time,
        &ChartConfig::default(),
    );
    let mut sync = ScrubberSync::from_series(&analysis.records, analysis.total_duration, &series);
    let mut seeker = RecordingSeeker::default();

    for (index, record) in analysis.records.iter().enumerate() {
        let pixel = series.distance_scale.map(record.cumulative_distance);
        let outcome = sync
            .scrub(ChartKind::Distance, pixel, &mut seeker)
            .expect("pixel on a record lands on the chart");
        assert_eq!(outcome.record_index, index);
        assert_eq!(outcome.playback_time, record.end_time);
        assert!((outcome.cursors.distance_chart_x - pixel).abs() < 1e-6);
    }
    assert_eq!(seeker.seeks.len(), analysis.records.len());

    let halfway = series.time_scale.map(analysis.total_duration / 2.);
    let outcome = sync.scrub(ChartKind::Time, halfway, &mut seeker).unwrap();
    assert!((outcome.playback_time - analysis.total_duration / 2.).abs() < 1e-6);
    assert_eq!(sync.last_cursor(), Some(outcome.cursors));

    assert!(sync.scrub(ChartKind::Time, -50., &mut seeker).is_none());
    assert_eq!(sync.last_cursor(), Some(outcome.cursors));
}

#[test]
fn test_capture_file_to_document_on_disk() {
    let dir = TempDir::new().unwrap();
    let capture_path = dir.path().join("capture.jsonl");
    let document_path = dir.path().join("signature.svg");

    let mut session = CaptureSession::new();
    session.pointer_down(Point::new(0., 0., 0.));
    for i in 1..12 {
        session.pointer_move(Point::new(i as f64 * 10., 0., i as f64 * 50.));
    }
    session.pointer_up();
    save_capture(&capture_path, &session).unwrap();

    let reloaded = load_capture(&capture_path).unwrap();
    assert_eq!(reloaded.strokes(), session.strokes());

    let document = SegmentEncoder::new().encode(reloaded.strokes()).unwrap();
    write_document(&document_path, &serialize(&document)).unwrap();

    let text = std::fs::read_to_string(&document_path).unwrap();
    let analysis = try_analyze(&text).unwrap();
    assert_eq!(analysis.records.len(), 4);
    assert!((analysis.total_distance() - 110.).abs() < 0.1);
}

#[test]
fn test_signable_document_still_analyzes() {
    let document = encode(&[straight_line_stroke()]).unwrap();
    let plain = analyze(&serialize(&document)).unwrap();

    let layout = DocumentLayout::Signable(SignatureMetadata::new("Ada Lovelace", "approval"));
    let svg = DocumentSerializer::with_layout(layout).serialize(&document);
    assert!(svg.contains("Ada Lovelace"));

    let signable = analyze(&svg).unwrap();
    assert_eq!(signable, plain);
}

#[test]
fn test_fixed_count_strategy_round_trip() {
    let config = SegmentationConfig {
        strategy: SegmentationStrategy::FixedCount { segments: 10 },
        ..SegmentationConfig::default()
    };
    let encoder = SegmentEncoder::with_config(config, Default::default());
    let strokes = wavy_session(2, 30);
    let document = encoder.encode(&strokes).unwrap();
    let analysis = analyze(&serialize(&document)).unwrap();

    let drawn: f64 = strokes
        .iter()
        .map(|s| {
            s.points()
                .windows(2)
                .map(|w| w[0].distance_to(&w[1]))
                .sum::<f64>()
        })
        .sum();
    assert!((analysis.total_distance() - drawn).abs() < 0.1);
}

#[test]
fn test_malformed_document() {
    assert!(analyze("<svg><path").is_none());
    assert!(matches!(
        try_analyze("not xml at all"),
        Err(InkReplayError::MalformedDocument { .. })
    ));
}

fn arb_session() -> impl Strategy<Value = Vec<Stroke>> {
    prop::collection::vec(
        (
            prop::collection::vec((0.0..600.0f64, 0.0..300.0f64, 0.0..50.0f64), 3..40),
            0.0..500.0f64,
        ),
        1..5,
    )
    .prop_map(|strokes| {
        let mut clock = 0.;
        strokes
            .into_iter()
            .map(|(samples, gap)| {
                clock += gap;
                let points = samples
                    .into_iter()
                    .map(|(x, y, dt)| {
                        clock += dt;
                        Point::new(x, y, clock)
                    })
                    .collect();
                Stroke::new(points).unwrap()
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_round_trip_keeps_duration(strokes in arb_session()) {
        let document = encode(&strokes).unwrap();
        let analysis = analyze(&serialize(&document)).unwrap();

        prop_assert!((analysis.total_duration - document.total_duration).abs() <= 0.005 + 1e-9);
        let last = analysis.records.last().unwrap();
        prop_assert!((last.end_time - document.total_duration).abs() <= 0.005 + 1e-9);
        for record in &analysis.records {
            prop_assert!(record.start_time <= record.end_time);
            prop_assert!(record.end_time <= analysis.total_duration + 1e-9);
        }
    }
}
