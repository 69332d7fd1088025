use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{error, info};

use inkreplay::{
    AppConfig, ChartKind, InkReplayError, PlaybackSeeker, ScrubberSync, VelocityDomain,
    build_series,
    capture::load_capture,
    codec::{
        DEFAULT_FIXED_SEGMENT_COUNT, DocumentLayout, DocumentSerializer, SegmentEncoder,
        SegmentationConfig, SegmentationStrategy, SignatureMetadata, try_analyze,
    },
    writer::{write_document, write_series},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Config file to use instead of the one in the user config directory
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a capture file into an animated SVG document
    Encode {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use a fixed number of segments over the whole capture, 100 when no
        /// count is given
        #[arg(short, long, num_args = 0..=1)]
        segments: Option<Option<usize>>,

        /// Lay out a signature metadata block for this signer
        #[arg(long)]
        signer: Option<String>,

        #[arg(long, default_value = "signature")]
        intent: String,
    },
    /// Analyze an animated SVG document into kinematic series
    Analyze {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Domain::Time)]
        domain: Domain,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Resolve a chart pointer position into playback time and cursor positions
    Scrub {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long, value_enum)]
        chart: Domain,

        #[arg(short, long, allow_negative_numbers = true)]
        pixel: f64,
    },
    /// Write the config file with every setting filled in, so it can be edited
    InitConfig,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Domain {
    Time,
    Distance,
}

impl From<Domain> for VelocityDomain {
    fn from(value: Domain) -> Self {
        match value {
            Domain::Time => VelocityDomain::Time,
            Domain::Distance => VelocityDomain::Distance,
        }
    }
}

impl From<Domain> for ChartKind {
    fn from(value: Domain) -> Self {
        match value {
            Domain::Time => ChartKind::Time,
            Domain::Distance => ChartKind::Distance,
        }
    }
}

/// Stands in for the replay renderer, which lives outside this tool
struct PrintingSeeker;

impl PlaybackSeeker for PrintingSeeker {
    fn seek(&mut self, time_s: f64) -> Result<(), InkReplayError> {
        println!("seek {:.3}s", time_s);
        Ok(())
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, InkReplayError> {
    match path {
        Some(path) => AppConfig::from_file(path),
        None => Ok(AppConfig::from_local_file()?.unwrap_or_default()),
    }
}

fn read_document(input: &Path) -> Result<String, InkReplayError> {
    if !input.exists() {
        return Err(InkReplayError::InvalidUserInput {
            field: "input".to_string(),
            reason: format!("{:?} does not exist", input),
        });
    }
    std::fs::read_to_string(input).map_err(|e| InkReplayError::DocumentReadError { source: e })
}

/// `--segments` switches to the fixed-count strategy, with the default count when
/// the flag carries no value
fn segmentation_for(
    mut segmentation: SegmentationConfig,
    segments: Option<Option<usize>>,
) -> SegmentationConfig {
    if let Some(segments) = segments {
        segmentation.strategy = SegmentationStrategy::FixedCount {
            segments: segments.unwrap_or(DEFAULT_FIXED_SEGMENT_COUNT),
        };
    }
    segmentation
}

fn encode(
    config: AppConfig,
    input: &Path,
    output: Option<&Path>,
    segments: Option<Option<usize>>,
    signer: Option<String>,
    intent: String,
) -> Result<(), InkReplayError> {
    let session = load_capture(input)?;

    let segmentation = segmentation_for(config.segmentation, segments);
    let encoder = SegmentEncoder::with_config(segmentation, config.style);
    let document = encoder.encode(session.strokes())?;

    let layout = match signer {
        Some(signer) => DocumentLayout::Signable(SignatureMetadata::new(signer, intent)),
        None => DocumentLayout::Plain,
    };
    let svg = DocumentSerializer::with_layout(layout).serialize(&document);

    match output {
        Some(output) => write_document(output, &svg),
        None => {
            println!("{}", svg);
            Ok(())
        }
    }
}

fn analyze(
    config: AppConfig,
    input: &Path,
    domain: Domain,
    output: Option<&Path>,
) -> Result<(), InkReplayError> {
    let analysis = try_analyze(&read_document(input)?)?;
    let series = build_series(
        &analysis.records,
        analysis.total_duration,
        domain.into(),
        &config.charts,
    );

    println!(
        "{:>5} {:>9} {:>9} {:>10} {:>10} {:>11}",
        "index", "start_s", "end_s", "distance", "velocity", "cumulative"
    );
    for record in &analysis.records {
        println!(
            "{:>5} {:>9.3} {:>9.3} {:>10.2} {:>10.2} {:>11.2}",
            record.index,
            record.start_time,
            record.end_time,
            record.distance,
            record.velocity,
            record.cumulative_distance
        );
    }
    println!(
        "total: {:.2} units over {:.2}s",
        analysis.total_distance(),
        analysis.total_duration
    );

    if let Some(output) = output {
        write_series(output, &series)?;
        info!("Wrote kinematic series to {:?}", output);
    }
    Ok(())
}

fn scrub(config: AppConfig, input: &Path, chart: Domain, pixel: f64) -> Result<(), InkReplayError> {
    let analysis = try_analyze(&read_document(input)?)?;
    let series = build_series(
        &analysis.records,
        analysis.total_duration,
        VelocityDomain::Time,
        &config.charts,
    );
    let mut sync = ScrubberSync::from_series(&analysis.records, analysis.total_duration, &series);

    match sync.scrub(chart.into(), pixel, &mut PrintingSeeker) {
        Some(outcome) => println!(
            "record {} at {:.3}s, distance {:.2}; cursors: time chart {:.1}px, distance chart {:.1}px",
            outcome.record_index,
            outcome.playback_time,
            outcome.distance,
            outcome.cursors.time_chart_x,
            outcome.cursors.distance_chart_x
        ),
        None => println!("pointer is off the chart, nothing to scrub"),
    }
    Ok(())
}

/// Settings already in the file are kept, missing ones get their defaults
fn init_config(path: Option<&Path>) -> Result<(), InkReplayError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => AppConfig::default_path()?,
    };
    let config = if path.exists() {
        AppConfig::from_file(&path)?
    } else {
        AppConfig::default()
    };
    config.save_to(&path)?;
    info!("Saved config to {:?}", path);
    println!("{}", path.display());
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    let result = match cli.command {
        Commands::InitConfig => init_config(cli.config.as_deref()),
        command => load_config(cli.config.as_deref()).and_then(|config| run(config, command)),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(config: AppConfig, command: Commands) -> Result<(), InkReplayError> {
    match command {
        Commands::Encode {
            input,
            output,
            segments,
            signer,
            intent,
        } => encode(config, &input, output.as_deref(), segments, signer, intent),
        Commands::Analyze {
            input,
            domain,
            output,
        } => analyze(config, &input, domain, output.as_deref()),
        Commands::Scrub {
            input,
            chart,
            pixel,
        } => scrub(config, &input, chart, pixel),
        Commands::InitConfig => init_config(None),
    }
}
