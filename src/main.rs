use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use football_analysis::{video, AnalysisConfig, Annotator, DetectionReplay, Displacement, FootballAnalysis};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "football-analysis")]
#[command(about = "Track players, teams and ball control in a football video", long_about = None)]
struct Args {
    /// Input video
    #[arg(long)]
    input: PathBuf,

    /// Recorded detections (JSON)
    #[arg(long)]
    detections: PathBuf,

    /// Annotated output video (.avi)
    #[arg(long)]
    output: PathBuf,

    /// YAML configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Track stub file, overrides the configured one
    #[arg(long)]
    stub: Option<PathBuf>,

    /// Reuse the track stub instead of running detection
    #[arg(long)]
    read_stub: bool,

    /// Per-frame camera displacements (JSON array of {dx, dy})
    #[arg(long)]
    camera_motion: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if args.stub.is_some() {
        config.stub.path = args.stub.clone();
    }
    config.stub.read |= args.read_stub;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("football_analysis={}", config.logging.level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let input = video::read_video(&args.input).with_context(|| format!("reading {}", args.input.display()))?;

    let camera_motion: Option<Vec<Displacement>> = match &args.camera_motion {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            Some(serde_json::from_reader(BufReader::new(file)).context("parsing camera motion")?)
        }
        None => None,
    };

    let detector = DetectionReplay::from_file(&args.detections, config.detection.min_confidence)
        .with_context(|| format!("loading detections {}", args.detections.display()))?;

    let mut analysis = FootballAnalysis::new(config.clone(), detector);
    let result = analysis
        .run(&input.frames, camera_motion.as_deref())
        .context("analysing video")?;

    let frames = Annotator::from_config(&config.render).annotate(&input.frames, &result.tracks, &result.possession)?;

    video::save_video(&frames, &args.output, config.video.output_fps).with_context(|| format!("writing {}", args.output.display()))?;

    match result.final_shares() {
        Some((team_1, team_2)) => info!(
            "Done: {} frames, ball control team 1 {:.2}%, team 2 {:.2}%",
            frames.len(),
            team_1 * 100.0,
            team_2 * 100.0
        ),
        None => warn!("Done: {} frames, nobody ever controlled the ball", frames.len()),
    }

    Ok(())
}
