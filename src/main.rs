use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use viafence::fixture::{run_all, Fixture, FixtureStatus};
use viafence::host::{write_via_lines, FenceConfig, HostTrack};
use viafence::operations::{EndCap, FenceOptions};
use viafence::plot::render_svg;
use viafence::{Point2, TrackSet, ViaFence};

#[derive(Parser)]
#[command(name = "viafence")]
#[command(about = "Generate via fences along PCB tracks")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Generate a fence for a JSON list of tracks and print the vias as JSON
    Generate {
        /// File holding `[[[x, y], ...], ...]`
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        offset: f64,
        #[arg(long)]
        pitch: f64,
        #[arg(long, default_value_t = viafence::operations::fence::DEFAULT_CORNER_TOLERANCE_DEG)]
        corner_tolerance: f64,
        /// Use flat ends instead of rounded ones around track ends
        #[arg(long)]
        butt: bool,
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// Recompute a fixture and store the result in it
    Record {
        fixture: PathBuf,
        #[arg(long)]
        svg: Option<PathBuf>,
    },
    /// Check every fixture in a directory
    Check {
        #[arg(default_value = "fixtures")]
        dir: PathBuf,
    },
    /// Run the board adapter and print one JSON line per created via
    Place {
        #[arg(long)]
        config: Option<PathBuf>,
        /// File holding a JSON list of `{ net, layer, start, end }` segments
        #[arg(long)]
        tracks: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,viafence=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match Cmd::parse().action {
        Action::Generate {
            input,
            offset,
            pitch,
            corner_tolerance,
            butt,
            svg,
        } => {
            let options = FenceOptions {
                corner_tolerance_deg: corner_tolerance,
                end_cap: if butt { EndCap::Butt } else { EndCap::Round },
            };
            generate(&input, offset, pitch, options, svg.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Action::Record { fixture, svg } => {
            record(&fixture, svg.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Action::Check { dir } => check(&dir),
        Action::Place { config, tracks } => {
            place(config.as_deref(), &tracks)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn generate(input: &Path, offset: f64, pitch: f64, options: FenceOptions, svg: Option<&Path>) -> Result<()> {
    let text = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let coords: Vec<Vec<[i64; 2]>> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", input.display()))?;
    let tracks = TrackSet::from_coords(&coords)?;

    let points = ViaFence::new(&tracks, offset, pitch)
        .with_options(options)
        .execute()?;
    tracing::info!(tracks = tracks.len(), vias = points.len(), "generated");

    let out: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
    println!("{}", serde_json::to_string_pretty(&out)?);
    write_svg(svg, &tracks, &points)
}

fn record(path: &Path, svg: Option<&Path>) -> Result<()> {
    let mut fixture = Fixture::load(path)?;
    let count = fixture.record()?.len();
    fixture.save(path)?;
    tracing::info!(fixture = %path.display(), vias = count, "recorded");

    if svg.is_some() {
        let tracks = fixture.tracks()?;
        let points: Vec<Point2> = fixture
            .via_points
            .iter()
            .flatten()
            .map(|&[x, y]| Point2::new(x, y))
            .collect();
        write_svg(svg, &tracks, &points)?;
    }
    Ok(())
}

fn check(dir: &Path) -> Result<ExitCode> {
    let outcomes = run_all(dir)?;
    let mut failed = 0;
    for outcome in &outcomes {
        let vias = outcome.generated.len();
        match &outcome.status {
            FixtureStatus::Passed => println!("{}: PASSED ({vias} vias)", outcome.name),
            FixtureStatus::Unrecorded => println!("{}: UNRECORDED ({vias} vias)", outcome.name),
            FixtureStatus::Failed {
                expected,
                generated,
                matched,
            } => {
                failed += 1;
                println!(
                    "{}: FAILED (expected {expected}, generated {generated}, matched {matched})",
                    outcome.name
                );
            }
        }
    }
    println!("{} fixtures, {failed} failed", outcomes.len());

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn place(config: Option<&Path>, tracks: &Path) -> Result<()> {
    let config = match config {
        Some(path) => FenceConfig::from_json_file(path)?,
        None => FenceConfig::default(),
    };
    let text = fs::read_to_string(tracks).with_context(|| format!("reading {}", tracks.display()))?;
    let segments: Vec<HostTrack> =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", tracks.display()))?;

    write_via_lines(&config, &segments, std::io::stdout().lock())?;
    Ok(())
}

fn write_svg(path: Option<&Path>, tracks: &TrackSet, vias: &[Point2]) -> Result<()> {
    if let Some(path) = path {
        fs::write(path, render_svg(tracks, vias))
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(svg = %path.display(), "plot written");
    }
    Ok(())
}
