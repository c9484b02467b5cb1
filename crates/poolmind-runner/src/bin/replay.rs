//! Replay recorded detections through the tracker and game engine.
//!
//! ```text
//! poolmind-replay --input frames.jsonl --config pool.json > reports.jsonl
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use poolmind::{ColorClass, PoolConfig};
use poolmind_runner::{ControlEvent, FrameSource, PoolRunner, SnapshotHub};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "poolmind-replay")]
#[command(about = "Replay recorded ball detections and report pots, fouls and game state")]
#[command(version)]
struct Args {
    /// JSON config file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-lines frame file, or `-` for stdin.
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Where to write one JSON report per frame. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Frame rate assumed for records without a `dt`.
    #[arg(long, default_value_t = 30.0)]
    fps: f32,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .format_timestamp(None)
        .init();

    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive, got {}", args.fps);
    }

    let config = match &args.config {
        Some(path) => PoolConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PoolConfig::default(),
    };

    let reader: Box<dyn BufRead> = if args.input.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("failed to open {}", args.input.display()))?;
        Box::new(BufReader::new(file))
    };

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let hub = Arc::new(SnapshotHub::new());
    let mut runner = PoolRunner::new(&config, Arc::clone(&hub));
    let default_dt = 1.0 / args.fps;
    let mut event_count = 0usize;

    for record in FrameSource::new(reader) {
        let record = record.context("failed to read frame")?;
        if record.reset {
            runner.push_control(ControlEvent::ResetGame);
        }
        let dt = record.dt.unwrap_or(default_dt);
        let report = runner.tick(record.detections.as_deref(), dt);
        event_count += report.events.len();

        serde_json::to_writer(&mut out, &report).context("failed to write report")?;
        writeln!(out).context("failed to write report")?;
    }
    out.flush().context("failed to flush output")?;

    let snap = hub.snapshot();
    let score = runner.engine().score();
    log::info!(
        "replayed {} frames: {} events, {} potted",
        runner.frames(),
        event_count,
        score.potted,
    );
    log::info!(
        "potted by type: {} solid, {} stripe, {} cue, {} eight, {} unknown",
        score.potted_of(ColorClass::Solid),
        score.potted_of(ColorClass::Stripe),
        score.potted_of(ColorClass::Cue),
        score.potted_of(ColorClass::Eight),
        score.potted_of(ColorClass::Unknown),
    );
    if let Some(rules) = &snap.state.rules {
        match rules.winner {
            Some(winner) => log::info!("game over, winner: player {}", winner),
            None => log::info!("game state: {}", rules.game_state),
        }
    }
    Ok(())
}
