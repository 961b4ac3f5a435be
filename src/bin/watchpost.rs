//! Replays recorded tracker output through the alerting core.
//!
//! cargo run --bin watchpost -- --config watch.yaml --input detections.jsonl

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use watchpost::{AlertEvent, AlertSink, FramePipeline, ReplaySource, TracingSink, WatchConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Recorded tracker output, one JSON object per frame
    #[arg(short, long)]
    input: PathBuf,

    /// Append alert events as JSON lines to this file
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Override the reported frame rate from the configuration
    #[arg(long)]
    fps: Option<f64>,

    /// Log every render directive
    #[arg(long, default_value_t = false)]
    render: bool,
}

/// Logs each alert and mirrors it to a JSON-lines file.
struct EventLog {
    console: TracingSink,
    file: Option<BufWriter<File>>,
}

impl AlertSink for EventLog {
    fn emit(&mut self, event: &AlertEvent) {
        self.console.emit(event);
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let written = serde_json::to_string(event)
            .map_err(anyhow::Error::from)
            .and_then(|line| writeln!(file, "{line}").map_err(anyhow::Error::from));
        if let Err(err) = written {
            error!("failed to record alert: {err}");
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("watchpost=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = WatchConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(fps) = args.fps {
        config.frames_per_second = fps;
        config.validate()?;
    }

    let source = ReplaySource::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?
        .with_snap_to_pixel(config.snap_to_pixel_grid);
    let mut pipeline = FramePipeline::from_config(source, &config)?;

    info!(
        fps = pipeline.processor().registry().frames_per_second(),
        zone = pipeline.processor().classifier().is_some(),
        "replaying {}",
        args.input.display()
    );

    let file = args
        .events
        .as_ref()
        .map(|path| {
            File::options()
                .create(true)
                .append(true)
                .open(path)
                .map(BufWriter::new)
                .with_context(|| format!("opening {}", path.display()))
        })
        .transpose()?;
    let mut sink = EventLog {
        console: TracingSink,
        file,
    };

    let render = args.render;
    let frames = pipeline.run(&mut sink, |report| {
        if report.dropped {
            return;
        }
        if render {
            for d in &report.directives {
                info!(frame = report.frame_index, color = ?d.color, "{}", d.label);
            }
        }
    })?;

    if let Some(file) = sink.file.as_mut() {
        file.flush()?;
    }
    info!(frames, tracked = pipeline.processor().registry().len(), "replay finished");
    Ok(())
}
