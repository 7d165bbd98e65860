use std::io::Write;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

use common::events::{DecoderError, Event};

/// Builds the box score of a single match from its decoded event log.
#[derive(Debug, Parser)]
#[command(name = "boxscore")]
struct Args {
    /// Newline delimited JSON events of one match.
    events: std::path::PathBuf,

    /// Where to write the box score, stdout if not given.
    #[arg(short, long)]
    output: Option<std::path::PathBuf>,

    #[arg(long, default_value_t = 64.0)]
    tick_rate: f32,

    /// Seconds within which a death counts as traded.
    #[arg(long, default_value_t = 5.0)]
    trade_window: f32,

    /// Flash duration in seconds above which a flash is a full flash.
    #[arg(long, default_value_t = 1.1)]
    full_flash: f32,

    #[arg(long, default_value_t = tracing::Level::INFO)]
    log_level: tracing::Level,
}

/// Turns every line into an event. A last line cut off mid record means the
/// log ended early.
fn read_events(content: &str) -> impl Iterator<Item = Result<Event, DecoderError>> + '_ {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str::<Event>(line).map_err(|e| {
                if e.is_eof() {
                    DecoderError::UnexpectedEnd
                } else {
                    DecoderError::Other(format!("Line {}: {}", number + 1, e))
                }
            })
        })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::filter::LevelFilter::from_level(args.log_level))
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().contains("analysis") || meta.target().contains("boxscore")
        }));
    tracing::subscriber::set_global_default(registry)?;

    let started = std::time::Instant::now();
    tracing::info!(events = %args.events.display(), "Started parsing");

    let content = std::fs::read_to_string(&args.events)
        .with_context(|| format!("Reading {}", args.events.display()))?;

    let config = analysis::endofgame::Config {
        tick_rate: args.tick_rate,
        trade_window_secs: args.trade_window,
        full_flash_secs: args.full_flash,
    };

    let result = analysis::endofgame::parse(&config, read_events(&content))
        .with_context(|| format!("Parsing {}", args.events.display()))?;

    if !result.complete {
        tracing::warn!(rounds = result.rounds_played, "Box score is incomplete");
    }

    match args.output.as_ref() {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Creating {}", path.display()))?;
            serde_json::to_writer(std::io::BufWriter::new(file), &result)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            serde_json::to_writer_pretty(&mut handle, &result)?;
            writeln!(handle)?;
        }
    }

    tracing::info!(elapsed = ?started.elapsed(), "Parsing succeeded");

    Ok(())
}
