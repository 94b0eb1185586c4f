/// Cadence - headless playlist player
use anyhow::Context;
use cadence_cli::{AppConfig, CliError, Command, Session};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Drive a playlist player against a simulated audio element", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./cadence.toml if present)
    #[arg(short, long, env = "CADENCE_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter directive, overrides RUST_LOG
    #[arg(long)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read transport commands from stdin (default)
    Run,
    /// List the configured playlist
    Tracks,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for events
    let filter = match cli.log_filter.as_deref() {
        Some(directive) => tracing_subscriber::EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter '{}'", directive))?,
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "cadence=info,cadence_playback=info".into()),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config)?,
        Commands::Tracks => list_tracks(&config),
    }

    Ok(())
}

fn list_tracks(config: &AppConfig) {
    for (index, track) in config.tracks.iter().enumerate() {
        println!(
            "{:>3}  {} - {} ({})",
            index, track.title, track.artist, track.duration_label
        );
    }
}

fn run(config: &AppConfig) -> anyhow::Result<()> {
    let mut session = Session::new(config)?;
    tracing::info!(tracks = config.tracks.len(), "Session started");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_events(&mut out, &session.drain_events())?;

    for line in io::stdin().lock().lines() {
        let line = line.map_err(CliError::from)?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        let command: Command = match line.parse() {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!("{}", e);
                continue;
            }
        };

        match session.execute(command) {
            Ok(events) => print_events(&mut out, &events)?,
            Err(e) => tracing::warn!("{}", e),
        }

        match command {
            Command::State => print_json(&mut out, &session.report())?,
            Command::Quit => break,
            _ => {}
        }
        out.flush()?;
    }

    tracing::info!("Session finished");
    Ok(())
}

fn print_events<W: Write, T: Serialize>(out: &mut W, events: &[T]) -> anyhow::Result<()> {
    for event in events {
        print_json(out, event)?;
    }
    Ok(())
}

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
