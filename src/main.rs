use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::debug;

use hue_cycle::cli::{Args, Command, Overrides};
use hue_cycle::config::RotationConfig;
use hue_cycle::engine::{RotationController, StartOutcome};
use hue_cycle::error::{ErrorCategory, StartError};
use hue_cycle::logging::init_tracing;
use hue_cycle::palettes::load_palettes;
use hue_cycle::preview::render_palettes;
use hue_cycle::sinks::settings_file::{default_settings_path, SettingsFileSink};

const HELP: &str = "commands: start, stop, next, status, quit";

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings_path = args.settings.clone().unwrap_or_else(default_settings_path);
    let mut config = RotationConfig::from_settings_file(&settings_path)
        .with_context(|| format!("failed to read options from {}", settings_path.display()))?;
    debug!(settings = %settings_path.display(), "options loaded");

    match args.command {
        Command::List(overrides) => {
            overrides.apply(&mut config);
            list(&config)
        }
        Command::Run(overrides) => {
            overrides.apply(&mut config);
            let sink = sink_for(&overrides, settings_path);
            run(config, sink).await
        }
    }
}

fn sink_for(overrides: &Overrides, settings_path: std::path::PathBuf) -> SettingsFileSink {
    match &overrides.colors_key {
        Some(key) => SettingsFileSink::with_key(settings_path, key.clone()),
        None => SettingsFileSink::new(settings_path),
    }
}

fn list(config: &RotationConfig) -> Result<()> {
    let palettes = load_palettes(&config.folder, &config.key_whitelist)?;
    let mut stdout = std::io::stdout().lock();
    render_palettes(&mut stdout, &palettes).context("failed to print palettes")
}

async fn run(config: RotationConfig, sink: SettingsFileSink) -> Result<()> {
    eprintln!("hue-cycle: writing colors to {}", sink.path().display());
    let rotation = RotationController::new(config, Arc::new(sink));
    start(&rotation).await;
    eprintln!("{HELP}");

    let mut commands = spawn_stdin_reader();
    loop {
        tokio::select! {
            line = commands.recv() => {
                let Some(line) = line else { break };
                match line.trim() {
                    "" => {}
                    "start" => start(&rotation).await,
                    "stop" => stop(&rotation).await,
                    "next" => match rotation.advance() {
                        Ok(Some(_)) => status(&rotation),
                        Ok(None) => eprintln!("hue-cycle: nothing to advance"),
                        Err(err) => eprintln!("error: {:#}", anyhow::Error::from(err)),
                    },
                    "status" => status(&rotation),
                    "quit" | "exit" => break,
                    other => eprintln!("unknown command '{other}'; {HELP}"),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    stop(&rotation).await;
    Ok(())
}

/// Read stdin lines on a plain thread so a pending read never holds up exit.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn start(rotation: &RotationController) {
    match rotation.start().await {
        Ok(StartOutcome::Started { palettes }) => {
            eprintln!("hue-cycle: rotating through {palettes} palettes");
        }
        Ok(StartOutcome::AlreadyRunning) => eprintln!("hue-cycle: already running"),
        Err(err) => report_start_error(err),
    }
}

fn report_start_error(err: StartError) {
    let kind = match err.category() {
        ErrorCategory::Configuration => "configuration error",
        ErrorCategory::Data => "no palettes",
        ErrorCategory::Host => "settings error",
    };
    eprintln!("{kind}: {:#}", anyhow::Error::from(err));
}

async fn stop(rotation: &RotationController) {
    match rotation.stop().await {
        Ok(outcome) if outcome.was_running => eprintln!("hue-cycle: stopped"),
        Ok(_) => {}
        Err(err) => eprintln!("error: {:#}", anyhow::Error::from(err)),
    }
}

fn status(rotation: &RotationController) {
    let status = rotation.status();
    match (status.running, status.palette_name) {
        (true, Some(name)) => eprintln!(
            "hue-cycle: running, palette {}/{} ({name})",
            status.index + 1,
            status.palette_count
        ),
        _ => eprintln!("hue-cycle: idle"),
    }
}
