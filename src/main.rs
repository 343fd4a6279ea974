mod tui;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossterm::event;
use log::{LevelFilter, error, info, warn};
use simplelog::{Config, WriteLogger};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use torus_snake::config::EngineConfig;
use torus_snake::engine::Engine;
use torus_snake::error::ConfigError;
use torus_snake::game::{BoardSnapshot, GamePhase};

use crate::tui::keys::{GameInput, map_event};
use crate::tui::session::TerminalSession;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(version, about = "Snake on a wrap-around board")]
struct Cli {
    /// Config file; defaults to the platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Board side length.
    #[arg(long)]
    size: Option<usize>,

    /// Segments laid down before the end marker.
    #[arg(long = "initial-length")]
    initial_length: Option<usize>,

    /// Milliseconds between simulation ticks.
    #[arg(long = "tick-ms")]
    tick_ms: Option<u64>,

    /// Milliseconds between game-over blinks.
    #[arg(long = "blink-ms")]
    blink_ms: Option<u64>,

    /// Seed for reproducible food placement.
    #[arg(long)]
    seed: Option<u64>,

    /// Log file path.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    #[arg(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to initialize logging: {0}")]
    Logger(#[from] log::SetLoggerError),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            eprintln!("torus-snake: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    init_logging(&cli)?;
    let config = resolve_config(&cli)?;
    info!("starting with {config:?}");

    let (snapshot_tx, mut snapshot_rx) = watch::channel::<Option<BoardSnapshot>>(None);
    let engine = Engine::new(&config, move |snapshot: BoardSnapshot| {
        snapshot_tx.send_replace(Some(snapshot));
    })?;

    let mut session = TerminalSession::enter()?;
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    let input_thread = tokio::task::spawn_blocking(move || forward_input(input_tx));

    loop {
        let snapshot = snapshot_rx.borrow_and_update().clone();
        session.draw(snapshot.as_ref())?;

        tokio::select! {
            changed = snapshot_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            input = input_rx.recv() => match input {
                None | Some(GameInput::Quit) => break,
                Some(input) => handle_input(&engine, input),
            },
        }
    }

    engine.shutdown();
    drop(input_rx);
    if let Ok(Err(error)) = input_thread.await {
        warn!("input thread stopped with error: {error}");
    }
    info!("exiting");
    Ok(())
}

fn handle_input(engine: &Engine, input: GameInput) {
    match input {
        GameInput::Heading(heading) => engine.change_direction(heading),
        GameInput::Start => {
            if let Err(error) = engine.start() {
                warn!("{error}");
            }
        }
        GameInput::Restart => engine.restart(),
        GameInput::Grow | GameInput::Shrink => {
            if engine.phase() == GamePhase::Playing {
                return;
            }
            let size = engine.snapshot().size;
            let next = if input == GameInput::Grow {
                size + 1
            } else {
                size.saturating_sub(1)
            };
            if let Err(error) = engine.build(next) {
                warn!("board size {next} rejected: {error}");
            }
        }
        GameInput::Resize | GameInput::Quit => {}
    }
}

/// Polls terminal events until the receiving side goes away or quit is pressed.
fn forward_input(tx: mpsc::UnboundedSender<GameInput>) -> io::Result<()> {
    while !tx.is_closed() {
        if !event::poll(INPUT_POLL_INTERVAL)? {
            continue;
        }

        let Some(input) = map_event(&event::read()?) else {
            continue;
        };
        if tx.send(input).is_err() || input == GameInput::Quit {
            break;
        }
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<EngineConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from_path(path)?,
        None => EngineConfig::load()?,
    };

    if let Some(size) = cli.size {
        config.board_size = size;
    }
    if let Some(initial_length) = cli.initial_length {
        config.initial_length = initial_length;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    if let Some(blink_ms) = cli.blink_ms {
        config.blink_interval_ms = blink_ms;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }

    config.validate()?;
    Ok(config)
}

fn init_logging(cli: &Cli) -> Result<(), AppError> {
    let path = cli
        .log_file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("torus-snake.log"));
    WriteLogger::init(cli.log_level, Config::default(), File::create(path)?)?;
    Ok(())
}
