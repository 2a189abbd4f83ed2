use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind};
use neko::{Config, Scene};
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

mod logging;
mod terminal;

/// Time between frames in interactive mode
const FRAME_TIME: Duration = Duration::from_millis(30);

/// Neko cats roaming a terminal. Click to send the first one chasing.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path of the configuration file. Defaults to `<config dir>/neko/config.yaml` when it exists.
    #[arg(long, short, env = "NEKO_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Number of cats, overriding the configuration
    #[arg(long)]
    cats: Option<usize>,

    /// Run this many frames without a terminal on a simulated clock, printing each one
    #[arg(long)]
    frames: Option<usize>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // interactive runs own the terminal, so they only log to a file
    let target = match (&cli.log_file, cli.frames) {
        (Some(path), _) => Some(logging::LogTarget::File(path.as_path())),
        (None, Some(_)) => Some(logging::LogTarget::Stderr),
        (None, None) => None,
    };
    if let Some(target) = target {
        logging::setup(cli.verbose, target)?;
    }

    let mut config = Config::load_or_default(cli.config.as_deref()).context("loading configuration")?;
    if let Some(cats) = cli.cats {
        config.herd.quantity = cats;
    }
    let mut rng = match cli.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    match cli.frames {
        Some(frames) => run_headless(&config, frames, &mut rng),
        None => run_interactive(&config, &mut rng),
    }
}

/// Steps past the longest jittered animation period so every frame advances every sprite.
fn run_headless(config: &Config, frames: usize, rng: &mut fastrand::Rng) -> anyhow::Result<()> {
    let step = config
        .neko_settings()
        .animation_period
        .saturating_add(config.herd_settings().animation_jitter)
        .saturating_add(Duration::from_millis(1));
    let mut now = Instant::now();
    let mut scene = Scene::from_config(config, now, rng)?;
    let mut out = std::io::stdout().lock();

    for frame in 0..frames {
        now = now.checked_add(step).context("simulated clock overflowed")?;
        scene.update(now, rng);
        writeln!(
            out,
            "frame {frame} power={} brightness={:.2} background={}",
            scene.power().state(),
            scene.power().brightness(),
            scene.power().background()
        )?;
        for neko in scene.herd().draw_order() {
            let (x, y) = neko.position();
            writeln!(out, "  {} {} tile={} at ({x}, {y})", neko.name(), neko.state(), neko.tile_index())?;
        }
    }
    Ok(())
}

fn run_interactive(config: &Config, rng: &mut fastrand::Rng) -> anyhow::Result<()> {
    let mut scene = Scene::from_config(config, Instant::now(), rng)?;
    let mut guard = terminal::TermGuard::new().context("setting up terminal")?;
    let mut viewport = terminal::Viewport::new(config.display_size(), crossterm::terminal::size()?);

    loop {
        if event::poll(FRAME_TIME)? {
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => match (key.code, key.modifiers) {
                        (KeyCode::Char('q') | KeyCode::Esc, _) => return Ok(()),
                        (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Ok(()),
                        _ => {}
                    },
                    Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                        if let Some(point) = viewport.to_point(mouse.column, mouse.row) {
                            scene.touch(point, Instant::now());
                        }
                    }
                    Event::Resize(columns, rows) => {
                        viewport = terminal::Viewport::new(config.display_size(), (columns, rows));
                    }
                    _ => {}
                }
            }
        }
        scene.update(Instant::now(), rng);
        terminal::draw(guard.out(), &scene, &viewport)?;
    }
}
