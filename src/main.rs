use std::env;
use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;
use pollster::block_on;
use thiserror::Error;
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use cat_vs_zombies::app::{print_final_state, AppState, FIXED_DT};
use cat_vs_zombies::{Game, InputState, Level, Renderer};

const DEFAULT_FRAMES: u32 = 600;
const USAGE: &str =
    "Usage: cat-vs-zombies [--level <path>] [--headless] [--frames <n>] [--seed <n>]";

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let mut level = match &options.level {
        Some(path) => {
            let xml = fs::read_to_string(path)
                .with_context(|| format!("failed to read level {path}"))?;
            Level::from_xml(&xml).with_context(|| format!("failed to parse level {path}"))?
        }
        None => Level::builtin()?,
    };
    if let Some(seed) = options.seed {
        level.config.seed = seed;
    }

    println!(
        "Loaded level {} with {} props (forest: {})",
        level.name,
        level.props.len(),
        level.forest.map_or(0, |forest| forest.count)
    );

    if options.headless {
        return run_headless(&level, options.frames);
    }
    match run_interactive(&level) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --headless mode (set DISPLAY or install a GPU driver to play)."
                );
                run_headless(&level, options.frames)
            } else {
                Err(err)
            }
        }
    }
}

fn run_headless(level: &Level, frames: u32) -> Result<()> {
    let mut game = Game::new(level)?;
    let input = InputState::new();
    game.start_round();
    for _ in 0..frames {
        game.update(FIXED_DT, &input)?;
    }
    let events = game.drain_events();
    info!("headless run produced {} net events", events.len());
    println!("Simulated {frames} frame(s)");
    print_final_state(&game.snapshot());
    Ok(())
}

fn run_interactive(level: &Level) -> Result<()> {
    let event_loop = EventLoop::new().map_err(WindowInitError::EventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Cat vs Zombies")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(WindowInitError::Window)?,
    );
    let renderer = block_on(Renderer::new(Arc::clone(&window))).map_err(WindowInitError::Renderer)?;
    let game = Game::new(level)?;
    info!("{}", game.status_line());

    let mut app = AppState::new(renderer, game);
    event_loop.set_control_flow(ControlFlow::Poll);
    event_loop
        .run(|event, elwt| app.handle(&event, elwt))
        .context("event loop failed")?;

    if let Some(err) = app.take_error() {
        return Err(err);
    }
    print_final_state(&app.game().snapshot());
    Ok(())
}

/// Failures that mean no window can be shown on this machine.
#[derive(Debug, Error)]
enum WindowInitError {
    #[error("failed to initialize event loop: {0}")]
    EventLoop(EventLoopError),
    #[error("failed to initialize window: {0}")]
    Window(OsError),
    #[error("failed to initialize renderer: {0:#}")]
    Renderer(anyhow::Error),
}

#[derive(Debug, PartialEq)]
struct CliOptions {
    level: Option<String>,
    headless: bool,
    frames: u32,
    seed: Option<u64>,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            level: None,
            headless: false,
            frames: DEFAULT_FRAMES,
            seed: None,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--headless" => options.headless = true,
                "--level" => options.level = Some(value_for(&mut args, "--level")?),
                "--frames" => {
                    let value = value_for(&mut args, "--frames")?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value:?}"))?;
                }
                "--seed" => {
                    let value = value_for(&mut args, "--seed")?;
                    options.seed = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid seed {value:?}"))?,
                    );
                }
                "--help" | "-h" => return Err(anyhow!(USAGE)),
                other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
            }
        }
        Ok(options)
    }
}

fn value_for(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} needs a value. {USAGE}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_to_interactive_builtin_level() {
        let options = parse(&[]).unwrap();
        assert_eq!(options.level, None);
        assert!(!options.headless);
        assert_eq!(options.frames, DEFAULT_FRAMES);
    }

    #[test]
    fn parses_all_flags() {
        let options = parse(&[
            "--headless",
            "--frames",
            "30",
            "--seed",
            "7",
            "--level",
            "yard.xml",
        ])
        .unwrap();
        assert_eq!(
            options,
            CliOptions {
                level: Some("yard.xml".into()),
                headless: true,
                frames: 30,
                seed: Some(7),
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--frames"]).is_err());
        assert!(parse(&["--frames", "lots"]).is_err());
        assert!(parse(&["--fly"]).is_err());
    }
}
