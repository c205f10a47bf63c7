/// Entry point and demo loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::part::{Audio, Silence};
use sim::demo::Demo;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "bampf.log";

/// The terminal is in raw alternate-screen mode while the demo runs,
/// so logs go to a file instead.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match File::create(LOG_FILE) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        Err(e) => eprintln!("Warning: could not create {LOG_FILE}: {e}"),
    }
}

fn main() {
    init_logging();
    let config = GameConfig::load();
    info!(level = config.demo.start_level, tick_ms = config.demo.tick_rate_ms, "starting demo");

    let mut demo = Demo::new(&config);
    let mut renderer = Renderer::new();

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let mut audio: Box<dyn Audio> = match SoundEngine::new() {
        Some(engine) => Box::new(engine),
        None => {
            info!("no audio output, running silent");
            Box::new(Silence)
        }
    };

    let result = demo_loop(&mut demo, &mut renderer, audio.as_mut(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        error!("demo loop failed: {e}");
        eprintln!("Demo error: {e}");
    }

    let h = demo.trooper().health();
    println!();
    println!("Level {} trooper ended with {}/{} cells.", demo.level(), h.current, h.max);
}

fn demo_loop(
    demo: &mut Demo,
    renderer: &mut Renderer,
    audio: &mut dyn Audio,
    config: &GameConfig,
) -> std::io::Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.demo.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();

        for action in kb.actions().into_iter().chain(gp.actions()) {
            demo.apply(action, audio);
        }
        if demo.quit {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            demo.step(audio);
            renderer.render(demo)?;
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    info!(ticks = demo.tick, "demo finished");
    Ok(())
}
