/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::KeyCode;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::entity::Intent;
use sim::event::GameEvent;
use sim::step;
use sim::world::{AppState, Phase};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::menu::{Menu, MenuItem, ITEMS};
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

/// Longest frame the simulation will accept; a stall is clamped so actors
/// do not jump across the screen after a hiccup.
const MAX_DT: f32 = 0.1;
const MUSIC_FADE_SECS: f32 = 1.0;

fn main() -> anyhow::Result<()> {
    let (config, config_err) = match GameConfig::load() {
        Ok(cfg) => (cfg, None),
        Err(e) => (GameConfig::default(), Some(e)),
    };

    let _log_guard = setup_logging(&config.log_file)?;
    if let Some(e) = config_err {
        warn!(error = %e, "config.toml rejected, using defaults");
    }

    let mut app = AppState::new(config.music);
    let mut renderer = Renderer::new();

    let enhanced_keys = match renderer.init() {
        Ok(flag) => flag,
        Err(e) => {
            if let Err(cleanup_err) = renderer.cleanup() {
                warn!(error = %cleanup_err, "terminal cleanup after failed init also failed");
            }
            return Err(e).context("terminal init failed");
        }
    };

    let mut sound = SoundEngine::new();

    let result = game_loop(&mut app, &mut renderer, &mut sound, &config, enhanced_keys);
    let cleanup = renderer.cleanup().context("terminal cleanup failed");
    result?;
    cleanup?;

    println!();
    println!("Thanks for playing Kodlike!");
    println!("Best survival: {:.1}s", app.best_survival);
    Ok(())
}

/// File-only logging: the terminal is the game screen.
/// Filter comes from `KODLIKE_LOG`, default `info`.
fn setup_logging(log_file: &Path) -> anyhow::Result<WorkerGuard> {
    let dir = match log_file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;
    let file_name = log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "kodlike.log".into());

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("KODLIKE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    info!(log_file = %log_file.display(), "logging initialized");
    Ok(guard)
}

fn game_loop(
    app: &mut AppState,
    renderer: &mut Renderer,
    sound: &mut Option<SoundEngine>,
    config: &GameConfig,
    enhanced_keys: bool,
) -> anyhow::Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = enhanced_keys;
    let mut gp = GamepadState::new();
    let mut menu = Menu::new();

    let frame = Duration::from_millis(config.frame_ms);
    let mut last = Instant::now();
    let mut anim: u64 = 0;

    if app.music_on {
        if let Some(s) = sound.as_mut() { s.start_music(); }
    }

    loop {
        let frame_start = Instant::now();
        let dt = frame_start.duration_since(last).as_secs_f32().min(MAX_DT);
        last = frame_start;

        kb.drain_events();
        gp.update();
        if kb.ctrl_c_pressed() {
            break;
        }

        let quit = match app.phase {
            Phase::Menu => handle_menu(app, &mut menu, &kb, &gp, sound, config, renderer.size()),
            Phase::Playing => {
                handle_playing(app, &kb, &gp, sound, dt);
                false
            }
            Phase::GameOver => {
                handle_game_over(app, &kb, &gp, sound);
                false
            }
        };
        if quit {
            break;
        }

        if let Some(s) = sound.as_mut() { s.update(dt); }

        renderer.render(app, &menu, anim).context("frame render failed")?;
        anim = anim.wrapping_add(1);

        if let Some(rest) = frame.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!("quit");
    Ok(())
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' ')];
const KEYS_BACK: &[KeyCode] = &[KeyCode::Esc];

fn detect_intent(kb: &InputState, gp: &GamepadState) -> Intent {
    let held = |keys: &[KeyCode]| kb.any_held(keys) || kb.any_pressed(keys);
    Intent::from_held(
        held(KEYS_LEFT) || gp.left_held(),
        held(KEYS_RIGHT) || gp.right_held(),
        held(KEYS_UP) || gp.up_held(),
        held(KEYS_DOWN) || gp.down_held(),
    )
}

fn resume_music(app: &AppState, sound: &mut Option<SoundEngine>) {
    if let Some(s) = sound.as_mut() {
        if app.music_on { s.start_music(); } else { s.stop_music(); }
    }
}

/// Returns true when the player chose to quit.
fn handle_menu(
    app: &mut AppState,
    menu: &mut Menu,
    kb: &InputState,
    gp: &GamepadState,
    sound: &mut Option<SoundEngine>,
    config: &GameConfig,
    (term_w, term_h): (u16, u16),
) -> bool {
    if kb.any_pressed(KEYS_BACK) || gp.cancel_pressed() {
        return true;
    }
    if kb.any_pressed(KEYS_UP) || gp.up_pressed() { menu.move_up(); }
    if kb.any_pressed(KEYS_DOWN) || gp.down_pressed() { menu.move_down(); }

    let mut chosen = (kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed()).then(|| menu.selected());
    for &(col, row) in kb.clicks() {
        if let Some(item) = Menu::hit_test(col, row, term_w, term_h) {
            menu.cursor = ITEMS.iter().position(|i| *i == item).unwrap_or(0);
            chosen = Some(item);
        }
    }

    match chosen {
        Some(MenuItem::Start) => {
            app.start_session(config);
            resume_music(app, sound);
        }
        Some(MenuItem::Music) => {
            let on = app.toggle_music();
            info!(on, "music toggled");
            resume_music(app, sound);
        }
        Some(MenuItem::Exit) => return true,
        None => {}
    }
    false
}

fn handle_playing(
    app: &mut AppState,
    kb: &InputState,
    gp: &GamepadState,
    sound: &mut Option<SoundEngine>,
    dt: f32,
) {
    if kb.any_pressed(KEYS_BACK) || gp.cancel_pressed() {
        info!("run abandoned");
        app.back_to_menu();
        return;
    }

    let intent = detect_intent(kb, gp);
    let Some(session) = app.session.as_mut() else {
        app.back_to_menu();
        return;
    };

    let events = step::step(session, intent, dt);
    let caught = events.iter().any(|e| matches!(e, GameEvent::PlayerCaught { .. }));
    if caught {
        app.game_over();
        if let Some(s) = sound.as_mut() {
            s.fade_out_music(MUSIC_FADE_SECS);
            s.play_caught();
        }
    }
}

fn handle_game_over(
    app: &mut AppState,
    kb: &InputState,
    gp: &GamepadState,
    sound: &mut Option<SoundEngine>,
) {
    let dismissed = kb.any_pressed(KEYS_CONFIRM)
        || kb.any_pressed(KEYS_BACK)
        || !kb.clicks().is_empty()
        || gp.confirm_pressed()
        || gp.cancel_pressed();
    if dismissed {
        app.back_to_menu();
        resume_music(app, sound);
    }
}
