use clap::Subcommand;
use std::time::Duration;
use studyx_core::screens::TimerScreen;
use studyx_core::{Event, SessionKind, SqliteStore, TimerEngine, TimerState};
use tracing::warn;

use super::{print_json, CmdResult, Context};

const ENGINE_KEY: &str = "timer_engine";

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Back to the full duration of the current kind
    Reset,
    /// Switch to a focus session (not while running)
    Focus,
    /// Switch to a break (not while running)
    Break,
    /// Advance the countdown to now
    Tick,
    /// Start and tick once per second until the interval completes
    Run,
    /// Stop the countdown and save any partial focus run
    Close,
}

fn load_engine(ctx: &Context) -> TimerEngine {
    let mut engine = stored_engine(ctx.store.kv_get(ENGINE_KEY));
    engine.set_durations(ctx.config.durations());
    engine.set_auto_switch(ctx.config.timer.auto_switch);
    engine
}

/// The persisted engine, or a fresh one when it is missing or unreadable.
fn stored_engine<E: std::fmt::Display>(stored: Result<Option<String>, E>) -> TimerEngine {
    match stored {
        Ok(Some(json)) => serde_json::from_str::<TimerEngine>(&json).unwrap_or_else(|e| {
            warn!(error = %e, "stored timer unreadable, starting fresh");
            TimerEngine::default()
        }),
        Ok(None) => TimerEngine::default(),
        Err(e) => {
            warn!(error = %e, "stored timer unavailable, starting fresh");
            TimerEngine::default()
        }
    }
}

fn save_engine(store: &SqliteStore, engine: &TimerEngine) -> CmdResult {
    let json = serde_json::to_string(engine)?;
    store.kv_set(ENGINE_KEY, &json)?;
    Ok(())
}

fn report(screen: &mut TimerScreen, events: &[Event]) -> CmdResult {
    if !events.is_empty() {
        print_json(events)?;
    }
    for notice in screen.take_notices() {
        eprintln!("{notice}");
    }
    Ok(())
}

fn switch(screen: &mut TimerScreen, kind: SessionKind) -> CmdResult {
    let events = screen.switch_to(kind);
    if events.is_empty() {
        eprintln!("timer is running; pause or reset first");
    }
    report(screen, &events)
}

pub fn run(action: TimerAction) -> CmdResult {
    let ctx = Context::open()?;
    let engine = load_engine(&ctx);
    let mut screen = TimerScreen::open(ctx.backend(), engine);

    match action {
        TimerAction::Status => {
            let events = screen.tick();
            report(&mut screen, &events)?;
            print_json(&screen.render())?;
        }
        TimerAction::Start => {
            let events = screen.start();
            report(&mut screen, &events)?;
        }
        TimerAction::Pause => {
            let events = screen.pause();
            report(&mut screen, &events)?;
        }
        TimerAction::Reset => {
            let events = screen.reset();
            report(&mut screen, &events)?;
        }
        TimerAction::Focus => switch(&mut screen, SessionKind::Focus)?,
        TimerAction::Break => switch(&mut screen, SessionKind::Break)?,
        TimerAction::Tick => {
            let events = screen.tick();
            report(&mut screen, &events)?;
            print_json(&screen.engine().snapshot())?;
        }
        TimerAction::Run => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;
            runtime.block_on(run_until_done(&ctx, &mut screen))?;
        }
        TimerAction::Close => {
            let events = screen.close();
            report(&mut screen, &events)?;
            print_json(&screen.render())?;
        }
    }

    save_engine(&ctx.store, screen.engine())?;
    Ok(())
}

async fn run_until_done(ctx: &Context, screen: &mut TimerScreen) -> CmdResult {
    let events = screen.start();
    report(screen, &events)?;
    save_engine(&ctx.store, screen.engine())?;

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    while screen.engine().state() == TimerState::Running {
        interval.tick().await;
        let events = screen.tick();
        eprint!("\r{} {}", screen.engine().kind().label(), screen.engine().display());
        if !events.is_empty() {
            eprintln!();
            report(screen, &events)?;
        }
        save_engine(&ctx.store, screen.engine())?;
    }
    print_json(&screen.render())?;
    Ok(())
}
