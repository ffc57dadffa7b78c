//! Focus/break timer with session banking.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::Backend;
use crate::events::Event;
use crate::model::StudySession;
use crate::repo::SessionRepo;
use crate::stats::{format_minutes, SessionTotals};
use crate::timer::{SessionKind, TimerEngine, TimerState};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    pub state: TimerState,
    pub kind: SessionKind,
    pub label: String,
    /// `mm:ss` remaining.
    pub display: String,
    pub progress: f64,
    pub remaining_ms: u64,
    pub focus_sessions: u64,
    pub focus_minutes: u64,
    pub total_time: String,
    pub streak_days: u32,
}

/// Owns the engine; every banked interval becomes a `study_sessions`
/// document and the stats are reloaded after each save.
pub struct TimerScreen {
    backend: Backend,
    engine: TimerEngine,
    totals: SessionTotals,
    notices: Vec<String>,
}

impl TimerScreen {
    pub fn open(backend: Backend, engine: TimerEngine) -> Self {
        let mut screen = Self {
            backend,
            engine,
            totals: SessionTotals::default(),
            notices: Vec::new(),
        };
        screen.reload_stats();
        screen
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn into_engine(self) -> TimerEngine {
        self.engine
    }

    pub fn totals(&self) -> &SessionTotals {
        &self.totals
    }

    pub fn switch_to(&mut self, kind: SessionKind) -> Vec<Event> {
        let events = self.engine.switch_to(kind);
        self.bank(events)
    }

    pub fn start(&mut self) -> Vec<Event> {
        let events = self.engine.start();
        self.bank(events)
    }

    pub fn pause(&mut self) -> Vec<Event> {
        let events = self.engine.pause();
        self.bank(events)
    }

    pub fn reset(&mut self) -> Vec<Event> {
        let events = self.engine.reset();
        self.bank(events)
    }

    pub fn tick(&mut self) -> Vec<Event> {
        let events = self.engine.tick();
        self.bank(events)
    }

    /// Leaving the screen: stop the countdown and save any partial run.
    pub fn close(&mut self) -> Vec<Event> {
        let events = self.engine.teardown();
        self.bank(events)
    }

    /// Run any engine command, e.g. a `*_at` variant with an explicit
    /// clock, and bank what it produced.
    pub fn drive<F>(&mut self, command: F) -> Vec<Event>
    where
        F: FnOnce(&mut TimerEngine) -> Vec<Event>,
    {
        let events = command(&mut self.engine);
        self.bank(events)
    }

    /// Persist banked intervals from `events`, then hand them back.
    pub fn bank(&mut self, events: Vec<Event>) -> Vec<Event> {
        let mut saved = false;
        for event in &events {
            let Some((kind, minutes, started_at, at)) = event.banked() else {
                continue;
            };
            if minutes == 0 {
                continue;
            }
            let Some(uid) = self.backend.auth.current_user() else {
                debug!(minutes, "signed out, session not saved");
                continue;
            };

            let session = StudySession {
                user_id: uid.clone(),
                start_time: started_at.timestamp_millis(),
                end_time: at.timestamp_millis(),
                duration: minutes,
                session_type: kind,
                created_at: at.timestamp_millis(),
                ..Default::default()
            };
            match SessionRepo::new(self.backend.store.clone(), uid).add(&session) {
                Ok(id) => {
                    info!(%id, %kind, minutes, "study session saved");
                    saved = true;
                    if let Event::Completed { .. } = event {
                        self.notices.push(match kind {
                            SessionKind::Focus => {
                                format!("Focus session completed! {minutes}m saved")
                            }
                            SessionKind::Break => format!("Break completed! {minutes}m saved"),
                        });
                    }
                }
                Err(e) => {
                    warn!(error = %e, "study session not saved");
                    self.notices.push("Failed to save session".to_string());
                }
            }
        }
        if saved {
            self.reload_stats();
        }
        events
    }

    /// Recompute focus count, focus minutes and streak. Keeps the previous
    /// figures when signed out or when the query fails.
    pub fn reload_stats(&mut self) {
        let Some(uid) = self.backend.auth.current_user() else {
            return;
        };
        match SessionRepo::new(self.backend.store.clone(), uid).list() {
            Ok(sessions) => self.totals = SessionTotals::from_sessions(&sessions),
            Err(e) => warn!(error = %e, "stats unavailable"),
        }
    }

    /// Messages queued since the last call.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    pub fn render(&self) -> TimerView {
        TimerView {
            state: self.engine.state(),
            kind: self.engine.kind(),
            label: self.engine.kind().label().to_string(),
            display: self.engine.display(),
            progress: self.engine.progress(),
            remaining_ms: self.engine.remaining_ms(),
            focus_sessions: self.totals.focus_sessions,
            focus_minutes: self.totals.focus_minutes,
            total_time: format_minutes(self.totals.focus_minutes),
            streak_days: self.totals.streak_days,
        }
    }
}
