//! Countdown timer engine.
//!
//! The engine is a wall-clock-based state machine. It does not use internal
//! threads - the caller is responsible for calling `tick()` about once per
//! second while the timer is running and stops calling it after
//! pause/reset/teardown.
//!
//! ## State Transitions
//!
//! ```text
//! Idle(kind) -> Running -> Paused -> Running -> ... -> Idle(opposite kind)
//!     ^                                           |
//!     +----------------- reset -------------------+
//! ```
//!
//! Natural completion banks the kind's full nominal duration. Interrupting
//! a focus run (pause, reset, teardown) banks the whole minutes observed
//! since the latest start; leftover seconds are dropped, and a stretch is
//! banked at most once.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::default();
//! engine.start();
//! // Once per second:
//! for event in engine.tick() { /* persist Completed */ }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::kind::{Durations, SessionKind};
use crate::events::Event;

const MS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Countdown finished and auto-switch is off; waiting for the user.
    Completed,
}

/// Core timer engine.
///
/// Operates on wall-clock deltas -- no internal thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    durations: Durations,
    #[serde(default = "default_true")]
    auto_switch: bool,
    state: TimerState,
    kind: SessionKind,
    /// Remaining time in milliseconds for the current interval.
    remaining_ms: u64,
    /// Timestamp (ms since epoch) of the last flush while running.
    #[serde(default)]
    last_tick_epoch_ms: Option<u64>,
    /// When the current uninterrupted stretch of running began.
    #[serde(default)]
    segment_started_epoch_ms: Option<u64>,
    /// Latest start instant; reported as the session start.
    #[serde(default)]
    run_started_epoch_ms: Option<u64>,
    /// Run time of the stopped stretch not yet credited.
    #[serde(default)]
    unbanked_ms: u64,
}

fn default_true() -> bool {
    true
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(Durations::default())
    }
}

impl TimerEngine {
    /// Create an engine in `Idle(Focus)` with the full focus duration loaded.
    pub fn new(durations: Durations) -> Self {
        Self {
            durations,
            auto_switch: true,
            state: TimerState::Idle,
            kind: SessionKind::Focus,
            remaining_ms: durations.ms(SessionKind::Focus),
            last_tick_epoch_ms: None,
            segment_started_epoch_ms: None,
            run_started_epoch_ms: None,
            unbanked_ms: 0,
        }
    }

    pub fn with_auto_switch(mut self, auto_switch: bool) -> Self {
        self.auto_switch = auto_switch;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn total_ms(&self) -> u64 {
        self.durations.ms(self.kind)
    }

    /// 0.0 .. 1.0 progress within the current interval.
    pub fn progress(&self) -> f64 {
        let total = self.total_ms();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_ms as f64 / total as f64)
    }

    /// Remaining time as `mm:ss`.
    pub fn display(&self) -> String {
        let secs = self.remaining_ms / 1000;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Apply new nominal durations. An idle timer reloads its full duration;
    /// an interval in progress keeps its remaining time.
    pub fn set_durations(&mut self, durations: Durations) {
        self.durations = durations;
        if self.state == TimerState::Idle {
            self.remaining_ms = durations.ms(self.kind);
        }
    }

    pub fn set_auto_switch(&mut self, auto_switch: bool) {
        self.auto_switch = auto_switch;
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(now_ms())
    }

    /// Build a full state snapshot event.
    pub fn snapshot_at(&self, now: u64) -> Event {
        Event::StateSnapshot {
            state: self.state,
            kind: self.kind,
            remaining_ms: self.remaining_ms,
            total_ms: self.total_ms(),
            display: self.display(),
            at: to_utc(now),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn switch_to(&mut self, kind: SessionKind) -> Vec<Event> {
        self.switch_to_at(kind, now_ms())
    }

    /// Load the full duration of `kind` and go idle. Ignored while running.
    pub fn switch_to_at(&mut self, kind: SessionKind, now: u64) -> Vec<Event> {
        if self.state == TimerState::Running {
            debug!(kind = %kind, "switch ignored while running");
            return Vec::new();
        }
        self.kind = kind;
        self.state = TimerState::Idle;
        self.remaining_ms = self.durations.ms(kind);
        self.clear_run();
        vec![Event::KindSwitched {
            kind,
            duration_min: self.durations.minutes(kind),
            at: to_utc(now),
        }]
    }

    pub fn start(&mut self) -> Vec<Event> {
        self.start_at(now_ms())
    }

    pub fn start_at(&mut self, now: u64) -> Vec<Event> {
        match self.state {
            TimerState::Running => Vec::new(),
            TimerState::Completed => {
                let mut events = self.switch_to_at(self.kind.opposite(), now);
                events.extend(self.begin(now));
                events
            }
            TimerState::Idle | TimerState::Paused => self.begin(now),
        }
    }

    pub fn pause(&mut self) -> Vec<Event> {
        self.pause_at(now_ms())
    }

    pub fn pause_at(&mut self, now: u64) -> Vec<Event> {
        if self.state != TimerState::Running {
            return Vec::new();
        }
        if let Some(done) = self.flush_and_complete(now) {
            return done;
        }
        self.stop_segment(now);
        self.state = TimerState::Paused;
        info!(kind = %self.kind, remaining_ms = self.remaining_ms, "timer paused");

        let mut events = vec![Event::TimerPaused {
            kind: self.kind,
            remaining_ms: self.remaining_ms,
            at: to_utc(now),
        }];
        events.extend(self.bank_partial(now));
        events
    }

    pub fn reset(&mut self) -> Vec<Event> {
        self.reset_at(now_ms())
    }

    /// Back to `Idle` with the full duration of the current kind. A running
    /// or paused focus run is credited first, as with pause.
    pub fn reset_at(&mut self, now: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.state == TimerState::Running {
            match self.flush_and_complete(now) {
                Some(done) => events.extend(done),
                None => self.stop_segment(now),
            }
        }
        events.extend(self.bank_partial(now));

        self.state = TimerState::Idle;
        self.remaining_ms = self.durations.ms(self.kind);
        self.clear_run();
        info!(kind = %self.kind, "timer reset");
        events.push(Event::TimerReset {
            kind: self.kind,
            at: to_utc(now),
        });
        events
    }

    pub fn tick(&mut self) -> Vec<Event> {
        self.tick_at(now_ms())
    }

    /// Call periodically while running. Returns `Completed` (and the
    /// auto-switch) when the countdown reaches zero.
    pub fn tick_at(&mut self, now: u64) -> Vec<Event> {
        if self.state != TimerState::Running {
            return Vec::new();
        }
        self.flush_and_complete(now).unwrap_or_default()
    }

    pub fn teardown(&mut self) -> Vec<Event> {
        self.teardown_at(now_ms())
    }

    /// The owning screen is going away: stop ticking and credit any
    /// unsaved partial focus run.
    pub fn teardown_at(&mut self, now: u64) -> Vec<Event> {
        if self.state == TimerState::Running {
            if let Some(done) = self.flush_and_complete(now) {
                return done;
            }
            self.stop_segment(now);
            self.state = TimerState::Paused;
        }
        self.bank_partial(now).into_iter().collect()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn begin(&mut self, now: u64) -> Vec<Event> {
        self.state = TimerState::Running;
        self.last_tick_epoch_ms = Some(now);
        self.segment_started_epoch_ms = Some(now);
        self.run_started_epoch_ms = Some(now);
        self.unbanked_ms = 0;
        info!(kind = %self.kind, remaining_ms = self.remaining_ms, "timer started");
        vec![Event::TimerStarted {
            kind: self.kind,
            remaining_ms: self.remaining_ms,
            at: to_utc(now),
        }]
    }

    fn flush_elapsed(&mut self, now: u64) {
        if let Some(last) = self.last_tick_epoch_ms {
            let elapsed = now.saturating_sub(last);
            self.remaining_ms = self.remaining_ms.saturating_sub(elapsed);
            self.last_tick_epoch_ms = Some(now);
        }
    }

    fn flush_and_complete(&mut self, now: u64) -> Option<Vec<Event>> {
        self.flush_elapsed(now);
        if self.remaining_ms > 0 {
            return None;
        }
        Some(self.complete(now))
    }

    fn complete(&mut self, now: u64) -> Vec<Event> {
        let kind = self.kind;
        let minutes = self.durations.minutes(kind);
        let started = self.run_started_epoch_ms.unwrap_or(now);
        info!(kind = %kind, minutes, "timer completed");

        let mut events = vec![Event::Completed {
            kind,
            minutes,
            started_at: to_utc(started),
            at: to_utc(now),
        }];
        self.clear_run();
        self.remaining_ms = 0;
        if self.auto_switch {
            self.state = TimerState::Idle;
            events.extend(self.switch_to_at(kind.opposite(), now));
        } else {
            self.state = TimerState::Completed;
        }
        events
    }

    fn stop_segment(&mut self, now: u64) {
        if let Some(started) = self.segment_started_epoch_ms.take() {
            self.unbanked_ms += now.saturating_sub(started);
        }
        self.last_tick_epoch_ms = None;
    }

    /// Credit the whole minutes of the stopped focus stretch, once. Breaks
    /// are never credited on interruption.
    fn bank_partial(&mut self, now: u64) -> Option<Event> {
        let elapsed = std::mem::take(&mut self.unbanked_ms);
        if self.kind != SessionKind::Focus {
            return None;
        }
        let minutes = elapsed / MS_PER_MINUTE;
        if minutes == 0 {
            return None;
        }
        debug!(minutes, "partial focus session banked");
        Some(Event::PartialSession {
            kind: self.kind,
            minutes,
            started_at: to_utc(self.run_started_epoch_ms.unwrap_or(now)),
            at: to_utc(now),
        })
    }

    fn clear_run(&mut self) {
        self.last_tick_epoch_ms = None;
        self.segment_started_epoch_ms = None;
        self.run_started_epoch_ms = None;
        self.unbanked_ms = 0;
    }
}

fn to_utc(epoch_ms: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64).unwrap_or_default()
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_714_700_000_000;
    const SEC: u64 = 1000;

    fn partial_minutes(events: &[Event]) -> Option<u64> {
        events.iter().find_map(|e| match e {
            Event::PartialSession { minutes, .. } => Some(*minutes),
            _ => None,
        })
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::default();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.display(), "25:00");

        assert_eq!(engine.start_at(T0).len(), 1);
        assert_eq!(engine.state(), TimerState::Running);
        assert!(engine.start_at(T0 + SEC).is_empty());

        engine.pause_at(T0 + 10 * SEC);
        assert_eq!(engine.state(), TimerState::Paused);
        assert_eq!(engine.remaining_ms(), 25 * 60 * SEC - 10 * SEC);

        engine.start_at(T0 + 100 * SEC);
        assert_eq!(engine.state(), TimerState::Running);
        // Paused time does not count down.
        engine.tick_at(T0 + 101 * SEC);
        assert_eq!(engine.remaining_ms(), 25 * 60 * SEC - 11 * SEC);
    }

    #[test]
    fn switching_is_rejected_while_running() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        assert!(engine.switch_to_at(SessionKind::Break, T0 + SEC).is_empty());
        assert_eq!(engine.kind(), SessionKind::Focus);

        engine.pause_at(T0 + 2 * SEC);
        engine.switch_to_at(SessionKind::Break, T0 + 3 * SEC);
        assert_eq!(engine.kind(), SessionKind::Break);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_ms(), 5 * 60 * SEC);
    }

    #[test]
    fn completion_banks_nominal_duration_and_switches() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        assert!(engine.tick_at(T0 + 60 * SEC).is_empty());

        let events = engine.tick_at(T0 + 25 * 60 * SEC + 400);
        assert!(matches!(
            events[0],
            Event::Completed {
                kind: SessionKind::Focus,
                minutes: 25,
                ..
            }
        ));
        assert!(matches!(
            events[1],
            Event::KindSwitched {
                kind: SessionKind::Break,
                ..
            }
        ));
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.kind(), SessionKind::Break);
        assert_eq!(engine.remaining_ms(), 5 * 60 * SEC);
    }

    #[test]
    fn completion_without_auto_switch_waits() {
        let mut engine = TimerEngine::default().with_auto_switch(false);
        engine.start_at(T0);
        let events = engine.tick_at(T0 + 25 * 60 * SEC);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.state(), TimerState::Completed);

        let events = engine.start_at(T0 + 26 * 60 * SEC);
        assert!(matches!(events[0], Event::KindSwitched { .. }));
        assert_eq!(engine.kind(), SessionKind::Break);
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn pause_after_a_minute_banks_whole_minutes() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        let events = engine.pause_at(T0 + 150 * SEC);
        assert_eq!(partial_minutes(&events), Some(2));
    }

    #[test]
    fn pause_under_a_minute_banks_nothing() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        let events = engine.pause_at(T0 + 59 * SEC);
        assert_eq!(partial_minutes(&events), None);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn minutes_are_banked_once() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        assert_eq!(partial_minutes(&engine.pause_at(T0 + 90 * SEC)), Some(1));
        // The leftover 30s is dropped; reset and teardown add nothing new.
        assert_eq!(partial_minutes(&engine.reset_at(T0 + 600 * SEC)), None);
        assert!(engine.teardown_at(T0 + 700 * SEC).is_empty());
    }

    #[test]
    fn each_resume_measures_from_its_own_start() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        assert_eq!(partial_minutes(&engine.pause_at(T0 + 40 * SEC)), None);
        engine.start_at(T0 + 100 * SEC);
        assert_eq!(partial_minutes(&engine.pause_at(T0 + 130 * SEC)), None);

        engine.start_at(T0 + 200 * SEC);
        let events = engine.pause_at(T0 + 330 * SEC);
        let started = events.iter().find_map(|e| match e {
            Event::PartialSession { started_at, .. } => Some(*started_at),
            _ => None,
        });
        assert_eq!(partial_minutes(&events), Some(2));
        assert_eq!(started, Some(to_utc(T0 + 200 * SEC)));
    }

    #[test]
    fn reset_while_running_banks_partial_focus() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        let events = engine.reset_at(T0 + 5 * 60 * SEC);
        assert_eq!(partial_minutes(&events), Some(5));
        assert!(matches!(events.last(), Some(Event::TimerReset { .. })));
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_ms(), 25 * 60 * SEC);
    }

    #[test]
    fn break_interruptions_bank_nothing() {
        let mut engine = TimerEngine::default();
        engine.switch_to_at(SessionKind::Break, T0);
        engine.start_at(T0);
        let events = engine.pause_at(T0 + 3 * 60 * SEC);
        assert_eq!(partial_minutes(&events), None);
    }

    #[test]
    fn teardown_while_running_credits_run() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        let events = engine.teardown_at(T0 + 4 * 60 * SEC + 5 * SEC);
        assert_eq!(partial_minutes(&events), Some(4));
        assert!(!engine.is_running());
        assert!(engine.tick_at(T0 + 30 * 60 * SEC).is_empty());
    }

    #[test]
    fn overdue_pause_completes_instead() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        let events = engine.pause_at(T0 + 40 * 60 * SEC);
        assert!(matches!(events[0], Event::Completed { minutes: 25, .. }));
        assert_eq!(engine.kind(), SessionKind::Break);
    }

    #[test]
    fn engine_survives_serde_round_trip_mid_run() {
        let mut engine = TimerEngine::default();
        engine.start_at(T0);
        let json = serde_json::to_string(&engine).unwrap();
        let mut restored: TimerEngine = serde_json::from_str(&json).unwrap();
        let events = restored.pause_at(T0 + 61 * SEC);
        assert_eq!(partial_minutes(&events), Some(1));
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::default();
        match engine.snapshot_at(T0) {
            Event::StateSnapshot {
                state,
                remaining_ms,
                display,
                ..
            } => {
                assert_eq!(state, TimerState::Idle);
                assert_eq!(remaining_ms, 25 * 60 * 1000);
                assert_eq!(display, "25:00");
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
