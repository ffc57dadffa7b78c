use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{SessionKind, TimerState};

/// Every timer state change produces an Event.
/// The timer screen persists sessions from `Completed` and `PartialSession`;
/// the CLI prints all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        kind: SessionKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        kind: SessionKind,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        kind: SessionKind,
        at: DateTime<Utc>,
    },
    KindSwitched {
        kind: SessionKind,
        duration_min: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero. `minutes` is the nominal duration of the kind.
    Completed {
        kind: SessionKind,
        minutes: u64,
        started_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// Interrupted focus run credited with whole elapsed minutes.
    PartialSession {
        kind: SessionKind,
        minutes: u64,
        started_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        kind: SessionKind,
        remaining_ms: u64,
        total_ms: u64,
        display: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Minutes to persist as a study session, if this event banks time.
    pub fn banked(&self) -> Option<(SessionKind, u64, DateTime<Utc>, DateTime<Utc>)> {
        match self {
            Event::Completed {
                kind,
                minutes,
                started_at,
                at,
            }
            | Event::PartialSession {
                kind,
                minutes,
                started_at,
                at,
            } => Some((*kind, *minutes, *started_at, *at)),
            _ => None,
        }
    }
}
