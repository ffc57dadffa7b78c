//! Session totals shown on the timer and home screens.

use serde::{Deserialize, Serialize};

use crate::model::StudySession;
use crate::timer::SessionKind;

use super::streak::current_streak;

/// Aggregates over one user's study sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTotals {
    pub focus_sessions: u64,
    pub focus_minutes: u64,
    /// Focus and break minutes together.
    pub all_minutes: u64,
    pub streak_days: u32,
}

impl SessionTotals {
    /// Totals with the streak taken against the local clock.
    pub fn from_sessions(sessions: &[StudySession]) -> Self {
        let mut totals = Self::tally(sessions);
        totals.streak_days = current_streak(
            sessions
                .iter()
                .filter(|s| s.session_type == SessionKind::Focus)
                .map(|s| s.created_at),
        );
        totals
    }

    /// Counts and minutes only; `streak_days` stays 0.
    pub fn tally(sessions: &[StudySession]) -> Self {
        let mut totals = Self::default();
        for session in sessions {
            totals.all_minutes += session.duration;
            if session.session_type == SessionKind::Focus {
                totals.focus_sessions += 1;
                totals.focus_minutes += session.duration;
            }
        }
        totals
    }
}

/// `"{h}h {m}m"` from an hour up, `"{m}m"` below.
pub fn format_minutes(total: u64) -> String {
    let hours = total / 60;
    let minutes = total % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(kind: SessionKind, duration: u64) -> StudySession {
        StudySession {
            session_type: kind,
            duration,
            ..StudySession::default()
        }
    }

    #[test]
    fn formats_hours_and_minutes() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(60), "1h 0m");
        assert_eq!(format_minutes(135), "2h 15m");
    }

    #[test]
    fn tally_separates_focus_from_breaks() {
        let sessions = vec![
            session(SessionKind::Focus, 25),
            session(SessionKind::Break, 5),
            session(SessionKind::Focus, 3),
        ];
        let totals = SessionTotals::tally(&sessions);
        assert_eq!(totals.focus_sessions, 2);
        assert_eq!(totals.focus_minutes, 28);
        assert_eq!(totals.all_minutes, 33);
        assert_eq!(totals.streak_days, 0);
    }
}
