//! Study statistics: focus streaks and session totals.

mod streak;
mod summary;

pub use streak::{current_streak, focus_streak, streak_from_dates, streak_label};
pub use summary::{format_minutes, SessionTotals};
