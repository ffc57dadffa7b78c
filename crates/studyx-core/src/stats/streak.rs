//! Consecutive-day focus streak.
//!
//! A streak counts calendar days, walking back from today, on which at least
//! one focus session was created. Today must be present: a gap on today
//! yields 0 even when a long run ends yesterday.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::collections::HashSet;

/// Count consecutive days in `dates`, starting at `today` and walking back.
pub fn streak_from_dates(dates: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while dates.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Streak over session creation timestamps (ms since epoch), with days
/// taken in the timezone of `now`.
///
/// Pure given `now`: the same inputs always give the same count.
pub fn focus_streak<Tz, I>(created_at_ms: I, now: &DateTime<Tz>) -> u32
where
    Tz: TimeZone,
    I: IntoIterator<Item = i64>,
{
    let tz = now.timezone();
    let dates: HashSet<NaiveDate> = created_at_ms
        .into_iter()
        .filter_map(DateTime::<Utc>::from_timestamp_millis)
        .map(|at| at.with_timezone(&tz).date_naive())
        .collect();
    streak_from_dates(&dates, now.date_naive())
}

/// Streak as of the local wall clock.
pub fn current_streak<I>(created_at_ms: I) -> u32
where
    I: IntoIterator<Item = i64>,
{
    focus_streak(created_at_ms, &Local::now())
}

pub fn streak_label(days: u32) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{days} days")
    }
}
