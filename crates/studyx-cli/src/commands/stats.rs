use serde_json::json;
use studyx_core::repo::SessionRepo;
use studyx_core::stats::{format_minutes, streak_label, SessionTotals};

use super::{print_json, CmdResult, Context};

pub fn run() -> CmdResult {
    let ctx = Context::open()?;
    let backend = ctx.backend();
    let uid = backend.user()?;
    let sessions = SessionRepo::new(backend.store.clone(), uid).list()?;
    let totals = SessionTotals::from_sessions(&sessions);

    print_json(&json!({
        "focus_sessions": totals.focus_sessions,
        "focus_minutes": totals.focus_minutes,
        "total_time": format_minutes(totals.focus_minutes),
        "streak_days": totals.streak_days,
        "streak": streak_label(totals.streak_days),
        "recent": sessions
            .iter()
            .rev()
            .take(5)
            .map(|s| json!({
                "type": s.session_type,
                "duration": s.formatted_duration(),
                "date": s.date_string(),
            }))
            .collect::<Vec<_>>(),
    }))
}
