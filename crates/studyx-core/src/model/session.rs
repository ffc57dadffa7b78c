use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{collections, now_ms, Record};
use crate::stats::format_minutes;
use crate::storage::{fields, Document, Fields};
use crate::timer::SessionKind;

/// A banked stretch of focus or break time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub user_id: String,
    pub start_time: i64,
    pub end_time: i64,
    /// Minutes.
    pub duration: u64,
    pub session_type: SessionKind,
    pub created_at: i64,
}

impl Default for StudySession {
    fn default() -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            start_time: 0,
            end_time: 0,
            duration: 0,
            session_type: SessionKind::Focus,
            created_at: now_ms(),
        }
    }
}

impl StudySession {
    pub fn formatted_duration(&self) -> String {
        format_minutes(self.duration)
    }

    /// Creation date as `"Mon DD, YYYY"` in `tz`.
    pub fn date_string_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match DateTime::<Utc>::from_timestamp_millis(self.created_at) {
            Some(utc) => utc.with_timezone(tz).format("%b %d, %Y").to_string(),
            None => String::new(),
        }
    }

    pub fn date_string(&self) -> String {
        self.date_string_in(&Local)
    }
}

impl Record for StudySession {
    const COLLECTION: &'static str = collections::SESSIONS;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_document(doc: &Document, user_id: &str) -> Self {
        Self {
            id: doc.id.clone(),
            user_id: doc.owner().unwrap_or(user_id).to_string(),
            start_time: doc.get_i64("startTime").unwrap_or(0),
            end_time: doc.get_i64("endTime").unwrap_or(0),
            duration: doc.get_u64("duration").unwrap_or(0),
            session_type: doc
                .get_str("sessionType")
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            created_at: doc.get_i64("createdAt").unwrap_or_else(now_ms),
        }
    }

    fn to_fields(&self) -> Fields {
        fields([
            ("userId", json!(self.user_id)),
            ("startTime", json!(self.start_time)),
            ("endTime", json!(self.end_time)),
            ("duration", json!(self.duration)),
            ("sessionType", json!(self.session_type.as_str())),
            ("createdAt", json!(self.created_at)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_session_type_reads_as_focus() {
        let doc = Document::new(
            "s1",
            fields([("sessionType", json!("nap")), ("duration", json!(12))]),
        );
        let s = StudySession::from_document(&doc, "u1");
        assert_eq!(s.session_type, SessionKind::Focus);
        assert_eq!(s.duration, 12);
        assert_eq!(s.user_id, "u1");
    }

    #[test]
    fn display_helpers() {
        let s = StudySession {
            duration: 95,
            // 2024-05-03T12:00:00Z
            created_at: 1_714_737_600_000,
            ..Default::default()
        };
        assert_eq!(s.formatted_duration(), "1h 35m");
        assert_eq!(s.date_string_in(&Utc), "May 03, 2024");
    }

    #[test]
    fn break_sessions_store_lowercase_type() {
        let s = StudySession {
            session_type: SessionKind::Break,
            ..Default::default()
        };
        assert_eq!(s.to_fields().get("sessionType"), Some(&json!("break")));
    }
}
