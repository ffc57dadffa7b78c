use serde::{Deserialize, Serialize};
use serde_json::json;

use super::now_ms;
use crate::storage::{fields, Document, Fields};

/// Shown when a profile is missing or has no name.
pub const DEFAULT_DISPLAY_NAME: &str = "Student";

/// Registration details, stored at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
    pub student_level: String,
    pub created_at: i64,
}

impl UserProfile {
    pub fn new(full_name: &str, email: &str, student_level: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            email: email.to_string(),
            student_level: student_level.to_string(),
            created_at: now_ms(),
        }
    }

    pub fn from_document(doc: &Document) -> Self {
        Self {
            full_name: doc.get_str("fullName").unwrap_or_default().to_string(),
            email: doc.get_str("email").unwrap_or_default().to_string(),
            student_level: doc.get_str("studentLevel").unwrap_or_default().to_string(),
            created_at: doc.get_i64("createdAt").unwrap_or_else(now_ms),
        }
    }

    pub fn to_fields(&self) -> Fields {
        fields([
            ("fullName", json!(self.full_name)),
            ("email", json!(self.email)),
            ("studentLevel", json!(self.student_level)),
            ("createdAt", json!(self.created_at)),
        ])
    }

    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            DEFAULT_DISPLAY_NAME
        } else {
            &self.full_name
        }
    }
}
