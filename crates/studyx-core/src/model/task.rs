use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{collections, now_ms, Record};
use crate::storage::{fields, Document, Fields};

/// A to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub is_completed: bool,
    /// Milliseconds since epoch; 0 means no due date.
    pub due_date: i64,
    pub priority: i64,
    pub created_at: i64,
    pub user_id: String,
}

impl Task {
    pub fn new(user_id: &str, title: &str, description: &str) -> Self {
        Self {
            id: String::new(),
            title: title.to_string(),
            description: description.to_string(),
            is_completed: false,
            due_date: 0,
            priority: 0,
            created_at: now_ms(),
            user_id: user_id.to_string(),
        }
    }
}

impl Record for Task {
    const COLLECTION: &'static str = collections::TASKS;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_document(doc: &Document, user_id: &str) -> Self {
        Self {
            id: doc.id.clone(),
            title: doc.get_str("title").unwrap_or_default().to_string(),
            description: doc.get_str("description").unwrap_or_default().to_string(),
            is_completed: doc.get_bool("isCompleted").unwrap_or(false),
            due_date: doc.get_i64("dueDate").unwrap_or(0),
            priority: doc.get_i64("priority").unwrap_or(0),
            created_at: doc.get_i64("createdAt").unwrap_or_else(now_ms),
            user_id: doc.owner().unwrap_or(user_id).to_string(),
        }
    }

    fn to_fields(&self) -> Fields {
        fields([
            ("title", json!(self.title)),
            ("description", json!(self.description)),
            ("isCompleted", json!(self.is_completed)),
            ("dueDate", json!(self.due_date)),
            ("priority", json!(self.priority)),
            ("createdAt", json!(self.created_at)),
            ("userId", json!(self.user_id)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_take_defaults() {
        let doc = Document::new("t1", fields([("title", json!("Read ch. 3"))]));
        let task = Task::from_document(&doc, "u1");
        assert_eq!(task.id, "t1");
        assert_eq!(task.title, "Read ch. 3");
        assert_eq!(task.description, "");
        assert!(!task.is_completed);
        assert_eq!(task.due_date, 0);
        assert_eq!(task.user_id, "u1");
        assert!(task.created_at > 0);
    }

    #[test]
    fn fields_use_camel_case_names() {
        let task = Task::new("u1", "Essay", "");
        let f = task.to_fields();
        assert_eq!(f.get("isCompleted"), Some(&json!(false)));
        assert_eq!(f.get("userId"), Some(&json!("u1")));
        assert!(!f.contains_key("id"));
    }
}
