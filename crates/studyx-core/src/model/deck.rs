use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{collections, now_ms, Record};
use crate::storage::{fields, Document, Fields};

/// A named set of flashcards.
///
/// `card_count` is denormalized: bumped on each card add, never recounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardDeck {
    pub id: String,
    pub name: String,
    pub description: String,
    pub card_count: u64,
    pub created_at: i64,
    pub user_id: String,
}

impl FlashcardDeck {
    pub fn new(user_id: &str, name: &str, description: &str) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            description: description.to_string(),
            card_count: 0,
            created_at: now_ms(),
            user_id: user_id.to_string(),
        }
    }
}

impl Record for FlashcardDeck {
    const COLLECTION: &'static str = collections::DECKS;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_document(doc: &Document, user_id: &str) -> Self {
        Self {
            id: doc.id.clone(),
            name: doc.get_str("name").unwrap_or_default().to_string(),
            description: doc.get_str("description").unwrap_or_default().to_string(),
            card_count: doc.get_u64("cardCount").unwrap_or(0),
            created_at: doc.get_i64("createdAt").unwrap_or_else(now_ms),
            user_id: doc.owner().unwrap_or(user_id).to_string(),
        }
    }

    fn to_fields(&self) -> Fields {
        fields([
            ("name", json!(self.name)),
            ("description", json!(self.description)),
            ("cardCount", json!(self.card_count)),
            ("createdAt", json!(self.created_at)),
            ("userId", json!(self.user_id)),
        ])
    }
}
