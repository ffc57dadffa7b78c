use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{collections, now_ms, Record};
use crate::storage::{fields, Document, Fields};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    pub deck_id: String,
    pub front: String,
    pub back: String,
    pub is_learned: bool,
    pub created_at: i64,
    pub user_id: String,
}

impl Flashcard {
    pub fn new(user_id: &str, deck_id: &str, front: &str, back: &str) -> Self {
        Self {
            id: String::new(),
            deck_id: deck_id.to_string(),
            front: front.to_string(),
            back: back.to_string(),
            is_learned: false,
            created_at: now_ms(),
            user_id: user_id.to_string(),
        }
    }
}

impl Record for Flashcard {
    const COLLECTION: &'static str = collections::CARDS;

    fn id(&self) -> &str {
        &self.id
    }

    fn from_document(doc: &Document, user_id: &str) -> Self {
        Self {
            id: doc.id.clone(),
            deck_id: doc.get_str("deckId").unwrap_or_default().to_string(),
            front: doc.get_str("front").unwrap_or_default().to_string(),
            back: doc.get_str("back").unwrap_or_default().to_string(),
            is_learned: doc.get_bool("isLearned").unwrap_or(false),
            created_at: doc.get_i64("createdAt").unwrap_or_else(now_ms),
            user_id: doc.owner().unwrap_or(user_id).to_string(),
        }
    }

    fn to_fields(&self) -> Fields {
        fields([
            ("deckId", json!(self.deck_id)),
            ("front", json!(self.front)),
            ("back", json!(self.back)),
            ("isLearned", json!(self.is_learned)),
            ("createdAt", json!(self.created_at)),
            ("userId", json!(self.user_id)),
        ])
    }
}
