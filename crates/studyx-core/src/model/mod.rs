//! Records stored in the document store.
//!
//! Each record maps to and from a [`Document`](crate::storage::Document) with
//! camelCase field names. Absent fields take defaults when reading, so
//! documents written by older clients still load.

mod card;
mod deck;
mod profile;
mod session;
mod task;

pub use card::Flashcard;
pub use deck::FlashcardDeck;
pub use profile::{UserProfile, DEFAULT_DISPLAY_NAME};
pub use session::StudySession;
pub use task::Task;

/// Collection names.
pub mod collections {
    pub const USERS: &str = "users";
    pub const TASKS: &str = "tasks";
    pub const DECKS: &str = "flashcard_decks";
    pub const CARDS: &str = "flashcards";
    pub const SESSIONS: &str = "study_sessions";
}

use crate::storage::{Document, Fields};

/// A record owned by one user, living in one collection.
pub trait Record: Sized {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    /// Map a stored document; `user_id` stands in for a missing owner.
    fn from_document(doc: &Document, user_id: &str) -> Self;

    /// Document fields, without the id.
    fn to_fields(&self) -> Fields;
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
