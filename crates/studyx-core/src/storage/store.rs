//! Document store seam.
//!
//! Records live as schemaless JSON documents in named collections, addressed
//! by `(collection, id)`. Reads are equality-filtered queries, either
//! one-shot (`query`) or live (`listen`). A live subscription receives the
//! full matching result set again after every write to its collection, in
//! write order, until it is cancelled or dropped.

use serde_json::{Map, Value};
use tokio::sync::mpsc::{error::TryRecvError, UnboundedReceiver};

use crate::error::StoreError;

pub type StoreResult<T> = Result<T, StoreError>;

/// Field map of one document.
pub type Fields = Map<String, Value>;

/// Field every owned record carries; the mandatory query filter.
pub const OWNER_FIELD: &str = "userId";

/// A stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.fields.get(key).and_then(Value::as_u64)
    }

    pub fn owner(&self) -> Option<&str> {
        self.get_str(OWNER_FIELD)
    }
}

/// Equality-filtered query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
        }
    }

    /// Query restricted to documents owned by `user_id`.
    pub fn owned_by(collection: impl Into<String>, user_id: &str) -> Self {
        Self::new(collection).where_eq(OWNER_FIELD, user_id)
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| fields.get(field) == Some(expected))
    }

    /// Whether the query pins `userId` to exactly `user_id`.
    pub fn is_scoped_to(&self, user_id: &str) -> bool {
        self.filters
            .iter()
            .any(|(field, value)| field == OWNER_FIELD && value.as_str() == Some(user_id))
    }
}

/// Full result set of a query at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub documents: Vec<Document>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Handle on a live query. Dropping it releases the listener.
#[derive(Debug)]
pub struct Subscription {
    rx: UnboundedReceiver<StoreResult<Snapshot>>,
}

impl Subscription {
    pub(crate) fn new(rx: UnboundedReceiver<StoreResult<Snapshot>>) -> Self {
        Self { rx }
    }

    /// Next pending delivery without waiting.
    pub fn try_next(&mut self) -> Option<StoreResult<Snapshot>> {
        match self.rx.try_recv() {
            Ok(delivery) => Some(delivery),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain pending deliveries, returning every one in delivery order.
    pub fn drain(&mut self) -> Vec<StoreResult<Snapshot>> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Wait for the next delivery. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<StoreResult<Snapshot>> {
        self.rx.recv().await
    }

    /// Stop receiving; the store forgets the listener on its next write.
    pub fn cancel(mut self) {
        self.rx.close();
    }
}

/// A document database: named collections of JSON documents.
///
/// Implementations decide access rules; callers always scope queries with
/// [`Query::owned_by`].
pub trait DocumentStore {
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    fn query(&self, query: &Query) -> StoreResult<Snapshot>;

    /// Live query. The current result set is delivered immediately.
    fn listen(&self, query: Query) -> StoreResult<Subscription>;

    /// Insert with a generated id; returns the id.
    fn add(&self, collection: &str, fields: Fields) -> StoreResult<String>;

    /// Create or replace the document at `id`.
    fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    /// Merge `fields` into an existing document.
    fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()>;

    fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;

    /// Delete all `ids` atomically. Missing ids are skipped.
    fn batch_delete(&self, collection: &str, ids: &[String]) -> StoreResult<()>;
}

/// Build a field map from `(name, value)` pairs.
pub fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Fields {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_matches_all_filters() {
        let q = Query::owned_by("tasks", "u1").where_eq("isCompleted", true);
        let doc = fields([
            ("userId", json!("u1")),
            ("isCompleted", json!(true)),
            ("title", json!("Read")),
        ]);
        assert!(q.matches(&doc));

        let other = fields([("userId", json!("u2")), ("isCompleted", json!(true))]);
        assert!(!q.matches(&other));
        assert!(q.is_scoped_to("u1"));
        assert!(!Query::new("tasks").is_scoped_to("u1"));
    }

    #[test]
    fn document_accessors_tolerate_missing_fields() {
        let doc = Document::new("d1", fields([("priority", json!(2))]));
        assert_eq!(doc.get_i64("priority"), Some(2));
        assert_eq!(doc.get_str("title"), None);
        assert_eq!(doc.owner(), None);
    }
}
