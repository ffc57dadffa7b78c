//! SQLite-backed document store.
//!
//! Provides persistent storage for:
//! - JSON documents in named collections
//! - Live query subscriptions, re-delivered after each write
//! - Key-value store for device-local state (timer, signed-in account)
//!
//! With owner rules enabled the store behaves like a hosted backend with
//! per-user security rules: every access needs a signed-in principal, queries
//! must filter `userId` to that principal, and documents may only be read or
//! written by their owner. Profiles in `users` are addressed by the owner's id.

use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::path::Path;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{debug, warn};
use uuid::Uuid;

use super::data_dir;
use super::store::{
    Document, DocumentStore, Fields, Query, Snapshot, StoreResult, Subscription, OWNER_FIELD,
};
use crate::error::StoreError;
use crate::model::collections;

struct Watcher {
    query: Query,
    tx: UnboundedSender<StoreResult<Snapshot>>,
}

/// SQLite database holding documents, accounts, and device state.
pub struct SqliteStore {
    conn: Connection,
    owner_rules: bool,
    principal: RefCell<Option<String>>,
    watchers: RefCell<Vec<Watcher>>,
}

impl SqliteStore {
    /// Open the database at `<data dir>/studyx.db` with owner rules on.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("studyx.db");
        Ok(Self::open_at(path)?.with_owner_rules(true))
    }

    /// Open (or create) a database file at `path`. Owner rules are off.
    pub fn open_at(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_conn(Connection::open(path)?)
    }

    /// Open an in-memory database (for tests and throwaway runs).
    pub fn open_memory() -> StoreResult<Self> {
        Self::from_conn(Connection::open_in_memory()?)
    }

    fn from_conn(conn: Connection) -> StoreResult<Self> {
        let store = Self {
            conn,
            owner_rules: false,
            principal: RefCell::new(None),
            watchers: RefCell::new(Vec::new()),
        };
        store.migrate()?;
        Ok(store)
    }

    pub fn with_owner_rules(mut self, enabled: bool) -> Self {
        self.owner_rules = enabled;
        self
    }

    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Identity the access rules evaluate against.
    pub fn set_principal(&self, user_id: Option<String>) {
        *self.principal.borrow_mut() = user_id;
    }

    pub fn principal(&self) -> Option<String> {
        self.principal.borrow().clone()
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                id         TEXT NOT NULL,
                data       TEXT NOT NULL,
                UNIQUE(collection, id)
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Number of live subscriptions still attached.
    pub fn listener_count(&self) -> usize {
        self.watchers
            .borrow()
            .iter()
            .filter(|w| !w.tx.is_closed())
            .count()
    }

    // ── Raw access (no rules) ────────────────────────────────────────

    fn load(&self, collection: &str, id: &str) -> StoreResult<Option<Fields>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;
        match data {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write(&self, collection: &str, id: &str, fields: &Fields) -> StoreResult<()> {
        let json = serde_json::to_string(fields)?;
        self.conn.execute(
            "INSERT INTO documents (collection, id, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, id) DO UPDATE SET data = excluded.data",
            params![collection, id, json],
        )?;
        Ok(())
    }

    fn run_query(&self, query: &Query) -> StoreResult<Snapshot> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, data FROM documents WHERE collection = ?1 ORDER BY seq")?;
        let rows = stmt.query_map(params![query.collection], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, data) = row?;
            let fields: Fields = serde_json::from_str(&data)?;
            if query.matches(&fields) {
                documents.push(Document::new(id, fields));
            }
        }
        Ok(Snapshot { documents })
    }

    /// Re-deliver every live query on `collection`, dropping closed ones.
    fn notify(&self, collection: &str) {
        let mut watchers = self.watchers.borrow_mut();
        watchers.retain(|w| !w.tx.is_closed());
        for watcher in watchers.iter().filter(|w| w.query.collection == collection) {
            let delivery = self
                .check_query(&watcher.query)
                .and_then(|_| self.run_query(&watcher.query));
            if let Err(ref e) = delivery {
                warn!(collection, error = %e, "live query failed");
            }
            // A receiver closed since `retain` is pruned on the next write.
            let _ = watcher.tx.send(delivery);
        }
    }

    // ── Access rules ─────────────────────────────────────────────────

    /// `Ok(None)` when rules are off, the signed-in principal otherwise.
    fn rule_principal(&self, collection: &str) -> StoreResult<Option<String>> {
        if !self.owner_rules {
            return Ok(None);
        }
        match self.principal() {
            Some(uid) => Ok(Some(uid)),
            None => Err(denied(collection, "not signed in")),
        }
    }

    fn check_query(&self, query: &Query) -> StoreResult<()> {
        let Some(uid) = self.rule_principal(&query.collection)? else {
            return Ok(());
        };
        if query.collection == collections::USERS {
            return Err(denied(&query.collection, "profiles are read by id"));
        }
        if !query.is_scoped_to(&uid) {
            return Err(denied(&query.collection, "query must filter userId"));
        }
        Ok(())
    }

    /// Check that the principal owns the document as stored (`existing`) and
    /// as it would be written (`incoming`).
    fn check_access(
        &self,
        collection: &str,
        id: &str,
        existing: Option<&Fields>,
        incoming: Option<&Fields>,
    ) -> StoreResult<()> {
        let Some(uid) = self.rule_principal(collection)? else {
            return Ok(());
        };
        if collection == collections::USERS {
            return if id == uid {
                Ok(())
            } else {
                Err(denied(collection, "profile belongs to another user"))
            };
        }
        for fields in [existing, incoming].into_iter().flatten() {
            let owner = fields.get(OWNER_FIELD).and_then(|v| v.as_str());
            if owner != Some(uid.as_str()) {
                return Err(denied(collection, "document belongs to another user"));
            }
        }
        Ok(())
    }
}

fn denied(collection: &str, reason: &str) -> StoreError {
    StoreError::PermissionDenied {
        collection: collection.to_string(),
        reason: reason.to_string(),
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

impl DocumentStore for SqliteStore {
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let existing = self.load(collection, id)?;
        self.check_access(collection, id, existing.as_ref(), None)?;
        Ok(existing.map(|fields| Document::new(id, fields)))
    }

    fn query(&self, query: &Query) -> StoreResult<Snapshot> {
        self.check_query(query)?;
        let snapshot = self.run_query(query)?;
        debug!(collection = %query.collection, count = snapshot.len(), "query");
        Ok(snapshot)
    }

    fn listen(&self, query: Query) -> StoreResult<Subscription> {
        self.check_query(&query)?;
        let (tx, rx) = unbounded_channel();
        // Receiver is alive, so the initial send cannot fail.
        let _ = tx.send(self.run_query(&query));
        debug!(collection = %query.collection, "listener attached");
        self.watchers.borrow_mut().push(Watcher { query, tx });
        Ok(Subscription::new(rx))
    }

    fn add(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.check_access(collection, &id, None, Some(&fields))?;
        self.write(collection, &id, &fields)?;
        debug!(collection, %id, "document added");
        self.notify(collection);
        Ok(id)
    }

    fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let existing = self.load(collection, id)?;
        self.check_access(collection, id, existing.as_ref(), Some(&fields))?;
        self.write(collection, id, &fields)?;
        debug!(collection, id, "document set");
        self.notify(collection);
        Ok(())
    }

    fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let mut merged = self
            .load(collection, id)?
            .ok_or_else(|| not_found(collection, id))?;
        let before = merged.clone();
        merged.extend(fields);
        self.check_access(collection, id, Some(&before), Some(&merged))?;
        self.write(collection, id, &merged)?;
        debug!(collection, id, "document updated");
        self.notify(collection);
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        let existing = self
            .load(collection, id)?
            .ok_or_else(|| not_found(collection, id))?;
        self.check_access(collection, id, Some(&existing), None)?;
        self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        debug!(collection, id, "document deleted");
        self.notify(collection);
        Ok(())
    }

    fn batch_delete(&self, collection: &str, ids: &[String]) -> StoreResult<()> {
        for id in ids {
            if let Some(existing) = self.load(collection, id)? {
                self.check_access(collection, id, Some(&existing), None)?;
            }
        }
        let tx = self.conn.unchecked_transaction()?;
        for id in ids {
            tx.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )?;
        }
        tx.commit()?;
        debug!(collection, count = ids.len(), "batch delete");
        self.notify(collection);
        Ok(())
    }
}
