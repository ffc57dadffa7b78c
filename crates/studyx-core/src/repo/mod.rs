//! User-scoped repositories.
//!
//! A [`Repo`] is bound to one user id; every query it issues filters
//! `userId` to that id and every record it writes is stamped with it.
//! Point reads and writes check the stored owner themselves, so a store
//! without access rules still keeps users apart.

use serde_json::json;
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{
    collections, Flashcard, FlashcardDeck, Record, StudySession, Task, UserProfile,
};
use crate::storage::{
    Document, DocumentStore, Fields, Query, Snapshot, StoreResult, Subscription, OWNER_FIELD,
};
use crate::timer::SessionKind;

pub type TaskRepo = Repo<Task>;
pub type DeckRepo = Repo<FlashcardDeck>;
pub type CardRepo = Repo<Flashcard>;
pub type SessionRepo = Repo<StudySession>;

pub struct Repo<R> {
    store: Rc<dyn DocumentStore>,
    user_id: String,
    _record: PhantomData<R>,
}

impl<R> Clone for Repo<R> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            user_id: self.user_id.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> Repo<R> {
    pub fn new(store: Rc<dyn DocumentStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
            _record: PhantomData,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The owner-filtered base query; narrow it with `where_eq`.
    pub fn scoped(&self) -> Query {
        Query::owned_by(R::COLLECTION, &self.user_id)
    }

    pub fn list(&self) -> StoreResult<Vec<R>> {
        self.fetch(self.scoped())
    }

    fn fetch(&self, query: Query) -> StoreResult<Vec<R>> {
        let snapshot = self.store.query(&query)?;
        Ok(self.map(&snapshot))
    }

    pub fn listen(&self) -> StoreResult<Subscription> {
        self.store.listen(self.scoped())
    }

    pub fn map(&self, snapshot: &Snapshot) -> Vec<R> {
        snapshot
            .documents
            .iter()
            .map(|doc| R::from_document(doc, &self.user_id))
            .collect()
    }

    pub fn get(&self, id: &str) -> StoreResult<Option<R>> {
        Ok(self
            .get_document(id)?
            .map(|doc| R::from_document(&doc, &self.user_id)))
    }

    /// Raw document. Another user's document is `PermissionDenied`.
    pub fn get_document(&self, id: &str) -> StoreResult<Option<Document>> {
        match self.store.get(R::COLLECTION, id)? {
            Some(doc) if doc.owner() != Some(self.user_id.as_str()) => {
                warn!(collection = R::COLLECTION, %id, "foreign document refused");
                Err(self.denied(id))
            }
            found => Ok(found),
        }
    }

    /// Insert `record` owned by this repo's user. Returns the new id.
    pub fn add(&self, record: &R) -> StoreResult<String> {
        let mut fields = record.to_fields();
        fields.insert("userId".to_string(), json!(self.user_id));
        let id = self.store.add(R::COLLECTION, fields)?;
        debug!(collection = R::COLLECTION, %id, "record added");
        Ok(id)
    }

    /// Patch fields of an owned document. `userId` cannot be changed.
    pub fn update(&self, id: &str, mut fields: Fields) -> StoreResult<()> {
        self.ensure_owned(id)?;
        fields.remove(OWNER_FIELD);
        self.store.update(R::COLLECTION, id, fields)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.ensure_owned(id)?;
        self.store.delete(R::COLLECTION, id)
    }

    /// Every id is checked before anything is deleted; missing ids are
    /// skipped.
    pub fn batch_delete(&self, ids: &[String]) -> StoreResult<()> {
        for id in ids {
            self.get_document(id)?;
        }
        self.store.batch_delete(R::COLLECTION, ids)
    }

    fn ensure_owned(&self, id: &str) -> StoreResult<()> {
        match self.get_document(id)? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                collection: R::COLLECTION.to_string(),
                id: id.to_string(),
            }),
        }
    }

    fn denied(&self, id: &str) -> StoreError {
        StoreError::PermissionDenied {
            collection: R::COLLECTION.to_string(),
            reason: format!("{id} belongs to another user"),
        }
    }
}

impl Repo<Task> {
    pub fn completed(&self) -> StoreResult<Vec<Task>> {
        self.fetch(self.scoped().where_eq("isCompleted", true))
    }
}

impl Repo<Flashcard> {
    pub fn in_deck(&self, deck_id: &str) -> StoreResult<Vec<Flashcard>> {
        self.fetch(self.scoped().where_eq("deckId", deck_id))
    }
}

impl Repo<StudySession> {
    pub fn of_kind(&self, kind: SessionKind) -> StoreResult<Vec<StudySession>> {
        self.fetch(self.scoped().where_eq("sessionType", kind.as_str()))
    }
}

/// Profile of `user_id`, if one was written at registration.
pub fn load_profile(store: &dyn DocumentStore, user_id: &str) -> StoreResult<Option<UserProfile>> {
    Ok(store
        .get(collections::USERS, user_id)?
        .map(|doc| UserProfile::from_document(&doc)))
}

pub fn save_profile(
    store: &dyn DocumentStore,
    user_id: &str,
    profile: &UserProfile,
) -> StoreResult<()> {
    store.set(collections::USERS, user_id, profile.to_fields())
}
