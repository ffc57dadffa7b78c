//! Flashcard decks and their cards.

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use super::{Backend, StudyMode};
use crate::error::{CoreError, Result, StoreError};
use crate::model::{collections, Flashcard, FlashcardDeck};
use crate::repo::{CardRepo, DeckRepo};
use crate::storage::{fields, Subscription};
use crate::validation::required;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecksView {
    pub decks: Vec<FlashcardDeck>,
    pub empty: bool,
}

pub struct FlashcardsScreen {
    decks_repo: DeckRepo,
    cards_repo: CardRepo,
    subscription: Option<Subscription>,
    decks: Vec<FlashcardDeck>,
    last_error: Option<String>,
}

impl FlashcardsScreen {
    pub fn open(backend: &Backend) -> Result<Self> {
        let uid = backend.user()?;
        let decks_repo = DeckRepo::new(backend.store.clone(), uid.as_str());
        let cards_repo = CardRepo::new(backend.store.clone(), uid);
        let subscription = decks_repo.listen()?;
        let mut screen = Self {
            decks_repo,
            cards_repo,
            subscription: Some(subscription),
            decks: Vec::new(),
            last_error: None,
        };
        screen.sync();
        Ok(screen)
    }

    /// Apply pending snapshots. Returns how many arrived.
    pub fn sync(&mut self) -> usize {
        let Some(subscription) = self.subscription.as_mut() else {
            return 0;
        };
        let deliveries = subscription.drain();
        let count = deliveries.len();
        for delivery in deliveries {
            match delivery {
                Ok(snapshot) => self.decks = self.decks_repo.map(&snapshot),
                Err(e) => {
                    warn!(error = %e, "deck listener failed");
                    self.last_error = Some(format!("Error loading decks: {e}"));
                }
            }
        }
        count
    }

    pub fn render(&self) -> DecksView {
        DecksView {
            decks: self.decks.clone(),
            empty: self.decks.is_empty(),
        }
    }

    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    pub fn create_deck(&mut self, name: &str, description: &str) -> Result<String> {
        let name = required("Deck name", name)?;
        let deck = FlashcardDeck::new(self.decks_repo.user_id(), name, description.trim());
        let id = self.decks_repo.add(&deck)?;
        info!(%id, name, "deck created");
        self.sync();
        Ok(id)
    }

    /// Add a card, then bump the deck's `cardCount`. If the count cannot
    /// be written the card is deleted again and the error returned.
    pub fn add_card(&mut self, deck_id: &str, front: &str, back: &str) -> Result<String> {
        let front = required("Question", front)?;
        let back = required("Answer", back)?;
        let deck = self.deck(deck_id)?;

        let card = Flashcard::new(self.cards_repo.user_id(), &deck.id, front, back);
        let card_id = self.cards_repo.add(&card)?;

        let count = fields([("cardCount", json!(deck.card_count + 1))]);
        if let Err(e) = self.decks_repo.update(&deck.id, count) {
            warn!(deck = %deck.id, card = %card_id, error = %e, "count update failed, removing card");
            if let Err(rollback) = self.cards_repo.delete(&card_id) {
                warn!(card = %card_id, error = %rollback, "rollback failed");
            }
            return Err(e.into());
        }
        info!(deck = %deck.id, card = %card_id, "card added");
        self.sync();
        Ok(card_id)
    }

    pub fn cards(&self, deck_id: &str) -> Result<Vec<Flashcard>> {
        Ok(self.cards_repo.in_deck(deck_id)?)
    }

    /// Delete the deck's cards in one batch, then the deck. Returns how
    /// many cards went with it.
    pub fn delete_deck(&mut self, deck_id: &str) -> Result<usize> {
        let deck = self.deck(deck_id)?;
        let ids: Vec<String> = self
            .cards_repo
            .in_deck(&deck.id)?
            .into_iter()
            .map(|c| c.id)
            .collect();
        self.cards_repo.batch_delete(&ids)?;
        self.decks_repo.delete(&deck.id)?;
        info!(deck = %deck.id, cards = ids.len(), "deck deleted");
        self.sync();
        Ok(ids.len())
    }

    /// `None` when the deck has no cards yet.
    pub fn study(&self, deck_id: &str) -> Result<Option<StudyMode>> {
        let deck = self.deck(deck_id)?;
        let cards = self.cards_repo.in_deck(&deck.id)?;
        Ok(StudyMode::new(self.cards_repo.clone(), &deck.name, cards))
    }

    /// Fresh copy of a deck from the store.
    fn deck(&self, deck_id: &str) -> Result<FlashcardDeck> {
        self.decks_repo.get(deck_id)?.ok_or_else(|| {
            CoreError::Store(StoreError::NotFound {
                collection: collections::DECKS.to_string(),
                id: deck_id.to_string(),
            })
        })
    }

    pub fn close(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthGateway, LocalAuth};
    use crate::storage::SqliteStore;
    use std::rc::Rc;

    fn screen() -> FlashcardsScreen {
        let store = Rc::new(SqliteStore::open_memory().unwrap().with_owner_rules(true));
        let auth = Rc::new(LocalAuth::new(store.clone(), 6).unwrap());
        auth.sign_up("ada@uni.edu", "secret1").unwrap();
        FlashcardsScreen::open(&Backend::new(store, auth)).unwrap()
    }

    #[test]
    fn card_add_bumps_deck_count() {
        let mut s = screen();
        let deck = s.create_deck("Biology", "").unwrap();
        s.add_card(&deck, "Cell unit?", "Cell").unwrap();
        s.add_card(&deck, "DNA shape?", "Double helix").unwrap();

        let view = s.render();
        assert_eq!(view.decks.len(), 1);
        assert_eq!(view.decks[0].card_count, 2);
        assert_eq!(s.cards(&deck).unwrap().len(), 2);
    }

    #[test]
    fn card_needs_both_faces() {
        let mut s = screen();
        let deck = s.create_deck("Biology", "").unwrap();
        let err = s.add_card(&deck, "Q", " ").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Answer is required");
        assert!(s.cards(&deck).unwrap().is_empty());
    }

    #[test]
    fn deleting_a_deck_takes_its_cards() {
        let mut s = screen();
        let keep = s.create_deck("Chemistry", "").unwrap();
        let doomed = s.create_deck("Biology", "").unwrap();
        s.add_card(&doomed, "a", "b").unwrap();
        s.add_card(&doomed, "c", "d").unwrap();
        s.add_card(&keep, "e", "f").unwrap();

        assert_eq!(s.delete_deck(&doomed).unwrap(), 2);
        assert!(s.cards(&doomed).unwrap().is_empty());
        assert_eq!(s.cards(&keep).unwrap().len(), 1);
        assert_eq!(s.render().decks.len(), 1);
    }

    #[test]
    fn empty_deck_cannot_be_studied() {
        let mut s = screen();
        let deck = s.create_deck("Empty", "").unwrap();
        assert!(s.study(&deck).unwrap().is_none());
        s.add_card(&deck, "Q", "A").unwrap();
        assert_eq!(s.study(&deck).unwrap().unwrap().render().total, 1);
    }
}
