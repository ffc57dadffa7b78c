//! One pass through a deck's cards.

use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::error::Result;
use crate::model::Flashcard;
use crate::repo::CardRepo;
use crate::storage::fields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Face {
    Front,
    Back,
}

/// Result of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Moved,
    /// Already on the last card; nothing changed.
    LastCard,
    /// Already on the first card; nothing changed.
    FirstCard,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub card_id: String,
    pub position: usize,
    pub total: usize,
    /// `"{position}/{total}"`.
    pub counter: String,
    pub face: Face,
    pub text: String,
    pub is_learned: bool,
}

/// Study state: ordered cards, a cursor, and which face is showing.
/// Never empty.
pub struct StudyMode {
    repo: CardRepo,
    deck_name: String,
    cards: Vec<Flashcard>,
    index: usize,
    face: Face,
}

impl StudyMode {
    /// `None` when there are no cards to study.
    pub fn new(repo: CardRepo, deck_name: &str, cards: Vec<Flashcard>) -> Option<Self> {
        if cards.is_empty() {
            return None;
        }
        info!(deck = deck_name, cards = cards.len(), "study started");
        Some(Self {
            repo,
            deck_name: deck_name.to_string(),
            cards,
            index: 0,
            face: Face::Front,
        })
    }

    pub fn deck_name(&self) -> &str {
        &self.deck_name
    }

    pub fn flip(&mut self) {
        self.face = match self.face {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        };
    }

    pub fn next(&mut self) -> Step {
        if self.index + 1 >= self.cards.len() {
            return Step::LastCard;
        }
        self.index += 1;
        self.face = Face::Front;
        Step::Moved
    }

    pub fn prev(&mut self) -> Step {
        if self.index == 0 {
            return Step::FirstCard;
        }
        self.index -= 1;
        self.face = Face::Front;
        Step::Moved
    }

    pub fn mark_learned(&mut self) -> Result<()> {
        let card = &mut self.cards[self.index];
        self.repo
            .update(&card.id, fields([("isLearned", json!(true))]))?;
        card.is_learned = true;
        info!(card = %card.id, "card marked learned");
        Ok(())
    }

    pub fn render(&self) -> CardView {
        let card = &self.cards[self.index];
        let text = match self.face {
            Face::Front => &card.front,
            Face::Back => &card.back,
        };
        CardView {
            card_id: card.id.clone(),
            position: self.index + 1,
            total: self.cards.len(),
            counter: format!("{}/{}", self.index + 1, self.cards.len()),
            face: self.face,
            text: text.clone(),
            is_learned: card.is_learned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DocumentStore, SqliteStore};
    use std::rc::Rc;

    fn mode(n: usize) -> Option<StudyMode> {
        let store: Rc<dyn DocumentStore> = Rc::new(SqliteStore::open_memory().unwrap());
        let repo = CardRepo::new(store, "u1");
        let cards = (0..n)
            .map(|i| {
                let mut card =
                    Flashcard::new("u1", "d1", &format!("Q{}", i + 1), &format!("A{}", i + 1));
                card.id = repo.add(&card).unwrap();
                card
            })
            .collect();
        StudyMode::new(repo, "Biology", cards)
    }

    #[test]
    fn empty_deck_has_no_study_mode() {
        assert!(mode(0).is_none());
    }

    #[test]
    fn navigation_and_flip() {
        let mut m = mode(3).unwrap();
        let v = m.render();
        assert_eq!((v.counter.as_str(), v.text.as_str()), ("1/3", "Q1"));

        m.flip();
        assert_eq!(m.render().text, "A1");
        assert_eq!(m.prev(), Step::FirstCard);

        assert_eq!(m.next(), Step::Moved);
        assert_eq!(m.render().face, Face::Front);
        assert_eq!(m.next(), Step::Moved);
        assert_eq!(m.next(), Step::LastCard);
        assert_eq!(m.render().counter, "3/3");

        assert_eq!(m.prev(), Step::Moved);
        assert_eq!(m.render().text, "Q2");
    }

    #[test]
    fn mark_learned_persists() {
        let mut m = mode(1).unwrap();
        m.mark_learned().unwrap();
        assert!(m.render().is_learned);
        let id = m.render().card_id;
        assert!(m.repo.get(&id).unwrap().unwrap().is_learned);
    }
}
