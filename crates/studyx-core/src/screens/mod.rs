//! Screen controllers.
//!
//! Each controller owns its query or subscription and its local list, and
//! renders an immutable view on demand. Writes go to the store one at a
//! time; a failed write leaves local state as it was and surfaces through
//! [`CoreError::user_message`].

mod account;
mod flashcards;
mod home;
mod quotes;
mod study;
mod tasks;
mod timer;

pub use account::AccountScreen;
pub use flashcards::{DecksView, FlashcardsScreen};
pub use home::{HomeScreen, HomeView};
pub use quotes::{random_quote, QUOTES};
pub use study::{CardView, Face, Step, StudyMode};
pub use tasks::{TasksScreen, TasksView};
pub use timer::{TimerScreen, TimerView};

use std::rc::Rc;

use crate::auth::AuthGateway;
use crate::error::Result;
use crate::storage::DocumentStore;

/// Store and identity shared by every screen.
#[derive(Clone)]
pub struct Backend {
    pub store: Rc<dyn DocumentStore>,
    pub auth: Rc<dyn AuthGateway>,
}

impl Backend {
    pub fn new(store: Rc<dyn DocumentStore>, auth: Rc<dyn AuthGateway>) -> Self {
        Self { store, auth }
    }

    /// Signed-in user id, or `NotSignedIn`.
    pub fn user(&self) -> Result<String> {
        Ok(self.auth.require_user()?)
    }
}
