//! Home dashboard.

use rand::Rng;
use serde::Serialize;
use tracing::warn;

use super::{random_quote, Backend};
use crate::error::Result;
use crate::model::DEFAULT_DISPLAY_NAME;
use crate::repo::{load_profile, SessionRepo, TaskRepo};
use crate::stats::{format_minutes, streak_label, SessionTotals};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub display_name: String,
    pub quote: Option<String>,
    pub tasks_completed: usize,
    /// Focus and break minutes across all sessions.
    pub study_minutes: u64,
    pub study_time: String,
    pub streak_days: u32,
    pub streak: String,
}

pub struct HomeScreen {
    backend: Backend,
    show_quotes: bool,
}

impl HomeScreen {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            show_quotes: true,
        }
    }

    pub fn with_quotes(mut self, show: bool) -> Self {
        self.show_quotes = show;
        self
    }

    /// Load the dashboard. Only a missing sign-in fails; a stat that
    /// cannot be read shows as zero.
    pub fn load<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<HomeView> {
        let uid = self.backend.user()?;
        let store = &self.backend.store;

        let display_name = match load_profile(store.as_ref(), &uid) {
            Ok(Some(profile)) => profile.display_name().to_string(),
            Ok(None) => DEFAULT_DISPLAY_NAME.to_string(),
            Err(e) => {
                warn!(error = %e, "profile unavailable");
                DEFAULT_DISPLAY_NAME.to_string()
            }
        };

        let tasks_completed = TaskRepo::new(store.clone(), uid.as_str())
            .completed()
            .map(|tasks| tasks.len())
            .unwrap_or_else(|e| {
                warn!(error = %e, "completed tasks unavailable");
                0
            });

        let totals = SessionRepo::new(store.clone(), uid.as_str())
            .list()
            .map(|sessions| SessionTotals::from_sessions(&sessions))
            .unwrap_or_else(|e| {
                warn!(error = %e, "study sessions unavailable");
                SessionTotals::default()
            });

        Ok(HomeView {
            display_name,
            quote: self.show_quotes.then(|| random_quote(rng).to_string()),
            tasks_completed,
            study_minutes: totals.all_minutes,
            study_time: format_minutes(totals.all_minutes),
            streak_days: totals.streak_days,
            streak: streak_label(totals.streak_days),
        })
    }

    pub fn sign_out(&self) -> Result<()> {
        Ok(self.backend.auth.sign_out()?)
    }
}
