//! Login, registration and sign-out.

use tracing::{info, warn};

use super::Backend;
use crate::error::Result;
use crate::model::UserProfile;
use crate::repo::{load_profile, save_profile};
use crate::validation::{Credentials, Registration};

pub struct AccountScreen {
    backend: Backend,
    min_password_len: usize,
}

impl AccountScreen {
    pub fn new(backend: Backend, min_password_len: usize) -> Self {
        Self {
            backend,
            min_password_len,
        }
    }

    /// Validate, then sign in. Returns the user id.
    pub fn login(&self, form: &Credentials) -> Result<String> {
        let form = form.validate(self.min_password_len)?;
        let uid = self.backend.auth.sign_in(&form.email, &form.password)?;
        Ok(uid)
    }

    /// Create the account and its profile, then sign out again so the user
    /// logs in explicitly. Returns the new user id.
    pub fn register(&self, form: &Registration) -> Result<String> {
        let form = form.validate(self.min_password_len)?;
        let uid = self.backend.auth.sign_up(&form.email, &form.password)?;

        let profile = UserProfile::new(&form.full_name, &form.email, &form.student_level);
        let saved = save_profile(self.backend.store.as_ref(), &uid, &profile);
        self.backend.auth.sign_out()?;
        if let Err(e) = saved {
            warn!(%uid, error = %e, "profile not saved");
            return Err(e.into());
        }
        info!(%uid, "registered");
        Ok(uid)
    }

    pub fn logout(&self) -> Result<()> {
        Ok(self.backend.auth.sign_out()?)
    }

    /// Current user id and profile, if signed in.
    pub fn whoami(&self) -> Result<Option<(String, Option<UserProfile>)>> {
        let Some(uid) = self.backend.auth.current_user() else {
            return Ok(None);
        };
        let profile = load_profile(self.backend.store.as_ref(), &uid)?;
        Ok(Some((uid, profile)))
    }
}
