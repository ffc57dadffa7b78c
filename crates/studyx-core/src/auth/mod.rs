//! Authentication gateway seam.

mod local;

pub use local::LocalAuth;

use crate::error::AuthError;

/// Identity provider: email/password accounts and the current session.
pub trait AuthGateway {
    /// Sign in and make the account current. Returns its user id.
    fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError>;

    /// Create an account and make it current. Returns its user id.
    fn sign_up(&self, email: &str, password: &str) -> Result<String, AuthError>;

    fn sign_out(&self) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<String>;

    /// Current user id, or `NotSignedIn`.
    fn require_user(&self) -> Result<String, AuthError> {
        self.current_user().ok_or(AuthError::NotSignedIn)
    }
}
