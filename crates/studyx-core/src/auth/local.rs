//! SQLite-backed accounts living next to the documents.
//!
//! Passwords are stored as hex SHA-256 digests over a per-account random
//! salt. The signed-in account is kept in the kv table so the session
//! survives restarts, and it becomes the store's access principal.

use rusqlite::{params, OptionalExtension};
use sha2::{Digest, Sha256};
use std::rc::Rc;
use tracing::{info, warn};
use uuid::Uuid;

use super::AuthGateway;
use crate::error::AuthError;
use crate::model::now_ms;
use crate::storage::SqliteStore;

const SESSION_KEY: &str = "auth.current_user";

pub struct LocalAuth {
    store: Rc<SqliteStore>,
    min_password_len: usize,
}

impl LocalAuth {
    /// Attach to `store`, restoring a persisted session.
    pub fn new(store: Rc<SqliteStore>, min_password_len: usize) -> Result<Self, AuthError> {
        store.conn().execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                uid        TEXT PRIMARY KEY,
                email      TEXT NOT NULL UNIQUE,
                salt       TEXT NOT NULL,
                digest     TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );",
        )?;
        let auth = Self {
            store,
            min_password_len,
        };
        let restored = auth.store.kv_get(SESSION_KEY)?;
        auth.store.set_principal(restored);
        Ok(auth)
    }

    pub fn store(&self) -> &Rc<SqliteStore> {
        &self.store
    }

    fn begin_session(&self, uid: &str) -> Result<(), AuthError> {
        self.store.kv_set(SESSION_KEY, uid)?;
        self.store.set_principal(Some(uid.to_string()));
        Ok(())
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

fn new_salt() -> Result<String, AuthError> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| AuthError::Backend(format!("Failed to generate salt: {e}")))?;
    Ok(hex::encode(bytes))
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl AuthGateway for LocalAuth {
    fn sign_in(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize(email);
        let row: Option<(String, String, String)> = self
            .store
            .conn()
            .query_row(
                "SELECT uid, salt, digest FROM accounts WHERE email = ?1",
                params![email],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        match row {
            Some((uid, salt, stored)) if digest(&salt, password) == stored => {
                self.begin_session(&uid)?;
                info!(%uid, "signed in");
                Ok(uid)
            }
            _ => {
                warn!(%email, "sign-in rejected");
                Err(AuthError::InvalidCredential)
            }
        }
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if password.chars().count() < self.min_password_len {
            return Err(AuthError::WeakPassword {
                min_len: self.min_password_len,
            });
        }
        let email = normalize(email);
        let taken: Option<String> = self
            .store
            .conn()
            .query_row(
                "SELECT uid FROM accounts WHERE email = ?1",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(AuthError::EmailInUse(email));
        }

        let uid = Uuid::new_v4().simple().to_string();
        let salt = new_salt()?;
        self.store.conn().execute(
            "INSERT INTO accounts (uid, email, salt, digest, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![uid, email, salt, digest(&salt, password), now_ms()],
        )?;
        self.begin_session(&uid)?;
        info!(%uid, "account created");
        Ok(uid)
    }

    fn sign_out(&self) -> Result<(), AuthError> {
        self.store.kv_delete(SESSION_KEY)?;
        self.store.set_principal(None);
        info!("signed out");
        Ok(())
    }

    fn current_user(&self) -> Option<String> {
        self.store.principal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> LocalAuth {
        let store = Rc::new(SqliteStore::open_memory().unwrap().with_owner_rules(true));
        LocalAuth::new(store, 6).unwrap()
    }

    #[test]
    fn sign_up_then_sign_in() {
        let auth = auth();
        let uid = auth.sign_up("Ada@Uni.edu", "secret1").unwrap();
        assert_eq!(auth.current_user().as_deref(), Some(uid.as_str()));

        auth.sign_out().unwrap();
        assert!(auth.current_user().is_none());
        assert!(matches!(auth.require_user(), Err(AuthError::NotSignedIn)));

        assert_eq!(auth.sign_in("ada@uni.edu", "secret1").unwrap(), uid);
        assert_eq!(auth.store().principal().as_deref(), Some(uid.as_str()));
    }

    #[test]
    fn rejects_bad_credentials_and_duplicates() {
        let auth = auth();
        auth.sign_up("ada@uni.edu", "secret1").unwrap();
        assert!(matches!(
            auth.sign_in("ada@uni.edu", "wrong-pw"),
            Err(AuthError::InvalidCredential)
        ));
        assert!(matches!(
            auth.sign_in("bob@uni.edu", "secret1"),
            Err(AuthError::InvalidCredential)
        ));
        assert!(matches!(
            auth.sign_up("ada@uni.edu", "another1"),
            Err(AuthError::EmailInUse(_))
        ));
        assert!(matches!(
            auth.sign_up("bob@uni.edu", "123"),
            Err(AuthError::WeakPassword { min_len: 6 })
        ));
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studyx.db");
        let uid = {
            let store = Rc::new(SqliteStore::open_at(&path).unwrap());
            LocalAuth::new(store, 6)
                .unwrap()
                .sign_up("ada@uni.edu", "secret1")
                .unwrap()
        };
        let store = Rc::new(SqliteStore::open_at(&path).unwrap());
        let auth = LocalAuth::new(store, 6).unwrap();
        assert_eq!(auth.current_user(), Some(uid));
    }
}
