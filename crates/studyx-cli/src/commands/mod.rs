pub mod auth;
pub mod config;
pub mod deck;
pub mod home;
pub mod stats;
pub mod task;
pub mod timer;

use std::error::Error;
use std::rc::Rc;

use serde::Serialize;
use studyx_core::{Backend, Config, LocalAuth, SqliteStore};

pub type CmdResult = Result<(), Box<dyn Error>>;

/// Everything a command needs: config, store, and the signed-in account.
pub struct Context {
    pub config: Config,
    pub store: Rc<SqliteStore>,
    pub auth: Rc<LocalAuth>,
}

impl Context {
    pub fn open() -> Result<Self, Box<dyn Error>> {
        let config = Config::load()?;
        let store = Rc::new(SqliteStore::open()?);
        let auth = Rc::new(LocalAuth::new(
            store.clone(),
            config.auth.min_password_len,
        )?);
        Ok(Self {
            config,
            store,
            auth,
        })
    }

    pub fn backend(&self) -> Backend {
        Backend::new(self.store.clone(), self.auth.clone())
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
