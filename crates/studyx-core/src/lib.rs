//! # StudyX Core Library
//!
//! Core logic for StudyX, a student productivity toolkit: tasks, a
//! focus/break countdown timer, flashcard decks with a study mode, and a
//! home dashboard. Everything is reachable from the `studyx` CLI, which is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-based state machine that requires the caller
//!   to periodically invoke `tick()` for progress updates
//! - **Storage**: a document store trait with a SQLite implementation, plus
//!   TOML-based configuration
//! - **Auth**: an identity gateway trait with SQLite-backed local accounts
//! - **Screens**: one controller per feature, each rendering an immutable view
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`DocumentStore`] / [`SqliteStore`]: Record persistence and live queries
//! - [`AuthGateway`] / [`LocalAuth`]: Sign-in and the current user
//! - [`Config`]: Application configuration management

pub mod auth;
pub mod error;
pub mod events;
pub mod model;
pub mod repo;
pub mod screens;
pub mod stats;
pub mod storage;
pub mod timer;
pub mod validation;

pub use auth::{AuthGateway, LocalAuth};
pub use error::{AuthError, ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use model::{Flashcard, FlashcardDeck, StudySession, Task, UserProfile};
pub use screens::Backend;
pub use storage::{data_dir, Config, DocumentStore, Query, SqliteStore};
pub use timer::{Durations, SessionKind, TimerEngine, TimerState};
