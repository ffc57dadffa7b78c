//! Screens against a shared store, with and without per-user access rules.

use std::rc::Rc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use studyx_core::model::collections;
use studyx_core::repo::{SessionRepo, TaskRepo};
use studyx_core::screens::{
    AccountScreen, Backend, FlashcardsScreen, HomeScreen, TasksScreen, QUOTES,
};
use studyx_core::storage::{
    fields, Document, DocumentStore, Fields, Query, Snapshot, StoreResult, Subscription,
};
use studyx_core::validation::{Credentials, Registration};
use studyx_core::{
    AuthGateway, CoreError, LocalAuth, SessionKind, SqliteStore, StoreError, StudySession,
};

struct World {
    store: Rc<SqliteStore>,
    auth: Rc<LocalAuth>,
}

impl World {
    fn new() -> Self {
        Self::with_rules(true)
    }

    fn with_rules(enabled: bool) -> Self {
        let store = Rc::new(SqliteStore::open_memory().unwrap().with_owner_rules(enabled));
        let auth = Rc::new(LocalAuth::new(store.clone(), 6).unwrap());
        Self { store, auth }
    }

    fn backend(&self) -> Backend {
        Backend::new(self.store.clone(), self.auth.clone())
    }

    fn register(&self, name: &str, email: &str) -> String {
        AccountScreen::new(self.backend(), 6)
            .register(&Registration {
                full_name: name.into(),
                email: email.into(),
                student_level: "Undergraduate".into(),
                password: "secret1".into(),
                confirm_password: "secret1".into(),
            })
            .unwrap()
    }

    fn login(&self, email: &str) -> String {
        AccountScreen::new(self.backend(), 6)
            .login(&Credentials::new(email, "secret1"))
            .unwrap()
    }
}

#[test]
fn registration_signs_out_and_login_restores_profile() {
    let world = World::new();
    let uid = world.register("Ada Lovelace", "ada@uni.edu");
    assert!(world.auth.current_user().is_none());

    assert_eq!(world.login("ada@uni.edu"), uid);
    let (who, profile) = AccountScreen::new(world.backend(), 6)
        .whoami()
        .unwrap()
        .unwrap();
    assert_eq!(who, uid);
    assert_eq!(profile.unwrap().student_level, "Undergraduate");
}

#[test]
fn one_user_never_sees_another_users_records() {
    let world = World::new();
    world.register("Ada", "ada@uni.edu");
    world.register("Bob", "bob@uni.edu");

    world.login("ada@uni.edu");
    let mut tasks = TasksScreen::open(&world.backend()).unwrap();
    let ada_task = tasks.add("Ada's essay", "").unwrap();
    let mut decks = FlashcardsScreen::open(&world.backend()).unwrap();
    decks.create_deck("Ada's deck", "").unwrap();
    tasks.close();
    decks.close();

    world.login("bob@uni.edu");
    let mut tasks = TasksScreen::open(&world.backend()).unwrap();
    assert!(tasks.render().empty);
    assert!(FlashcardsScreen::open(&world.backend())
        .unwrap()
        .render()
        .empty);

    // Not in Bob's list, so nothing is sent to the store.
    let err = tasks.delete(&ada_task).unwrap_err();
    assert!(matches!(err, CoreError::Store(StoreError::NotFound { .. })));

    // Going around the screen hits the access rules.
    let store: Rc<dyn DocumentStore> = world.store.clone();
    let bob = world.auth.current_user().unwrap();
    let repo = TaskRepo::new(store.clone(), bob.as_str());
    assert!(matches!(
        repo.delete(&ada_task),
        Err(StoreError::PermissionDenied { .. })
    ));
    assert!(matches!(
        store.query(&Query::new(collections::TASKS)),
        Err(StoreError::PermissionDenied { .. })
    ));

    world.login("ada@uni.edu");
    assert_eq!(TasksScreen::open(&world.backend()).unwrap().render().total, 1);
}

#[test]
fn repositories_keep_users_apart_without_store_rules() {
    let world = World::with_rules(false);
    world.register("Ada", "ada@uni.edu");
    world.register("Bob", "bob@uni.edu");

    world.login("ada@uni.edu");
    let mut tasks = TasksScreen::open(&world.backend()).unwrap();
    let ada_task = tasks.add("Ada task", "").unwrap();
    let mut decks = FlashcardsScreen::open(&world.backend()).unwrap();
    let ada_deck = decks.create_deck("Ada deck", "").unwrap();
    tasks.close();
    decks.close();

    world.login("bob@uni.edu");
    let bob = world.auth.current_user().unwrap();
    let store: Rc<dyn DocumentStore> = world.store.clone();
    let repo = TaskRepo::new(store.clone(), bob.as_str());
    assert!(matches!(
        repo.get(&ada_task),
        Err(StoreError::PermissionDenied { .. })
    ));
    assert!(matches!(
        repo.update(&ada_task, fields([("title", json!("hijacked"))])),
        Err(StoreError::PermissionDenied { .. })
    ));
    assert!(matches!(
        repo.delete(&ada_task),
        Err(StoreError::PermissionDenied { .. })
    ));
    assert!(matches!(
        repo.batch_delete(&[ada_task.clone()]),
        Err(StoreError::PermissionDenied { .. })
    ));

    let mut tasks = TasksScreen::open(&world.backend()).unwrap();
    assert!(tasks.edit(&ada_task, "hijacked", "").is_err());
    let mut decks = FlashcardsScreen::open(&world.backend()).unwrap();
    assert!(decks.add_card(&ada_deck, "Q", "A").is_err());
    assert!(decks.study(&ada_deck).is_err());
    assert!(decks.delete_deck(&ada_deck).is_err());

    let raw = store.get(collections::TASKS, &ada_task).unwrap().unwrap();
    assert_eq!(raw.get_str("title"), Some("Ada task"));
    let deck = store.get(collections::DECKS, &ada_deck).unwrap().unwrap();
    assert_eq!(deck.get_u64("cardCount"), Some(0));
    assert!(store
        .query(&Query::new(collections::CARDS))
        .unwrap()
        .is_empty());
}

#[test]
fn stale_delete_is_diagnosed_as_not_found() {
    let world = World::new();
    world.register("Ada", "ada@uni.edu");
    world.login("ada@uni.edu");

    let mut first = TasksScreen::open(&world.backend()).unwrap();
    let mut stale = TasksScreen::open(&world.backend()).unwrap();
    let id = first.add("Read", "").unwrap();
    stale.sync();

    first.delete(&id).unwrap();
    let err = stale.delete(&id).unwrap_err();
    assert_eq!(err.user_message(), "Not found or already deleted");
}

#[test]
fn live_list_follows_writes_from_other_screens() {
    let world = World::new();
    world.register("Ada", "ada@uni.edu");
    world.login("ada@uni.edu");

    let mut watcher = TasksScreen::open(&world.backend()).unwrap();
    let mut writer = TasksScreen::open(&world.backend()).unwrap();
    writer.add("One", "").unwrap();
    let id = writer.add("Two", "").unwrap();
    writer.toggle(&id).unwrap();

    assert_eq!(watcher.sync(), 3);
    let view = watcher.render();
    assert_eq!((view.total, view.completed), (2, 1));

    writer.edit(&id, "Two (revised)", "with notes").unwrap();
    watcher.sync();
    assert_eq!(watcher.render().tasks[1].title, "Two (revised)");
}

/// Delegates to SQLite but refuses updates to decks.
struct DeckUpdateFails(Rc<SqliteStore>);

impl DocumentStore for DeckUpdateFails {
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.0.get(collection, id)
    }
    fn query(&self, query: &Query) -> StoreResult<Snapshot> {
        self.0.query(query)
    }
    fn listen(&self, query: Query) -> StoreResult<Subscription> {
        self.0.listen(query)
    }
    fn add(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        self.0.add(collection, fields)
    }
    fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        self.0.set(collection, id, fields)
    }
    fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        if collection == collections::DECKS {
            return Err(StoreError::Unavailable("offline".into()));
        }
        self.0.update(collection, id, fields)
    }
    fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.0.delete(collection, id)
    }
    fn batch_delete(&self, collection: &str, ids: &[String]) -> StoreResult<()> {
        self.0.batch_delete(collection, ids)
    }
}

#[test]
fn failed_count_update_rolls_back_the_card() {
    let world = World::new();
    world.register("Ada", "ada@uni.edu");
    world.login("ada@uni.edu");

    let backend = Backend::new(
        Rc::new(DeckUpdateFails(world.store.clone())),
        world.auth.clone(),
    );
    let mut screen = FlashcardsScreen::open(&backend).unwrap();
    let deck = screen.create_deck("Biology", "").unwrap();

    let err = screen.add_card(&deck, "Q", "A").unwrap_err();
    assert!(matches!(err, CoreError::Store(StoreError::Unavailable(_))));
    assert!(screen.cards(&deck).unwrap().is_empty());
    assert_eq!(screen.render().decks[0].card_count, 0);
}

#[test]
fn home_dashboard_summarizes_the_user() {
    let world = World::new();
    world.register("Ada Lovelace", "ada@uni.edu");
    let uid = world.login("ada@uni.edu");

    let mut tasks = TasksScreen::open(&world.backend()).unwrap();
    let done = tasks.add("Done", "").unwrap();
    tasks.add("Open", "").unwrap();
    tasks.toggle(&done).unwrap();

    let store: Rc<dyn DocumentStore> = world.store.clone();
    let sessions = SessionRepo::new(store, uid.as_str());
    for (kind, minutes) in [(SessionKind::Focus, 50), (SessionKind::Break, 15)] {
        sessions
            .add(&StudySession {
                duration: minutes,
                session_type: kind,
                ..Default::default()
            })
            .unwrap();
    }

    let mut rng = StdRng::seed_from_u64(7);
    let view = HomeScreen::new(world.backend()).load(&mut rng).unwrap();
    assert_eq!(view.display_name, "Ada Lovelace");
    assert_eq!(view.tasks_completed, 1);
    assert_eq!(view.study_minutes, 65);
    assert_eq!(view.study_time, "1h 5m");
    // Sessions were created just now.
    assert_eq!(view.streak_days, 1);
    assert_eq!(view.streak, "1 day");
    assert!(QUOTES.contains(&view.quote.unwrap().as_str()));

    let quiet = HomeScreen::new(world.backend())
        .with_quotes(false)
        .load(&mut rng)
        .unwrap();
    assert!(quiet.quote.is_none());
}

#[test]
fn home_without_profile_greets_a_student() {
    let world = World::new();
    let uid = world.auth.sign_up("ada@uni.edu", "secret1").unwrap();
    world
        .store
        .set(
            collections::USERS,
            &uid,
            fields([("email", json!("ada@uni.edu"))]),
        )
        .unwrap();

    let view = HomeScreen::new(world.backend())
        .load(&mut StdRng::seed_from_u64(1))
        .unwrap();
    assert_eq!(view.display_name, "Student");
    assert_eq!(view.study_time, "0m");
    assert_eq!(view.streak, "0 days");

    HomeScreen::new(world.backend()).sign_out().unwrap();
    let err = HomeScreen::new(world.backend())
        .load(&mut StdRng::seed_from_u64(1))
        .unwrap_err();
    assert_eq!(err.user_message(), "Please login again");
}
