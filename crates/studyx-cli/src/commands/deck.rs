use clap::Subcommand;
use serde_json::json;
use std::io::{self, BufRead, Write};
use studyx_core::repo::CardRepo;
use studyx_core::screens::{FlashcardsScreen, Step, StudyMode};
use studyx_core::storage::fields;
use studyx_core::CoreError;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum DeckAction {
    /// Create a deck
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List decks as JSON
    List,
    /// Delete a deck and all of its cards
    Delete { id: String },
    /// Add a card to a deck
    AddCard {
        deck_id: String,
        /// Question side
        front: String,
        /// Answer side
        back: String,
    },
    /// List a deck's cards as JSON
    Cards { deck_id: String },
    /// Study a deck interactively (reads commands from stdin)
    Study { deck_id: String },
    /// Mark a card as learned
    Learn { card_id: String },
}

pub fn run(action: DeckAction) -> CmdResult {
    let ctx = Context::open()?;
    let backend = ctx.backend();
    let mut screen = FlashcardsScreen::open(&backend)?;

    match action {
        DeckAction::Create { name, description } => {
            let id = screen.create_deck(&name, &description)?;
            print_json(&json!({ "id": id, "message": format!("Deck '{}' created!", name.trim()) }))?;
        }
        DeckAction::List => print_json(&screen.render())?,
        DeckAction::Delete { id } => {
            let cards = screen.delete_deck(&id)?;
            print_json(&json!({ "id": id, "cards_deleted": cards }))?;
        }
        DeckAction::AddCard {
            deck_id,
            front,
            back,
        } => {
            let id = screen.add_card(&deck_id, &front, &back)?;
            print_json(&json!({ "id": id, "deck_id": deck_id }))?;
        }
        DeckAction::Cards { deck_id } => print_json(&screen.cards(&deck_id)?)?,
        DeckAction::Study { deck_id } => match screen.study(&deck_id)? {
            Some(mode) => study(mode)?,
            None => println!("No cards in this deck yet!"),
        },
        DeckAction::Learn { card_id } => {
            let uid = backend.user()?;
            CardRepo::new(backend.store.clone(), uid)
                .update(&card_id, fields([("isLearned", json!(true))]))
                .map_err(CoreError::from)?;
            println!("Card marked as learned!");
        }
    }
    screen.close();
    Ok(())
}

const STUDY_HELP: &str = "commands: f(lip) n(ext) p(rev) l(earned) q(uit)";

fn study(mut mode: StudyMode) -> CmdResult {
    println!("Studying '{}'. {STUDY_HELP}", mode.deck_name());
    show(&mode)?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line?.trim() {
            "f" | "flip" => mode.flip(),
            "n" | "next" => {
                if mode.next() == Step::LastCard {
                    println!("Last card reached!");
                }
            }
            "p" | "prev" => {
                if mode.prev() == Step::FirstCard {
                    println!("Already at the first card");
                }
            }
            "l" | "learned" => {
                mode.mark_learned()?;
                println!("Card marked as learned!");
            }
            "q" | "quit" => break,
            "" => continue,
            _ => {
                println!("{STUDY_HELP}");
                continue;
            }
        }
        show(&mode)?;
    }
    Ok(())
}

fn show(mode: &StudyMode) -> CmdResult {
    let view = mode.render();
    let learned = if view.is_learned { " (learned)" } else { "" };
    println!(
        "[{}] {:?}: {}{learned}",
        view.counter, view.face, view.text
    );
    io::stdout().flush()?;
    Ok(())
}
