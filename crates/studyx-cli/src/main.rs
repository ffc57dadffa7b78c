use clap::{Parser, Subcommand};
use studyx_core::CoreError;

mod commands;

#[derive(Parser)]
#[command(name = "studyx", version, about = "StudyX CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account management
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Flashcard decks and study mode
    Deck {
        #[command(subcommand)]
        action: commands::deck::DeckAction,
    },
    /// Focus/break timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Focus session statistics
    Stats,
    /// Home dashboard
    Home {
        /// Print the dashboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Auth { action } => commands::auth::run(action),
        Commands::Task { action } => commands::task::run(action),
        Commands::Deck { action } => commands::deck::run(action),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Stats => commands::stats::run(),
        Commands::Home { json } => commands::home::run(json),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        match e.downcast_ref::<CoreError>() {
            Some(core) => eprintln!("error: {}", core.user_message()),
            None => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
