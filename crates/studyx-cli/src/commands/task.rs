use clap::Subcommand;
use serde_json::json;
use studyx_core::screens::TasksScreen;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// List tasks with completion counts as JSON
    List,
    /// Change a task's title and description
    Edit {
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Flip a task between done and not done
    Toggle { id: String },
    /// Delete a task
    Delete { id: String },
}

pub fn run(action: TaskAction) -> CmdResult {
    let ctx = Context::open()?;
    let mut screen = TasksScreen::open(&ctx.backend())?;

    match action {
        TaskAction::Add { title, description } => {
            let id = screen.add(&title, &description)?;
            print_json(&json!({ "id": id, "message": "Task added!" }))?;
        }
        TaskAction::List => print_json(&screen.render())?,
        TaskAction::Edit {
            id,
            title,
            description,
        } => {
            screen.edit(&id, &title, &description)?;
            println!("Task updated!");
        }
        TaskAction::Toggle { id } => {
            let done = screen.toggle(&id)?;
            print_json(&json!({ "id": id, "isCompleted": done }))?;
        }
        TaskAction::Delete { id } => {
            screen.delete(&id)?;
            println!("Task deleted");
        }
    }
    screen.close();
    Ok(())
}
