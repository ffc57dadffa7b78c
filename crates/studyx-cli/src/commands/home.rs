use studyx_core::screens::HomeScreen;

use super::{print_json, CmdResult, Context};

pub fn run(json: bool) -> CmdResult {
    let ctx = Context::open()?;
    let view = HomeScreen::new(ctx.backend())
        .with_quotes(ctx.config.display.show_quotes)
        .load(&mut rand::thread_rng())?;

    if json {
        return print_json(&view);
    }
    println!("Welcome back, {}!", view.display_name);
    if let Some(quote) = &view.quote {
        println!("\"{quote}\"");
    }
    println!("Tasks Completed: {}", view.tasks_completed);
    println!("Study Time: {}", view.study_time);
    println!("Study Streak: {}", view.streak);
    Ok(())
}
