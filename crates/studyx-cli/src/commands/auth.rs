use clap::Subcommand;
use serde_json::json;
use studyx_core::screens::AccountScreen;
use studyx_core::validation::{Credentials, Registration};

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create an account (signs out afterwards; log in to continue)
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// e.g. "Undergraduate"
        #[arg(long)]
        level: String,
        #[arg(long)]
        password: String,
        /// Password confirmation (defaults to --password)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Sign in
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account as JSON
    Whoami,
}

pub fn run(action: AuthAction) -> CmdResult {
    let ctx = Context::open()?;
    let screen = AccountScreen::new(ctx.backend(), ctx.config.auth.min_password_len);

    match action {
        AuthAction::Register {
            name,
            email,
            level,
            password,
            confirm,
        } => {
            let form = Registration {
                full_name: name,
                email,
                student_level: level,
                confirm_password: confirm.unwrap_or_else(|| password.clone()),
                password,
            };
            screen.register(&form)?;
            println!("Registration successful! Please log in.");
        }
        AuthAction::Login { email, password } => {
            screen.login(&Credentials::new(&email, &password))?;
            println!("Login successful!");
        }
        AuthAction::Logout => {
            screen.logout()?;
            println!("Logged out successfully");
        }
        AuthAction::Whoami => match screen.whoami()? {
            Some((uid, profile)) => print_json(&json!({
                "signed_in": true,
                "user_id": uid,
                "profile": profile,
            }))?,
            None => print_json(&json!({ "signed_in": false }))?,
        },
    }
    Ok(())
}
