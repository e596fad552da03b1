//! Login Wizard - sign in or register with an emailed code
//!
//! Registration runs in three steps: email, one-time code, password.

use std::time::Duration;

use anon_feedback::auth::CodeSender;
use anon_feedback::{Account, FeedbackDesk, FeedbackError};
use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};

/// Shows the code on the terminal in place of an email
pub struct TerminalCodeSender;

impl CodeSender for TerminalCodeSender {
    fn send(&self, email: &str, code: &str) -> anon_feedback::Result<()> {
        println!();
        println!(
            "  {} Code sent to {}",
            style("✉").cyan(),
            style(email).cyan()
        );
        println!(
            "  {}",
            style(format!("(demo mailbox) Code: {}", code)).dim()
        );
        println!();
        Ok(())
    }
}

/// Returns `None` when the user chose to quit.
pub fn run(desk: &FeedbackDesk) -> Result<Option<Account>> {
    loop {
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("  Welcome")
            .items(&["Sign in", "Register", "Quit"])
            .default(0)
            .interact()?;

        let outcome = match choice {
            0 => sign_in(desk)?,
            1 => register(desk)?,
            _ => return Ok(None),
        };
        if outcome.is_some() {
            return Ok(outcome);
        }
    }
}

fn sign_in(desk: &FeedbackDesk) -> Result<Option<Account>> {
    println!();
    println!("  {}", style("Sign in").bold());
    println!();

    let email: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("  Email")
        .interact_text()?;
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("  Password")
        .interact()?;

    match desk.auth().login(email.trim(), &password) {
        Ok(account) => {
            println!(
                "  {} Signed in as {}",
                style("✓").green(),
                style(account.role.label()).cyan()
            );
            Ok(Some(account))
        }
        Err(e @ FeedbackError::InvalidCredential) => {
            println!("  {} {}", style("✗").red(), e);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn register(desk: &FeedbackDesk) -> Result<Option<Account>> {
    let auth = desk.auth();

    // Step 1: Email
    println!();
    println!("  {}", style("Step 1: Enter Email").bold());
    println!("  {}", style("A one-time code will be sent there").dim());
    println!();

    let email: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("  Email")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() || !input.contains('@') {
                return Err("Enter a valid email");
            }
            Ok(())
        })
        .interact_text()?;
    let email = email.trim().to_string();

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Sending verification code...");
    pb.enable_steady_tick(Duration::from_millis(80));
    let sent = auth.register(&email);
    pb.finish_and_clear();

    if let Err(e) = sent {
        return recoverable(e);
    }

    // Step 2: Code
    println!("  {}", style("Step 2: Enter Code").bold());
    println!();
    loop {
        let code: String = Input::with_theme(&ColorfulTheme::default())
            .with_prompt("  Verification code")
            .interact_text()?;

        match auth.confirm_code(&email, &code) {
            Ok(()) => {
                println!("  {} Email confirmed", style("✓").green());
                break;
            }
            Err(FeedbackError::CodeMismatch) => {
                println!("  {} Code does not match, try again", style("✗").red());
            }
            Err(e) => return recoverable(e),
        }
    }

    // Step 3: Password
    println!();
    println!("  {}", style("Step 3: Choose Password").bold());
    println!(
        "  {}",
        style(format!(
            "At least {} characters",
            desk.config().auth.min_password_len
        ))
        .dim()
    );
    println!();

    let min_len = desk.config().auth.min_password_len;
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("  Password")
        .with_confirmation("  Repeat password", "Passwords do not match")
        .validate_with(move |input: &String| -> Result<(), String> {
            if input.chars().count() < min_len {
                return Err(format!("Password must be at least {} characters", min_len));
            }
            Ok(())
        })
        .interact()?;

    match auth.finalize_registration(&email, &password) {
        Ok(account) => {
            println!();
            println!("  {} Registration complete", style("✓").green().bold());
            println!(
                "  Your anonymous handle: {}",
                style(account.handle.as_str()).cyan()
            );
            Ok(Some(account))
        }
        Err(e) => recoverable(e),
    }
}

fn recoverable(e: FeedbackError) -> Result<Option<Account>> {
    if e.is_recoverable() {
        println!("  {} {}", style("✗").red(), e);
        Ok(None)
    } else {
        Err(e.into())
    }
}
