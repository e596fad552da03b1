//! Terminal styling utilities

use colored::Colorize;

use anon_feedback::TicketStatus;

pub fn style_cyan(s: &str) -> String {
    s.cyan().to_string()
}

pub fn style_green(s: &str) -> String {
    s.green().to_string()
}

pub fn style_yellow(s: &str) -> String {
    s.yellow().to_string()
}

pub fn style_dim(s: &str) -> String {
    s.dimmed().to_string()
}

pub fn style_bold(s: &str) -> String {
    s.bold().to_string()
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "ℹ".cyan(), msg);
}

pub fn print_header(title: &str) {
    println!();
    println!("{}", style_bold(title));
    println!("{}", "─".repeat(title.chars().count()));
}

pub fn style_status(status: TicketStatus) -> String {
    let label = status.label();
    match status {
        TicketStatus::New => label.blue().to_string(),
        TicketStatus::Approved => label.magenta().to_string(),
        TicketStatus::Answered => label.yellow().to_string(),
        TicketStatus::Resolved => label.green().to_string(),
        TicketStatus::Rejected => label.red().to_string(),
    }
}

/// Text progress bar for level progress in `[0, 1]`
pub fn progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0)) * width as f64).round() as usize;
    format!(
        "{}{}",
        "█".repeat(filled).cyan(),
        "░".repeat(width - filled).dimmed()
    )
}
