//! Leaderboard command

use crate::style::*;
use anon_feedback::{Config, FeedbackDesk};
use anyhow::Result;

pub fn run(config: Config, limit: Option<usize>) -> Result<()> {
    print_header("Leaderboard");

    let desk = FeedbackDesk::new(config);
    let limit = limit.unwrap_or_else(|| desk.scoring().default_limit());
    let entries = desk.leaderboard(limit);

    if entries.is_empty() {
        print_info("No accounts yet.");
        return Ok(());
    }

    println!();
    println!(
        "{:>4}  {:<20}  {:<12}  {:>6}  {:>8}",
        "Rank", "Handle", "Role", "Level", "XP"
    );
    println!("{}", "─".repeat(58));

    for entry in &entries {
        let rank = format!("#{}", entry.rank);
        let rank_styled = if entry.rank == 1 {
            style_yellow(&rank)
        } else if entry.rank <= 3 {
            style_cyan(&rank)
        } else {
            rank
        };

        println!(
            "{:>4}  {:<20}  {:<12}  {:>6}  {:>8}",
            rank_styled,
            entry.handle.as_str(),
            entry.role.as_str(),
            format!("Lv {}", entry.level),
            entry.points
        );
    }

    println!();
    println!("Shown: {}", entries.len());

    Ok(())
}
