//! Levels command - show the band a points total falls into

use crate::style::*;
use anon_feedback::{level_of, Config};
use anyhow::Result;

pub fn run(config: &Config, points: u32) -> Result<()> {
    print_header("Level");

    let level = level_of(points, config.scoring.band_width);

    println!("Points:        {}", style_bold(&points.to_string()));
    println!("Level:         {}", style_cyan(&format!("Lv {}", level.level)));
    println!(
        "Progress:      {} {:.0}%",
        progress_bar(level.progress, 30),
        level.progress * 100.0
    );
    println!("To next level: {} XP", style_yellow(&level.xp_to_next.to_string()));
    println!();
    println!(
        "{}",
        style_dim(&format!(
            "Levels advance every {} points",
            config.scoring.band_width
        ))
    );

    Ok(())
}
