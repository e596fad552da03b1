//! Config command - show effective configuration

use crate::style::*;
use anon_feedback::Config;
use anyhow::{Context, Result};

pub fn run(config: &Config) -> Result<()> {
    print_header("Configuration");

    println!();
    println!("Handle label:      {}", style_cyan(&config.identity.handle_label));
    println!("Unique handles:    {}", config.identity.unique_handles);
    println!("Code lifetime:     {}s", config.verification.code_ttl_secs);
    println!("Min password:      {} chars", config.auth.min_password_len);
    println!("Level band:        {} XP", config.scoring.band_width);
    println!("Session database:  {}", config.session_path().display());
    println!("Demo data:         {}", config.seed.demo_data);

    println!();
    println!("{}", style_bold("Full config:"));
    let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
    println!("{}", style_dim(&rendered));

    Ok(())
}
