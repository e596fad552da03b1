//! Configuration management
//!
//! Loads configuration from config.toml with support for:
//! - Pseudonymous handle format
//! - Verification code lifetime
//! - Points awarded per mission and level band width
//! - Badge thresholds
//! - Local session slot location

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub identity: IdentityConfig,
    pub verification: VerificationConfig,
    pub auth: AuthConfig,
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub badges: Vec<BadgeRule>,
    pub session: SessionConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub handle_label: String,
    /// Re-roll a freshly generated handle when it was already issued
    #[serde(default = "default_true")]
    pub unique_handles: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    pub code_ttl_secs: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub min_password_len: usize,
}

/// Points and leveling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Width of one level band in points
    pub band_width: u32,
    pub leaderboard_limit: usize,
    pub awards: AwardsConfig,
}

/// Points credited per mission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardsConfig {
    pub ticket_submitted: u32,
    pub moderator_approved: u32,
    pub reply_received: u32,
    pub resolved: u32,
    pub praise_shared: u32,
}

/// A badge granted once the account has submitted `min_tickets` tickets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeRule {
    pub name: String,
    pub min_tickets: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_true")]
    pub demo_data: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { demo_data: true }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load from config.toml or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load from specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            toml::from_str(DEFAULT_CONFIG).context("Failed to parse default config")
        }
    }

    /// Session database path (env var takes precedence)
    pub fn session_path(&self) -> PathBuf {
        match std::env::var("FEEDBACK_SESSION_DB") {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => self.session.path.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            identity: IdentityConfig {
                handle_label: "сотрудник".to_string(),
                unique_handles: true,
            },
            verification: VerificationConfig { code_ttl_secs: 600 },
            auth: AuthConfig {
                min_password_len: 6,
            },
            scoring: ScoringConfig {
                band_width: 150,
                leaderboard_limit: 5,
                awards: AwardsConfig {
                    ticket_submitted: 40,
                    moderator_approved: 35,
                    reply_received: 25,
                    resolved: 60,
                    praise_shared: 20,
                },
            },
            badges: vec![
                BadgeRule {
                    name: "Новичок".to_string(),
                    min_tickets: 1,
                },
                BadgeRule {
                    name: "Активный участник".to_string(),
                    min_tickets: 5,
                },
            ],
            session: SessionConfig {
                path: PathBuf::from("feedback-session.db"),
            },
            seed: SeedConfig::default(),
        })
    }
}
