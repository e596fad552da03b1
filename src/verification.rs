//! One-time email verification codes
//!
//! One live entry per email. Issuing again overwrites the previous code.
//! Expiry is checked on read; an expired entry is dropped the first time it
//! is looked at.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FeedbackError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationEntry {
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

pub struct VerificationLedger {
    ttl: Duration,
    entries: Mutex<HashMap<String, VerificationEntry>>,
}

impl VerificationLedger {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn issue(&self, email: &str) -> String {
        self.issue_at(email, Utc::now())
    }

    /// Issue a 6-digit code for `email`, valid until `now + ttl`.
    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> String {
        let code = rand::thread_rng().gen_range(100_000..1_000_000u32).to_string();
        let entry = VerificationEntry {
            code: code.clone(),
            expires_at: now + self.ttl,
        };

        let replaced = self.entries.lock().insert(email.to_string(), entry);
        if replaced.is_some() {
            debug!("Replaced pending verification code for {}", email);
        }
        info!("Issued verification code for {}", email);
        code
    }

    pub fn verify(&self, email: &str, code: &str) -> Result<()> {
        self.verify_at(email, code, Utc::now())
    }

    /// Consume the pending code for `email` if it matches and has not expired.
    ///
    /// A mismatch leaves the entry in place; expiry removes it.
    pub fn verify_at(&self, email: &str, code: &str, now: DateTime<Utc>) -> Result<()> {
        let mut entries = self.entries.lock();

        let entry = entries.get(email).ok_or(FeedbackError::NoPendingCode)?;
        if now > entry.expires_at {
            entries.remove(email);
            info!("Verification code for {} expired", email);
            return Err(FeedbackError::CodeExpired);
        }
        if entry.code != code {
            debug!("Verification code mismatch for {}", email);
            return Err(FeedbackError::CodeMismatch);
        }

        entries.remove(email);
        info!("Verification code for {} consumed", email);
        Ok(())
    }

    /// Boolean form of [`verify`](Self::verify)
    pub fn check(&self, email: &str, code: &str) -> bool {
        self.verify(email, code).is_ok()
    }

    pub fn has_pending(&self, email: &str) -> bool {
        self.entries.lock().contains_key(email)
    }
}
