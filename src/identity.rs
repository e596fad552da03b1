//! Pseudonymous handle issuance
//!
//! Handles look like `сотрудник-4821`: a fixed label plus a random 4-digit
//! suffix. The suffix grows by a digit once draws keep landing on taken
//! handles. The issuer remembers which account each handle was issued for so
//! that scoring can credit the right account, but that mapping never leaves
//! the crate. A recorded owner is never replaced.

use std::collections::HashMap;

use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, warn};

use crate::model::{Account, AccountId, Handle};

/// Draws per suffix width before widening
const MAX_REROLLS: usize = 64;
const SUFFIX_DIGITS: u32 = 4;
const MAX_SUFFIX_DIGITS: u32 = 18;

pub struct IdentityIssuer {
    label: String,
    unique: bool,
    issued: Mutex<HashMap<Handle, Option<AccountId>>>,
}

impl IdentityIssuer {
    pub fn new(label: impl Into<String>, unique: bool) -> Self {
        Self {
            label: label.into(),
            unique,
            issued: Mutex::new(HashMap::new()),
        }
    }

    /// Draw a fresh handle not bound to any account.
    pub fn issue_handle(&self) -> Handle {
        self.issue(None)
    }

    /// Draw a fresh handle and remember that `owner` holds it.
    pub fn issue_handle_for(&self, owner: &AccountId) -> Handle {
        self.issue(Some(owner.clone()))
    }

    pub fn handle_of<'a>(&self, account: &'a Account) -> &'a Handle {
        &account.handle
    }

    /// Record an externally supplied handle (seed data).
    ///
    /// Returns `false` when the handle already belongs to another account;
    /// the existing owner is kept.
    pub fn register(&self, handle: Handle, owner: Option<AccountId>) -> bool {
        let mut issued = self.issued.lock();
        let current = issued.get(&handle).cloned();
        match (current, owner) {
            (None, owner) | (Some(None), owner @ Some(_)) => {
                issued.insert(handle, owner);
                true
            }
            (Some(_), None) => true,
            (Some(Some(existing)), Some(owner)) => {
                if existing == owner {
                    true
                } else {
                    warn!("Handle {} already held by {}, not reassigning", handle, existing);
                    false
                }
            }
        }
    }

    pub(crate) fn owner_of(&self, handle: &Handle) -> Option<AccountId> {
        self.issued.lock().get(handle).cloned().flatten()
    }

    pub(crate) fn is_owned_by(&self, handle: &Handle, owner: &AccountId) -> bool {
        matches!(self.issued.lock().get(handle), Some(Some(id)) if id == owner)
    }

    fn issue(&self, owner: Option<AccountId>) -> Handle {
        let mut issued = self.issued.lock();
        let mut rng = rand::thread_rng();
        let mut digits = SUFFIX_DIGITS;

        loop {
            for _ in 0..MAX_REROLLS {
                let handle = self.draw(&mut rng, digits);
                // repeats are only tolerated for the same holder
                let free = match issued.get(&handle) {
                    None => true,
                    Some(existing) => !self.unique && *existing == owner,
                };
                if free {
                    debug!("Issued handle {}", handle);
                    issued.entry(handle.clone()).or_insert(owner);
                    return handle;
                }
            }

            if digits < MAX_SUFFIX_DIGITS {
                digits += 1;
                warn!("Handle space exhausted, widening suffix to {} digits", digits);
            }
        }
    }

    fn draw(&self, rng: &mut impl Rng, digits: u32) -> Handle {
        let low = 10u64.pow(digits - 1);
        let suffix: u64 = rng.gen_range(low..low * 10);
        Handle::new(format!("{}-{}", self.label, suffix))
    }
}
