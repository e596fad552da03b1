//! Account directory

use std::collections::BTreeSet;

use parking_lot::RwLock;
use tracing::info;

use crate::error::{FeedbackError, Result};
use crate::model::{Account, AccountId, Handle, Role};

#[derive(Default)]
pub struct AccountDirectory {
    accounts: RwLock<Vec<Account>>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account with the next `uN` identifier.
    pub fn insert(
        &self,
        email: &str,
        credential: String,
        role: Role,
        handle: Handle,
    ) -> Result<Account> {
        let mut accounts = self.accounts.write();
        if accounts.iter().any(|a| a.email == email) {
            return Err(FeedbackError::EmailAlreadyRegistered(email.to_string()));
        }

        let account = Account {
            id: AccountId::new(format!("u{}", accounts.len() + 1)),
            email: email.to_string(),
            credential,
            role,
            handle,
            points: 0,
            badges: BTreeSet::new(),
        };
        accounts.push(account.clone());
        info!("Created {} account {}", role, account.id);
        Ok(account)
    }

    /// Load an existing record verbatim (boot seed).
    pub fn import(&self, account: Account) {
        self.accounts.write().push(account);
    }

    pub fn by_email(&self, email: &str) -> Option<Account> {
        self.accounts
            .read()
            .iter()
            .find(|a| a.email == email)
            .cloned()
    }

    pub fn by_id(&self, id: &AccountId) -> Option<Account> {
        self.accounts.read().iter().find(|a| &a.id == id).cloned()
    }

    pub fn email_exists(&self, email: &str) -> bool {
        self.accounts.read().iter().any(|a| a.email == email)
    }

    /// All accounts in creation order
    pub fn all(&self) -> Vec<Account> {
        self.accounts.read().clone()
    }

    /// Credit points, returning the new total.
    pub fn add_points(&self, id: &AccountId, points: u32) -> Result<u32> {
        let mut accounts = self.accounts.write();
        let account = accounts
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| FeedbackError::account_not_found(id.as_str()))?;
        account.points = account.points.saturating_add(points);
        Ok(account.points)
    }

    /// Grant a badge; returns false when the account already had it.
    pub fn grant_badge(&self, id: &AccountId, badge: &str) -> Result<bool> {
        let mut accounts = self.accounts.write();
        let account = accounts
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| FeedbackError::account_not_found(id.as_str()))?;
        Ok(account.badges.insert(badge.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let directory = AccountDirectory::new();
        let account = directory
            .insert("a@example.com", "digest".into(), Role::Employee, Handle::new("h-1"))
            .unwrap();
        assert_eq!(account.id.as_str(), "u1");
        assert_eq!(account.points, 0);
        assert!(directory.email_exists("a@example.com"));
        // lookups are case-sensitive as stored
        assert!(directory.by_email("A@example.com").is_none());
        assert_eq!(directory.by_id(&account.id).unwrap().email, "a@example.com");
    }

    #[test]
    fn test_duplicate_email() {
        let directory = AccountDirectory::new();
        directory
            .insert("a@example.com", "x".into(), Role::Employee, Handle::new("h-1"))
            .unwrap();
        let err = directory
            .insert("a@example.com", "y".into(), Role::Hr, Handle::new("h-2"))
            .unwrap_err();
        assert_eq!(
            err,
            FeedbackError::EmailAlreadyRegistered("a@example.com".to_string())
        );
    }

    #[test]
    fn test_points_and_badges() {
        let directory = AccountDirectory::new();
        let account = directory
            .insert("a@example.com", "x".into(), Role::Employee, Handle::new("h-1"))
            .unwrap();
        assert_eq!(directory.add_points(&account.id, 40).unwrap(), 40);
        assert_eq!(directory.add_points(&account.id, 35).unwrap(), 75);
        assert!(directory.grant_badge(&account.id, "Новичок").unwrap());
        assert!(!directory.grant_badge(&account.id, "Новичок").unwrap());
        assert!(directory
            .add_points(&AccountId::new("u99"), 1)
            .is_err());
    }
}
