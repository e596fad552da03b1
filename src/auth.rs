//! Authentication and registration
//!
//! - Credential digests (salted SHA-256)
//! - Login by email and password
//! - Email-code registration: request code, confirm code, set password

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::accounts::AccountDirectory;
use crate::error::{FeedbackError, Result};
use crate::identity::IdentityIssuer;
use crate::model::{Account, Role};
use crate::verification::VerificationLedger;

const CREDENTIAL_SALT: &str = "anon-feedback";

/// Digest stored in place of the password
pub fn hash_credential(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(CREDENTIAL_SALT.as_bytes());
    hasher.update(b":");
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify_credential(account: &Account, password: &str) -> bool {
    account.credential == hash_credential(&account.email, password)
}

/// Delivers verification codes to the mailbox being verified
pub trait CodeSender: Send + Sync {
    fn send(&self, email: &str, code: &str) -> Result<()>;
}

/// Stand-in transport: writes the code to the debug log
#[derive(Debug, Default)]
pub struct LogCodeSender;

impl CodeSender for LogCodeSender {
    fn send(&self, email: &str, code: &str) -> Result<()> {
        debug!("Verification code for {}: {}", email, code);
        Ok(())
    }
}

pub struct Authenticator {
    directory: Arc<AccountDirectory>,
    issuer: Arc<IdentityIssuer>,
    ledger: VerificationLedger,
    sender: Arc<dyn CodeSender>,
    confirmed: Mutex<HashSet<String>>,
    min_password_len: usize,
}

impl Authenticator {
    pub fn new(
        directory: Arc<AccountDirectory>,
        issuer: Arc<IdentityIssuer>,
        ledger: VerificationLedger,
        sender: Arc<dyn CodeSender>,
        min_password_len: usize,
    ) -> Self {
        Self {
            directory,
            issuer,
            ledger,
            sender,
            confirmed: Mutex::new(HashSet::new()),
            min_password_len,
        }
    }

    pub fn ledger(&self) -> &VerificationLedger {
        &self.ledger
    }

    pub fn login(&self, email: &str, password: &str) -> Result<Account> {
        match self.directory.by_email(email) {
            Some(account) if verify_credential(&account, password) => {
                info!("Login for {}", account.id);
                Ok(account)
            }
            _ => {
                debug!("Login rejected for {}", email);
                Err(FeedbackError::InvalidCredential)
            }
        }
    }

    /// Step 1: issue a code for an unregistered email and hand it to the sender.
    pub fn register(&self, email: &str) -> Result<()> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(FeedbackError::Validation(
                "a valid email is required".to_string(),
            ));
        }
        if self.directory.email_exists(email) {
            return Err(FeedbackError::EmailAlreadyRegistered(email.to_string()));
        }

        self.confirmed.lock().remove(email);
        let code = self.ledger.issue(email);
        self.sender.send(email, &code)
    }

    /// Step 2: consume the emailed code, proving ownership of the address.
    pub fn confirm_code(&self, email: &str, code: &str) -> Result<()> {
        self.ledger.verify(email.trim(), code.trim())?;
        self.confirmed.lock().insert(email.trim().to_string());
        Ok(())
    }

    /// Step 3: create the employee account for a confirmed email.
    pub fn finalize_registration(&self, email: &str, password: &str) -> Result<Account> {
        let email = email.trim();
        if password.chars().count() < self.min_password_len {
            return Err(FeedbackError::Validation(format!(
                "password must be at least {} characters",
                self.min_password_len
            )));
        }
        if !self.confirmed.lock().contains(email) {
            return Err(FeedbackError::Validation(
                "email has not been confirmed".to_string(),
            ));
        }

        let handle = self.issuer.issue_handle();
        let account = self.directory.insert(
            email,
            hash_credential(email, password),
            Role::Employee,
            handle.clone(),
        )?;
        self.issuer.register(handle, Some(account.id.clone()));
        self.confirmed.lock().remove(email);

        info!("Registered {} as {}", account.id, account.handle);
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl CodeSender for Outbox {
        fn send(&self, email: &str, code: &str) -> Result<()> {
            self.sent.lock().push((email.to_string(), code.to_string()));
            Ok(())
        }
    }

    impl Outbox {
        fn last_code(&self) -> String {
            self.sent.lock().last().map(|(_, c)| c.clone()).unwrap()
        }
    }

    fn setup() -> (Authenticator, Arc<Outbox>, Arc<AccountDirectory>, Arc<IdentityIssuer>) {
        let directory = Arc::new(AccountDirectory::new());
        let issuer = Arc::new(IdentityIssuer::new("сотрудник", true));
        let outbox = Arc::new(Outbox::default());
        let auth = Authenticator::new(
            directory.clone(),
            issuer.clone(),
            VerificationLedger::new(Duration::minutes(10)),
            outbox.clone(),
            6,
        );
        (auth, outbox, directory, issuer)
    }

    #[test]
    fn test_credential_digest() {
        let digest = hash_credential("a@example.com", "secret");
        assert_eq!(digest.len(), 64);
        assert_ne!(digest, hash_credential("b@example.com", "secret"));
        assert_ne!(digest, hash_credential("a@example.com", "Secret"));
    }

    #[test]
    fn test_full_registration() {
        let (auth, outbox, directory, issuer) = setup();

        auth.register("new@example.com").unwrap();
        auth.confirm_code("new@example.com", &outbox.last_code())
            .unwrap();
        let account = auth
            .finalize_registration("new@example.com", "hunter22")
            .unwrap();

        assert_eq!(account.role, Role::Employee);
        assert_eq!(account.points, 0);
        assert!(account.badges.is_empty());
        assert!(account.handle.as_str().starts_with("сотрудник-"));
        assert_eq!(issuer.owner_of(&account.handle), Some(account.id.clone()));
        assert!(directory.email_exists("new@example.com"));

        let logged_in = auth.login("new@example.com", "hunter22").unwrap();
        assert_eq!(logged_in.id, account.id);
        assert_eq!(
            auth.login("new@example.com", "wrong").unwrap_err(),
            FeedbackError::InvalidCredential
        );
    }

    #[test]
    fn test_short_password() {
        let (auth, outbox, _, _) = setup();
        auth.register("new@example.com").unwrap();
        auth.confirm_code("new@example.com", &outbox.last_code())
            .unwrap();
        assert!(matches!(
            auth.finalize_registration("new@example.com", "12345"),
            Err(FeedbackError::Validation(_))
        ));
        assert!(auth
            .finalize_registration("new@example.com", "123456")
            .is_ok());
    }

    #[test]
    fn test_unconfirmed_email_cannot_finalize() {
        let (auth, _, _, _) = setup();
        auth.register("new@example.com").unwrap();
        assert!(matches!(
            auth.finalize_registration("new@example.com", "password"),
            Err(FeedbackError::Validation(_))
        ));
    }

    #[test]
    fn test_registered_email_rejected() {
        let (auth, outbox, _, _) = setup();
        auth.register("new@example.com").unwrap();
        auth.confirm_code("new@example.com", &outbox.last_code())
            .unwrap();
        auth.finalize_registration("new@example.com", "password")
            .unwrap();

        assert_eq!(
            auth.register("new@example.com").unwrap_err(),
            FeedbackError::EmailAlreadyRegistered("new@example.com".to_string())
        );
    }

    #[test]
    fn test_code_is_single_use() {
        let (auth, outbox, _, _) = setup();
        auth.register("new@example.com").unwrap();
        let code = outbox.last_code();
        auth.confirm_code("new@example.com", &code).unwrap();
        assert_eq!(
            auth.confirm_code("new@example.com", &code).unwrap_err(),
            FeedbackError::NoPendingCode
        );
    }

    #[test]
    fn test_unknown_login() {
        let (auth, _, _, _) = setup();
        assert_eq!(
            auth.login("ghost@example.com", "password").unwrap_err(),
            FeedbackError::InvalidCredential
        );
    }
}
