//! Typed outcomes for every rejected operation

use thiserror::Error;

use crate::lifecycle::Transition;
use crate::model::{Role, TicketStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    /// Unknown ticket id, account id or email
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("cannot {transition} a ticket that is {from}")]
    IllegalTransition {
        from: TicketStatus,
        transition: Transition,
    },

    #[error("role {role} is not allowed to {action}")]
    Forbidden { role: Role, action: String },

    #[error("invalid email or password")]
    InvalidCredential,

    #[error("verification code expired")]
    CodeExpired,

    #[error("verification code does not match")]
    CodeMismatch,

    #[error("no pending verification code for this email")]
    NoPendingCode,

    #[error("email already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("validation failed: {0}")]
    Validation(String),
}

impl FeedbackError {
    pub fn ticket_not_found(id: u64) -> Self {
        Self::NotFound {
            entity: "ticket",
            key: id.to_string(),
        }
    }

    pub fn account_not_found(key: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "account",
            key: key.into(),
        }
    }

    /// Failures the caller can recover from by prompting again
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredential
                | Self::CodeExpired
                | Self::CodeMismatch
                | Self::NoPendingCode
                | Self::Validation(_)
                | Self::EmailAlreadyRegistered(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FeedbackError>;
