//! Ticket lifecycle state machine
//!
//! ```text
//!   new ──approve──▶ approved ──answer──▶ answered ──resolve──▶ resolved
//!    │                  │                    ▲  │
//!    │                  └──────resolve───────┼──┼──────────────▶ resolved
//!    ├──answer───────────────────────────────┘  └─answer (follow-up reply)
//!    ├──resolve─────────────────────────────────────────────────▶ resolved
//!    └──reject──▶ rejected
//! ```
//!
//! `resolved` and `rejected` are terminal. A reply (answer) may be written
//! straight onto a `new` ticket, skipping moderation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FeedbackError, Result};
use crate::model::{Role, TicketStatus};

/// A role-gated edge of the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Approve,
    Reject,
    /// Reply, or the admin "mark answered" action
    Answer,
    Resolve,
}

impl Transition {
    pub const ALL: [Transition; 4] = [
        Transition::Approve,
        Transition::Reject,
        Transition::Answer,
        Transition::Resolve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Answer => "answer",
            Self::Resolve => "resolve",
        }
    }

    /// Roles allowed to trigger this transition
    pub fn permitted_roles(&self) -> &'static [Role] {
        match self {
            Self::Approve | Self::Reject => &[Role::Moderator],
            Self::Answer | Self::Resolve => &[Role::Hr, Role::Manager],
        }
    }

    /// States this transition may start from
    pub fn sources(&self) -> &'static [TicketStatus] {
        match self {
            Self::Approve | Self::Reject => &[TicketStatus::New],
            Self::Answer | Self::Resolve => &[
                TicketStatus::New,
                TicketStatus::Approved,
                TicketStatus::Answered,
            ],
        }
    }

    pub fn target(&self) -> TicketStatus {
        match self {
            Self::Approve => TicketStatus::Approved,
            Self::Reject => TicketStatus::Rejected,
            Self::Answer => TicketStatus::Answered,
            Self::Resolve => TicketStatus::Resolved,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the status reached by applying `transition` to a ticket in `from`.
pub fn next_status(from: TicketStatus, transition: Transition) -> Result<TicketStatus> {
    if transition.sources().contains(&from) {
        Ok(transition.target())
    } else {
        Err(FeedbackError::IllegalTransition { from, transition })
    }
}

/// Transitions that may legally start from `status`
pub fn available_transitions(status: TicketStatus) -> Vec<Transition> {
    Transition::ALL
        .into_iter()
        .filter(|t| t.sources().contains(&status))
        .collect()
}

/// Every status reachable from `new`, used to sanity-check stored tickets
pub fn is_reachable(status: TicketStatus) -> bool {
    let mut frontier = vec![TicketStatus::New];
    let mut seen = vec![TicketStatus::New];
    while let Some(current) = frontier.pop() {
        for transition in available_transitions(current) {
            let next = transition.target();
            if !seen.contains(&next) {
                seen.push(next);
                frontier.push(next);
            }
        }
    }
    seen.contains(&status)
}
