//! Access policy
//!
//! All role checks go through here. Privileged surfaces are open to
//! managers and HR only; lifecycle transitions follow the role table
//! in [`Transition::permitted_roles`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FeedbackError, Result};
use crate::lifecycle::Transition;
use crate::model::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Surface {
    TicketIntake,
    AnalyticsDashboard,
    AdminPanel,
    ModerationPanel,
    Profile,
    SupervisorPanel,
}

impl Surface {
    pub const ALL: [Surface; 6] = [
        Surface::TicketIntake,
        Surface::AnalyticsDashboard,
        Surface::AdminPanel,
        Surface::ModerationPanel,
        Surface::Profile,
        Surface::SupervisorPanel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TicketIntake => "ticket-intake",
            Self::AnalyticsDashboard => "analytics-dashboard",
            Self::AdminPanel => "admin-panel",
            Self::ModerationPanel => "moderation-panel",
            Self::Profile => "profile",
            Self::SupervisorPanel => "supervisor-panel",
        }
    }

    fn is_privileged(&self) -> bool {
        matches!(
            self,
            Self::AnalyticsDashboard
                | Self::AdminPanel
                | Self::ModerationPanel
                | Self::SupervisorPanel
        )
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn can_view(&self, role: Role, surface: Surface) -> bool {
        if surface.is_privileged() {
            matches!(role, Role::Manager | Role::Hr)
        } else {
            true
        }
    }

    pub fn can_transition(&self, role: Role, transition: Transition) -> bool {
        transition.permitted_roles().contains(&role)
    }

    pub fn require_view(&self, role: Role, surface: Surface) -> Result<()> {
        if self.can_view(role, surface) {
            Ok(())
        } else {
            debug!("Role {} refused access to {}", role, surface);
            Err(FeedbackError::Forbidden {
                role,
                action: format!("view {}", surface),
            })
        }
    }

    pub fn require_transition(&self, role: Role, transition: Transition) -> Result<()> {
        if self.can_transition(role, transition) {
            Ok(())
        } else {
            debug!("Role {} refused transition {}", role, transition);
            Err(FeedbackError::Forbidden {
                role,
                action: transition.to_string(),
            })
        }
    }

    /// Surfaces a role may open, in menu order
    pub fn visible_surfaces(&self, role: Role) -> Vec<Surface> {
        Surface::ALL
            .into_iter()
            .filter(|s| self.can_view(role, *s))
            .collect()
    }
}
