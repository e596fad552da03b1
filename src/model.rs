//! Accounts, tickets and the intake catalog

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FeedbackError, Result};

/// Pseudonymous identifier substituted for a real identity on tickets
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employee,
    Hr,
    Manager,
    Moderator,
    Supervisor,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Employee,
        Role::Hr,
        Role::Manager,
        Role::Moderator,
        Role::Supervisor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Hr => "hr",
            Self::Manager => "manager",
            Self::Moderator => "moderator",
            Self::Supervisor => "supervisor",
        }
    }

    /// Human-facing title shown on profiles
    pub fn label(&self) -> &'static str {
        match self {
            Self::Employee => "Сотрудник",
            Self::Hr => "HR специалист",
            Self::Manager => "Менеджер",
            Self::Moderator => "Модератор",
            Self::Supervisor => "Супервайзер",
        }
    }

    /// Author label attached to replies written under this role
    pub fn reply_label(&self) -> &'static str {
        match self {
            Self::Hr => "HR",
            other => other.label(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| FeedbackError::Validation(format!("unknown role: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketType {
    Complaint,
    Suggestion,
    Praise,
}

const COMPLAINT_DEPARTMENTS: &[&str] = &[
    "HR",
    "Руководство",
    "Оплата труда",
    "Инфраструктура",
    "Безопасность",
    "IT",
];

const SUGGESTION_DEPARTMENTS: &[&str] = &[
    "HR",
    "IT",
    "Продуктовая команда",
    "Маркетинг",
    "Офис",
    "Обучение",
];

const PRAISE_DEPARTMENTS: &[&str] = &[
    "HR",
    "Команда поддержки",
    "Отдел продаж",
    "Маркетинг",
    "IT",
    "Общее",
];

impl TicketType {
    pub const ALL: [TicketType; 3] = [
        TicketType::Complaint,
        TicketType::Suggestion,
        TicketType::Praise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complaint => "complaint",
            Self::Suggestion => "suggestion",
            Self::Praise => "praise",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Complaint => "Жалоба",
            Self::Suggestion => "Предложение",
            Self::Praise => "Похвала",
        }
    }

    /// Recognized departments for this ticket type
    pub fn departments(&self) -> &'static [&'static str] {
        match self {
            Self::Complaint => COMPLAINT_DEPARTMENTS,
            Self::Suggestion => SUGGESTION_DEPARTMENTS,
            Self::Praise => PRAISE_DEPARTMENTS,
        }
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketType {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self> {
        TicketType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| FeedbackError::Validation(format!("unknown ticket type: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    New,
    Approved,
    Answered,
    Resolved,
    Rejected,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::New,
        TicketStatus::Approved,
        TicketStatus::Answered,
        TicketStatus::Resolved,
        TicketStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Approved => "approved",
            Self::Answered => "answered",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "Новое",
            Self::Approved => "Одобрено модератором",
            Self::Answered => "Отвечено",
            Self::Resolved => "Решено",
            Self::Rejected => "Отклонено",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Rejected)
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self> {
        TicketStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| FeedbackError::Validation(format!("unknown status: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub by: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub department: String,
    pub title: String,
    pub body: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<Reply>,
    /// Captured at creation, never rewritten
    pub author_handle: Handle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    /// Salted SHA-256 digest, hex encoded
    #[serde(skip_serializing)]
    pub credential: String,
    pub role: Role,
    pub handle: Handle,
    pub points: u32,
    pub badges: BTreeSet<String>,
}

/// Ticket intake form contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketDraft {
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
    pub department: String,
    pub title: String,
    pub body: String,
}

impl TicketDraft {
    pub fn new(
        ticket_type: TicketType,
        department: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            ticket_type,
            department: department.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    /// Intake checks: non-empty title and body, department recognized for the type
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(FeedbackError::Validation("title is required".to_string()));
        }
        if self.body.trim().is_empty() {
            return Err(FeedbackError::Validation("body is required".to_string()));
        }
        if !self
            .ticket_type
            .departments()
            .contains(&self.department.as_str())
        {
            return Err(FeedbackError::Validation(format!(
                "department '{}' is not accepted for {} tickets",
                self.department, self.ticket_type
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validation() {
        let draft = TicketDraft::new(TicketType::Complaint, "IT", "Slow VPN", "Every morning");
        assert!(draft.validate().is_ok());

        let empty_title = TicketDraft::new(TicketType::Complaint, "IT", "  ", "body");
        assert!(matches!(
            empty_title.validate(),
            Err(FeedbackError::Validation(_))
        ));

        let empty_body = TicketDraft::new(TicketType::Suggestion, "IT", "title", "");
        assert!(empty_body.validate().is_err());

        // "Офис" is a suggestion department, not a complaint one
        let foreign = TicketDraft::new(TicketType::Complaint, "Офис", "title", "body");
        assert!(foreign.validate().is_err());
        let ok = TicketDraft::new(TicketType::Suggestion, "Офис", "title", "body");
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("moderator".parse::<Role>().unwrap(), Role::Moderator);
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Hr.reply_label(), "HR");
        assert_eq!(Role::Manager.reply_label(), "Менеджер");
    }

    #[test]
    fn test_status_serde_is_lowercase() {
        let json = serde_json::to_string(&TicketStatus::Answered).unwrap();
        assert_eq!(json, "\"answered\"");
        assert!(TicketStatus::Rejected.is_terminal());
        assert!(!TicketStatus::Answered.is_terminal());
    }

    #[test]
    fn test_department_catalog_sizes() {
        for ticket_type in TicketType::ALL {
            assert_eq!(ticket_type.departments().len(), 6);
            assert!(ticket_type.departments().contains(&"HR"));
        }
    }
}
