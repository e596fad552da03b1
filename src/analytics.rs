//! Aggregate views over the ticket collection
//!
//! None of these views carry author handles beyond what the ticket list
//! itself shows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Ticket, TicketStatus, TicketType};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTotals {
    pub new: usize,
    pub approved: usize,
    pub answered: usize,
    pub resolved: usize,
    pub rejected: usize,
}

impl StatusTotals {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let mut totals = Self::default();
        for ticket in tickets {
            match ticket.status {
                TicketStatus::New => totals.new += 1,
                TicketStatus::Approved => totals.approved += 1,
                TicketStatus::Answered => totals.answered += 1,
                TicketStatus::Resolved => totals.resolved += 1,
                TicketStatus::Rejected => totals.rejected += 1,
            }
        }
        totals
    }

    pub fn get(&self, status: TicketStatus) -> usize {
        match status {
            TicketStatus::New => self.new,
            TicketStatus::Approved => self.approved,
            TicketStatus::Answered => self.answered,
            TicketStatus::Resolved => self.resolved,
            TicketStatus::Rejected => self.rejected,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotals {
    pub complaint: usize,
    pub suggestion: usize,
    pub praise: usize,
}

impl TypeTotals {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let mut totals = Self::default();
        for ticket in tickets {
            match ticket.ticket_type {
                TicketType::Complaint => totals.complaint += 1,
                TicketType::Suggestion => totals.suggestion += 1,
                TicketType::Praise => totals.praise += 1,
            }
        }
        totals
    }
}

/// Rounded share of `part` in `total`, 0 for an empty collection
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((part as f64 / total as f64) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total: usize,
    pub by_status: StatusTotals,
    pub by_type: TypeTotals,
    pub resolved_percent: u32,
    pub approval_percent: u32,
}

impl AnalyticsSummary {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let by_status = StatusTotals::from_tickets(tickets);
        let total = tickets.len();
        Self {
            total,
            resolved_percent: percent(by_status.resolved, total),
            approval_percent: percent(by_status.approved, total),
            by_type: TypeTotals::from_tickets(tickets),
            by_status,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentStat {
    pub total: usize,
    pub resolved: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorReport {
    pub total: usize,
    pub by_status: StatusTotals,
    pub resolved_percent: u32,
    /// Share of tickets that got past `new` without being rejected
    pub response_rate: u32,
    /// `resolved_percent + 0.3 * response_rate`, clamped to `[0, 100]`
    pub hr_rating: f64,
    pub departments: BTreeMap<String, DepartmentStat>,
}

impl SupervisorReport {
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        let by_status = StatusTotals::from_tickets(tickets);
        let total = tickets.len();
        let resolved_percent = percent(by_status.resolved, total);
        let response_rate = percent(
            by_status.approved + by_status.answered + by_status.resolved,
            total,
        );
        let hr_rating = (resolved_percent as f64 + response_rate as f64 * 0.3).clamp(0.0, 100.0);

        let mut departments: BTreeMap<String, DepartmentStat> = BTreeMap::new();
        for ticket in tickets {
            let stat = departments.entry(ticket.department.clone()).or_default();
            stat.total += 1;
            if ticket.status == TicketStatus::Resolved {
                stat.resolved += 1;
            }
        }

        Self {
            total,
            by_status,
            resolved_percent,
            response_rate,
            hr_rating,
            departments,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminOverview {
    pub counts: StatusTotals,
    pub total: usize,
    pub tickets: Vec<Ticket>,
}

impl AdminOverview {
    pub fn from_tickets(tickets: Vec<Ticket>, filter: Option<TicketStatus>) -> Self {
        let counts = StatusTotals::from_tickets(&tickets);
        let total = tickets.len();
        let tickets = match filter {
            Some(status) => tickets.into_iter().filter(|t| t.status == status).collect(),
            None => tickets,
        };
        Self {
            counts,
            total,
            tickets,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationQueue {
    pub pending: Vec<Ticket>,
    pub approved: usize,
    pub rejected: usize,
}

impl ModerationQueue {
    pub fn from_tickets(tickets: Vec<Ticket>) -> Self {
        let counts = StatusTotals::from_tickets(&tickets);
        Self {
            pending: tickets
                .into_iter()
                .filter(|t| t.status == TicketStatus::New)
                .collect(),
            approved: counts.approved,
            rejected: counts.rejected,
        }
    }
}
