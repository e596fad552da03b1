//! Ticket storage
//!
//! The store applies mutations as asked. Whether a status change is legal is
//! decided by the lifecycle and policy layers before the store is touched.

use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{FeedbackError, Result};
use crate::model::{Handle, Reply, Ticket, TicketDraft, TicketStatus};

pub trait TicketStore: Send + Sync {
    /// Create a `new` ticket with the next identifier.
    fn create(&self, draft: TicketDraft, author_handle: Handle) -> Ticket;

    /// Load an existing record verbatim (boot seed, backing store reload).
    fn import(&self, ticket: Ticket);

    /// Append a reply; the ticket becomes `answered` whatever its prior status.
    fn reply(&self, id: u64, reply: Reply) -> Result<Ticket>;

    fn set_status(&self, id: u64, status: TicketStatus) -> Result<Ticket>;

    fn by_id(&self, id: u64) -> Option<Ticket>;

    /// All tickets, most recently created first
    fn all(&self) -> Vec<Ticket>;

    fn by_author_handle(&self, handle: &Handle) -> Vec<Ticket>;
}

#[derive(Default)]
pub struct MemoryTicketStore {
    tickets: RwLock<Vec<Ticket>>,
}

impl MemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn update<F>(&self, id: u64, apply: F) -> Result<Ticket>
    where
        F: FnOnce(&mut Ticket),
    {
        let mut tickets = self.tickets.write();
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| FeedbackError::ticket_not_found(id))?;
        apply(ticket);
        Ok(ticket.clone())
    }
}

impl TicketStore for MemoryTicketStore {
    fn create(&self, draft: TicketDraft, author_handle: Handle) -> Ticket {
        let mut tickets = self.tickets.write();
        let id = tickets.iter().map(|t| t.id).max().map_or(1, |max| max + 1);

        let ticket = Ticket {
            id,
            ticket_type: draft.ticket_type,
            department: draft.department,
            title: draft.title,
            body: draft.body,
            status: TicketStatus::New,
            created_at: Utc::now(),
            replies: Vec::new(),
            author_handle,
        };
        tickets.insert(0, ticket.clone());
        debug!("Stored ticket #{}", id);
        ticket
    }

    fn import(&self, ticket: Ticket) {
        self.tickets.write().push(ticket);
    }

    fn reply(&self, id: u64, reply: Reply) -> Result<Ticket> {
        self.update(id, |ticket| {
            ticket.replies.push(reply);
            ticket.status = TicketStatus::Answered;
        })
    }

    fn set_status(&self, id: u64, status: TicketStatus) -> Result<Ticket> {
        self.update(id, |ticket| ticket.status = status)
    }

    fn by_id(&self, id: u64) -> Option<Ticket> {
        self.tickets.read().iter().find(|t| t.id == id).cloned()
    }

    fn all(&self) -> Vec<Ticket> {
        self.tickets.read().clone()
    }

    fn by_author_handle(&self, handle: &Handle) -> Vec<Ticket> {
        self.tickets
            .read()
            .iter()
            .filter(|t| &t.author_handle == handle)
            .cloned()
            .collect()
    }
}
