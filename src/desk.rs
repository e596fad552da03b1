//! Feedback desk
//!
//! Entry point for every caller-facing operation. Resolves the acting
//! account, asks the access policy, consults the lifecycle and only then
//! mutates the store and credits points.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::accounts::AccountDirectory;
use crate::analytics::{AdminOverview, AnalyticsSummary, ModerationQueue, SupervisorReport};
use crate::auth::{Authenticator, CodeSender, LogCodeSender};
use crate::config::Config;
use crate::error::{FeedbackError, Result};
use crate::identity::IdentityIssuer;
use crate::lifecycle::{self, Transition};
use crate::model::{Account, Handle, Reply, Role, Ticket, TicketDraft, TicketStatus, TicketType};
use crate::policy::{AccessPolicy, Surface};
use crate::scoring::{LeaderboardEntry, Level, Mission, ScoringEngine};
use crate::seed;
use crate::tickets::{MemoryTicketStore, TicketStore};
use crate::verification::VerificationLedger;

/// Moderator verdict on a new ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl From<Decision> for Transition {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => Transition::Approve,
            Decision::Reject => Transition::Reject,
        }
    }
}

/// The caller's own standing and tickets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub email: String,
    pub role: Role,
    pub handle: Handle,
    pub points: u32,
    pub level: Level,
    pub badges: BTreeSet<String>,
    pub tickets: Vec<Ticket>,
    pub resolved: usize,
    pub approved: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionInfo {
    pub mission: Mission,
    pub title: String,
    pub description: String,
    pub points: u32,
}

pub struct FeedbackDesk {
    config: Config,
    accounts: Arc<AccountDirectory>,
    issuer: Arc<IdentityIssuer>,
    tickets: Arc<dyn TicketStore>,
    scoring: ScoringEngine,
    policy: AccessPolicy,
    auth: Authenticator,
    /// Serializes check-then-apply sequences on tickets
    write_gate: Mutex<()>,
}

impl FeedbackDesk {
    /// In-memory desk, seeded with the demo data when the config asks for it.
    pub fn new(config: Config) -> Self {
        Self::with_parts(
            config,
            Arc::new(MemoryTicketStore::new()),
            Arc::new(LogCodeSender),
        )
    }

    pub fn with_parts(
        config: Config,
        tickets: Arc<dyn TicketStore>,
        sender: Arc<dyn CodeSender>,
    ) -> Self {
        let accounts = Arc::new(AccountDirectory::new());
        let issuer = Arc::new(IdentityIssuer::new(
            config.identity.handle_label.clone(),
            config.identity.unique_handles,
        ));

        if config.seed.demo_data {
            seed::load_demo_data(&accounts, &issuer, tickets.as_ref());
        }

        let auth = Authenticator::new(
            accounts.clone(),
            issuer.clone(),
            VerificationLedger::new(Duration::seconds(config.verification.code_ttl_secs)),
            sender,
            config.auth.min_password_len,
        );
        let scoring = ScoringEngine::new(config.scoring.clone(), config.badges.clone());

        Self {
            config,
            accounts,
            issuer,
            tickets,
            scoring,
            policy: AccessPolicy,
            auth,
            write_gate: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.scoring
    }

    pub fn account(&self, email: &str) -> Result<Account> {
        self.accounts
            .by_email(email)
            .ok_or_else(|| FeedbackError::account_not_found(email))
    }

    /// Accounts live in memory; only the demo directory is rebuilt at start.
    pub fn account_survives_restart(&self, email: &str) -> bool {
        self.config.seed.demo_data && seed::is_demo_account(email)
    }

    // ------------------------------------------------------------------
    // Intake
    // ------------------------------------------------------------------

    /// Submit a ticket under a freshly issued handle.
    pub fn submit_ticket(&self, actor: &str, draft: TicketDraft) -> Result<Ticket> {
        let account = self.account(actor)?;
        self.policy.require_view(account.role, Surface::TicketIntake)?;
        draft.validate()?;

        let handle = self.issuer.issue_handle_for(&account.id);
        let ticket = {
            let _gate = self.write_gate.lock();
            self.tickets.create(draft, handle)
        };
        info!(
            "Ticket #{} ({}) submitted under {}",
            ticket.id, ticket.ticket_type, ticket.author_handle
        );

        self.credit(&ticket, Mission::TicketSubmitted);
        if ticket.ticket_type == TicketType::Praise {
            self.credit(&ticket, Mission::PraiseShared);
        }
        Ok(ticket)
    }

    pub fn departments_for(&self, ticket_type: TicketType) -> &'static [&'static str] {
        ticket_type.departments()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    pub fn moderate(&self, actor: &str, id: u64, decision: Decision) -> Result<Ticket> {
        let account = self.account(actor)?;
        self.transition(&account, id, decision.into(), None)
    }

    /// Append a reply; the ticket becomes `answered`.
    pub fn reply(&self, actor: &str, id: u64, text: &str) -> Result<Ticket> {
        let account = self.account(actor)?;
        self.policy
            .require_transition(account.role, Transition::Answer)?;
        if text.trim().is_empty() {
            return Err(FeedbackError::Validation("reply text is required".to_string()));
        }
        let reply = Reply {
            by: account.role.reply_label().to_string(),
            text: text.trim().to_string(),
        };
        self.transition(&account, id, Transition::Answer, Some(reply))
    }

    /// Mark a ticket answered without writing a reply.
    pub fn mark_answered(&self, actor: &str, id: u64) -> Result<Ticket> {
        let account = self.account(actor)?;
        self.transition(&account, id, Transition::Answer, None)
    }

    pub fn resolve(&self, actor: &str, id: u64) -> Result<Ticket> {
        let account = self.account(actor)?;
        self.transition(&account, id, Transition::Resolve, None)
    }

    fn transition(
        &self,
        actor: &Account,
        id: u64,
        transition: Transition,
        reply: Option<Reply>,
    ) -> Result<Ticket> {
        self.policy.require_transition(actor.role, transition)?;

        let updated = {
            let _gate = self.write_gate.lock();
            let current = self
                .tickets
                .by_id(id)
                .ok_or_else(|| FeedbackError::ticket_not_found(id))?;
            let next = lifecycle::next_status(current.status, transition)?;

            match reply {
                Some(reply) => self.tickets.reply(id, reply)?,
                None => self.tickets.set_status(id, next)?,
            }
        };
        info!(
            "Ticket #{}: {} by {} -> {}",
            id, transition, actor.role, updated.status
        );

        let mission = match transition {
            Transition::Approve => Some(Mission::ModeratorApproved),
            Transition::Answer => Some(Mission::ReplyReceived),
            Transition::Resolve => Some(Mission::Resolved),
            Transition::Reject => None,
        };
        if let Some(mission) = mission {
            self.credit(&updated, mission);
        }
        Ok(updated)
    }

    /// Award failures never undo an applied transition.
    fn credit(&self, ticket: &Ticket, mission: Mission) {
        if let Err(e) = self
            .scoring
            .award(
                ticket,
                mission,
                &self.issuer,
                &self.accounts,
                self.tickets.as_ref(),
            )
        {
            warn!("Failed to credit {:?} for ticket #{}: {}", mission, ticket.id, e);
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Every ticket, newest first. Tickets only carry their handle.
    pub fn tickets(&self) -> Vec<Ticket> {
        self.tickets.all()
    }

    pub fn ticket(&self, id: u64) -> Result<Ticket> {
        self.tickets
            .by_id(id)
            .ok_or_else(|| FeedbackError::ticket_not_found(id))
    }

    pub fn tickets_by_handle(&self, handle: &Handle) -> Vec<Ticket> {
        self.tickets.by_author_handle(handle)
    }

    /// Tickets submitted by the caller, across all of its handles
    pub fn my_tickets(&self, actor: &str) -> Result<Vec<Ticket>> {
        let account = self.account(actor)?;
        Ok(self
            .tickets
            .all()
            .into_iter()
            .filter(|t| self.issuer.is_owned_by(&t.author_handle, &account.id))
            .collect())
    }

    pub fn profile(&self, actor: &str) -> Result<Profile> {
        let account = self.account(actor)?;
        self.policy.require_view(account.role, Surface::Profile)?;
        let tickets = self.my_tickets(actor)?;
        let points = self.scoring.points_of(&account);
        let handle = self.issuer.handle_of(&account).clone();

        Ok(Profile {
            resolved: tickets
                .iter()
                .filter(|t| t.status == TicketStatus::Resolved)
                .count(),
            approved: tickets
                .iter()
                .filter(|t| t.status == TicketStatus::Approved)
                .count(),
            email: account.email,
            role: account.role,
            handle,
            points,
            level: self.scoring.level_of(points),
            badges: account.badges,
            tickets,
        })
    }

    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.scoring.leaderboard(&self.accounts.all(), limit)
    }

    pub fn missions(&self) -> Vec<MissionInfo> {
        Mission::ALL
            .iter()
            .map(|mission| MissionInfo {
                mission: *mission,
                title: mission.title().to_string(),
                description: mission.description().to_string(),
                points: mission.points(&self.config.scoring.awards),
            })
            .collect()
    }

    pub fn analytics(&self, actor: &str) -> Result<AnalyticsSummary> {
        self.require_surface(actor, Surface::AnalyticsDashboard)?;
        Ok(AnalyticsSummary::from_tickets(&self.tickets.all()))
    }

    pub fn supervisor_report(&self, actor: &str) -> Result<SupervisorReport> {
        self.require_surface(actor, Surface::SupervisorPanel)?;
        Ok(SupervisorReport::from_tickets(&self.tickets.all()))
    }

    pub fn admin_overview(
        &self,
        actor: &str,
        filter: Option<TicketStatus>,
    ) -> Result<AdminOverview> {
        self.require_surface(actor, Surface::AdminPanel)?;
        Ok(AdminOverview::from_tickets(self.tickets.all(), filter))
    }

    pub fn moderation_queue(&self, actor: &str) -> Result<ModerationQueue> {
        self.require_surface(actor, Surface::ModerationPanel)?;
        Ok(ModerationQueue::from_tickets(self.tickets.all()))
    }

    fn require_surface(&self, actor: &str, surface: Surface) -> Result<Account> {
        let account = self.account(actor)?;
        self.policy.require_view(account.role, surface)?;
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BadgeRule;

    const EMPLOYEE: &str = "employee@example.com";
    const HR: &str = "hr@example.com";
    const MANAGER: &str = "manager@example.com";
    const MODERATOR: &str = "moderator@example.com";
    const SUPERVISOR: &str = "supervisor@example.com";

    fn desk() -> FeedbackDesk {
        FeedbackDesk::new(Config::default())
    }

    fn complaint() -> TicketDraft {
        TicketDraft::new(
            TicketType::Complaint,
            "Оплата труда",
            "Overtime unpaid",
            "Overtime from March is missing",
        )
    }

    fn points(desk: &FeedbackDesk, email: &str) -> u32 {
        desk.account(email).unwrap().points
    }

    #[test]
    fn test_submit_creates_new_ticket_with_fresh_handle() {
        let desk = desk();
        let employee = desk.account(EMPLOYEE).unwrap();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();

        assert_eq!(ticket.id, 7);
        assert_eq!(ticket.status, TicketStatus::New);
        assert_ne!(ticket.author_handle, employee.handle);
        assert!(ticket.author_handle.as_str().starts_with("сотрудник-"));
        assert_eq!(points(&desk, EMPLOYEE), 120 + 40);
    }

    #[test]
    fn test_submit_rejects_invalid_draft() {
        let desk = desk();
        let mut draft = complaint();
        draft.department = "Обучение".to_string();
        assert!(matches!(
            desk.submit_ticket(EMPLOYEE, draft),
            Err(FeedbackError::Validation(_))
        ));
        assert_eq!(desk.tickets().len(), 6);
        assert_eq!(points(&desk, EMPLOYEE), 120);
    }

    #[test]
    fn test_handles_are_per_ticket() {
        let desk = desk();
        let employee = desk.account(EMPLOYEE).unwrap();
        let first = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        let second = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();

        assert_ne!(first.author_handle, second.author_handle);
        assert_eq!(desk.tickets_by_handle(&first.author_handle).len(), 1);
        assert_eq!(desk.tickets_by_handle(&second.author_handle).len(), 1);
        // only the seeded ticket carries the account's stored handle
        assert_eq!(desk.tickets_by_handle(&employee.handle).len(), 1);

        let mine = desk.my_tickets(EMPLOYEE).unwrap();
        assert_eq!(mine.len(), 3);
    }

    #[test]
    fn test_full_lifecycle_awards_once() {
        let desk = desk();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();

        let approved = desk.moderate(MODERATOR, ticket.id, Decision::Approve).unwrap();
        assert_eq!(approved.status, TicketStatus::Approved);

        let answered = desk.reply(HR, ticket.id, "We are on it").unwrap();
        assert_eq!(answered.status, TicketStatus::Answered);
        assert_eq!(answered.replies.last().unwrap().by, "HR");

        // follow-up reply does not pay again
        desk.reply(MANAGER, ticket.id, "Fixed next payroll").unwrap();

        let resolved = desk.resolve(MANAGER, ticket.id).unwrap();
        assert_eq!(resolved.status, TicketStatus::Resolved);

        assert_eq!(points(&desk, EMPLOYEE), 120 + 40 + 35 + 25 + 60);
    }

    #[test]
    fn test_reply_skips_moderation() {
        let desk = desk();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        let answered = desk.reply(HR, ticket.id, "Looking into it").unwrap();
        assert_eq!(answered.status, TicketStatus::Answered);

        assert_eq!(
            desk.moderate(MODERATOR, ticket.id, Decision::Approve)
                .unwrap_err(),
            FeedbackError::IllegalTransition {
                from: TicketStatus::Answered,
                transition: Transition::Approve
            }
        );
    }

    #[test]
    fn test_rejected_is_terminal() {
        let desk = desk();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        desk.moderate(MODERATOR, ticket.id, Decision::Reject).unwrap();

        assert_eq!(
            desk.resolve(HR, ticket.id).unwrap_err(),
            FeedbackError::IllegalTransition {
                from: TicketStatus::Rejected,
                transition: Transition::Resolve
            }
        );
        assert!(desk.reply(HR, ticket.id, "late answer").is_err());

        let stored = desk.ticket(ticket.id).unwrap();
        assert_eq!(stored.status, TicketStatus::Rejected);
        assert!(stored.replies.is_empty());
    }

    #[test]
    fn test_resolved_is_terminal() {
        let desk = desk();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        desk.resolve(HR, ticket.id).unwrap();
        assert!(matches!(
            desk.mark_answered(HR, ticket.id),
            Err(FeedbackError::IllegalTransition { .. })
        ));
        assert!(matches!(
            desk.resolve(MANAGER, ticket.id),
            Err(FeedbackError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_employee_cannot_moderate() {
        let desk = desk();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();

        let err = desk
            .moderate(EMPLOYEE, ticket.id, Decision::Approve)
            .unwrap_err();
        assert!(matches!(err, FeedbackError::Forbidden { role: Role::Employee, .. }));
        assert_eq!(desk.ticket(ticket.id).unwrap().status, TicketStatus::New);
    }

    #[test]
    fn test_role_table_enforced() {
        let desk = desk();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();

        assert!(matches!(
            desk.moderate(HR, ticket.id, Decision::Approve),
            Err(FeedbackError::Forbidden { .. })
        ));
        assert!(matches!(
            desk.reply(MODERATOR, ticket.id, "hi"),
            Err(FeedbackError::Forbidden { .. })
        ));
        assert!(matches!(
            desk.resolve(SUPERVISOR, ticket.id),
            Err(FeedbackError::Forbidden { .. })
        ));
        assert_eq!(desk.ticket(ticket.id).unwrap().status, TicketStatus::New);
    }

    #[test]
    fn test_unknown_ticket_and_account() {
        let desk = desk();
        assert_eq!(
            desk.resolve(HR, 404).unwrap_err(),
            FeedbackError::ticket_not_found(404)
        );
        assert!(matches!(
            desk.submit_ticket("ghost@example.com", complaint()),
            Err(FeedbackError::NotFound { entity: "account", .. })
        ));
    }

    #[test]
    fn test_mark_answered_without_reply() {
        let desk = desk();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        let answered = desk.mark_answered(MANAGER, ticket.id).unwrap();
        assert_eq!(answered.status, TicketStatus::Answered);
        assert!(answered.replies.is_empty());
        assert_eq!(points(&desk, EMPLOYEE), 120 + 40 + 25);
    }

    #[test]
    fn test_praise_pays_bonus() {
        let desk = desk();
        let draft = TicketDraft::new(TicketType::Praise, "Команда поддержки", "Thanks", "Great help");
        desk.submit_ticket("newcomer@example.com", draft).unwrap();
        let account = desk.account("newcomer@example.com").unwrap();
        assert_eq!(account.points, 40 + 20);
        assert!(account.badges.contains("Новичок"));
    }

    #[test]
    fn test_privileged_views() {
        let desk = desk();
        assert!(desk.analytics(HR).is_ok());
        assert!(desk.supervisor_report(MANAGER).is_ok());
        assert!(matches!(
            desk.analytics(EMPLOYEE),
            Err(FeedbackError::Forbidden { .. })
        ));
        assert!(desk.moderation_queue(MODERATOR).is_err());
        assert!(desk.admin_overview(SUPERVISOR, None).is_err());

        let queue = desk.moderation_queue(MANAGER).unwrap();
        assert_eq!(queue.pending.len(), 3);
        let overview = desk
            .admin_overview(HR, Some(TicketStatus::Resolved))
            .unwrap();
        assert_eq!(overview.tickets.len(), 2);
        assert_eq!(overview.total, 6);
    }

    #[test]
    fn test_profile() {
        let desk = desk();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        desk.moderate(MODERATOR, ticket.id, Decision::Approve).unwrap();

        let profile = desk.profile(EMPLOYEE).unwrap();
        assert_eq!(profile.points, 120 + 40 + 35);
        assert_eq!(profile.level.level, 2);
        assert_eq!(profile.tickets.len(), 2);
        assert_eq!(profile.approved, 1);
        assert_eq!(profile.resolved, 0);
    }

    #[test]
    fn test_leaderboard_from_directory() {
        let desk = desk();
        let board = desk.leaderboard(3);
        assert_eq!(board.len(), 3);
        assert_eq!(board[0].points, 120);
        assert_eq!(board[0].handle.as_str(), "сотрудник-834");
        // ties keep directory order
        assert_eq!(board[1].handle.as_str(), "hr-001");
        assert_eq!(board[2].handle.as_str(), "mod-001");
    }

    #[test]
    fn test_statuses_stay_reachable() {
        let desk = desk();
        let a = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        let b = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        desk.moderate(MODERATOR, a.id, Decision::Approve).unwrap();
        desk.reply(HR, b.id, "ok").unwrap();
        let _ = desk.moderate(MODERATOR, b.id, Decision::Reject);
        desk.resolve(MANAGER, a.id).unwrap();

        assert!(desk
            .tickets()
            .iter()
            .all(|t| lifecycle::is_reachable(t.status)));
    }

    #[test]
    fn test_empty_reply_from_moderator_is_forbidden() {
        let desk = desk();
        let ticket = desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        assert!(matches!(
            desk.reply(MODERATOR, ticket.id, "   "),
            Err(FeedbackError::Forbidden { role: Role::Moderator, .. })
        ));
        assert!(matches!(
            desk.reply(HR, ticket.id, "   "),
            Err(FeedbackError::Validation(_))
        ));
    }

    #[test]
    fn test_fifth_submission_grants_active_badge() {
        let desk = desk();
        let newcomer = "newcomer@example.com";
        for _ in 0..4 {
            desk.submit_ticket(newcomer, complaint()).unwrap();
        }
        let account = desk.account(newcomer).unwrap();
        assert!(account.badges.contains("Новичок"));
        assert!(!account.badges.contains("Активный участник"));

        desk.submit_ticket(newcomer, complaint()).unwrap();
        let account = desk.account(newcomer).unwrap();
        assert!(account.badges.contains("Активный участник"));
        assert_eq!(account.points, 5 * 40);
    }

    #[test]
    fn test_seeded_ticket_counts_toward_badges() {
        let mut config = Config::default();
        config.badges.push(BadgeRule {
            name: "Постоянный автор".to_string(),
            min_tickets: 5,
        });
        let desk = FeedbackDesk::new(config);
        let employee = desk.account(EMPLOYEE).unwrap();
        assert_eq!(desk.my_tickets(EMPLOYEE).unwrap().len(), 1);

        for _ in 0..3 {
            desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        }
        assert!(!desk.profile(EMPLOYEE).unwrap().badges.contains("Постоянный автор"));

        // seed ticket plus four new ones reaches the rule
        desk.submit_ticket(EMPLOYEE, complaint()).unwrap();
        let profile = desk.profile(EMPLOYEE).unwrap();
        assert_eq!(profile.tickets.len(), 5);
        assert_eq!(profile.handle, employee.handle);
        assert!(profile.badges.contains("Постоянный автор"));
    }

    #[test]
    fn test_my_tickets_unknown_account() {
        let desk = desk();
        assert!(matches!(
            desk.my_tickets("ghost@example.com"),
            Err(FeedbackError::NotFound { entity: "account", .. })
        ));
    }

    #[test]
    fn test_registered_accounts_do_not_survive_restart() {
        let desk = desk();
        assert!(desk.account_survives_restart(EMPLOYEE));
        assert!(!desk.account_survives_restart("new@example.com"));

        let mut config = Config::default();
        config.seed.demo_data = false;
        assert!(!FeedbackDesk::new(config).account_survives_restart(EMPLOYEE));
    }

    #[test]
    fn test_missions_catalog() {
        let missions = desk().missions();
        assert_eq!(missions.len(), 5);
        assert_eq!(missions[0].points, 40);
    }
}
