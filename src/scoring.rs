//! Points, levels and the leaderboard
//!
//! Points accrue from missions completed on an account's tickets. Each
//! mission pays out at most once per ticket. Levels are derived from points
//! using fixed-width bands and are never stored.

use std::collections::HashSet;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::accounts::AccountDirectory;
use crate::config::{AwardsConfig, BadgeRule, ScoringConfig};
use crate::error::Result;
use crate::identity::IdentityIssuer;
use crate::model::{Account, AccountId, Handle, Role, Ticket};
use crate::tickets::TicketStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mission {
    TicketSubmitted,
    ReplyReceived,
    ModeratorApproved,
    Resolved,
    PraiseShared,
}

impl Mission {
    /// Catalog order
    pub const ALL: [Mission; 5] = [
        Mission::TicketSubmitted,
        Mission::ReplyReceived,
        Mission::ModeratorApproved,
        Mission::Resolved,
        Mission::PraiseShared,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::TicketSubmitted => "Отправить обращение",
            Self::ReplyReceived => "Получить ответ HR",
            Self::ModeratorApproved => "Одобрено модератором",
            Self::Resolved => "Решённое обращение",
            Self::PraiseShared => "Похвала коллеге",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::TicketSubmitted => "Сообщите о проблеме или предложении",
            Self::ReplyReceived => "Дождитесь реакции на обращение",
            Self::ModeratorApproved => "Пройдите проверку в модерации",
            Self::Resolved => "Получите окончательное решение",
            Self::PraiseShared => "Поделитесь позитивной историей",
        }
    }

    pub fn points(&self, awards: &AwardsConfig) -> u32 {
        match self {
            Self::TicketSubmitted => awards.ticket_submitted,
            Self::ReplyReceived => awards.reply_received,
            Self::ModeratorApproved => awards.moderator_approved,
            Self::Resolved => awards.resolved,
            Self::PraiseShared => awards.praise_shared,
        }
    }
}

/// Level band derived from a points total
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub level: u32,
    /// Fraction of the current band completed, in `[0, 1]`
    pub progress: f64,
    pub xp_to_next: u32,
}

pub fn level_of(points: u32, band_width: u32) -> Level {
    // u64 keeps `level * band` in range for totals near u32::MAX
    let band = u64::from(band_width.max(1));
    let points = u64::from(points);
    let level = points / band + 1;
    let floor = (level - 1) * band;
    let ceiling = level * band;
    let progress = ((points - floor) as f64 / band as f64).clamp(0.0, 1.0);

    Level {
        level: u32::try_from(level).unwrap_or(u32::MAX),
        progress,
        xp_to_next: u32::try_from(ceiling - points).unwrap_or(u32::MAX),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub handle: Handle,
    pub role: Role,
    pub points: u32,
    pub level: u32,
}

/// Rank accounts by points, keeping input order among equals.
pub fn leaderboard(accounts: &[Account], limit: usize, band_width: u32) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&Account> = accounts.iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.points.cmp(&a.points));

    ranked
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, account)| LeaderboardEntry {
            rank: (i + 1) as u32,
            handle: account.handle.clone(),
            role: account.role,
            points: account.points,
            level: level_of(account.points, band_width).level,
        })
        .collect()
}

pub struct ScoringEngine {
    config: ScoringConfig,
    badges: Vec<BadgeRule>,
    awarded: Mutex<HashSet<(u64, Mission)>>,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig, badges: Vec<BadgeRule>) -> Self {
        Self {
            config,
            badges,
            awarded: Mutex::new(HashSet::new()),
        }
    }

    pub fn band_width(&self) -> u32 {
        self.config.band_width
    }

    pub fn default_limit(&self) -> usize {
        self.config.leaderboard_limit
    }

    pub fn points_of(&self, account: &Account) -> u32 {
        account.points
    }

    pub fn level_of(&self, points: u32) -> Level {
        level_of(points, self.config.band_width)
    }

    pub fn leaderboard(&self, accounts: &[Account], limit: usize) -> Vec<LeaderboardEntry> {
        leaderboard(accounts, limit, self.config.band_width)
    }

    /// Credit `mission` on `ticket` to the account owning its handle.
    ///
    /// Returns the points credited, `None` when the mission was already paid
    /// for this ticket or the handle has no owner. Submissions also re-check
    /// badge thresholds against every ticket the owner holds in `tickets`.
    pub fn award(
        &self,
        ticket: &Ticket,
        mission: Mission,
        issuer: &IdentityIssuer,
        directory: &AccountDirectory,
        tickets: &dyn TicketStore,
    ) -> Result<Option<u32>> {
        let Some(owner) = issuer.owner_of(&ticket.author_handle) else {
            debug!("Ticket #{} has no owning account, skipping {:?}", ticket.id, mission);
            return Ok(None);
        };

        if !self.awarded.lock().insert((ticket.id, mission)) {
            debug!("{:?} already awarded for ticket #{}", mission, ticket.id);
            return Ok(None);
        }

        let points = mission.points(&self.config.awards);
        let total = directory.add_points(&owner, points)?;
        info!(
            "Awarded {} points to {} for {:?} on ticket #{} (total {})",
            points, owner, mission, ticket.id, total
        );

        if mission == Mission::TicketSubmitted {
            let submitted = tickets
                .all()
                .iter()
                .filter(|t| issuer.is_owned_by(&t.author_handle, &owner))
                .count();
            self.grant_badges(&owner, submitted, directory)?;
        }

        Ok(Some(points))
    }

    fn grant_badges(
        &self,
        owner: &AccountId,
        submitted: usize,
        directory: &AccountDirectory,
    ) -> Result<()> {
        for rule in self.badges.iter().filter(|r| submitted >= r.min_tickets) {
            if directory.grant_badge(owner, &rule.name)? {
                info!("Granted badge '{}' to {}", rule.name, owner);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::{TicketDraft, TicketType};
    use crate::tickets::{MemoryTicketStore, TicketStore};
    use std::collections::BTreeSet;

    fn account(id: &str, points: u32) -> Account {
        Account {
            id: AccountId::new(id),
            email: format!("{}@example.com", id),
            credential: String::new(),
            role: Role::Employee,
            handle: Handle::new(format!("h-{}", id)),
            points,
            badges: BTreeSet::new(),
        }
    }

    #[test]
    fn test_level_bands() {
        let zero = level_of(0, 150);
        assert_eq!((zero.level, zero.progress, zero.xp_to_next), (1, 0.0, 150));

        let boundary = level_of(150, 150);
        assert_eq!(
            (boundary.level, boundary.progress, boundary.xp_to_next),
            (2, 0.0, 150)
        );

        let half = level_of(75, 150);
        assert_eq!((half.level, half.progress, half.xp_to_next), (1, 0.5, 75));

        let almost = level_of(299, 150);
        assert_eq!(almost.level, 2);
        assert_eq!(almost.xp_to_next, 1);
    }

    #[test]
    fn test_level_monotonic() {
        let mut previous = 0;
        for points in 0..1000 {
            let level = level_of(points, 150).level;
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn test_level_at_points_ceiling() {
        let top = level_of(u32::MAX, 150);
        assert_eq!(top.level, 28_633_116);
        assert_eq!(top.xp_to_next, 105);
        assert!((top.progress - 0.3).abs() < 1e-9);

        let narrow = level_of(u32::MAX, 1);
        assert_eq!(narrow.level, u32::MAX);
        assert_eq!(narrow.xp_to_next, 1);
        assert_eq!(narrow.progress, 0.0);
    }

    #[test]
    fn test_leaderboard_stable_ties() {
        let accounts = vec![
            account("a", 300),
            account("b", 300),
            account("c", 150),
            account("d", 0),
        ];
        let board = leaderboard(&accounts, 3, 150);
        assert_eq!(board.len(), 3);
        let handles: Vec<&str> = board.iter().map(|e| e.handle.as_str()).collect();
        assert_eq!(handles, vec!["h-a", "h-b", "h-c"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].level, 3);
        assert_eq!(board[2].level, 2);
    }

    #[test]
    fn test_leaderboard_descending() {
        let accounts = vec![account("a", 10), account("b", 90), account("c", 50)];
        let points: Vec<u32> = leaderboard(&accounts, 10, 150)
            .iter()
            .map(|e| e.points)
            .collect();
        assert_eq!(points, vec![90, 50, 10]);
    }

    #[test]
    fn test_award_is_idempotent() {
        let config = Config::default();
        let engine = ScoringEngine::new(config.scoring.clone(), config.badges.clone());
        let issuer = IdentityIssuer::new("emp", true);
        let directory = AccountDirectory::new();
        let store = MemoryTicketStore::new();

        let owner = directory
            .insert("a@example.com", String::new(), Role::Employee, issuer.issue_handle())
            .unwrap();
        let handle = issuer.issue_handle_for(&owner.id);
        let ticket = store.create(
            TicketDraft::new(TicketType::Complaint, "IT", "t", "b"),
            handle,
        );

        let first = engine
            .award(&ticket, Mission::TicketSubmitted, &issuer, &directory, &store)
            .unwrap();
        let again = engine
            .award(&ticket, Mission::TicketSubmitted, &issuer, &directory, &store)
            .unwrap();
        assert_eq!(first, Some(40));
        assert_eq!(again, None);

        engine
            .award(&ticket, Mission::Resolved, &issuer, &directory, &store)
            .unwrap();
        let stored = directory.by_id(&owner.id).unwrap();
        assert_eq!(engine.points_of(&stored), 100);
        assert!(stored.badges.contains("Новичок"));
        assert!(!stored.badges.contains("Активный участник"));
    }

    #[test]
    fn test_badges_count_owned_tickets() {
        let config = Config::default();
        let engine = ScoringEngine::new(config.scoring.clone(), config.badges.clone());
        let issuer = IdentityIssuer::new("emp", true);
        let directory = AccountDirectory::new();
        let store = MemoryTicketStore::new();

        let owner = directory
            .insert("a@example.com", String::new(), Role::Employee, issuer.issue_handle())
            .unwrap();
        // four tickets held before this engine saw any submission
        for _ in 0..4 {
            store.create(
                TicketDraft::new(TicketType::Complaint, "IT", "t", "b"),
                issuer.issue_handle_for(&owner.id),
            );
        }
        // someone else's ticket does not count
        store.create(
            TicketDraft::new(TicketType::Complaint, "IT", "t", "b"),
            issuer.issue_handle(),
        );

        let fifth = store.create(
            TicketDraft::new(TicketType::Complaint, "IT", "t", "b"),
            issuer.issue_handle_for(&owner.id),
        );
        engine
            .award(&fifth, Mission::TicketSubmitted, &issuer, &directory, &store)
            .unwrap();

        let stored = directory.by_id(&owner.id).unwrap();
        assert!(stored.badges.contains("Новичок"));
        assert!(stored.badges.contains("Активный участник"));
    }

    #[test]
    fn test_award_without_owner() {
        let config = Config::default();
        let engine = ScoringEngine::new(config.scoring.clone(), config.badges.clone());
        let issuer = IdentityIssuer::new("emp", true);
        let directory = AccountDirectory::new();
        let store = MemoryTicketStore::new();

        let ticket = store.create(
            TicketDraft::new(TicketType::Praise, "IT", "t", "b"),
            issuer.issue_handle(),
        );
        assert_eq!(
            engine
                .award(&ticket, Mission::PraiseShared, &issuer, &directory, &store)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_mission_catalog_points() {
        let awards = Config::default().scoring.awards;
        let points: Vec<u32> = Mission::ALL.iter().map(|m| m.points(&awards)).collect();
        assert_eq!(points, vec![40, 25, 35, 60, 20]);
    }
}
