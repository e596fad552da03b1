//! Anonymous Feedback - tickets, moderation and gamified levels
//!
//! Employees submit complaints, suggestions and praise under a pseudonymous
//! handle. Tickets move through a moderated workflow and activity earns
//! points that convert into levels and a leaderboard.
//!
//! # How it works
//!
//! 1. An employee registers by proving ownership of an email (one-time code)
//! 2. Each submitted ticket gets a freshly issued handle; the ticket never
//!    records the account behind it
//! 3. Moderators approve or reject new tickets
//! 4. HR and managers reply to and resolve tickets
//! 5. Every step pays points to the author once: +40 submit, +35 approved,
//!    +25 answered, +60 resolved, +20 extra for praise
//!
//! # Anonymity
//!
//! - Ticket views expose only the handle
//! - Handle ownership is kept inside the identity issuer and used for
//!   scoring and the author's own profile
//! - The leaderboard shows account handles, never emails

pub mod accounts;
pub mod analytics;
pub mod auth;
pub mod config;
pub mod desk;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod model;
pub mod policy;
pub mod scoring;
pub mod seed;
pub mod session;
pub mod tickets;
pub mod verification;

pub use config::Config;
pub use desk::{Decision, FeedbackDesk, MissionInfo, Profile};
pub use error::{FeedbackError, Result};
pub use lifecycle::Transition;
pub use model::{Account, Handle, Role, Ticket, TicketDraft, TicketStatus, TicketType};
pub use policy::{AccessPolicy, Surface};
pub use scoring::{level_of, LeaderboardEntry, Level, Mission};
pub use session::{SessionRecord, SlotStore, SqliteSlots};
