//! Interactive shell
//!
//! Restores the persisted session, otherwise runs the login wizard, then
//! offers the actions the account's role is allowed to take.

use std::sync::Arc;

use anon_feedback::session::{clear_session, load_session, save_session};
use anon_feedback::tickets::MemoryTicketStore;
use anon_feedback::{
    Account, Config, Decision, FeedbackDesk, FeedbackError, SessionRecord, SqliteSlots, Surface,
    Ticket, TicketDraft, TicketStatus, TicketType, Transition,
};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use tracing::debug;

use super::login_wizard::{self, TerminalCodeSender};
use crate::style::*;

#[derive(Debug, Clone, Copy)]
enum Action {
    NewTicket,
    MyTickets,
    AllTickets,
    Levels,
    Profile,
    Moderate,
    Reply,
    MarkAnswered,
    Resolve,
    ModerationQueue,
    Analytics,
    AdminPanel,
    SupervisorPanel,
    Logout,
    Quit,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Self::NewTicket => "New ticket",
            Self::MyTickets => "My tickets",
            Self::AllTickets => "All tickets",
            Self::Levels => "Levels & leaderboard",
            Self::Profile => "Profile",
            Self::Moderate => "Moderate a ticket",
            Self::Reply => "Reply to a ticket",
            Self::MarkAnswered => "Mark ticket answered",
            Self::Resolve => "Resolve a ticket",
            Self::ModerationQueue => "Moderation queue",
            Self::Analytics => "Analytics",
            Self::AdminPanel => "Admin panel",
            Self::SupervisorPanel => "Supervisor panel",
            Self::Logout => "Log out",
            Self::Quit => "Quit",
        }
    }
}

pub fn run(config: Config) -> Result<()> {
    let slots = SqliteSlots::new(config.session_path())?;
    let desk = FeedbackDesk::with_parts(
        config,
        Arc::new(MemoryTicketStore::new()),
        Arc::new(TerminalCodeSender),
    );

    let mut current = restore(&desk, &slots)?;
    loop {
        let account = match current.take() {
            Some(account) => account,
            None => match login_wizard::run(&desk)? {
                Some(account) => {
                    if desk.account_survives_restart(&account.email) {
                        save_session(
                            &slots,
                            &SessionRecord {
                                email: account.email.clone(),
                                role: account.role,
                            },
                        )?;
                    } else {
                        print_info("Accounts created here last until you quit");
                    }
                    account
                }
                None => return Ok(()),
            },
        };

        match session_loop(&desk, &account)? {
            Action::Logout => {
                clear_session(&slots)?;
                print_info("Logged out");
            }
            _ => return Ok(()),
        }
    }
}

fn restore(desk: &FeedbackDesk, slots: &SqliteSlots) -> Result<Option<Account>> {
    let Some(record) = load_session(slots)? else {
        return Ok(None);
    };
    match desk.account(&record.email) {
        Ok(account) => {
            print_info(&format!(
                "Welcome back, {}",
                style_cyan(account.role.label())
            ));
            Ok(Some(account))
        }
        Err(_) => {
            debug!("Stored session does not match any account");
            print_warning("Saved session is no longer valid, please sign in again");
            clear_session(slots)?;
            Ok(None)
        }
    }
}

fn menu_for(desk: &FeedbackDesk, account: &Account) -> Vec<Action> {
    let policy = desk.policy();
    let role = account.role;
    let surfaces = policy.visible_surfaces(role);

    let mut actions = Vec::new();
    if surfaces.contains(&Surface::TicketIntake) {
        actions.push(Action::NewTicket);
    }
    actions.extend([Action::MyTickets, Action::AllTickets, Action::Levels]);
    if surfaces.contains(&Surface::Profile) {
        actions.push(Action::Profile);
    }
    if policy.can_transition(role, Transition::Approve) {
        actions.push(Action::Moderate);
    }
    if policy.can_transition(role, Transition::Answer) {
        actions.push(Action::Reply);
        actions.push(Action::MarkAnswered);
    }
    if policy.can_transition(role, Transition::Resolve) {
        actions.push(Action::Resolve);
    }
    actions.extend(surfaces.into_iter().filter_map(|surface| match surface {
        Surface::ModerationPanel => Some(Action::ModerationQueue),
        Surface::AnalyticsDashboard => Some(Action::Analytics),
        Surface::AdminPanel => Some(Action::AdminPanel),
        Surface::SupervisorPanel => Some(Action::SupervisorPanel),
        Surface::TicketIntake | Surface::Profile => None,
    }));
    actions.push(Action::Logout);
    actions.push(Action::Quit);
    actions
}

fn session_loop(desk: &FeedbackDesk, account: &Account) -> Result<Action> {
    let actions = menu_for(desk, account);
    let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

    loop {
        println!();
        let choice = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("  {} ", account.role.label()))
            .items(&labels)
            .default(0)
            .interact()?;

        let action = actions[choice];
        let outcome = match action {
            Action::NewTicket => new_ticket(desk, account),
            Action::MyTickets => match desk.my_tickets(&account.email) {
                Ok(tickets) => {
                    show_tickets("My tickets", &tickets);
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
            Action::AllTickets => {
                show_tickets("All tickets", &desk.tickets());
                Ok(())
            }
            Action::Levels => show_levels(desk, account),
            Action::Profile => show_profile(desk, account),
            Action::Moderate => moderate(desk, account),
            Action::Reply => reply(desk, account),
            Action::MarkAnswered => simple_transition(desk, account, Transition::Answer),
            Action::Resolve => simple_transition(desk, account, Transition::Resolve),
            Action::ModerationQueue => show_queue(desk, account),
            Action::Analytics => show_analytics(desk, account),
            Action::AdminPanel => show_admin(desk, account),
            Action::SupervisorPanel => show_supervisor(desk, account),
            Action::Logout | Action::Quit => return Ok(action),
        };

        if let Err(e) = outcome {
            match e.downcast_ref::<FeedbackError>() {
                Some(err) => print_error(&err.to_string()),
                None => return Err(e),
            }
        }
    }
}

fn new_ticket(desk: &FeedbackDesk, account: &Account) -> Result<()> {
    print_header("New ticket");
    print_info("Your ticket is submitted anonymously");

    let type_labels: Vec<&str> = TicketType::ALL.iter().map(|t| t.label()).collect();
    let type_index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("  Type")
        .items(&type_labels)
        .default(0)
        .interact()?;
    let ticket_type = TicketType::ALL[type_index];

    let departments = desk.departments_for(ticket_type);
    let department_index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("  Department")
        .items(departments)
        .default(0)
        .interact()?;

    let title: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("  Title")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                return Err("Title cannot be empty");
            }
            Ok(())
        })
        .interact_text()?;
    let body: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("  Details")
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() {
                return Err("Details cannot be empty");
            }
            Ok(())
        })
        .interact_text()?;

    let draft = TicketDraft::new(ticket_type, departments[department_index], title, body);
    let ticket = desk.submit_ticket(&account.email, draft)?;
    print_success(&format!(
        "Ticket #{} submitted as {}",
        ticket.id,
        style_cyan(ticket.author_handle.as_str())
    ));
    Ok(())
}

fn show_tickets(title: &str, tickets: &[Ticket]) {
    print_header(title);
    if tickets.is_empty() {
        print_info("No tickets yet.");
        return;
    }
    for ticket in tickets {
        show_ticket(ticket);
    }
}

fn show_ticket(ticket: &Ticket) {
    println!();
    println!(
        "{} {}  {}",
        style_bold(&format!("#{}", ticket.id)),
        style_bold(&ticket.title),
        style_status(ticket.status)
    );
    println!(
        "{}",
        style_dim(&format!(
            "{} · {} · {} · {}",
            ticket.ticket_type.label(),
            ticket.department,
            ticket.author_handle,
            ticket.created_at.format("%Y-%m-%d %H:%M")
        ))
    );
    println!("{}", ticket.body);
    for reply in &ticket.replies {
        println!("  {} {}", style_cyan(&format!("{}:", reply.by)), reply.text);
    }
}

fn show_levels(desk: &FeedbackDesk, account: &Account) -> Result<()> {
    let profile = desk.profile(&account.email)?;
    let level = profile.level;

    print_header("Progress");
    println!(
        "{}  {} XP",
        style_cyan(&format!("Lv {}", level.level)),
        profile.points
    );
    println!(
        "{}  {} XP to next level",
        progress_bar(level.progress, 30),
        level.xp_to_next
    );

    print_header("Missions");
    for mission in desk.missions() {
        println!(
            "  {:<24} {}  {}",
            mission.title,
            style_green(&format!("+{} XP", mission.points)),
            style_dim(&mission.description)
        );
    }

    print_header("Leaderboard");
    let limit = desk.scoring().default_limit();
    for entry in desk.leaderboard(limit) {
        let marker = if entry.handle == account.handle { "◀" } else { "" };
        println!(
            "  {:>3}  {:<20}  Lv {} · {} XP {}",
            format!("#{}", entry.rank),
            entry.handle.as_str(),
            entry.level,
            entry.points,
            style_yellow(marker)
        );
    }
    Ok(())
}

fn show_profile(desk: &FeedbackDesk, account: &Account) -> Result<()> {
    let profile = desk.profile(&account.email)?;

    print_header("Profile");
    println!("Role:          {}", profile.role.label());
    println!("Email:         {}", profile.email);
    println!("Anonymous ID:  {}", style_cyan(profile.handle.as_str()));
    println!("Points:        {}", style_bold(&profile.points.to_string()));
    println!("Level:         {}", profile.level.level);
    println!("Tickets:       {}", profile.tickets.len());
    println!("Resolved:      {}", profile.resolved);
    println!("Approved:      {}", profile.approved);
    if !profile.badges.is_empty() {
        let badges: Vec<&str> = profile.badges.iter().map(String::as_str).collect();
        println!("Badges:        {}", style_yellow(&badges.join(", ")));
    }

    let recent: Vec<Ticket> = profile.tickets.into_iter().take(5).collect();
    show_tickets("Recent tickets", &recent);
    Ok(())
}

/// Pick a ticket whose status allows `transition`.
fn pick_ticket(desk: &FeedbackDesk, transition: Transition) -> Result<Option<u64>> {
    let candidates: Vec<Ticket> = desk
        .tickets()
        .into_iter()
        .filter(|t| transition.sources().contains(&t.status))
        .collect();

    if candidates.is_empty() {
        print_info("No tickets available for this action.");
        return Ok(None);
    }

    let labels: Vec<String> = candidates
        .iter()
        .map(|t| format!("#{} {} [{}]", t.id, t.title, t.status.label()))
        .collect();
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("  Ticket")
        .items(&labels)
        .default(0)
        .interact()?;

    show_ticket(&candidates[index]);
    Ok(Some(candidates[index].id))
}

fn moderate(desk: &FeedbackDesk, account: &Account) -> Result<()> {
    print_header("Moderation");
    let Some(id) = pick_ticket(desk, Transition::Approve)? else {
        return Ok(());
    };

    let approve = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("  Approve this ticket? (no = reject)")
        .default(true)
        .interact()?;
    let decision = if approve {
        Decision::Approve
    } else {
        Decision::Reject
    };

    let ticket = desk.moderate(&account.email, id, decision)?;
    print_success(&format!(
        "Ticket #{} is now {}",
        ticket.id,
        style_status(ticket.status)
    ));
    Ok(())
}

fn reply(desk: &FeedbackDesk, account: &Account) -> Result<()> {
    print_header("Reply");
    let Some(id) = pick_ticket(desk, Transition::Answer)? else {
        return Ok(());
    };

    let text: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt("  Reply")
        .interact_text()?;
    let ticket = desk.reply(&account.email, id, &text)?;
    print_success(&format!(
        "Reply added, ticket #{} is {}",
        ticket.id,
        style_status(ticket.status)
    ));
    Ok(())
}

fn simple_transition(desk: &FeedbackDesk, account: &Account, transition: Transition) -> Result<()> {
    print_header(match transition {
        Transition::Resolve => "Resolve",
        _ => "Mark answered",
    });
    let Some(id) = pick_ticket(desk, transition)? else {
        return Ok(());
    };

    let ticket = match transition {
        Transition::Resolve => desk.resolve(&account.email, id)?,
        _ => desk.mark_answered(&account.email, id)?,
    };
    print_success(&format!(
        "Ticket #{} is now {}",
        ticket.id,
        style_status(ticket.status)
    ));
    Ok(())
}

fn show_queue(desk: &FeedbackDesk, account: &Account) -> Result<()> {
    let queue = desk.moderation_queue(&account.email)?;
    print_header("Moderation queue");
    println!(
        "Pending: {}  Approved: {}  Rejected: {}",
        style_bold(&queue.pending.len().to_string()),
        queue.approved,
        queue.rejected
    );
    for ticket in &queue.pending {
        show_ticket(ticket);
    }
    Ok(())
}

fn show_analytics(desk: &FeedbackDesk, account: &Account) -> Result<()> {
    let summary = desk.analytics(&account.email)?;
    print_header("Analytics");

    println!("Total tickets:   {}", style_bold(&summary.total.to_string()));
    for status in TicketStatus::ALL {
        println!(
            "  {:<22} {}",
            style_status(status),
            summary.by_status.get(status)
        );
    }
    println!();
    println!("Complaints:      {}", summary.by_type.complaint);
    println!("Suggestions:     {}", summary.by_type.suggestion);
    println!("Praise:          {}", summary.by_type.praise);
    println!();
    println!("Resolved:        {}%", summary.resolved_percent);
    println!("Approved:        {}%", summary.approval_percent);
    Ok(())
}

fn show_admin(desk: &FeedbackDesk, account: &Account) -> Result<()> {
    let mut filters: Vec<String> = vec!["All".to_string()];
    filters.extend(TicketStatus::ALL.iter().map(|s| s.label().to_string()));
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("  Filter")
        .items(&filters)
        .default(0)
        .interact()?;
    let filter = index.checked_sub(1).map(|i| TicketStatus::ALL[i]);

    let overview = desk.admin_overview(&account.email, filter)?;
    print_header("Admin panel");
    println!(
        "Total: {}  New: {}  Approved: {}  Answered: {}  Resolved: {}",
        overview.total,
        overview.counts.new,
        overview.counts.approved,
        overview.counts.answered,
        overview.counts.resolved
    );
    show_tickets("Tickets", &overview.tickets);
    Ok(())
}

fn show_supervisor(desk: &FeedbackDesk, account: &Account) -> Result<()> {
    let report = desk.supervisor_report(&account.email)?;
    print_header("Supervisor panel");

    println!("Total tickets:   {}", report.total);
    println!("New:             {}", report.by_status.new);
    println!("Approved:        {}", report.by_status.approved);
    println!("Resolved:        {} ({}%)", report.by_status.resolved, report.resolved_percent);
    println!("Response rate:   {}%", report.response_rate);
    println!(
        "HR rating:       {}",
        style_green(&format!("{:.0}/100", report.hr_rating))
    );

    print_header("Departments");
    for (department, stat) in &report.departments {
        println!(
            "  {:<24} {} resolved of {}",
            department, stat.resolved, stat.total
        );
    }
    Ok(())
}
