//! Demo directory and tickets loaded at boot

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::info;

use crate::accounts::AccountDirectory;
use crate::auth::hash_credential;
use crate::identity::IdentityIssuer;
use crate::model::{Account, AccountId, Handle, Reply, Role, Ticket, TicketStatus, TicketType};
use crate::tickets::TicketStore;

struct SeedAccount {
    email: &'static str,
    password: &'static str,
    role: Role,
    handle: &'static str,
    points: u32,
    badges: &'static [&'static str],
}

const ACCOUNTS: &[SeedAccount] = &[
    SeedAccount {
        email: "employee@example.com",
        password: "password",
        role: Role::Employee,
        handle: "сотрудник-834",
        points: 120,
        badges: &["Новичок", "Активный участник"],
    },
    SeedAccount {
        email: "hr@example.com",
        password: "password",
        role: Role::Hr,
        handle: "hr-001",
        points: 0,
        badges: &[],
    },
    SeedAccount {
        email: "moderator@example.com",
        password: "password",
        role: Role::Moderator,
        handle: "mod-001",
        points: 0,
        badges: &[],
    },
    SeedAccount {
        email: "supervisor@example.com",
        password: "password",
        role: Role::Supervisor,
        handle: "svp-001",
        points: 0,
        badges: &[],
    },
    SeedAccount {
        email: "manager@example.com",
        password: "12345678900",
        role: Role::Manager,
        handle: "manager-001",
        points: 0,
        badges: &[],
    },
    SeedAccount {
        email: "newcomer@example.com",
        password: "12345678900",
        role: Role::Employee,
        handle: "сотрудник-999",
        points: 0,
        badges: &[],
    },
];

struct SeedTicket {
    ticket_type: TicketType,
    department: &'static str,
    title: &'static str,
    body: &'static str,
    status: TicketStatus,
    replies: &'static [(&'static str, &'static str)],
    handle: &'static str,
}

const TICKETS: &[SeedTicket] = &[
    SeedTicket {
        ticket_type: TicketType::Complaint,
        department: "Продажи",
        title: "Задержка выплаты премий",
        body: "Премии за последний квартал до сих пор не выплачены. Обещали до 15 числа, но уже 20-е.",
        status: TicketStatus::New,
        replies: &[],
        handle: "сотрудник-834",
    },
    SeedTicket {
        ticket_type: TicketType::Praise,
        department: "Поддержка",
        title: "Отличная работа команды поддержки",
        body: "Хочу поблагодарить Анну из отдела поддержки за оперативное решение моего вопроса. Очень профессионально!",
        status: TicketStatus::Resolved,
        replies: &[("HR", "Спасибо за обратную связь! Передадим благодарность Анне.")],
        handle: "сотрудник-521",
    },
    SeedTicket {
        ticket_type: TicketType::Suggestion,
        department: "IT",
        title: "Предложение по улучшению рабочего процесса",
        body: "Предлагаю внедрить систему автоматического резервного копирования данных. Это повысит безопасность и надежность работы.",
        status: TicketStatus::Approved,
        replies: &[("Руководитель IT", "Идея интересная, рассмотрим на ближайшем совещании.")],
        handle: "сотрудник-247",
    },
    SeedTicket {
        ticket_type: TicketType::Complaint,
        department: "HR",
        title: "Проблема с графиком отпусков",
        body: "Не могу согласовать отпуск на удобные мне даты. Система постоянно показывает, что все места заняты.",
        status: TicketStatus::New,
        replies: &[],
        handle: "сотрудник-912",
    },
    SeedTicket {
        ticket_type: TicketType::Praise,
        department: "Маркетинг",
        title: "Отличная организация корпоратива",
        body: "Спасибо отделу маркетинга за прекрасно организованное новогоднее мероприятие! Все было на высшем уровне.",
        status: TicketStatus::Resolved,
        replies: &[],
        handle: "сотрудник-634",
    },
    SeedTicket {
        ticket_type: TicketType::Suggestion,
        department: "Общее",
        title: "Предложение по улучшению офисного пространства",
        body: "Хотелось бы добавить больше растений в офис и улучшить освещение. Это повысит комфорт работы сотрудников.",
        status: TicketStatus::New,
        replies: &[],
        handle: "сотрудник-189",
    },
];

/// Whether `email` is one of the demo accounts rebuilt on every start
pub fn is_demo_account(email: &str) -> bool {
    ACCOUNTS.iter().any(|seed| seed.email == email)
}

/// Load the demo accounts and tickets into empty stores.
pub fn load_demo_data(
    directory: &AccountDirectory,
    issuer: &IdentityIssuer,
    tickets: &dyn TicketStore,
) {
    for (i, seed) in ACCOUNTS.iter().enumerate() {
        let id = AccountId::new(format!("u{}", i + 1));
        let handle = Handle::new(seed.handle);
        issuer.register(handle.clone(), Some(id.clone()));
        directory.import(Account {
            id,
            email: seed.email.to_string(),
            credential: hash_credential(seed.email, seed.password),
            role: seed.role,
            handle,
            points: seed.points,
            badges: seed.badges.iter().map(|b| b.to_string()).collect::<BTreeSet<_>>(),
        });
    }

    let now = Utc::now();
    for (i, seed) in TICKETS.iter().enumerate() {
        let handle = Handle::new(seed.handle);
        issuer.register(handle.clone(), None);
        tickets.import(Ticket {
            id: (i + 1) as u64,
            ticket_type: seed.ticket_type,
            department: seed.department.to_string(),
            title: seed.title.to_string(),
            body: seed.body.to_string(),
            status: seed.status,
            created_at: now,
            replies: seed
                .replies
                .iter()
                .map(|(by, text)| Reply {
                    by: by.to_string(),
                    text: text.to_string(),
                })
                .collect(),
            author_handle: handle,
        });
    }

    info!(
        "Loaded demo data: {} accounts, {} tickets",
        ACCOUNTS.len(),
        TICKETS.len()
    );
}
