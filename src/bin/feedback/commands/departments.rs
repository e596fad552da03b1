//! Departments command - intake catalog per ticket type

use crate::style::*;
use anon_feedback::TicketType;
use anyhow::Result;

pub fn run() -> Result<()> {
    print_header("Intake Departments");

    for ticket_type in TicketType::ALL {
        println!();
        println!(
            "{} {}",
            style_bold(ticket_type.label()),
            style_dim(&format!("({})", ticket_type))
        );
        for department in ticket_type.departments() {
            println!("  - {}", department);
        }
    }

    Ok(())
}
