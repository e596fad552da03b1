pub mod login_wizard;
pub mod shell;
