//! API handlers

mod account;
mod emi;
mod health;
mod loan;
mod trash;

pub use account::{get_dashboard, get_session};
pub use emi::preview_schedule;
pub use health::{health_check, root};
pub use loan::{
    approve_loan, create_loan, get_loan, list_loans, mark_defaulted, move_to_trash, pay_installment,
};
pub use trash::{cleanup_trash, list_trash, purge_loan, restore_loan};
