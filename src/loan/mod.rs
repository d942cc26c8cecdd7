//! Loan domain module
//!
//! Contains the loan records, the status classifier, derived summaries and
//! the loan service.

mod model;
mod service;
mod status;
mod summary;

pub use model::*;
pub use service::LoanService;
pub use status::{classify, LoanSnapshot, LoanState};
pub use summary::{DashboardStats, LoanDetail, LoanSummary};
