//! Microloan Backend Library
//!
//! EMI calculation, amortization schedules, loan status classification and
//! the retention-bounded trash for the microloan server.

pub mod auth;
pub mod config;
pub mod db;
pub mod emi;
pub mod error;
pub mod handlers;
pub mod loan;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod trash;
