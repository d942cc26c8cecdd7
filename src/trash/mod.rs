//! Trash domain module
//!
//! Soft delete with a restore window, permanent purge and the periodic
//! cleanup sweep.

mod policy;
mod service;
mod sweeper;

pub use policy::{RetentionPolicy, RetentionRemaining, RETENTION_WINDOW_DAYS};
pub use service::{authorize, PurgeFailure, SweepReport, TrashEntry, TrashService};
pub use sweeper::{run_sweep, start_cleanup_job};
