//! `onstart-executor` library crate.
//!
//! The startup orchestrator and the per-script execution protocol. The
//! binary entrypoint lives in `main.rs`.

pub mod config;
pub mod orchestrator;
pub mod protocol;
pub mod report;

pub use orchestrator::StartupExecutor;
pub use report::{ExecutionOutcome, OutcomeStatus, StartupReport};
