//! `onstart-core` -- domain logic for running startup scripts.
//!
//! Everything here is pure: no filesystem, process, or network access.
//! Storage and script execution are reached through the collaborator
//! traits in [`script`], [`manager`], [`run_mode`], and [`session`].

pub mod error;
pub mod manager;
pub mod messaging;
pub mod progress;
pub mod run_mode;
pub mod script;
pub mod session;

pub use error::{CoreError, CoreResult};
