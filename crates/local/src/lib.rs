//! `onstart-local` -- directory-backed collaborators.
//!
//! Provides a session over a scripts directory, a finder that reads
//! execution metadata from script header comments, and a manager that
//! validates and runs scripts with `bash`.

pub mod finder;
pub mod header;
pub mod manager;
pub mod session;
pub mod subprocess;

pub use finder::HeaderScriptFinder;
pub use manager::ShellScriptManager;
pub use session::{DirectorySession, DirectorySessionFactory};
