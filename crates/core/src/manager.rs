//! Script manager contract.

use crate::error::CoreResult;
use crate::progress::Progress;
use crate::script::Script;
use crate::session::Session;

/// Phase a script is processed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Check the script is well-formed. Has no side effects besides the
    /// returned progress; a successful progress means the script is valid.
    Validation,
    /// Apply the script's real effects.
    AutomaticRun,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::AutomaticRun => "automatic_run",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates and runs scripts.
///
/// Returning `Err` means the store could not be accessed; a script that ran
/// but failed is an `Ok` progress with an error entry.
pub trait ScriptManager: Send + Sync {
    fn process(&self, script: &Script, mode: Mode, session: &mut dyn Session)
        -> CoreResult<Progress>;
}
