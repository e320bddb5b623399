//! Script model, discovery filter, and the finder contract.

use crate::error::{CoreError, CoreResult};
use crate::session::Session;

// ---------------------------------------------------------------------------
// ExecutionMode
// ---------------------------------------------------------------------------

/// When a script is meant to be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    OnDemand,
    OnStart,
    OnModify,
    OnSchedule,
}

impl ExecutionMode {
    /// Return the wire-format string for this variant.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnDemand => "on_demand",
            Self::OnStart => "on_start",
            Self::OnModify => "on_modify",
            Self::OnSchedule => "on_schedule",
        }
    }

    /// Parse from a wire-format string. Hyphens are accepted in place of
    /// underscores and case is ignored.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "on_demand" => Ok(Self::OnDemand),
            "on_start" => Ok(Self::OnStart),
            "on_modify" => Ok(Self::OnModify),
            "on_schedule" => Ok(Self::OnSchedule),
            _ => Err(CoreError::Validation(format!(
                "Invalid execution_mode: '{s}'. Must be one of: on_demand, on_start, \
                 on_modify, on_schedule"
            ))),
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// Read-only view of a script held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    /// Unique location of the script within the store.
    pub path: String,
    pub execution_mode: ExecutionMode,
    /// Disabled scripts are never picked up automatically.
    pub execution_enabled: bool,
}

impl Script {
    /// An enabled, on-demand script at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            execution_mode: ExecutionMode::OnDemand,
            execution_enabled: true,
        }
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.execution_enabled = enabled;
        self
    }
}

// ---------------------------------------------------------------------------
// ScriptFilter
// ---------------------------------------------------------------------------

/// Predicate applied by a [`ScriptFinder`] during discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFilter {
    /// Every script in the store.
    All,
    /// Enabled scripts with the given execution mode.
    ExecutionMode(ExecutionMode),
}

impl ScriptFilter {
    /// Scripts flagged for automatic execution when the process starts.
    pub fn on_start() -> Self {
        Self::ExecutionMode(ExecutionMode::OnStart)
    }

    pub fn matches(&self, script: &Script) -> bool {
        match self {
            Self::All => true,
            Self::ExecutionMode(mode) => {
                script.execution_enabled && script.execution_mode == *mode
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ScriptFinder
// ---------------------------------------------------------------------------

/// Discovery collaborator.
///
/// Returns the scripts satisfying `filter`, in store order. Finding nothing
/// is an empty `Vec`, not an error.
pub trait ScriptFinder: Send + Sync {
    fn find_all(&self, filter: &ScriptFilter, session: &dyn Session) -> CoreResult<Vec<Script>>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
