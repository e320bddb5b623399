//! Run modes and the path-based run-mode gate.
//!
//! A script stored under a folder named `config.<mode>/` is only allowed to
//! run when `<mode>` is one of the process's active run modes. Scripts whose
//! path carries no `config.` marker are always allowed.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Substring that signals a path is scoped to a run mode.
pub const RUN_MODE_MARKER: &str = "config.";

/// First `config<selector>/` segment in a path. `.+?` stops at the next `/`.
static RUN_MODE_SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"config.+?/").expect("valid regex"));

// ---------------------------------------------------------------------------
// RunModeSet
// ---------------------------------------------------------------------------

/// Immutable set of run modes active for the current process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunModeSet {
    modes: BTreeSet<String>,
}

impl RunModeSet {
    pub fn new<I, S>(modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modes: modes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list such as `"author,production"`.
    ///
    /// Entries are trimmed and blank entries are dropped.
    pub fn parse(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty()),
        )
    }

    pub fn contains(&self, mode: &str) -> bool {
        self.modes.contains(mode)
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(String::as_str)
    }
}

impl std::fmt::Display for RunModeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Source of the active run modes for the current process.
///
/// Queried once per orchestration pass; implementations must not rely on
/// the result being cached between passes.
pub trait RunModeProvider: Send + Sync {
    fn active_run_modes(&self) -> RunModeSet;
}

/// Provider backed by a fixed set, typically loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticRunModes(RunModeSet);

impl StaticRunModes {
    pub fn new(modes: RunModeSet) -> Self {
        Self(modes)
    }
}

impl RunModeProvider for StaticRunModes {
    fn active_run_modes(&self) -> RunModeSet {
        self.0.clone()
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Extract the run-mode selector from a scoped path.
///
/// Returns `None` when the path has no `config<selector>/` segment. Only the
/// literal `config.` prefix is stripped, so selectors may contain dots.
pub fn run_mode_selector(path: &str) -> Option<String> {
    let segment = RUN_MODE_SEGMENT_RE.find(path)?.as_str();
    let selector = segment.strip_prefix(RUN_MODE_MARKER).unwrap_or(segment);
    Some(selector.replace('/', ""))
}

/// Decide whether the script at `path` may run under `active`.
///
/// A path containing the marker but no well-formed segment is denied.
pub fn is_allowed(path: &str, active: &RunModeSet) -> bool {
    if !path.contains(RUN_MODE_MARKER) {
        return true;
    }

    match run_mode_selector(path) {
        Some(selector) => active.contains(&selector),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
