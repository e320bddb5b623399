//! Validate-then-run protocol for a single startup script.
//!
//! Every error is contained here: the caller always receives an
//! [`ExecutionOutcome`] and moves on to the next script.

use onstart_core::error::CoreResult;
use onstart_core::manager::{Mode, ScriptManager};
use onstart_core::script::Script;
use onstart_core::session::Session;

use crate::report::{ExecutionOutcome, OutcomeStatus};

/// Validate `script` and, if valid, run it automatically.
///
/// Logs exactly one line per script: warn for invalid, info for success,
/// error for a failed run or a repository error.
pub fn execute(
    manager: &dyn ScriptManager,
    session: &mut dyn Session,
    script: &Script,
) -> ExecutionOutcome {
    let status = match run_phases(manager, session, script) {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(
                script = %script.path,
                error = %e,
                "Script cannot be processed because of repository error",
            );
            OutcomeStatus::Error {
                detail: e.to_string(),
            }
        }
    };

    ExecutionOutcome::new(script.path.clone(), status)
}

fn run_phases(
    manager: &dyn ScriptManager,
    session: &mut dyn Session,
    script: &Script,
) -> CoreResult<OutcomeStatus> {
    let validation = manager.process(script, Mode::Validation, session)?;
    if !validation.is_success() {
        tracing::warn!(
            script = %script.path,
            reason = validation.first_error().unwrap_or_default(),
            "Startup executor cannot execute script which is not valid",
        );
        return Ok(OutcomeStatus::Invalid);
    }

    let progress = manager.process(script, Mode::AutomaticRun, session)?;
    if progress.is_success() {
        tracing::info!(script = %script.path, "Script successfully executed");
        Ok(OutcomeStatus::Succeeded)
    } else {
        tracing::error!(
            script = %script.path,
            reason = progress.first_error().unwrap_or_default(),
            "Script cannot be executed properly",
        );
        Ok(OutcomeStatus::Failed)
    }
}
