//! Startup orchestrator.
//!
//! Runs once when the host process activates: opens a session, discovers
//! the scripts flagged for startup, filters them through the run-mode gate,
//! and drives the execution protocol over each admitted script in
//! discovery order.

use std::sync::{Arc, Mutex, PoisonError};

use onstart_core::error::CoreResult;
use onstart_core::manager::ScriptManager;
use onstart_core::messaging::describe_scripts;
use onstart_core::run_mode::{self, RunModeProvider};
use onstart_core::script::{ScriptFilter, ScriptFinder};
use onstart_core::session::{self, Session, SessionFactory};

use crate::protocol;
use crate::report::StartupReport;

/// Collaborators and pass serialization for startup script execution.
///
/// Only one pass runs at a time; concurrent calls to [`activate`] or
/// [`run_pass`] wait for the running pass to finish. Calling it again
/// re-evaluates the same startup set from scratch.
///
/// [`activate`]: StartupExecutor::activate
/// [`run_pass`]: StartupExecutor::run_pass
pub struct StartupExecutor {
    finder: Arc<dyn ScriptFinder>,
    manager: Arc<dyn ScriptManager>,
    run_modes: Arc<dyn RunModeProvider>,
    sessions: Arc<dyn SessionFactory>,
    pass_lock: Mutex<()>,
}

impl StartupExecutor {
    pub fn new(
        finder: Arc<dyn ScriptFinder>,
        manager: Arc<dyn ScriptManager>,
        run_modes: Arc<dyn RunModeProvider>,
        sessions: Arc<dyn SessionFactory>,
    ) -> Self {
        Self {
            finder,
            manager,
            run_modes,
            sessions,
            pass_lock: Mutex::new(()),
        }
    }

    /// Activation hook. Runs one pass; all observability is through logs.
    pub fn activate(&self) {
        self.run_pass();
    }

    /// Run one orchestration pass and return what it did.
    pub fn run_pass(&self) -> StartupReport {
        // Recover the guard if an earlier pass panicked.
        let _pass = self.pass_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut report = StartupReport::begin();
        let span = tracing::info_span!("startup_pass", pass_id = %report.pass_id);
        let _entered = span.enter();

        let completed = session::operate_traced(self.sessions.as_ref(), |session| {
            self.run_on_startup(session, &mut report)
        });
        report.completed = completed.is_some();
        report
    }

    fn run_on_startup(
        &self,
        session: &mut dyn Session,
        report: &mut StartupReport,
    ) -> CoreResult<()> {
        let scripts = self.finder.find_all(&ScriptFilter::on_start(), &*session)?;
        report.discovered = scripts.len();

        if scripts.is_empty() {
            tracing::info!("Startup script executor has nothing to do");
            return Ok(());
        }

        tracing::info!(
            count = scripts.len(),
            "Startup script executor is trying to execute scripts on startup",
        );
        tracing::info!("{}", describe_scripts(&scripts));

        let active = self.run_modes.active_run_modes();
        for script in &scripts {
            if run_mode::is_allowed(&script.path, &active) {
                let outcome = protocol::execute(self.manager.as_ref(), session, script);
                report.outcomes.push(outcome);
            } else {
                tracing::debug!(
                    script = %script.path,
                    run_modes = %active,
                    "Script not allowed under active run modes",
                );
                report.denied.push(script.path.clone());
            }
        }

        Ok(())
    }
}
