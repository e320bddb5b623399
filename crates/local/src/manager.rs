//! Bash-backed script manager.
//!
//! Script content is read through the session and piped to the shell's
//! stdin: `bash -n` for validation (parse only, nothing executed) and
//! `bash -s` for the automatic run. A successful run commits the session.

use std::path::PathBuf;
use std::time::Duration;

use tokio::process::Command;
use tokio::runtime::Runtime;

use onstart_core::error::CoreResult;
use onstart_core::manager::{Mode, ScriptManager};
use onstart_core::progress::Progress;
use onstart_core::script::Script;
use onstart_core::session::Session;

use crate::subprocess::{self, CommandInput, SubprocessError};

/// Default shell program.
pub const DEFAULT_SHELL: &str = "bash";

/// Default time limit for a validation pass.
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time limit for an automatic run.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable carrying the script's store path.
pub const ENV_SCRIPT_PATH: &str = "ONSTART_SCRIPT_PATH";

/// Manager that validates and runs scripts with a POSIX shell.
///
/// The [`ScriptManager`] interface is synchronous; subprocesses are driven
/// by a private current-thread Tokio runtime. Do not call
/// [`ScriptManager::process`] from inside another Tokio runtime.
pub struct ShellScriptManager {
    runtime: Runtime,
    shell: String,
    working_directory: Option<PathBuf>,
    env_vars: Vec<(String, String)>,
    validation_timeout: Duration,
    run_timeout: Duration,
}

impl ShellScriptManager {
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        Ok(Self {
            runtime,
            shell: DEFAULT_SHELL.to_string(),
            working_directory: None,
            env_vars: Vec::new(),
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
            run_timeout: DEFAULT_RUN_TIMEOUT,
        })
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Add an environment variable passed to every automatic run.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    pub fn with_timeouts(mut self, validation: Duration, run: Duration) -> Self {
        self.validation_timeout = validation;
        self.run_timeout = run;
        self
    }

    fn command_input(&self, script: &Script, content: String, mode: Mode) -> CommandInput {
        let (env_vars, timeout) = match mode {
            Mode::Validation => (Vec::new(), self.validation_timeout),
            Mode::AutomaticRun => {
                let mut env_vars = self.env_vars.clone();
                env_vars.push((ENV_SCRIPT_PATH.to_string(), script.path.clone()));
                (env_vars, self.run_timeout)
            }
        };

        CommandInput {
            stdin: content.into_bytes(),
            env_vars,
            working_directory: self
                .working_directory
                .as_ref()
                .map(|dir| dir.to_string_lossy().into_owned()),
            timeout,
        }
    }
}

impl ScriptManager for ShellScriptManager {
    fn process(
        &self,
        script: &Script,
        mode: Mode,
        session: &mut dyn Session,
    ) -> CoreResult<Progress> {
        let content = session.read_script(&script.path)?;

        let mut cmd = Command::new(&self.shell);
        match mode {
            Mode::Validation => cmd.arg("-n"),
            Mode::AutomaticRun => cmd.arg("-s"),
        };
        let input = self.command_input(script, content, mode);

        tracing::debug!(script = %script.path, %mode, shell = %self.shell, "Spawning shell");
        let result = self.runtime.block_on(subprocess::run_command(&mut cmd, input));
        let progress = progress_from(mode, result);

        if mode == Mode::AutomaticRun && progress.is_success() {
            session.commit()?;
        }
        Ok(progress)
    }
}

fn progress_from(
    mode: Mode,
    result: Result<subprocess::CommandOutput, SubprocessError>,
) -> Progress {
    match result {
        Ok(output) if output.exit_code == 0 => {
            let mut progress = Progress::new();
            for line in output.stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
                progress = progress.success(line);
            }
            progress.success(format!("{mode} finished in {}ms", output.duration_ms))
        }
        Ok(output) => Progress::new().error(format!(
            "{mode} exited with code {}: {}",
            output.exit_code,
            output.stderr.trim()
        )),
        Err(e @ SubprocessError::Timeout { .. }) => Progress::new().error(format!("{mode}: {e}")),
        Err(SubprocessError::Io(e)) => {
            Progress::new().error(format!("{mode}: cannot start shell: {e}"))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
