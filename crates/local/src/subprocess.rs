//! Subprocess management for the shell manager.
//!
//! [`run_command`] spawns a prepared [`tokio::process::Command`], writes the
//! given bytes to its stdin, captures stdout/stderr, and enforces a timeout.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Maximum stdout or stderr size captured per stream (10 MiB).
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Input for one subprocess invocation.
#[derive(Debug, Clone)]
pub struct CommandInput {
    /// Bytes written to the child's stdin before it is closed.
    pub stdin: Vec<u8>,
    /// Additional environment variables set for the child process.
    pub env_vars: Vec<(String, String)>,
    /// Working directory for the child process (uses current dir if `None`).
    pub working_directory: Option<String>,
    /// Maximum wall-clock time before the process is killed.
    pub timeout: Duration,
}

/// Captured output from a finished process.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Process exit code (`-1` if killed by signal).
    pub exit_code: i32,
    pub duration_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum SubprocessError {
    #[error("Process timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Spawn `cmd`, feed `input.stdin`, and wait for it within `input.timeout`.
///
/// The caller sets the program and arguments; environment and working
/// directory from [`CommandInput`] are applied here.
pub async fn run_command(
    cmd: &mut Command,
    input: CommandInput,
) -> Result<CommandOutput, SubprocessError> {
    // `kill_on_drop(true)` kills the child when it is dropped on timeout.
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    for (key, value) in &input.env_vars {
        cmd.env(key, value);
    }

    if let Some(dir) = &input.working_directory {
        cmd.current_dir(dir);
    }

    let start = Instant::now();

    let mut child = cmd.spawn()?;

    // Readers start before stdin is fed: `bash -s` may fill its output
    // pipes while the rest of the script is still being written.
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();

    let stdout_task = tokio::spawn(async move { read_stream(stdout_handle, MAX_OUTPUT_BYTES).await });
    let stderr_task = tokio::spawn(async move { read_stream(stderr_handle, MAX_OUTPUT_BYTES).await });

    if let Some(mut stdin) = child.stdin.take() {
        let bytes = input.stdin;
        tokio::spawn(async move {
            // The process may close stdin early; that is not an error here.
            let _ = stdin.write_all(&bytes).await;
        });
    }

    match tokio::time::timeout(input.timeout, child.wait()).await {
        Ok(Ok(status)) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            let stdout_bytes = stdout_task.await.unwrap_or_default();
            let stderr_bytes = stderr_task.await.unwrap_or_default();

            Ok(CommandOutput {
                stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
                stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
                exit_code: status.code().unwrap_or(-1),
                duration_ms,
            })
        }
        Ok(Err(e)) => Err(SubprocessError::Io(e)),
        Err(_elapsed) => Err(SubprocessError::Timeout {
            elapsed_ms: start.elapsed().as_millis() as u64,
        }),
    }
}

/// Read an entire output stream, keeping at most `limit` bytes.
///
/// Anything past the limit is drained and discarded so the child never
/// blocks on a full pipe.
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>, limit: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h).take(limit as u64).read_to_end(&mut buf).await;
        let _ = tokio::io::copy(&mut h, &mut tokio::io::sink()).await;
    }
    buf
}
