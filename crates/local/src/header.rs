//! Execution metadata read from a script's leading comment block.
//!
//! ```text
//! #!/bin/bash
//! # execution-mode: on-start
//! # execution-enabled: false
//! ```
//!
//! Parsing stops at the first line that is neither blank nor a comment.
//! Unknown keys are ignored.

use onstart_core::error::{CoreError, CoreResult};
use onstart_core::script::ExecutionMode;

const KEY_EXECUTION_MODE: &str = "execution-mode";
const KEY_EXECUTION_ENABLED: &str = "execution-enabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptHeader {
    pub execution_mode: ExecutionMode,
    pub execution_enabled: bool,
}

impl Default for ScriptHeader {
    fn default() -> Self {
        Self {
            execution_mode: ExecutionMode::OnDemand,
            execution_enabled: true,
        }
    }
}

pub fn parse(content: &str) -> CoreResult<ScriptHeader> {
    let mut header = ScriptHeader::default();

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with("#!") {
            continue;
        }
        let Some(comment) = line.strip_prefix('#') else {
            break;
        };
        let Some((key, value)) = comment.split_once(':') else {
            continue;
        };

        match key.trim().to_ascii_lowercase().as_str() {
            KEY_EXECUTION_MODE => header.execution_mode = ExecutionMode::from_str(value)?,
            KEY_EXECUTION_ENABLED => header.execution_enabled = parse_bool(value)?,
            _ => {}
        }
    }

    Ok(header)
}

fn parse_bool(value: &str) -> CoreResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(CoreError::Validation(format!(
            "Invalid {KEY_EXECUTION_ENABLED}: '{other}'. Must be true or false"
        ))),
    }
}
