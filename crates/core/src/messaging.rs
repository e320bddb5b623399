//! Human-readable descriptions of script batches for log output.

use crate::script::Script;

/// Describe a batch of scripts, one path per line.
///
/// ```
/// use onstart_core::messaging::describe_scripts;
/// use onstart_core::script::Script;
///
/// let text = describe_scripts(&[Script::new("/a.sh"), Script::new("/b.sh")]);
/// assert_eq!(text, "Scripts (2):\n - /a.sh\n - /b.sh");
/// ```
pub fn describe_scripts(scripts: &[Script]) -> String {
    let mut text = format!("Scripts ({}):", scripts.len());
    for script in scripts {
        text.push_str("\n - ");
        text.push_str(&script.path);
    }
    text
}
