//! Script discovery from header directives.

use onstart_core::error::CoreResult;
use onstart_core::script::{Script, ScriptFilter, ScriptFinder};
use onstart_core::session::Session;

use crate::header;

/// Finder that reads each script's header through the session.
///
/// Scripts that cannot be read or carry a malformed header are logged and
/// left out of the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderScriptFinder;

impl ScriptFinder for HeaderScriptFinder {
    fn find_all(&self, filter: &ScriptFilter, session: &dyn Session) -> CoreResult<Vec<Script>> {
        let mut scripts = Vec::new();

        for path in session.list_scripts()? {
            let content = match session.read_script(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(script = %path, error = %e, "Skipping unreadable script");
                    continue;
                }
            };
            let header = match header::parse(&content) {
                Ok(header) => header,
                Err(e) => {
                    tracing::warn!(script = %path, error = %e, "Ignoring script with malformed header");
                    continue;
                }
            };

            let script = Script::new(path)
                .with_mode(header.execution_mode)
                .enabled(header.execution_enabled);
            if filter.matches(&script) {
                scripts.push(script);
            }
        }

        Ok(scripts)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use onstart_core::script::ExecutionMode;
    use onstart_core::session::SessionFactory;

    use super::*;
    use crate::session::DirectorySessionFactory;

    fn write(root: &Path, rel: &str, body: &str) {
        let file = root.join(rel);
        fs::create_dir_all(file.parent().expect("parent")).expect("create dirs");
        fs::write(file, body).expect("write script");
    }

    #[test]
    fn finds_enabled_startup_scripts_in_order() {
        let dir = tempfile::tempdir().expect("create temp dir");
        write(dir.path(), "a.sh", "# execution-mode: on-start\necho a\n");
        write(dir.path(), "b.sh", "echo b\n");
        write(dir.path(), "c.sh", "# execution-mode: on-start\n# execution-enabled: false\n");
        write(dir.path(), "config.staging/d.sh", "# execution-mode: on-start\necho d\n");
        write(dir.path(), "e.sh", "# execution-mode: whenever\n");

        let session = DirectorySessionFactory::new(dir.path()).open().expect("open");
        let found = HeaderScriptFinder
            .find_all(&ScriptFilter::on_start(), &*session)
            .expect("find");

        let paths: Vec<_> = found.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/a.sh", "/config.staging/d.sh"]);
        assert!(found.iter().all(|s| s.execution_mode == ExecutionMode::OnStart));
    }

    #[test]
    fn unreadable_script_does_not_hide_the_others() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("a_latin1.sh"), b"# execution-mode: on-start\n# caf\xe9\n")
            .expect("write script");
        write(dir.path(), "b.sh", "# execution-mode: on-start\necho b\n");

        let session = DirectorySessionFactory::new(dir.path()).open().expect("open");
        let found = HeaderScriptFinder
            .find_all(&ScriptFilter::on_start(), &*session)
            .expect("find");

        let paths: Vec<_> = found.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/b.sh"]);
    }

    #[test]
    fn empty_store_finds_nothing() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let session = DirectorySessionFactory::new(dir.path()).open().expect("open");
        let found = HeaderScriptFinder
            .find_all(&ScriptFilter::on_start(), &*session)
            .expect("find");
        assert!(found.is_empty());
    }
}
