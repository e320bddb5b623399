//! Resource-access sessions against the script store.
//!
//! A session is exclusively owned by whoever opened it and is released
//! when dropped. [`operate_traced`] is the scoped entry point: it opens a
//! session, hands it to a callback, logs any failure, and drops the session
//! on every exit path.

use crate::error::CoreResult;

/// Access to the backing script store for the duration of one operation.
///
/// Not assumed safe for concurrent use.
pub trait Session {
    /// Paths of every script in the store, in store order.
    fn list_scripts(&self) -> CoreResult<Vec<String>>;

    /// Raw content of the script at `path`.
    fn read_script(&self, path: &str) -> CoreResult<String>;

    /// Persist pending changes made through this session.
    fn commit(&mut self) -> CoreResult<()>;
}

/// Opens sessions on demand.
pub trait SessionFactory: Send + Sync {
    fn open(&self) -> CoreResult<Box<dyn Session>>;
}

/// Run `operation` inside a freshly opened session.
///
/// Returns `None` if the session could not be opened or the operation
/// failed; both cases are logged at error level. The session is released
/// before this function returns.
pub fn operate_traced<T, F>(factory: &dyn SessionFactory, operation: F) -> Option<T>
where
    F: FnOnce(&mut dyn Session) -> CoreResult<T>,
{
    let mut session = match factory.open() {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Cannot open resource session");
            return None;
        }
    };

    match operation(session.as_mut()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(error = %e, "Operation inside resource session failed");
            None
        }
    }
}
