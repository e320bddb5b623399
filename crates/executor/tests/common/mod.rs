//! Shared fakes and log capture for executor integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use onstart_core::error::{CoreError, CoreResult};
use onstart_core::manager::{Mode, ScriptManager};
use onstart_core::progress::Progress;
use onstart_core::run_mode::{RunModeSet, StaticRunModes};
use onstart_core::script::{ExecutionMode, Script, ScriptFilter, ScriptFinder};
use onstart_core::session::{Session, SessionFactory};
use onstart_executor::StartupExecutor;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

pub struct FakeSession {
    released: Arc<AtomicUsize>,
}

impl Session for FakeSession {
    fn list_scripts(&self) -> CoreResult<Vec<String>> {
        Ok(Vec::new())
    }

    fn read_script(&self, path: &str) -> CoreResult<String> {
        Ok(format!("# {path}"))
    }

    fn commit(&mut self) -> CoreResult<()> {
        Ok(())
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeSessions {
    pub opened: AtomicUsize,
    pub released: Arc<AtomicUsize>,
    pub fail_open: bool,
}

impl SessionFactory for FakeSessions {
    fn open(&self) -> CoreResult<Box<dyn Session>> {
        if self.fail_open {
            return Err(CoreError::Session("store offline".to_string()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            released: Arc::clone(&self.released),
        }))
    }
}

// ---------------------------------------------------------------------------
// Finder
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeFinder {
    pub scripts: Vec<Script>,
    pub fail: bool,
    pub filters: Mutex<Vec<ScriptFilter>>,
}

impl FakeFinder {
    pub fn with_paths(paths: &[&str]) -> Self {
        Self {
            scripts: paths.iter().map(|p| startup_script(p)).collect(),
            ..Self::default()
        }
    }
}

impl ScriptFinder for FakeFinder {
    fn find_all(&self, filter: &ScriptFilter, _session: &dyn Session) -> CoreResult<Vec<Script>> {
        self.filters.lock().unwrap().push(*filter);
        if self.fail {
            return Err(CoreError::Repository("index unavailable".to_string()));
        }
        Ok(self
            .scripts
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }
}

pub fn startup_script(path: &str) -> Script {
    Script::new(path).with_mode(ExecutionMode::OnStart)
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

/// Scripted behaviour of [`FakeManager`] for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Succeed,
    Invalid,
    RunFails,
    ValidationRepoError,
    RunRepoError,
}

#[derive(Default)]
pub struct FakeManager {
    pub behaviors: HashMap<String, Behavior>,
    pub calls: Mutex<Vec<(String, Mode)>>,
    pub run_delay: Option<Duration>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeManager {
    pub fn with(behaviors: &[(&str, Behavior)]) -> Self {
        Self {
            behaviors: behaviors
                .iter()
                .map(|(p, b)| (p.to_string(), *b))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Mode)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn runs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|(_, mode)| *mode == Mode::AutomaticRun)
            .map(|(path, _)| path)
            .collect()
    }
}

impl ScriptManager for FakeManager {
    fn process(
        &self,
        script: &Script,
        mode: Mode,
        _session: &mut dyn Session,
    ) -> CoreResult<Progress> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.run_delay {
            std::thread::sleep(delay);
        }
        self.calls.lock().unwrap().push((script.path.clone(), mode));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let behavior = self
            .behaviors
            .get(&script.path)
            .copied()
            .unwrap_or(Behavior::Succeed);

        match (mode, behavior) {
            (Mode::Validation, Behavior::Invalid) => Ok(Progress::new().error("syntax error")),
            (Mode::Validation, Behavior::ValidationRepoError)
            | (Mode::AutomaticRun, Behavior::RunRepoError) => {
                Err(CoreError::Repository(format!("{} is locked", script.path)))
            }
            (Mode::AutomaticRun, Behavior::RunFails) => Ok(Progress::new().error("exit code 1")),
            _ => Ok(Progress::new().success("ok")),
        }
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub struct Harness {
    pub finder: Arc<FakeFinder>,
    pub manager: Arc<FakeManager>,
    pub sessions: Arc<FakeSessions>,
    pub executor: StartupExecutor,
}

impl Harness {
    pub fn new(finder: FakeFinder, manager: FakeManager, run_modes: &[&str]) -> Self {
        Self::with_sessions(finder, manager, run_modes, FakeSessions::default())
    }

    pub fn with_sessions(
        finder: FakeFinder,
        manager: FakeManager,
        run_modes: &[&str],
        sessions: FakeSessions,
    ) -> Self {
        let finder = Arc::new(finder);
        let manager = Arc::new(manager);
        let sessions = Arc::new(sessions);
        let executor = StartupExecutor::new(
            finder.clone(),
            manager.clone(),
            Arc::new(StaticRunModes::new(RunModeSet::new(run_modes.iter().copied()))),
            sessions.clone(),
        );
        Self {
            finder,
            manager,
            sessions,
            executor,
        }
    }
}

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: Level,
    pub message: String,
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn script(&self) -> Option<&str> {
        self.fields.get("script").map(String::as_str)
    }
}

/// Layer that records every event it sees.
#[derive(Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Run `f` with this capture installed as the thread's default subscriber.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Events at info, warn, or error.
    pub fn visible(&self) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level <= Level::INFO)
            .collect()
    }

    pub fn at(&self, level: Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level)
            .collect()
    }

    pub fn for_script(&self, path: &str) -> Vec<CapturedEvent> {
        self.visible()
            .into_iter()
            .filter(|e| e.script() == Some(path))
            .collect()
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            message: visitor.message,
            fields: visitor.fields,
        });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: HashMap<String, String>,
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.store(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.store(field, format!("{value:?}"));
    }
}

impl FieldVisitor {
    fn store(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}
