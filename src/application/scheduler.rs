//! Poll tasks and the registry that owns them.
//!
//! Each `(view, session)` pair gets one task. A task runs its cycles
//! strictly in sequence: the next delay starts only after the current
//! refresh has finished, so slow responses never pile up requests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable};
use futures::lock::Mutex;
use futures::task::{LocalSpawn, LocalSpawnExt};

use crate::application::binder::ViewBinder;
use crate::application::config::{Next, PollPolicy};
use crate::application::runtime::Runtime;
use crate::domain::errors::{AppResult, ExternalServiceError};
use crate::domain::logging::LogComponent;
use crate::domain::repositories::{Timer, WalletControl};
use crate::domain::session::SessionId;
use crate::domain::view::ViewKind;
use crate::{log_info, log_trace};

pub type SharedBinder<R> = Rc<Mutex<ViewBinder<R>>>;

pub struct PollTask<R: Runtime> {
    binder: SharedBinder<R>,
    timer: Rc<R::Timer>,
    policy: PollPolicy,
}

impl<R: Runtime> PollTask<R> {
    pub fn new(binder: SharedBinder<R>, timer: Rc<R::Timer>, policy: PollPolicy) -> Self {
        Self { binder, timer, policy }
    }

    /// Runs one cycle and decides what comes next.
    pub async fn step(&self) -> Next {
        let mut binder = self.binder.lock().await;
        let outcome = binder.refresh().await;
        let next = self.policy.next(binder.view(), outcome, binder.anchor_seen());
        log_trace!(
            LogComponent::Application("PollTask"),
            "{} -> {outcome:?}, next {next:?}",
            binder.view()
        );
        if next == Next::Stop {
            log_info!(
                LogComponent::Application("PollTask"),
                "Stopped polling {} after {outcome:?}",
                binder.view()
            );
        }
        next
    }

    pub async fn run(self) {
        while let Next::After(delay) = self.step().await {
            self.timer.sleep(delay).await;
        }
    }
}

/// Keeps the server from shutting down while the page is open.
pub struct HeartbeatTask<R: Runtime> {
    control: Rc<R::Control>,
    timer: Rc<R::Timer>,
    interval: Duration,
}

impl<R: Runtime> HeartbeatTask<R> {
    pub fn new(control: Rc<R::Control>, timer: Rc<R::Timer>, interval: Duration) -> Self {
        Self { control, timer, interval }
    }

    pub async fn run(self) {
        loop {
            if let Err(e) = self.control.heartbeat().await {
                log_trace!(LogComponent::Application("Heartbeat"), "Heartbeat failed: {e}");
            }
            self.timer.sleep(self.interval).await;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    View(ViewKind, SessionId),
    Heartbeat,
}

struct TaskEntry {
    abort: AbortHandle,
    finished: Rc<Cell<bool>>,
}

/// Abortable tasks keyed by what they poll. Starting a key that is already
/// running replaces the old task.
pub struct PollRegistry<S> {
    spawner: S,
    tasks: RefCell<HashMap<TaskKey, TaskEntry>>,
}

impl<S: LocalSpawn> PollRegistry<S> {
    pub fn new(spawner: S) -> Self {
        Self { spawner, tasks: RefCell::new(HashMap::new()) }
    }

    pub fn start<F>(&self, key: TaskKey, task: F) -> AppResult<()>
    where
        F: Future<Output = ()> + 'static,
    {
        self.stop(&key);
        let (abort, registration) = AbortHandle::new_pair();
        let finished = Rc::new(Cell::new(false));
        let flag = Rc::clone(&finished);
        let task = Abortable::new(task, registration).map(move |_| flag.set(true));
        self.spawner
            .spawn_local(task)
            .map_err(|e| ExternalServiceError::BrowserApiError(format!("spawn failed: {e}")))?;
        self.tasks.borrow_mut().insert(key, TaskEntry { abort, finished });
        Ok(())
    }

    /// Returns whether a live task was aborted.
    pub fn stop(&self, key: &TaskKey) -> bool {
        match self.tasks.borrow_mut().remove(key) {
            Some(entry) => {
                let live = !entry.finished.get();
                entry.abort.abort();
                live
            }
            None => false,
        }
    }

    pub fn stop_all(&self) -> usize {
        let entries: Vec<TaskEntry> = self.tasks.borrow_mut().drain().map(|(_, entry)| entry).collect();
        let live = entries.iter().filter(|entry| !entry.finished.get()).count();
        for entry in entries {
            entry.abort.abort();
        }
        log_info!(LogComponent::Application("PollRegistry"), "Stopped {live} tasks");
        live
    }

    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks
            .borrow()
            .get(key)
            .is_some_and(|entry| !entry.finished.get() && !entry.abort.is_aborted())
    }

    pub fn running(&self) -> Vec<TaskKey> {
        self.tasks
            .borrow()
            .iter()
            .filter(|(_, entry)| !entry.finished.get())
            .map(|(key, _)| key.clone())
            .collect()
    }
}
