//! In-memory stand-ins for the browser: a DOM that records updates, a
//! scripted snapshot source and a timer that only fires when told to.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use serde_json::Value;

use wallet_views_wasm::application::{Ports, Runtime};
use wallet_views_wasm::domain::errors::{AppResult, NetworkError, PresentationError};
use wallet_views_wasm::domain::render::{DomOp, DomUpdate, TX_HISTORY_PAGE_COUNT, TX_HISTORY_PAGES};
use wallet_views_wasm::domain::repositories::{
    DomHost, FetchRequest, SnapshotSource, Timer, WalletControl,
};
use wallet_views_wasm::domain::snapshot::Snapshot;
use wallet_views_wasm::domain::view::{Target, ViewKind};
use wallet_views_wasm::infrastructure::MemoryStore;

#[derive(Default)]
pub struct FakeDom {
    mounted: RefCell<HashSet<Target>>,
    content: RefCell<HashMap<Target, DomOp>>,
    classes: RefCell<HashMap<Target, String>>,
    applied: RefCell<Vec<DomUpdate>>,
    submitted: RefCell<Vec<String>>,
    forms: RefCell<HashSet<String>>,
    replaced: RefCell<Option<(String, String)>>,
}

impl FakeDom {
    pub fn mount(&self, target: Target) {
        self.mounted.borrow_mut().insert(target);
    }

    pub fn unmount(&self, target: Target) {
        self.mounted.borrow_mut().remove(&target);
    }

    /// Mounts the anchor and every element the view writes to.
    pub fn mount_view(&self, view: ViewKind) {
        self.mount(view.anchor());
        let extra: &[Target] = match view {
            ViewKind::Balance => &[
                Target::Class("confirmed"),
                Target::Class("unconfirmed"),
                Target::Class("spf_funds"),
                Target::Class("spf_b_funds"),
                Target::Id("whale_size"),
                Target::Id("whale_size_button"),
            ],
            ViewKind::BlockHeight => &[Target::Class("status")],
            ViewKind::TxHistory => &[TX_HISTORY_PAGE_COUNT, TX_HISTORY_PAGES],
            ViewKind::BootstrapperProgress | ViewKind::ConsensusBuilderProgress => &[],
        };
        for target in extra {
            self.mount(*target);
        }
        if let Some(form) = view.transition_form() {
            self.add_form(form);
        }
    }

    pub fn add_form(&self, id: &str) {
        self.forms.borrow_mut().insert(id.to_string());
    }

    /// Inner HTML, or input value, last written to `target`.
    pub fn text(&self, target: Target) -> Option<String> {
        match self.content.borrow().get(&target)? {
            DomOp::InnerHtml(html) | DomOp::Value(html) => Some(html.clone()),
            DomOp::ClassName(_) => None,
        }
    }

    pub fn class_of(&self, target: Target) -> Option<String> {
        self.classes.borrow().get(&target).cloned()
    }

    pub fn value_of(&self, target: Target) -> Option<String> {
        match self.content.borrow().get(&target)? {
            DomOp::Value(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn update_count(&self) -> usize {
        self.applied.borrow().len()
    }

    pub fn updates_for(&self, target: Target) -> usize {
        self.applied.borrow().iter().filter(|update| update.target == target).count()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.borrow().clone()
    }

    pub fn replaced(&self) -> Option<(String, String)> {
        self.replaced.borrow().clone()
    }
}

impl DomHost for FakeDom {
    fn anchor_present(&self, anchor: Target) -> bool {
        self.mounted.borrow().contains(&anchor)
    }

    fn apply(&self, update: &DomUpdate) -> Result<usize, PresentationError> {
        if !self.mounted.borrow().contains(&update.target) {
            return Ok(0);
        }
        self.applied.borrow_mut().push(update.clone());
        match &update.op {
            DomOp::ClassName(class) => {
                self.classes.borrow_mut().insert(update.target, class.clone());
            }
            op => {
                self.content.borrow_mut().insert(update.target, op.clone());
            }
        }
        Ok(1)
    }

    fn submit_form(&self, form_id: &str) -> bool {
        if !self.forms.borrow().contains(form_id) {
            return false;
        }
        self.submitted.borrow_mut().push(form_id.to_string());
        true
    }

    fn replace_page(&self, container_id: &str, html: &str) {
        self.mounted.borrow_mut().clear();
        *self.replaced.borrow_mut() = Some((container_id.to_string(), html.to_string()));
    }

    fn cache_buster(&self) -> String {
        "cb".to_string()
    }
}

/// Answers each view from its own script. The last scripted answer
/// repeats once the script runs out.
#[derive(Default)]
pub struct ScriptedSource {
    scripts: RefCell<HashMap<ViewKind, VecDeque<AppResult<Option<Snapshot>>>>>,
    requests: RefCell<Vec<FetchRequest>>,
}

impl ScriptedSource {
    pub fn push(&self, view: ViewKind, answer: AppResult<Option<Snapshot>>) {
        self.scripts.borrow_mut().entry(view).or_default().push_back(answer);
    }

    /// Decodes `payload` the way the HTTP client would.
    pub fn push_json(&self, view: ViewKind, payload: Value) {
        let answer = Snapshot::decode(view, payload).map_err(Into::into);
        self.push(view, answer);
    }

    pub fn push_failure(&self, view: ViewKind) {
        self.push(view, Err(NetworkError::HttpRequestFailed("connection refused".into()).into()));
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self, view: ViewKind) -> usize {
        self.requests.borrow().iter().filter(|request| request.view == view).count()
    }
}

impl SnapshotSource for ScriptedSource {
    async fn fetch(&self, request: &FetchRequest) -> AppResult<Option<Snapshot>> {
        self.requests.borrow_mut().push(request.clone());
        let mut scripts = self.scripts.borrow_mut();
        let Some(script) = scripts.get_mut(&request.view) else {
            return Ok(None);
        };
        if script.len() > 1 {
            script.pop_front().unwrap_or(Ok(None))
        } else {
            script.front().cloned().unwrap_or(Ok(None))
        }
    }
}

#[derive(Default)]
pub struct FakeControl {
    pub acknowledge: Cell<bool>,
    pub shutdowns: Cell<usize>,
    pub heartbeats: Cell<usize>,
}

impl WalletControl for FakeControl {
    async fn shutdown(&self) -> AppResult<bool> {
        self.shutdowns.set(self.shutdowns.get() + 1);
        Ok(self.acknowledge.get())
    }

    async fn heartbeat(&self) -> AppResult<()> {
        self.heartbeats.set(self.heartbeats.get() + 1);
        Ok(())
    }
}

/// Sleeps never end on their own; `fire` releases every pending one.
#[derive(Default)]
pub struct ManualTimer {
    pending: RefCell<Vec<oneshot::Sender<()>>>,
    delays: RefCell<Vec<Duration>>,
}

impl ManualTimer {
    pub fn fire(&self) -> usize {
        let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        let count = pending.len();
        for sender in pending {
            let _ = sender.send(());
        }
        count
    }

    pub fn delays(&self) -> Vec<Duration> {
        self.delays.borrow().clone()
    }

    pub fn last_delay(&self) -> Option<Duration> {
        self.delays.borrow().last().copied()
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl Timer for ManualTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().push(sender);
        self.delays.borrow_mut().push(duration);
        async move {
            let _ = receiver.await;
        }
    }
}

pub struct TestRuntime;

impl Runtime for TestRuntime {
    type Source = ScriptedSource;
    type Control = FakeControl;
    type Dom = FakeDom;
    type Store = MemoryStore;
    type Timer = ManualTimer;
}

/// One page worth of fakes.
pub struct Page {
    pub source: Rc<ScriptedSource>,
    pub control: Rc<FakeControl>,
    pub dom: Rc<FakeDom>,
    pub store: Rc<MemoryStore>,
    pub timer: Rc<ManualTimer>,
}

impl Page {
    pub fn new() -> Self {
        Self::with_store(Rc::new(MemoryStore::new()))
    }

    /// A fresh page over existing storage, as after a reload.
    pub fn with_store(store: Rc<MemoryStore>) -> Self {
        Self {
            source: Rc::new(ScriptedSource::default()),
            control: Rc::new(FakeControl::default()),
            dom: Rc::new(FakeDom::default()),
            store,
            timer: Rc::new(ManualTimer::default()),
        }
    }

    pub fn ports(&self) -> Ports<TestRuntime> {
        Ports {
            source: Rc::clone(&self.source),
            control: Rc::clone(&self.control),
            dom: Rc::clone(&self.dom),
            store: Rc::clone(&self.store),
            timer: Rc::clone(&self.timer),
        }
    }
}
