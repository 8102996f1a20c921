use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures::lock::Mutex;
use futures::task::LocalSpawn;

use crate::application::actions;
use crate::application::binder::ViewBinder;
use crate::application::cache::{NoteStore, SnapshotCache};
use crate::application::config::PollConfig;
use crate::application::runtime::{PageSelection, Ports, Runtime};
use crate::application::scheduler::{HeartbeatTask, PollRegistry, PollTask, SharedBinder, TaskKey};
use crate::domain::errors::AppResult;
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::session::SessionId;
use crate::domain::view::ViewKind;

/// Everything one page load runs: a binder and poll task per view, the
/// optional heartbeat and the one-shot actions.
pub struct WalletViewsService<R: Runtime, S: LocalSpawn> {
    session: SessionId,
    config: PollConfig,
    ports: Ports<R>,
    registry: PollRegistry<S>,
    page: PageSelection,
    binders: RefCell<HashMap<ViewKind, SharedBinder<R>>>,
}

impl<R: Runtime, S: LocalSpawn> WalletViewsService<R, S> {
    pub fn new(session: SessionId, config: PollConfig, ports: Ports<R>, spawner: S) -> Self {
        Self {
            session,
            config,
            ports,
            registry: PollRegistry::new(spawner),
            page: PageSelection::default(),
            binders: RefCell::new(HashMap::new()),
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn registry(&self) -> &PollRegistry<S> {
        &self.registry
    }

    /// Sweeps the cache, paints cached views and starts every poll task.
    pub fn start(&self) -> AppResult<()> {
        SnapshotCache::new(Rc::clone(&self.ports.store)).sweep();
        for view in ViewKind::all() {
            self.start_view(view)?;
        }
        if self.config.heartbeat_enabled {
            let heartbeat = HeartbeatTask::<R>::new(
                Rc::clone(&self.ports.control),
                Rc::clone(&self.ports.timer),
                self.config.heartbeat_interval(),
            );
            self.registry.start(TaskKey::Heartbeat, heartbeat.run())?;
        }
        get_logger().info(
            LogComponent::Application("WalletViews"),
            &format!("Polling started for session {}", self.session),
        );
        Ok(())
    }

    /// (Re)starts the poll task of one view. The binder survives restarts.
    pub fn start_view(&self, view: ViewKind) -> AppResult<()> {
        let task = PollTask::<R>::new(self.binder(view), Rc::clone(&self.ports.timer), self.config.policy());
        self.registry.start(TaskKey::View(view, self.session.clone()), task.run())
    }

    pub fn is_polling(&self, view: ViewKind) -> bool {
        self.registry.is_running(&TaskKey::View(view, self.session.clone()))
    }

    /// Records the transaction-history page and refetches at once.
    pub fn select_page(&self, page: u32) -> AppResult<()> {
        self.page.select(page)?;
        self.start_view(ViewKind::TxHistory)
    }

    pub fn save_note(&self, short_id: &str, text: &str) -> AppResult<()> {
        NoteStore::new(Rc::clone(&self.ports.store)).set(short_id, text)?;
        Ok(())
    }

    pub async fn shutdown(&self) -> AppResult<bool> {
        actions::shutdown(
            self.ports.control.as_ref(),
            self.ports.dom.as_ref(),
            &self.registry,
            &self.config.base_url,
        )
        .await
    }

    pub fn stop(&self) -> usize {
        self.registry.stop_all()
    }

    fn binder(&self, view: ViewKind) -> SharedBinder<R> {
        let mut binders = self.binders.borrow_mut();
        let binder = binders.entry(view).or_insert_with(|| {
            let mut binder = ViewBinder::new(
                view,
                self.session.clone(),
                self.config.base_url.clone(),
                self.ports.clone(),
                self.page.clone(),
            );
            binder.hydrate();
            Rc::new(Mutex::new(binder))
        });
        Rc::clone(binder)
    }
}
