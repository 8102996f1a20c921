//! One binder per view: probe, fetch, compare, render, persist.

use crate::application::cache::{NoteStore, SnapshotCache};
use crate::application::config::RefreshOutcome;
use crate::application::runtime::{PageSelection, Ports, Runtime};
use crate::domain::errors::PresentationError;
use crate::domain::logging::LogComponent;
use crate::domain::render::{RenderContext, render};
use crate::domain::repositories::{DomHost, FetchRequest, SnapshotSource};
use crate::domain::session::SessionId;
use crate::domain::snapshot::Snapshot;
use crate::domain::view::ViewKind;
use crate::{log_debug, log_info, log_trace, log_warn};

pub struct ViewBinder<R: Runtime> {
    view: ViewKind,
    session: SessionId,
    base_url: String,
    ports: Ports<R>,
    cache: SnapshotCache<R::Store>,
    notes: NoteStore<R::Store>,
    page: PageSelection,
    /// What the DOM currently shows for this view
    last_rendered: Option<Snapshot>,
    anchor_seen: bool,
    transitioned: bool,
}

impl<R: Runtime> ViewBinder<R> {
    pub fn new(
        view: ViewKind,
        session: SessionId,
        base_url: impl Into<String>,
        ports: Ports<R>,
        page: PageSelection,
    ) -> Self {
        let cache = SnapshotCache::new(ports.store.clone());
        let notes = NoteStore::new(ports.store.clone());
        Self {
            view,
            session,
            base_url: base_url.into(),
            ports,
            cache,
            notes,
            page,
            last_rendered: None,
            anchor_seen: false,
            transitioned: false,
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn anchor_seen(&self) -> bool {
        self.anchor_seen
    }

    pub fn last_rendered(&self) -> Option<&Snapshot> {
        self.last_rendered.as_ref()
    }

    /// Paints the cached snapshot before the first fetch. Only views that
    /// hydrate from cache do this, and only when their anchor is mounted.
    /// `refresh` retries it on the first cycle that finds the anchor.
    pub fn hydrate(&mut self) -> bool {
        if !self.view.hydrates_from_cache() || !self.ports.dom.anchor_present(self.view.anchor()) {
            return false;
        }
        let Some(cached) = self.cache.get(&self.session, self.view) else {
            return false;
        };
        match self.paint(&cached) {
            Ok(count) => {
                log_debug!(
                    LogComponent::Application("ViewBinder"),
                    "Hydrated {} from cache ({count} elements)",
                    self.view
                );
                self.anchor_seen = true;
                self.last_rendered = Some(cached);
                true
            }
            Err(e) => {
                log_warn!(
                    LogComponent::Application("ViewBinder"),
                    "Hydrating {} failed: {e}",
                    self.view
                );
                false
            }
        }
    }

    /// One fetch-compare-render cycle. Never mutates the DOM or the cache
    /// unless a new snapshot arrived and was applied.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        if !self.ports.dom.anchor_present(self.view.anchor()) {
            log_trace!(
                LogComponent::Application("ViewBinder"),
                "{} anchor {} not mounted",
                self.view,
                self.view.anchor()
            );
            return RefreshOutcome::AnchorAbsent;
        }
        // The anchor may mount after start; paint the cache before the fetch.
        if !self.anchor_seen && self.last_rendered.is_none() {
            self.hydrate();
        }
        self.anchor_seen = true;

        let request = FetchRequest {
            view: self.view,
            session: self.session.clone(),
            page: if self.view.accepts_page() { self.page.current() } else { None },
        };
        let snapshot = match self.ports.source.fetch(&request).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return RefreshOutcome::Empty,
            Err(e) => {
                log_warn!(
                    LogComponent::Application("ViewBinder"),
                    "Refreshing {} failed: {e}",
                    self.view
                );
                return RefreshOutcome::Failed;
            }
        };
        if !snapshot.matches_view(self.view) {
            log_warn!(
                LogComponent::Application("ViewBinder"),
                "{} received a snapshot for another view",
                self.view
            );
            return RefreshOutcome::Failed;
        }

        let changed = self.last_rendered.as_ref() != Some(&snapshot)
            || !self.cache.contains(&self.session, self.view);
        if changed {
            match self.paint(&snapshot) {
                Ok(count) => {
                    log_debug!(
                        LogComponent::Application("ViewBinder"),
                        "Rendered {} ({count} elements)",
                        self.view
                    );
                }
                Err(e) => {
                    log_warn!(
                        LogComponent::Application("ViewBinder"),
                        "Rendering {} failed: {e}",
                        self.view
                    );
                    return RefreshOutcome::Failed;
                }
            }
            if let Err(e) = self.cache.put(&self.session, self.view, &snapshot) {
                log_warn!(
                    LogComponent::Application("ViewBinder"),
                    "Caching {} failed: {e}",
                    self.view
                );
            }
        }

        let terminal = snapshot.is_terminal();
        self.last_rendered = Some(snapshot);
        if terminal && self.fire_transition() {
            return RefreshOutcome::Terminal;
        }
        if changed { RefreshOutcome::Rendered } else { RefreshOutcome::Unchanged }
    }

    /// Submits the view's transition form at most once per binder.
    fn fire_transition(&mut self) -> bool {
        if self.transitioned {
            return false;
        }
        let Some(form) = self.view.transition_form() else {
            return false;
        };
        self.transitioned = true;
        if self.ports.dom.submit_form(form) {
            log_info!(
                LogComponent::Application("ViewBinder"),
                "{} reached its terminal state, submitted #{form}",
                self.view
            );
        } else {
            log_warn!(
                LogComponent::Application("ViewBinder"),
                "{} reached its terminal state but #{form} is missing",
                self.view
            );
        }
        true
    }

    fn paint(&self, snapshot: &Snapshot) -> Result<usize, PresentationError> {
        let notes = match snapshot {
            Snapshot::TxHistory(page) => self
                .notes
                .notes_for(page.lines.iter().map(|line| line.short_transaction_id.as_str())),
            _ => Default::default(),
        };
        let cache_buster = self.ports.dom.cache_buster();
        let ctx = RenderContext {
            session: &self.session,
            base_url: &self.base_url,
            cache_buster: &cache_buster,
            notes: &notes,
        };
        let mut applied = 0;
        for update in render(self.view, snapshot, &ctx) {
            applied += self.ports.dom.apply(&update)?;
        }
        Ok(applied)
    }
}
