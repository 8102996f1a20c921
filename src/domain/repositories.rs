//! Ports the application layer is written against. Browser implementations
//! live in `infrastructure`; tests supply in-memory ones.

use std::future::Future;
use std::time::Duration;

use crate::domain::errors::{AppResult, InfrastructureError, PresentationError};
use crate::domain::render::DomUpdate;
use crate::domain::session::SessionId;
use crate::domain::snapshot::Snapshot;
use crate::domain::view::{Target, ViewKind};

/// One fetch for one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub view: ViewKind,
    pub session: SessionId,
    /// Only sent for paged views
    pub page: Option<u32>,
}

/// Remote data source for view snapshots.
#[allow(async_fn_in_trait)]
pub trait SnapshotSource {
    /// `Ok(None)` when the server answered with nothing to render.
    async fn fetch(&self, request: &FetchRequest) -> AppResult<Option<Snapshot>>;
}

/// One-shot server actions outside the refresh loop.
#[allow(async_fn_in_trait)]
pub trait WalletControl {
    /// Returns the server's acknowledgement.
    async fn shutdown(&self) -> AppResult<bool>;
    async fn heartbeat(&self) -> AppResult<()>;
}

/// Durable string key-value storage (`localStorage` in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), InfrastructureError>;
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// The page the views are mounted in.
pub trait DomHost {
    fn anchor_present(&self, anchor: Target) -> bool;
    /// Returns how many elements were updated; zero is not an error.
    fn apply(&self, update: &DomUpdate) -> Result<usize, PresentationError>;
    /// Submits the form with the given id. False when the form is absent.
    fn submit_form(&self, form_id: &str) -> bool;
    /// Replaces `#{container_id}`, or the whole body when it is missing.
    fn replace_page(&self, container_id: &str, html: &str);
    fn cache_buster(&self) -> String;
}

/// Delay source for the poll loop.
pub trait Timer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Key derivation module provided by the page.
pub trait SeedModule {
    fn new_seed(&self) -> AppResult<String>;
    fn address_from_seed(&self, seed: &str) -> AppResult<String>;
}
