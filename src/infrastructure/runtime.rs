//! Browser event-loop plumbing: timers, task spawning and the runtime
//! binding every port to its browser implementation.

use std::future::Future;
use std::time::Duration;

use futures::future::LocalFutureObj;
use futures::task::{LocalSpawn, SpawnError};

use crate::application::runtime::Runtime;
use crate::domain::repositories::Timer;
use crate::infrastructure::dom::BrowserDom;
use crate::infrastructure::http::WalletHttpClient;
use crate::infrastructure::storage::BrowserStore;

#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimer;

impl Timer for GlooTimer {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        gloo_timers::future::sleep(duration)
    }
}

/// Spawns onto the page's microtask queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSpawner;

impl LocalSpawn for BrowserSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}

pub struct BrowserRuntime;

impl Runtime for BrowserRuntime {
    type Source = WalletHttpClient;
    type Control = WalletHttpClient;
    type Dom = BrowserDom;
    type Store = BrowserStore;
    type Timer = GlooTimer;
}
