pub mod dom;
pub mod http;
pub mod runtime;
pub mod seed;
pub mod services;
pub mod storage;
pub mod upload;

pub use dom::BrowserDom;
pub use http::WalletHttpClient;
pub use runtime::{BrowserRuntime, BrowserSpawner, GlooTimer};
pub use storage::{BrowserStore, LocalStorageStore, MemoryStore};
