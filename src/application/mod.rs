pub mod actions;
pub mod binder;
pub mod cache;
pub mod config;
pub mod runtime;
pub mod scheduler;
pub mod service;

pub use binder::ViewBinder;
pub use config::{Next, PollConfig, PollPolicy, RefreshOutcome};
pub use runtime::{PageSelection, Ports, Runtime};
pub use scheduler::{PollRegistry, PollTask, TaskKey};
pub use service::WalletViewsService;
