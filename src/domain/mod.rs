//! Wallet view model: snapshots, view catalogue, pure rendering and the
//! ports the application layer drives.

pub mod errors;
pub mod logging;
pub mod markup;
pub mod render;
pub mod repositories;
pub mod session;
pub mod snapshot;
pub mod view;
