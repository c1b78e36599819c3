//! unitsync daemon: directory watcher + event scheduler driving the reconciler.

pub mod config;
mod error;
mod runtime;
pub mod scheduler;

pub use config::{DaemonConfig, Intervals};
pub use error::DaemonError;
pub use runtime::{run, start_blocking, sync_once, sync_once_blocking, watch_directory, WatchEvents};
pub use scheduler::{run_loop, Reconcile};
