//! Download lifecycle tracking.

mod event;
mod listener;

pub use event::{DownloadEvent, DownloadState, completion};
pub use listener::{ListenerGuard, spawn_listener};
