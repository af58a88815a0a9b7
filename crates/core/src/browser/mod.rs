//! Browser control boundary.
//!
//! The orchestrator only talks to a [`BrowserSession`] obtained from a
//! [`SessionFactory`]. The Chrome backend in [`crate::chrome`] is the shipped
//! implementation; tests substitute in-memory sessions.

mod selector;

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::mpsc;

pub use selector::Selector;

use crate::download::DownloadEvent;
use crate::error::Result;

/// One controlled browser context.
#[async_trait]
pub trait BrowserSession: Send + Sync {
	/// Auto-accept downloads into `dir`, named by guid, with lifecycle events.
	async fn set_download_behavior(&self, dir: &Path) -> Result<()>;

	/// Stream of download events. Each call returns a fresh subscription.
	fn download_events(&self) -> mpsc::UnboundedReceiver<DownloadEvent>;

	/// Navigates and waits for the document to finish loading.
	async fn navigate(&self, url: &str) -> Result<()>;

	/// Polls until the element matching `selector` is rendered and visible.
	async fn wait_visible(&self, selector: &Selector) -> Result<()>;

	async fn click(&self, selector: &Selector) -> Result<()>;

	/// Releases the browser. Safe to call more than once.
	async fn close(&self) -> Result<()>;
}

/// Opens new sessions.
#[async_trait]
pub trait SessionFactory: Send + Sync {
	type Session: BrowserSession;

	async fn open(&self) -> Result<Self::Session>;
}
