//! Browser-driven download of the document archive.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::browser::{BrowserSession, SessionFactory};
use crate::config::PagePlan;
use crate::download::spawn_listener;
use crate::error::{Error, Result};

/// Drives one browser session until a single archive has been downloaded.
pub struct Orchestrator<F> {
	factory: F,
	plan: PagePlan,
}

impl<F: SessionFactory> Orchestrator<F> {
	pub fn new(factory: F, plan: PagePlan) -> Self {
		Self { factory, plan }
	}

	/// Downloads the archive into `dir` and returns its path (`dir/<guid>`).
	///
	/// `deadline` bounds everything from opening the session to the
	/// completion event. The session is closed on every outcome.
	pub async fn download(&self, dir: &Path, deadline: Duration) -> Result<PathBuf> {
		let until = Instant::now() + deadline;
		let timed_out = |condition: &str| Error::Timeout {
			ms: deadline.as_millis() as u64,
			condition: condition.to_string(),
		};

		let session = match timeout_at(until, self.factory.open()).await {
			Ok(session) => session?,
			Err(_) => return Err(timed_out("browser session")),
		};

		let outcome = timeout_at(until, self.acquire(&session, dir)).await;
		if let Err(e) = session.close().await {
			warn!(target = "docgrab.orchestrator", error = %e, "failed to close browser session");
		}

		let guid = match outcome {
			Ok(guid) => guid?,
			Err(_) => return Err(timed_out("download completion")),
		};
		let archive = dir.join(&guid);
		info!(target = "docgrab.orchestrator", %guid, path = %archive.display(), "download complete");
		Ok(archive)
	}

	async fn acquire(&self, session: &F::Session, dir: &Path) -> Result<String> {
		session.set_download_behavior(dir).await?;
		let (_listener, completed) = spawn_listener(session.download_events());

		match self.drive(session).await {
			Ok(()) => {}
			Err(e) if e.is_aborted_navigation() => {
				debug!(target = "docgrab.orchestrator", error = %e, "navigation aborted by download");
			}
			Err(e) => return Err(e),
		}

		completed
			.await
			.map_err(|_| Error::Automation("download event stream ended before completion".into()))
	}

	async fn drive(&self, session: &F::Session) -> Result<()> {
		session.navigate(&self.plan.url).await?;
		debug!(target = "docgrab.orchestrator", settle_ms = self.plan.settle_ms, "waiting for documents to render");
		tokio::time::sleep(self.plan.settle_delay()).await;

		session.wait_visible(&self.plan.select_all).await?;
		session.click(&self.plan.select_all).await?;
		session.wait_visible(&self.plan.download_selected).await?;
		session.click(&self.plan.download_selected).await?;
		Ok(())
	}
}
