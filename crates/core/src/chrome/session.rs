//! [`BrowserSession`] over a CDP connection.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docgrab_protocol::{
	AttachToTarget, CloseBrowser, CreateTarget, DispatchMouseEvent, DownloadBehavior, DownloadProgress, DownloadWillBegin, EnablePage,
	Evaluate, MouseButton, MouseEventKind, Navigate, SetDownloadBehavior,
};
use docgrab_runtime::Connection;
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::launcher::ChromeProcess;
use crate::browser::{BrowserSession, Selector};
use crate::download::DownloadEvent;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct Point {
	x: f64,
	y: f64,
}

/// One page target attached in flat mode, plus the browser that hosts it.
pub struct CdpSession {
	connection: Arc<Connection>,
	session_id: String,
	pump: JoinHandle<()>,
	process: Mutex<Option<ChromeProcess>>,
	closed: AtomicBool,
}

impl CdpSession {
	/// Starts the connection pump, opens a blank page and attaches to it.
	///
	/// `process` is owned by the session from here on and killed on close.
	pub async fn attach(connection: Arc<Connection>, process: Option<ChromeProcess>) -> Result<Self> {
		let pump = tokio::spawn({
			let connection = Arc::clone(&connection);
			async move { connection.run().await }
		});

		match open_page(&connection).await {
			Ok(session_id) => {
				debug!(target = "docgrab.chrome", session = %session_id, "page attached");
				Ok(Self {
					connection,
					session_id,
					pump,
					process: Mutex::new(process),
					closed: AtomicBool::new(false),
				})
			}
			Err(e) => {
				pump.abort();
				drop(process);
				Err(e)
			}
		}
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	async fn evaluate(&self, expression: String) -> Result<Value> {
		let response = self.connection.execute(Some(&self.session_id), &Evaluate::by_value(expression)).await?;
		if let Some(details) = response.exception_details {
			return Err(Error::Automation(format!("script failed: {}", details.message())));
		}
		Ok(response.result.value.unwrap_or(Value::Null))
	}

	async fn mouse(&self, kind: MouseEventKind, at: &Point, button: MouseButton, click_count: u32) -> Result<()> {
		let event = DispatchMouseEvent {
			kind,
			x: at.x,
			y: at.y,
			button,
			click_count,
		};
		self.connection.execute(Some(&self.session_id), &event).await?;
		Ok(())
	}
}

async fn open_page(connection: &Connection) -> Result<String> {
	let target = connection
		.execute(
			None,
			&CreateTarget {
				url: "about:blank".to_string(),
			},
		)
		.await?;
	let attached = connection
		.execute(
			None,
			&AttachToTarget {
				target_id: target.target_id,
				flatten: true,
			},
		)
		.await?;
	connection.execute(Some(&attached.session_id), &EnablePage {}).await?;
	Ok(attached.session_id)
}

fn visible_check(selector: &Selector) -> String {
	format!(
		"(() => {{ const el = {}; if (!el) return false; const r = el.getBoundingClientRect(); const s = window.getComputedStyle(el); \
		 return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }})()",
		selector.js_lookup()
	)
}

fn click_point(selector: &Selector) -> String {
	format!(
		"(() => {{ const el = {}; if (!el) return null; el.scrollIntoView({{block: 'center', inline: 'center'}}); \
		 const r = el.getBoundingClientRect(); return {{x: r.left + r.width / 2, y: r.top + r.height / 2}}; }})()",
		selector.js_lookup()
	)
}

fn translate(event: &docgrab_protocol::Event) -> Option<serde_json::Result<DownloadEvent>> {
	if event.method == DownloadWillBegin::METHOD {
		Some(event.decode::<DownloadWillBegin>().map(DownloadEvent::from))
	} else if event.method == DownloadProgress::METHOD {
		Some(event.decode::<DownloadProgress>().map(DownloadEvent::from))
	} else {
		None
	}
}

#[async_trait]
impl BrowserSession for CdpSession {
	async fn set_download_behavior(&self, dir: &Path) -> Result<()> {
		let dir = std::path::absolute(dir)?;
		self.connection
			.execute(
				None,
				&SetDownloadBehavior {
					behavior: DownloadBehavior::AllowAndName,
					download_path: Some(dir.display().to_string()),
					events_enabled: Some(true),
				},
			)
			.await?;
		debug!(target = "docgrab.chrome", dir = %dir.display(), "downloads enabled");
		Ok(())
	}

	fn download_events(&self) -> mpsc::UnboundedReceiver<DownloadEvent> {
		let mut raw = self.connection.subscribe();
		let (tx, rx) = mpsc::unbounded_channel();
		tokio::spawn(async move {
			while let Some(event) = raw.recv().await {
				match translate(&event) {
					Some(Ok(download)) => {
						if tx.send(download).is_err() {
							break;
						}
					}
					Some(Err(e)) => warn!(target = "docgrab.chrome", method = %event.method, error = %e, "malformed download event"),
					None => {}
				}
			}
		});
		rx
	}

	async fn navigate(&self, url: &str) -> Result<()> {
		info!(target = "docgrab.chrome", %url, "navigating");
		let response = self
			.connection
			.execute(Some(&self.session_id), &Navigate { url: url.to_string() })
			.await?;
		if let Some(error_text) = response.error_text.filter(|text| !text.is_empty()) {
			return Err(Error::Navigation {
				url: url.to_string(),
				error_text,
			});
		}

		loop {
			let state = self.evaluate("document.readyState".to_string()).await?;
			if state.as_str() == Some("complete") {
				debug!(target = "docgrab.chrome", %url, "document loaded");
				return Ok(());
			}
			tokio::time::sleep(POLL_INTERVAL).await;
		}
	}

	async fn wait_visible(&self, selector: &Selector) -> Result<()> {
		let check = visible_check(selector);
		loop {
			if self.evaluate(check.clone()).await?.as_bool() == Some(true) {
				debug!(target = "docgrab.chrome", %selector, "visible");
				return Ok(());
			}
			tokio::time::sleep(POLL_INTERVAL).await;
		}
	}

	async fn click(&self, selector: &Selector) -> Result<()> {
		let value = self.evaluate(click_point(selector)).await?;
		if value.is_null() {
			return Err(Error::ElementNotFound {
				selector: selector.to_string(),
			});
		}
		let point: Point = serde_json::from_value(value)?;

		self.mouse(MouseEventKind::MouseMoved, &point, MouseButton::None, 0).await?;
		self.mouse(MouseEventKind::MousePressed, &point, MouseButton::Left, 1).await?;
		self.mouse(MouseEventKind::MouseReleased, &point, MouseButton::Left, 1).await?;
		info!(target = "docgrab.chrome", %selector, x = point.x, y = point.y, "clicked");
		Ok(())
	}

	async fn close(&self) -> Result<()> {
		if self.closed.swap(true, Ordering::SeqCst) {
			return Ok(());
		}

		let result = match tokio::time::timeout(CLOSE_TIMEOUT, self.connection.execute(None, &CloseBrowser {})).await {
			Ok(Ok(_)) => Ok(()),
			// the browser may drop the socket before answering
			Ok(Err(docgrab_runtime::Error::ConnectionClosed | docgrab_runtime::Error::ChannelClosed)) => Ok(()),
			Ok(Err(e)) => Err(e.into()),
			Err(_) => {
				debug!(target = "docgrab.chrome", "Browser.close unanswered");
				Ok(())
			}
		};

		self.pump.abort();
		let process = self.process.lock().take();
		if let Some(process) = process {
			process.shutdown().await;
		}
		debug!(target = "docgrab.chrome", "session closed");
		result
	}
}

impl Drop for CdpSession {
	fn drop(&mut self) {
		self.pump.abort();
	}
}
