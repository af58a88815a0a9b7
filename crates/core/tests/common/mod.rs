//! In-memory browser sessions for orchestrator and pipeline tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docgrab::{BrowserSession, DownloadEvent, DownloadState, Error, Result, Selector, SessionFactory};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use zip::write::SimpleFileOptions;

/// When the scripted download events are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
	/// After the nth click (1-based).
	Click(usize),
	/// During navigation, before it returns.
	Navigate,
	Never,
}

#[derive(Debug, Clone)]
pub struct Script {
	pub trigger: Trigger,
	pub events: Vec<DownloadEvent>,
	/// Written to `dir/<guid>` before the first completed event is sent.
	pub archive: Option<Vec<u8>>,
	pub navigate_error: Option<String>,
	pub click_error: Option<String>,
	/// Drop the event sender after emitting.
	pub end_stream: bool,
	pub open_delay: Option<Duration>,
}

impl Default for Script {
	fn default() -> Self {
		Self {
			trigger: Trigger::Click(2),
			events: Vec::new(),
			archive: None,
			navigate_error: None,
			click_error: None,
			end_stream: false,
			open_delay: None,
		}
	}
}

impl Script {
	/// Start, progress with unknown size, then completion for `guid`.
	pub fn completing(guid: &str, archive: Option<Vec<u8>>) -> Self {
		let size = archive.as_ref().map(|bytes| bytes.len() as u64).unwrap_or(1024);
		Self {
			events: vec![
				DownloadEvent {
					guid: guid.to_string(),
					state: DownloadState::Started,
					received_bytes: 0,
					total_bytes: None,
					url: Some("https://mft.ffessm.fr/documents/export".into()),
					suggested_filename: Some("documents.zip".into()),
				},
				DownloadEvent::progress(guid, DownloadState::InProgress, size / 2, None),
				DownloadEvent::progress(guid, DownloadState::Completed, size, Some(size)),
			],
			archive,
			..Self::default()
		}
	}
}

#[derive(Debug, Default)]
pub struct Recorder {
	pub calls: Mutex<Vec<String>>,
	pub closed: AtomicUsize,
	pub opened: AtomicBool,
}

impl Recorder {
	pub fn calls(&self) -> Vec<String> {
		self.calls.lock().clone()
	}

	pub fn close_count(&self) -> usize {
		self.closed.load(Ordering::SeqCst)
	}

	fn record(&self, call: impl Into<String>) {
		self.calls.lock().push(call.into());
	}
}

pub struct FakeSession {
	script: Script,
	recorder: Arc<Recorder>,
	dir: Mutex<Option<PathBuf>>,
	events: Mutex<Option<mpsc::UnboundedSender<DownloadEvent>>>,
	clicks: AtomicUsize,
}

impl FakeSession {
	fn emit(&self) {
		let dir = self.dir.lock().clone();
		let sender = self.events.lock().clone();
		let Some(sender) = sender else {
			return;
		};
		let mut written = false;
		for event in &self.script.events {
			if event.state == DownloadState::Completed && !written {
				if let (Some(bytes), Some(dir)) = (&self.script.archive, &dir) {
					std::fs::write(dir.join(&event.guid), bytes).unwrap();
				}
				written = true;
			}
			let _ = sender.send(event.clone());
		}
		if self.script.end_stream {
			self.events.lock().take();
		}
	}
}

#[async_trait]
impl BrowserSession for FakeSession {
	async fn set_download_behavior(&self, dir: &Path) -> Result<()> {
		self.recorder.record(format!("download_behavior {}", dir.display()));
		*self.dir.lock() = Some(dir.to_path_buf());
		Ok(())
	}

	fn download_events(&self) -> mpsc::UnboundedReceiver<DownloadEvent> {
		let (tx, rx) = mpsc::unbounded_channel();
		*self.events.lock() = Some(tx);
		rx
	}

	async fn navigate(&self, url: &str) -> Result<()> {
		self.recorder.record(format!("navigate {url}"));
		if self.script.trigger == Trigger::Navigate {
			self.emit();
		}
		match &self.script.navigate_error {
			Some(error_text) => Err(Error::Navigation {
				url: url.to_string(),
				error_text: error_text.clone(),
			}),
			None => Ok(()),
		}
	}

	async fn wait_visible(&self, selector: &Selector) -> Result<()> {
		self.recorder.record(format!("wait_visible {selector}"));
		Ok(())
	}

	async fn click(&self, selector: &Selector) -> Result<()> {
		self.recorder.record(format!("click {selector}"));
		let count = self.clicks.fetch_add(1, Ordering::SeqCst) + 1;
		if let Some(message) = &self.script.click_error {
			return Err(Error::Automation(message.clone()));
		}
		if self.script.trigger == Trigger::Click(count) {
			self.emit();
		}
		Ok(())
	}

	async fn close(&self) -> Result<()> {
		self.recorder.record("close");
		self.recorder.closed.fetch_add(1, Ordering::SeqCst);
		self.events.lock().take();
		Ok(())
	}
}

pub struct FakeFactory {
	pub script: Script,
	pub recorder: Arc<Recorder>,
}

impl FakeFactory {
	pub fn new(script: Script) -> (Self, Arc<Recorder>) {
		let recorder = Arc::new(Recorder::default());
		(
			Self {
				script,
				recorder: Arc::clone(&recorder),
			},
			recorder,
		)
	}
}

#[async_trait]
impl SessionFactory for FakeFactory {
	type Session = FakeSession;

	async fn open(&self) -> Result<FakeSession> {
		if let Some(delay) = self.script.open_delay {
			tokio::time::sleep(delay).await;
		}
		self.recorder.opened.store(true, Ordering::SeqCst);
		Ok(FakeSession {
			script: self.script.clone(),
			recorder: Arc::clone(&self.recorder),
			dir: Mutex::new(None),
			events: Mutex::new(None),
			clicks: AtomicUsize::new(0),
		})
	}
}

/// Builds a zip in memory. A name ending in `/` becomes a directory entry.
pub fn zip_bytes(entries: &[(&str, &[u8], u32)]) -> Vec<u8> {
	let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
	for (name, contents, mode) in entries {
		let options = SimpleFileOptions::default().unix_permissions(*mode);
		if name.ends_with('/') {
			writer.add_directory(*name, options).unwrap();
		} else {
			writer.start_file(*name, options).unwrap();
			writer.write_all(contents).unwrap();
		}
	}
	writer.finish().unwrap().into_inner()
}
