//! Background consumer of download events.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::event::{DownloadEvent, DownloadState};

/// Aborts the listener task when dropped.
pub struct ListenerGuard {
	handle: JoinHandle<()>,
}

impl Drop for ListenerGuard {
	fn drop(&mut self) {
		self.handle.abort();
	}
}

/// Spawns the listener over `events`.
///
/// The returned receiver yields the `guid` of the first completed download.
/// The channel is buffered, so a completion that lands before anyone awaits it
/// is kept. It closes without a value if the event stream ends first.
pub fn spawn_listener(mut events: mpsc::UnboundedReceiver<DownloadEvent>) -> (ListenerGuard, oneshot::Receiver<String>) {
	let (done_tx, done_rx) = oneshot::channel();

	let handle = tokio::spawn(async move {
		let mut done = Some(done_tx);
		while let Some(event) = events.recv().await {
			match event.state {
				DownloadState::Started => {
					info!(
						target = "docgrab.download",
						guid = %event.guid,
						url = event.url.as_deref().unwrap_or(""),
						file = event.suggested_filename.as_deref().unwrap_or(""),
						"download started"
					);
				}
				DownloadState::InProgress => {
					info!(
						target = "docgrab.download",
						guid = %event.guid,
						state = %event.state,
						completed = %event.completion(),
						"download progress"
					);
				}
				DownloadState::Completed => match done.take() {
					Some(tx) => {
						info!(
							target = "docgrab.download",
							guid = %event.guid,
							completed = %event.completion(),
							bytes = event.received_bytes,
							"download completed"
						);
						let _ = tx.send(event.guid);
					}
					None => debug!(
						target = "docgrab.download",
						guid = %event.guid,
						completed = %event.completion(),
						"ignoring extra completion"
					),
				},
				DownloadState::Canceled => {
					warn!(target = "docgrab.download", guid = %event.guid, "download canceled");
				}
			}
		}
		debug!(target = "docgrab.download", "download event stream ended");
	});

	(ListenerGuard { handle }, done_rx)
}

#[cfg(test)]
mod tests {
	use std::io;
	use std::sync::Arc;

	use parking_lot::Mutex;

	use super::*;

	#[derive(Clone, Default)]
	struct Captured(Arc<Mutex<Vec<u8>>>);

	impl io::Write for Captured {
		fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
			self.0.lock().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	impl Captured {
		fn text(&self) -> String {
			String::from_utf8_lossy(&self.0.lock()).into_owned()
		}
	}

	#[tokio::test]
	async fn first_completion_wins() {
		let (tx, rx) = mpsc::unbounded_channel();
		let (_guard, done) = spawn_listener(rx);

		tx.send(DownloadEvent::progress("first", DownloadState::InProgress, 10, Some(0))).unwrap();
		tx.send(DownloadEvent::progress("first", DownloadState::Completed, 20, Some(20))).unwrap();
		tx.send(DownloadEvent::progress("second", DownloadState::Completed, 30, Some(30))).unwrap();

		assert_eq!(done.await.unwrap(), "first");
	}

	#[tokio::test]
	async fn canceled_download_does_not_complete() {
		let (tx, rx) = mpsc::unbounded_channel();
		let (_guard, done) = spawn_listener(rx);

		tx.send(DownloadEvent::progress("g", DownloadState::Canceled, 0, None)).unwrap();
		drop(tx);

		assert!(done.await.is_err());
	}

	#[tokio::test]
	async fn completion_is_buffered_until_awaited() {
		let (tx, rx) = mpsc::unbounded_channel();
		let (_guard, done) = spawn_listener(rx);

		tx.send(DownloadEvent::progress("early", DownloadState::Completed, 1, Some(1))).unwrap();
		for _ in 0..10 {
			tokio::task::yield_now().await;
		}

		assert_eq!(done.await.unwrap(), "early");
	}

	#[tokio::test]
	async fn dropping_guard_stops_listener() {
		let (tx, rx) = mpsc::unbounded_channel();
		let (guard, done) = spawn_listener(rx);
		drop(guard);

		assert!(done.await.is_err());
		tokio::task::yield_now().await;
		assert!(tx.send(DownloadEvent::progress("late", DownloadState::Completed, 1, None)).is_err());
	}

	#[tokio::test]
	async fn completion_logs_progress() {
		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_writer(move || writer.clone())
			.with_ansi(false)
			.with_max_level(tracing::Level::DEBUG)
			.finish();
		let _default = tracing::subscriber::set_default(subscriber);

		let (tx, rx) = mpsc::unbounded_channel();
		let (_guard, done) = spawn_listener(rx);
		tx.send(DownloadEvent::progress("sized", DownloadState::Completed, 2048, Some(2048))).unwrap();
		tx.send(DownloadEvent::progress("unsized", DownloadState::Completed, 4096, Some(0))).unwrap();
		assert_eq!(done.await.unwrap(), "sized");
		for _ in 0..10 {
			tokio::task::yield_now().await;
		}

		let output = captured.text();
		let completed = output.lines().find(|line| line.contains("download completed")).unwrap();
		assert!(completed.contains("completed=100.00%"), "{completed}");
		let extra = output.lines().find(|line| line.contains("ignoring extra completion")).unwrap();
		assert!(extra.contains("completed=(unknown)"), "{extra}");
	}
}
