use std::fmt;

use docgrab_protocol::{DownloadProgress, DownloadProgressState, DownloadWillBegin};

/// Lifecycle state of one download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
	Started,
	InProgress,
	Completed,
	Canceled,
}

impl fmt::Display for DownloadState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Started => "started",
			Self::InProgress => "in-progress",
			Self::Completed => "completed",
			Self::Canceled => "canceled",
		};
		f.write_str(name)
	}
}

/// Backend-neutral download notification.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadEvent {
	pub guid: String,
	pub state: DownloadState,
	pub received_bytes: u64,
	/// `None` while the browser does not know the size.
	pub total_bytes: Option<u64>,
	pub url: Option<String>,
	pub suggested_filename: Option<String>,
}

impl DownloadEvent {
	pub fn progress(guid: impl Into<String>, state: DownloadState, received_bytes: u64, total_bytes: Option<u64>) -> Self {
		Self {
			guid: guid.into(),
			state,
			received_bytes,
			total_bytes: total_bytes.filter(|total| *total > 0),
			url: None,
			suggested_filename: None,
		}
	}

	pub fn completion(&self) -> String {
		completion(self.received_bytes, self.total_bytes)
	}
}

/// Progress as a two-decimal percentage, or `(unknown)` without a total.
pub fn completion(received: u64, total: Option<u64>) -> String {
	match total {
		Some(total) if total > 0 => format!("{:.2}%", received as f64 / total as f64 * 100.0),
		_ => "(unknown)".to_string(),
	}
}

impl From<DownloadWillBegin> for DownloadEvent {
	fn from(begin: DownloadWillBegin) -> Self {
		Self {
			guid: begin.guid,
			state: DownloadState::Started,
			received_bytes: 0,
			total_bytes: None,
			url: Some(begin.url),
			suggested_filename: Some(begin.suggested_filename),
		}
	}
}

impl From<DownloadProgress> for DownloadEvent {
	fn from(progress: DownloadProgress) -> Self {
		let state = match progress.state {
			DownloadProgressState::InProgress => DownloadState::InProgress,
			DownloadProgressState::Completed => DownloadState::Completed,
			DownloadProgressState::Canceled => DownloadState::Canceled,
		};
		let total = progress.total_bytes.max(0.0) as u64;
		Self::progress(progress.guid, state, progress.received_bytes.max(0.0) as u64, Some(total))
	}
}
