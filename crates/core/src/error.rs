//! Error taxonomy for the acquisition pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Marker Chrome reports when a navigation turns into a download.
pub const ABORTED_NAVIGATION: &str = "net::ERR_ABORTED";

#[derive(Debug, Error)]
pub enum Error {
	#[error("failed to launch browser: {0}")]
	BrowserLaunch(String),

	#[error("browser automation failed: {0}")]
	Automation(String),

	#[error("navigation to {url} failed: {error_text}")]
	Navigation { url: String, error_text: String },

	#[error("element not found: {selector}")]
	ElementNotFound { selector: String },

	#[error("timed out after {ms}ms waiting for {condition}")]
	Timeout { ms: u64, condition: String },

	#[error("failed to open archive {}: {source}", path.display())]
	ArchiveOpen {
		path: PathBuf,
		#[source]
		source: zip::result::ZipError,
	},

	#[error("failed to read archive entry #{index}: {source}")]
	EntryOpen {
		index: usize,
		#[source]
		source: zip::result::ZipError,
	},

	#[error("archive entry '{entry}' resolves outside {}", root.display())]
	UnsafeEntry { entry: String, root: PathBuf },

	#[error("failed to create directory {}: {source}", path.display())]
	DirectoryCreate {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("failed to open file {}: {source}", path.display())]
	FileOpen {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("failed to copy file {}: {source}", path.display())]
	Copy {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("failed to remove {}: {source}", path.display())]
	Cleanup {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error(transparent)]
	Cdp(#[from] docgrab_runtime::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Io(#[from] io::Error),

	#[error("blocking task failed: {0}")]
	Join(#[from] tokio::task::JoinError),
}

impl Error {
	/// Whether this is the aborted navigation Chrome reports when a click or
	/// navigation turns into a download.
	pub fn is_aborted_navigation(&self) -> bool {
		match self {
			Error::Navigation { error_text, .. } => error_text.contains(ABORTED_NAVIGATION),
			Error::Automation(message) => message.contains(ABORTED_NAVIGATION),
			Error::Cdp(docgrab_runtime::Error::Protocol { message, .. }) => message.contains(ABORTED_NAVIGATION),
			_ => false,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;
