//! `Browser` domain: download behavior and download lifecycle events.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::{Command, Empty};

/// How the browser treats download requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadBehavior {
	Deny,
	Allow,
	/// Accept and name the file after the download `guid`.
	AllowAndName,
	Default,
}

/// `Browser.setDownloadBehavior`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDownloadBehavior {
	pub behavior: DownloadBehavior,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub download_path: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub events_enabled: Option<bool>,
}

impl Command for SetDownloadBehavior {
	const METHOD: &'static str = "Browser.setDownloadBehavior";
	type Response = Empty;
}

/// `Browser.close`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CloseBrowser {}

impl Command for CloseBrowser {
	const METHOD: &'static str = "Browser.close";
	type Response = Empty;
}

/// `Browser.downloadWillBegin` event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadWillBegin {
	pub frame_id: String,
	pub guid: String,
	pub url: String,
	pub suggested_filename: String,
}

impl DownloadWillBegin {
	pub const METHOD: &'static str = "Browser.downloadWillBegin";
}

/// Download state reported by `Browser.downloadProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadProgressState {
	InProgress,
	Completed,
	Canceled,
}

impl fmt::Display for DownloadProgressState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::InProgress => "inProgress",
			Self::Completed => "completed",
			Self::Canceled => "canceled",
		};
		f.write_str(name)
	}
}

/// `Browser.downloadProgress` event payload.
///
/// Byte counters are doubles on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadProgress {
	pub guid: String,
	pub total_bytes: f64,
	pub received_bytes: f64,
	pub state: DownloadProgressState,
}

impl DownloadProgress {
	pub const METHOD: &'static str = "Browser.downloadProgress";
}
