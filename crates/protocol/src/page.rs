//! `Page` domain: lifecycle enablement and navigation.

use serde::{Deserialize, Serialize};

use crate::message::{Command, Empty};

/// `Page.enable`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnablePage {}

impl Command for EnablePage {
	const METHOD: &'static str = "Page.enable";
	type Response = Empty;
}

/// `Page.navigate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigate {
	pub url: String,
}

/// Result of `Page.navigate`.
///
/// `error_text` is set when the navigation failed, e.g. `net::ERR_ABORTED`
/// when the response turned into a download.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateResponse {
	pub frame_id: String,
	#[serde(default)]
	pub loader_id: Option<String>,
	#[serde(default)]
	pub error_text: Option<String>,
}

impl Command for Navigate {
	const METHOD: &'static str = "Page.navigate";
	type Response = NavigateResponse;
}
