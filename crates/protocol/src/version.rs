//! HTTP discovery payloads served next to the CDP socket.

use serde::{Deserialize, Serialize};

/// `/json/version` response subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdpVersionInfo {
	#[serde(rename = "webSocketDebuggerUrl")]
	pub web_socket_debugger_url: String,
	#[serde(rename = "Browser", default)]
	pub browser: Option<String>,
	#[serde(rename = "User-Agent", default)]
	pub user_agent: Option<String>,
}
