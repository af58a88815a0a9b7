//! `Target` domain: page creation and flat-session attach.

use serde::{Deserialize, Serialize};

use crate::message::Command;

/// `Target.createTarget`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTarget {
	pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTargetResponse {
	pub target_id: String,
}

impl Command for CreateTarget {
	const METHOD: &'static str = "Target.createTarget";
	type Response = CreateTargetResponse;
}

/// `Target.attachToTarget`
///
/// With `flatten` the returned session id is used as `sessionId` on the
/// browser connection instead of nested `sendMessageToTarget` envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTarget {
	pub target_id: String,
	pub flatten: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTargetResponse {
	pub session_id: String,
}

impl Command for AttachToTarget {
	const METHOD: &'static str = "Target.attachToTarget";
	type Response = AttachToTargetResponse;
}
