//! Envelope types for CDP JSON-RPC traffic.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A typed CDP command.
///
/// Implementors are the `params` object of a request; [`Command::METHOD`] is
/// the fully-qualified method name and [`Command::Response`] the shape of the
/// `result` object returned for it.
pub trait Command: Serialize {
	const METHOD: &'static str;
	type Response: DeserializeOwned;
}

/// Empty `result` payload returned by commands with no output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Request sent to the browser.
///
/// ```json
/// { "id": 7, "method": "Page.navigate", "params": { "url": "https://example.com" }, "sessionId": "A1B2" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
	/// Unique request ID for correlating responses
	pub id: u64,
	/// Method name to invoke (`Domain.method`)
	pub method: String,
	/// Method parameters as JSON object
	pub params: Value,
	/// Flat-mode session the command targets; `None` addresses the browser
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

/// Response to a [`Request`], carrying either `result` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	pub id: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

/// Protocol error details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
	pub code: i64,
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
}

/// Unsolicited notification pushed by the browser.
///
/// Events are distinguished from responses by the absence of an `id` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
	pub method: String,
	#[serde(default)]
	pub params: Value,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
}

impl Event {
	/// Decodes `params` as the payload type for this event.
	pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
		T::deserialize(&self.params)
	}
}

/// Discriminated union of inbound messages.
///
/// `Response` is tried first: it requires `id`, so events fall through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Message {
	Response(Response),
	Event(Event),
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn request_omits_session_when_browser_scoped() {
		let request = Request {
			id: 3,
			method: "Browser.getVersion".into(),
			params: json!({}),
			session_id: None,
		};
		let value = serde_json::to_value(&request).unwrap();
		assert_eq!(value, json!({"id": 3, "method": "Browser.getVersion", "params": {}}));
	}

	#[test]
	fn message_with_id_is_response() {
		let message: Message = serde_json::from_str(r#"{"id": 42, "result": {"frameId": "F"}, "sessionId": "S"}"#).unwrap();
		match message {
			Message::Response(response) => {
				assert_eq!(response.id, 42);
				assert_eq!(response.session_id.as_deref(), Some("S"));
				assert!(response.error.is_none());
			}
			Message::Event(_) => panic!("Expected Response"),
		}
	}

	#[test]
	fn message_with_error_is_response() {
		let message: Message = serde_json::from_str(r#"{"id": 1, "error": {"code": -32000, "message": "No node"}}"#).unwrap();
		match message {
			Message::Response(response) => {
				let error = response.error.expect("error payload");
				assert_eq!(error.code, -32000);
				assert_eq!(error.message, "No node");
			}
			Message::Event(_) => panic!("Expected Response"),
		}
	}

	#[test]
	fn message_without_id_is_event() {
		let message: Message = serde_json::from_str(r#"{"method": "Browser.downloadProgress", "params": {"guid": "g"}}"#).unwrap();
		match message {
			Message::Event(event) => {
				assert_eq!(event.method, "Browser.downloadProgress");
				assert_eq!(event.params["guid"], "g");
			}
			Message::Response(_) => panic!("Expected Event"),
		}
	}
}
