//! `Runtime` domain: expression evaluation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::Command;

/// `Runtime.evaluate`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluate {
	pub expression: String,
	pub return_by_value: bool,
	pub await_promise: bool,
}

impl Evaluate {
	/// Evaluates `expression` and returns its JSON value.
	pub fn by_value(expression: impl Into<String>) -> Self {
		Self {
			expression: expression.into(),
			return_by_value: true,
			await_promise: false,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
	pub result: RemoteObject,
	#[serde(default)]
	pub exception_details: Option<ExceptionDetails>,
}

impl Command for Evaluate {
	const METHOD: &'static str = "Runtime.evaluate";
	type Response = EvaluateResponse;
}

/// Mirror of a JavaScript value; `value` is populated for by-value results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteObject {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub value: Option<Value>,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
	pub text: String,
	#[serde(default)]
	pub exception: Option<RemoteObject>,
}

impl ExceptionDetails {
	/// Best human-readable description of the thrown value.
	pub fn message(&self) -> &str {
		self.exception
			.as_ref()
			.and_then(|exception| exception.description.as_deref())
			.unwrap_or(&self.text)
	}
}
