use std::fmt;

use serde::{Deserialize, Serialize};

/// Locates one element on the page.
///
/// Serialized externally tagged, e.g. `{"id": "k-grid0-select-all"}` or
/// `{"buttonText": "Download"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Selector {
	Id(String),
	Css(String),
	#[serde(rename = "xpath")]
	XPath(String),
	/// A `<button>` whose whitespace-normalized text equals the value.
	ButtonText(String),
}

impl Selector {
	/// JavaScript expression evaluating to the element or `null`.
	pub fn js_lookup(&self) -> String {
		match self {
			Selector::Id(id) => format!("document.getElementById({})", js_string(id)),
			Selector::Css(css) => format!("document.querySelector({})", js_string(css)),
			Selector::XPath(xpath) => format!(
				"document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
				js_string(xpath)
			),
			Selector::ButtonText(text) => format!(
				"(Array.from(document.querySelectorAll('button')).find(b => b.textContent.replace(/\\s+/g, ' ').trim() === {}) || null)",
				js_string(text.split_whitespace().collect::<Vec<_>>().join(" ").as_str())
			),
		}
	}
}

impl fmt::Display for Selector {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Selector::Id(id) => write!(f, "#{id}"),
			Selector::Css(css) => f.write_str(css),
			Selector::XPath(xpath) => write!(f, "xpath={xpath}"),
			Selector::ButtonText(text) => write!(f, "button \"{text}\""),
		}
	}
}

// A JSON string literal is a valid JS string literal.
fn js_string(value: &str) -> String {
	serde_json::Value::String(value.to_string()).to_string()
}
