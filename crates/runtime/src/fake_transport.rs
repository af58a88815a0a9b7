//! In-memory transport for exercising the connection and CDP sessions
//! without a browser.
//!
//! # Example
//!
//! ```ignore
//! let (parts, mut controller) = FakeTransportBuilder::new().build();
//! let connection = Connection::new(parts);
//!
//! tokio::spawn(async move {
//!     while let Some(request) = controller.next_sent().await {
//!         controller.inject_response(request["id"].as_u64().unwrap(), json!({}));
//!     }
//! });
//! ```

use std::future::Future;
use std::pin::Pin;

use serde_json::Value as JsonValue;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::transport::{Transport, TransportParts, TransportReceiver};

/// Builder for creating fake transport instances.
#[derive(Default)]
pub struct FakeTransportBuilder {}

impl FakeTransportBuilder {
	pub fn new() -> Self {
		Self {}
	}

	/// Returns [`TransportParts`] for a connection and a
	/// [`FakeTransportController`] to play the browser's side.
	pub fn build(self) -> (TransportParts, FakeTransportController) {
		let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
		let (message_tx, message_rx) = mpsc::unbounded_channel();
		let (sent_tx, sent_rx) = mpsc::unbounded_channel();

		let parts = TransportParts {
			sender: Box::new(FakeTransportSender { sent: sent_tx }),
			receiver: Box::new(FakeTransportReceiver { inbound_rx, message_tx }),
			message_rx,
		};

		let controller = FakeTransportController { inbound_tx, sent: sent_rx };

		(parts, controller)
	}
}

/// Browser-side handle: observes sent requests and injects replies/events.
pub struct FakeTransportController {
	inbound_tx: mpsc::UnboundedSender<JsonValue>,
	sent: mpsc::UnboundedReceiver<JsonValue>,
}

impl FakeTransportController {
	/// Inject a raw JSON message into the connection.
	pub fn inject(&self, message: JsonValue) {
		let _ = self.inbound_tx.send(message);
	}

	pub fn inject_response(&self, id: u64, result: JsonValue) {
		self.inject(serde_json::json!({ "id": id, "result": result }));
	}

	pub fn inject_error(&self, id: u64, code: i64, message: &str) {
		self.inject(serde_json::json!({
			"id": id,
			"error": { "code": code, "message": message }
		}));
	}

	pub fn inject_event(&self, method: &str, params: JsonValue) {
		self.inject(serde_json::json!({ "method": method, "params": params }));
	}

	/// Cloneable injector usable from another task while this controller
	/// keeps reading sent messages.
	pub fn injector(&self) -> FakeInjector {
		FakeInjector {
			inbound_tx: self.inbound_tx.clone(),
		}
	}

	/// Waits for the next request written by the connection.
	pub async fn next_sent(&mut self) -> Option<JsonValue> {
		self.sent.recv().await
	}
}

/// Injection-only handle split off a [`FakeTransportController`].
#[derive(Clone)]
pub struct FakeInjector {
	inbound_tx: mpsc::UnboundedSender<JsonValue>,
}

impl FakeInjector {
	pub fn inject_event(&self, method: &str, params: JsonValue) {
		let _ = self.inbound_tx.send(serde_json::json!({ "method": method, "params": params }));
	}
}

struct FakeTransportSender {
	sent: mpsc::UnboundedSender<JsonValue>,
}

impl Transport for FakeTransportSender {
	fn send(&mut self, message: JsonValue) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
		let _ = self.sent.send(message);
		Box::pin(async { Ok(()) })
	}
}

struct FakeTransportReceiver {
	inbound_rx: mpsc::UnboundedReceiver<JsonValue>,
	message_tx: mpsc::UnboundedSender<JsonValue>,
}

impl TransportReceiver for FakeTransportReceiver {
	fn run(mut self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
		Box::pin(async move {
			while let Some(message) = self.inbound_rx.recv().await {
				if self.message_tx.send(message).is_err() {
					break;
				}
			}
			Ok(())
		})
	}
}
