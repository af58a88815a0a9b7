//! JSON-RPC connection layer for the Chrome DevTools Protocol.
//!
//! This module implements request/response correlation on top of a
//! [`TransportParts`]. It handles:
//! - Generating unique request IDs
//! - Correlating responses with pending requests
//! - Distinguishing events from responses
//! - Fanning events out to every live subscriber
//!
//! # Message Flow
//!
//! 1. Caller invokes [`Connection::execute`] with a typed command
//! 2. Connection allocates an ID and parks a oneshot sender under it
//! 3. Request is serialized and written through the transport
//! 4. [`Connection::run`] reads the matching response and completes the oneshot
//! 5. Caller decodes the `result` into the command's response type
//!
//! Events (no `id`) are cloned into each channel returned by
//! [`Connection::subscribe`]. Closed subscriber channels are pruned on the
//! next event.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use docgrab_protocol::{Command, ErrorPayload, Event, Message, Request};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, trace};

use crate::error::{Error, Result};
use crate::transport::{Transport, TransportParts, TransportReceiver};

type Callback = oneshot::Sender<Result<Value>>;

struct Inbound {
	receiver: Box<dyn TransportReceiver>,
	message_rx: mpsc::UnboundedReceiver<Value>,
}

/// Connection to a browser's CDP endpoint.
///
/// Share it across tasks with `Arc`; multiple concurrent requests are
/// supported. [`Connection::run`] must be spawned once to pump messages.
pub struct Connection {
	last_id: AtomicU64,
	closed: AtomicBool,
	callbacks: Mutex<HashMap<u64, Callback>>,
	subscribers: Mutex<Vec<mpsc::UnboundedSender<Event>>>,
	sender: tokio::sync::Mutex<Box<dyn Transport>>,
	inbound: Mutex<Option<Inbound>>,
}

impl Connection {
	pub fn new(parts: TransportParts) -> Self {
		Self {
			last_id: AtomicU64::new(0),
			closed: AtomicBool::new(false),
			callbacks: Mutex::new(HashMap::new()),
			subscribers: Mutex::new(Vec::new()),
			sender: tokio::sync::Mutex::new(parts.sender),
			inbound: Mutex::new(Some(Inbound {
				receiver: parts.receiver,
				message_rx: parts.message_rx,
			})),
		}
	}

	/// Sends a typed command and decodes its result.
	///
	/// `session_id` addresses a flat-mode target session; `None` sends to
	/// the browser endpoint itself.
	pub async fn execute<C: Command>(&self, session_id: Option<&str>, command: &C) -> Result<C::Response> {
		let params = serde_json::to_value(command)?;
		let result = self.send_message(C::METHOD, params, session_id).await?;
		Ok(serde_json::from_value(result)?)
	}

	/// Sends a raw request and awaits the raw `result` object.
	pub async fn send_message(&self, method: &str, params: Value, session_id: Option<&str>) -> Result<Value> {
		if self.closed.load(Ordering::SeqCst) {
			return Err(Error::ConnectionClosed);
		}

		let id = self.last_id.fetch_add(1, Ordering::SeqCst);
		let (tx, rx) = oneshot::channel();
		self.callbacks.lock().insert(id, tx);
		// shutdown() may have drained the map between the check above and the insert
		if self.closed.load(Ordering::SeqCst) {
			self.callbacks.lock().remove(&id);
			return Err(Error::ConnectionClosed);
		}

		let request = Request {
			id,
			method: method.to_string(),
			params,
			session_id: session_id.map(str::to_string),
		};
		trace!(target = "docgrab.cdp", id, %method, "request");

		let sent = match serde_json::to_value(&request) {
			Ok(value) => self.sender.lock().await.send(value).await,
			Err(err) => Err(err.into()),
		};
		if let Err(err) = sent {
			self.callbacks.lock().remove(&id);
			return Err(err);
		}

		rx.await.map_err(|_| Error::ChannelClosed).and_then(|result| result)
	}

	/// Registers a new event subscriber.
	///
	/// The channel closes when the connection's message loop ends.
	pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Event> {
		let (tx, rx) = mpsc::unbounded_channel();
		let mut subscribers = self.subscribers.lock();
		if !self.closed.load(Ordering::SeqCst) {
			subscribers.push(tx);
		}
		rx
	}

	pub fn is_closed(&self) -> bool {
		self.closed.load(Ordering::SeqCst)
	}

	/// Runs the transport receiver and the dispatch loop until the transport
	/// closes, then fails pending requests and closes subscriber channels.
	///
	/// Only the first call does any work.
	pub async fn run(&self) {
		let Some(Inbound { receiver, mut message_rx }) = self.inbound.lock().take() else {
			error!(target = "docgrab.cdp", "connection loop already started");
			return;
		};

		let transport_handle = tokio::spawn(async move {
			if let Err(e) = receiver.run().await {
				debug!(target = "docgrab.cdp", error = %e, "transport receiver stopped");
			}
		});

		while let Some(message_value) = message_rx.recv().await {
			match serde_json::from_value::<Message>(message_value) {
				Ok(message) => {
					if let Err(e) = self.dispatch(message) {
						error!(target = "docgrab.cdp", error = %e, "error dispatching message");
					}
				}
				Err(e) => {
					error!(target = "docgrab.cdp", error = %e, "failed to parse message");
				}
			}
		}

		debug!(target = "docgrab.cdp", "message loop ended (transport closed)");
		self.shutdown();
		let _ = transport_handle.await;
	}

	fn dispatch(&self, message: Message) -> Result<()> {
		match message {
			Message::Response(response) => {
				let callback = self
					.callbacks
					.lock()
					.remove(&response.id)
					.ok_or_else(|| Error::UnexpectedMessage(format!("Cannot find request to respond: id={}", response.id)))?;

				let result = match response.error {
					Some(payload) => Err(protocol_error(payload)),
					None => Ok(response.result.unwrap_or_else(|| Value::Object(Default::default()))),
				};

				let _ = callback.send(result);
				Ok(())
			}
			Message::Event(event) => {
				trace!(target = "docgrab.cdp", method = %event.method, "event");
				self.subscribers.lock().retain(|subscriber| subscriber.send(event.clone()).is_ok());
				Ok(())
			}
		}
	}

	fn shutdown(&self) {
		self.closed.store(true, Ordering::SeqCst);
		for (_, callback) in self.callbacks.lock().drain() {
			let _ = callback.send(Err(Error::ConnectionClosed));
		}
		let mut subscribers = self.subscribers.lock();
		subscribers.clear();
	}
}

fn protocol_error(payload: ErrorPayload) -> Error {
	let message = match payload.data {
		Some(data) => format!("{} ({})", payload.message, data),
		None => payload.message,
	};
	Error::Protocol { code: payload.code, message }
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use docgrab_protocol::{Evaluate, EvaluateResponse, Response};
	use serde_json::json;

	use super::*;
	use crate::fake_transport::FakeTransportBuilder;

	fn create_test_connection() -> (Arc<Connection>, crate::fake_transport::FakeTransportController) {
		let (parts, controller) = FakeTransportBuilder::new().build();
		(Arc::new(Connection::new(parts)), controller)
	}

	#[test]
	fn request_ids_increment() {
		let (connection, _) = create_test_connection();
		assert_eq!(connection.last_id.fetch_add(1, Ordering::SeqCst), 0);
		assert_eq!(connection.last_id.fetch_add(1, Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn dispatch_response_completes_callback() {
		let (connection, _) = create_test_connection();
		let (tx, rx) = oneshot::channel();
		connection.callbacks.lock().insert(5, tx);

		connection
			.dispatch(Message::Response(Response {
				id: 5,
				result: Some(json!({"frameId": "F1"})),
				error: None,
				session_id: None,
			}))
			.unwrap();

		let result = rx.await.unwrap().unwrap();
		assert_eq!(result["frameId"], "F1");
	}

	#[tokio::test]
	async fn dispatch_error_response_maps_to_protocol_error() {
		let (connection, _) = create_test_connection();
		let (tx, rx) = oneshot::channel();
		connection.callbacks.lock().insert(0, tx);

		connection
			.dispatch(Message::Response(Response {
				id: 0,
				result: None,
				error: Some(ErrorPayload {
					code: -32000,
					message: "Cannot navigate to invalid URL".into(),
					data: None,
				}),
				session_id: None,
			}))
			.unwrap();

		match rx.await.unwrap() {
			Err(Error::Protocol { code, message }) => {
				assert_eq!(code, -32000);
				assert_eq!(message, "Cannot navigate to invalid URL");
			}
			other => panic!("Expected Protocol error, got {other:?}"),
		}
	}

	#[test]
	fn dispatch_unknown_id_is_rejected() {
		let (connection, _) = create_test_connection();
		let err = connection
			.dispatch(Message::Response(Response {
				id: 999,
				result: None,
				error: None,
				session_id: None,
			}))
			.unwrap_err();
		assert!(err.to_string().contains("Cannot find request"));
	}

	#[tokio::test]
	async fn events_fan_out_and_dead_subscribers_are_pruned() {
		let (connection, _) = create_test_connection();
		let mut first = connection.subscribe();
		let second = connection.subscribe();
		drop(second);

		connection
			.dispatch(Message::Event(Event {
				method: "Browser.downloadProgress".into(),
				params: json!({"guid": "g1"}),
				session_id: None,
			}))
			.unwrap();

		let event = first.recv().await.unwrap();
		assert_eq!(event.params["guid"], "g1");
		assert_eq!(connection.subscribers.lock().len(), 1);
	}

	#[tokio::test]
	async fn execute_round_trips_through_transport() {
		let (connection, mut controller) = create_test_connection();
		let conn = Arc::clone(&connection);
		tokio::spawn(async move { conn.run().await });

		let responder = tokio::spawn(async move {
			let request = controller.next_sent().await.unwrap();
			assert_eq!(request["method"], "Runtime.evaluate");
			assert_eq!(request["sessionId"], "S1");
			assert_eq!(request["params"]["expression"], "1 + 1");
			let id = request["id"].as_u64().unwrap();
			controller.inject_response(id, json!({"result": {"type": "number", "value": 2}}));
			controller
		});

		let response: EvaluateResponse = connection.execute(Some("S1"), &Evaluate::by_value("1 + 1")).await.unwrap();
		assert_eq!(response.result.value, Some(json!(2)));
		responder.await.unwrap();
	}

	#[tokio::test]
	async fn pending_requests_fail_when_transport_closes() {
		let (connection, controller) = create_test_connection();
		let mut events = connection.subscribe();
		let conn = Arc::clone(&connection);
		let loop_handle = tokio::spawn(async move { conn.run().await });

		let request = {
			let conn = Arc::clone(&connection);
			tokio::spawn(async move { conn.send_message("Page.enable", json!({}), None).await })
		};
		tokio::task::yield_now().await;
		drop(controller);

		loop_handle.await.unwrap();
		assert!(matches!(request.await.unwrap(), Err(Error::ConnectionClosed) | Err(Error::ChannelClosed)));
		assert!(events.recv().await.is_none());
		assert!(connection.is_closed());
	}
}
