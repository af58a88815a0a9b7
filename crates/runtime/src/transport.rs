//! Message transports carrying CDP JSON frames.
//!
//! A transport is split into a sending half ([`Transport`]) and a receiving
//! half ([`TransportReceiver`]) that forwards every inbound frame, decoded as
//! JSON, into an unbounded channel consumed by the
//! [`Connection`](crate::Connection).

use std::future::Future;
use std::pin::Pin;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value as JsonValue;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Sending half of a transport.
pub trait Transport: Send + Sync {
	fn send(&mut self, message: JsonValue) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Receiving half of a transport; runs until the peer goes away.
pub trait TransportReceiver: Send {
	fn run(self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>>;
}

/// Both halves plus the channel the receiver feeds.
pub struct TransportParts {
	pub sender: Box<dyn Transport>,
	pub receiver: Box<dyn TransportReceiver>,
	pub message_rx: mpsc::UnboundedReceiver<JsonValue>,
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// CDP transport over a browser's `webSocketDebuggerUrl`.
pub struct WebSocketTransport {
	sink: SplitSink<WsStream, Message>,
	stream: SplitStream<WsStream>,
	message_tx: mpsc::UnboundedSender<JsonValue>,
}

impl WebSocketTransport {
	/// Opens the WebSocket at `url`.
	///
	/// Returns the transport and the receiver that will yield inbound frames
	/// once the receiving half runs.
	pub async fn connect(url: &str) -> Result<(Self, mpsc::UnboundedReceiver<JsonValue>)> {
		let (ws, _response) = tokio_tungstenite::connect_async(url).await?;
		debug!(target = "docgrab.cdp", %url, "websocket connected");
		let (sink, stream) = ws.split();
		let (message_tx, message_rx) = mpsc::unbounded_channel();
		Ok((Self { sink, stream, message_tx }, message_rx))
	}

	/// Splits into boxed halves ready for a [`Connection`](crate::Connection).
	pub fn into_transport_parts(self, message_rx: mpsc::UnboundedReceiver<JsonValue>) -> TransportParts {
		TransportParts {
			sender: Box::new(WebSocketSender { sink: self.sink }),
			receiver: Box::new(WebSocketReceiver {
				stream: self.stream,
				message_tx: self.message_tx,
			}),
			message_rx,
		}
	}
}

struct WebSocketSender {
	sink: SplitSink<WsStream, Message>,
}

impl Transport for WebSocketSender {
	fn send(&mut self, message: JsonValue) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
		Box::pin(async move {
			let text = serde_json::to_string(&message)?;
			trace!(target = "docgrab.cdp", frame = %text, "send");
			self.sink.send(Message::Text(text.into())).await?;
			Ok(())
		})
	}
}

struct WebSocketReceiver {
	stream: SplitStream<WsStream>,
	message_tx: mpsc::UnboundedSender<JsonValue>,
}

impl TransportReceiver for WebSocketReceiver {
	fn run(mut self: Box<Self>) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> {
		Box::pin(async move {
			while let Some(frame) = self.stream.next().await {
				let value: JsonValue = match frame? {
					Message::Text(text) => serde_json::from_str(&text)?,
					Message::Binary(data) => serde_json::from_slice(&data)?,
					Message::Close(_) => break,
					_ => continue,
				};
				if self.message_tx.send(value).is_err() {
					return Err(Error::ConnectionClosed);
				}
			}
			debug!(target = "docgrab.cdp", "websocket stream ended");
			Ok(())
		})
	}
}
