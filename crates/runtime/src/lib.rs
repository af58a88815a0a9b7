//! Chrome DevTools Protocol runtime.
//!
//! Owns the pieces between raw bytes and typed commands: a [`Transport`]
//! abstraction with a WebSocket implementation, the [`Connection`] that
//! correlates responses with requests and fans events out to subscribers,
//! an in-memory [`fake_transport`] for tests, and a free-port helper used
//! when launching a browser.

pub mod connection;
pub mod error;
pub mod fake_transport;
pub mod process;
pub mod transport;

pub use connection::Connection;
pub use error::{Error, Result};
pub use transport::{Transport, TransportParts, TransportReceiver, WebSocketTransport};
