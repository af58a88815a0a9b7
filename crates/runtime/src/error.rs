use thiserror::Error;

/// Errors raised by the CDP transport and connection layer.
#[derive(Debug, Error)]
pub enum Error {
	#[error("connection closed")]
	ConnectionClosed,

	#[error("response channel closed before a reply arrived")]
	ChannelClosed,

	#[error("protocol error {code}: {message}")]
	Protocol { code: i64, message: String },

	#[error("unexpected message: {0}")]
	UnexpectedMessage(String),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
