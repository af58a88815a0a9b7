//! Port helpers for launched browsers.

use std::net::TcpListener;

/// Asks the OS for an unused localhost port for `--remote-debugging-port`.
///
/// The port is released before returning, so another process could grab it
/// in between; launchers keep probing until their timeout instead.
pub fn free_local_port() -> std::io::Result<u16> {
	let listener = TcpListener::bind(("127.0.0.1", 0))?;
	Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn free_port_is_bindable_after_release() {
		let port = free_local_port().unwrap();
		assert_ne!(port, 0);
		assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
	}
}
