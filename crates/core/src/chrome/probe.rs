//! DevTools endpoint probing.

use std::time::Duration;

use docgrab_protocol::CdpVersionInfo;

use crate::error::{Error, Result};

/// Reads `/json/version` from a browser listening on `port`.
pub async fn fetch_cdp_endpoint(port: u16) -> Result<CdpVersionInfo> {
	let client = reqwest::Client::builder()
		.timeout(Duration::from_millis(400))
		.build()
		.map_err(|e| Error::BrowserLaunch(format!("failed to create HTTP client: {e}")))?;
	let mut last_error = "no response".to_string();

	for url in [
		format!("http://127.0.0.1:{port}/json/version"),
		format!("http://localhost:{port}/json/version"),
	] {
		let response = match client.get(&url).send().await {
			Ok(response) => response,
			Err(e) => {
				last_error = e.to_string();
				continue;
			}
		};

		if !response.status().is_success() {
			last_error = format!("unexpected status {}", response.status());
			continue;
		}

		return response
			.json::<CdpVersionInfo>()
			.await
			.map_err(|e| Error::BrowserLaunch(format!("invalid /json/version response: {e}")));
	}

	Err(Error::BrowserLaunch(format!("DevTools endpoint on port {port} unreachable: {last_error}")))
}

#[cfg(test)]
mod tests {
	use tokio::io::{AsyncReadExt, AsyncWriteExt};
	use tokio::net::TcpListener;

	use super::*;

	async fn serve_once(body: &'static str) -> u16 {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let port = listener.local_addr().unwrap().port();
		tokio::spawn(async move {
			let (mut socket, _) = listener.accept().await.unwrap();
			let mut buf = [0u8; 1024];
			let _ = socket.read(&mut buf).await;
			let response = format!(
				"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
				body.len(),
				body
			);
			socket.write_all(response.as_bytes()).await.unwrap();
		});
		port
	}

	#[tokio::test]
	async fn parses_version_payload() {
		let port = serve_once(r#"{"Browser":"Chrome/119.0.6045.105","webSocketDebuggerUrl":"ws://127.0.0.1:9222/devtools/browser/abc"}"#).await;
		let info = fetch_cdp_endpoint(port).await.unwrap();
		assert_eq!(info.web_socket_debugger_url, "ws://127.0.0.1:9222/devtools/browser/abc");
		assert_eq!(info.browser.as_deref(), Some("Chrome/119.0.6045.105"));
	}

	#[tokio::test]
	async fn closed_port_is_a_launch_error() {
		let port = docgrab_runtime::process::free_local_port().unwrap();
		let err = fetch_cdp_endpoint(port).await.unwrap_err();
		assert!(matches!(err, Error::BrowserLaunch(_)));
	}
}
