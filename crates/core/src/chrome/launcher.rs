//! Chrome process launch with remote debugging.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use docgrab_protocol::CdpVersionInfo;
use docgrab_runtime::{Connection, WebSocketTransport, process::free_local_port};
use tempfile::TempDir;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use super::finder::find_chrome_executable;
use super::probe::fetch_cdp_endpoint;
use super::session::CdpSession;
use crate::browser::SessionFactory;
use crate::config::BrowserOptions;
use crate::error::{Error, Result};

const PROBE_INTERVAL: Duration = Duration::from_millis(200);

/// A running browser.
///
/// The child is spawned with `kill_on_drop`, so dropping this (or a launch
/// future still waiting for the endpoint) kills the browser and removes its
/// throwaway profile.
pub struct ChromeProcess {
	child: Child,
	port: u16,
	endpoint: CdpVersionInfo,
	_profile: TempDir,
}

impl ChromeProcess {
	pub fn port(&self) -> u16 {
		self.port
	}

	pub fn endpoint(&self) -> &CdpVersionInfo {
		&self.endpoint
	}

	pub fn pid(&self) -> Option<u32> {
		self.child.id()
	}

	/// Kills the browser and reaps it.
	pub async fn shutdown(mut self) {
		stop(&mut self.child).await;
	}
}

async fn stop(child: &mut Child) {
	let pid = child.id();
	if let Ok(Some(_)) = child.try_wait() {
		return;
	}
	if let Err(e) = child.start_kill() {
		warn!(target = "docgrab.chrome", ?pid, error = %e, "kill failed");
	}
	let _ = child.wait().await;
	debug!(target = "docgrab.chrome", ?pid, "browser process stopped");
}

fn launch_args(options: &BrowserOptions, port: u16, profile: &TempDir) -> Vec<String> {
	let mut args = vec![
		format!("--remote-debugging-port={port}"),
		format!("--user-data-dir={}", profile.path().display()),
		"--no-first-run".to_string(),
		"--no-default-browser-check".to_string(),
	];
	if options.headless {
		args.push("--headless=new".to_string());
	}
	if let Some(user_agent) = &options.user_agent {
		args.push(format!("--user-agent={user_agent}"));
	}
	args.push("about:blank".to_string());
	args
}

/// Spawns the browser and waits for its DevTools endpoint.
///
/// The browser stays in the caller's process group so a terminal interrupt
/// reaches it too.
pub async fn launch_chrome(options: &BrowserOptions) -> Result<ChromeProcess> {
	let executable = match &options.executable {
		Some(path) => path.clone(),
		None => find_chrome_executable().ok_or_else(|| {
			Error::BrowserLaunch("could not find a Chrome/Chromium executable; pass --browser <path>".into())
		})?,
	};

	let port = free_local_port()?;
	let profile = tempfile::Builder::new().prefix("docgrab-profile-").tempdir()?;
	let args = launch_args(options, port, &profile);

	let mut cmd = Command::new(&executable);
	cmd.args(&args)
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.kill_on_drop(true);

	let mut child = cmd
		.spawn()
		.map_err(|e| Error::BrowserLaunch(format!("failed to launch {}: {e}", executable.display())))?;
	info!(target = "docgrab.chrome", executable = %executable.display(), pid = ?child.id(), port, headless = options.headless, "browser launched");

	let deadline = tokio::time::Instant::now() + options.launch_timeout();
	let mut last_error = "endpoint not reachable".to_string();
	while tokio::time::Instant::now() < deadline {
		tokio::time::sleep(PROBE_INTERVAL).await;

		if let Ok(Some(status)) = child.try_wait() {
			return Err(Error::BrowserLaunch(format!(
				"browser exited before the DevTools endpoint came up ({status})"
			)));
		}

		match fetch_cdp_endpoint(port).await {
			Ok(endpoint) => {
				debug!(target = "docgrab.chrome", browser = endpoint.browser.as_deref().unwrap_or("unknown"), ws = %endpoint.web_socket_debugger_url, "endpoint ready");
				return Ok(ChromeProcess {
					child,
					port,
					endpoint,
					_profile: profile,
				});
			}
			Err(e) => last_error = e.to_string(),
		}
	}

	stop(&mut child).await;
	Err(Error::BrowserLaunch(format!(
		"DevTools endpoint not available on port {port} after {}ms: {last_error}",
		options.launch_timeout_ms
	)))
}

/// [`SessionFactory`] that launches a fresh local browser per session.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
	options: BrowserOptions,
}

impl ChromeLauncher {
	pub fn new(options: BrowserOptions) -> Self {
		Self { options }
	}
}

#[async_trait]
impl SessionFactory for ChromeLauncher {
	type Session = CdpSession;

	async fn open(&self) -> Result<CdpSession> {
		let process = launch_chrome(&self.options).await?;
		let (transport, message_rx) = WebSocketTransport::connect(&process.endpoint().web_socket_debugger_url).await?;
		let connection = Arc::new(Connection::new(transport.into_transport_parts(message_rx)));
		CdpSession::attach(connection, Some(process)).await
	}
}
