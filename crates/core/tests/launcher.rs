//! Browser process lifetime against a stand-in executable that never opens a
//! DevTools endpoint.
#![cfg(target_os = "linux")]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use docgrab::chrome::{ChromeLauncher, launch_chrome};
use docgrab::{BrowserOptions, Error, Orchestrator, PagePlan};
use tempfile::TempDir;

/// Writes a shell script that records its pid and then idles like a browser
/// stuck during startup.
fn stalled_browser(dir: &Path) -> (PathBuf, PathBuf) {
	let pid_file = dir.join("pid");
	let script = dir.join("fake-chrome");
	std::fs::write(&script, format!("#!/bin/sh\necho $$ > {}\nexec sleep 30\n", pid_file.display())).unwrap();
	std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
	(script, pid_file)
}

fn options(executable: PathBuf) -> BrowserOptions {
	BrowserOptions {
		executable: Some(executable),
		launch_timeout_ms: 15_000,
		..BrowserOptions::default()
	}
}

async fn wait_for_pid(pid_file: &Path) -> u32 {
	for _ in 0..100 {
		if let Ok(raw) = std::fs::read_to_string(pid_file) {
			if let Ok(pid) = raw.trim().parse() {
				return pid;
			}
		}
		tokio::time::sleep(Duration::from_millis(50)).await;
	}
	panic!("stand-in browser never wrote {}", pid_file.display());
}

/// `(state, pgrp)` from `/proc/<pid>/stat`, or `None` once the pid is gone.
fn stat(pid: &str) -> Option<(String, i32)> {
	let raw = std::fs::read_to_string(format!("/proc/{pid}/stat")).ok()?;
	let rest = &raw[raw.rfind(')')? + 1..];
	let fields: Vec<&str> = rest.split_whitespace().collect();
	Some((fields[0].to_string(), fields[2].parse().ok()?))
}

async fn assert_exits(pid: u32) {
	for _ in 0..100 {
		match stat(&pid.to_string()) {
			None => return,
			Some((state, _)) if state == "Z" || state == "X" => return,
			Some(_) => tokio::time::sleep(Duration::from_millis(50)).await,
		}
	}
	panic!("browser process {pid} outlived its launch");
}

#[tokio::test]
async fn deadline_during_launch_kills_browser() {
	let temp = TempDir::new().unwrap();
	let (script, pid_file) = stalled_browser(temp.path());
	let orchestrator = Orchestrator::new(ChromeLauncher::new(options(script)), PagePlan::default());

	let err = orchestrator.download(temp.path(), Duration::from_secs(2)).await.unwrap_err();

	match err {
		Error::Timeout { condition, .. } => assert_eq!(condition, "browser session"),
		other => panic!("expected timeout, got {other:?}"),
	}
	let pid = wait_for_pid(&pid_file).await;
	assert_exits(pid).await;
}

#[tokio::test]
async fn browser_shares_the_callers_process_group() {
	let temp = TempDir::new().unwrap();
	let (script, pid_file) = stalled_browser(temp.path());
	let opts = options(script);
	let launch = tokio::spawn(async move { launch_chrome(&opts).await.map(|_| ()) });

	let pid = wait_for_pid(&pid_file).await;
	let (_, child_group) = stat(&pid.to_string()).unwrap();
	let (_, own_group) = stat("self").unwrap();
	assert_eq!(child_group, own_group);

	launch.abort();
	assert!(launch.await.unwrap_err().is_cancelled());
	assert_exits(pid).await;
}
