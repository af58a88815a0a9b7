//! Chrome/Chromium executable discovery.

use std::path::PathBuf;

/// Returns the first installed Chromium-family browser.
///
/// Bare command names are resolved through `PATH`; absolute candidates only
/// need to exist.
pub fn find_chrome_executable() -> Option<PathBuf> {
	let candidates: Vec<String> = if cfg!(target_os = "macos") {
		vec![
			"/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
			"/Applications/Chromium.app/Contents/MacOS/Chromium",
			"/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
			"/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
		]
		.into_iter()
		.map(str::to_string)
		.collect()
	} else if cfg!(target_os = "windows") {
		windows_candidates()
	} else {
		vec![
			"google-chrome-stable",
			"google-chrome",
			"chromium",
			"chromium-browser",
			"headless_shell",
			"brave-browser",
			"microsoft-edge",
			"/usr/bin/google-chrome-stable",
			"/usr/bin/google-chrome",
			"/usr/bin/chromium",
			"/usr/bin/chromium-browser",
			"/snap/bin/chromium",
			"/opt/google/chrome/chrome",
		]
		.into_iter()
		.map(str::to_string)
		.collect()
	};

	candidates.into_iter().find_map(|candidate| resolve_candidate(&candidate))
}

fn resolve_candidate(candidate: &str) -> Option<PathBuf> {
	if candidate.starts_with('/') || candidate.contains('\\') || candidate.contains(':') {
		let path = PathBuf::from(candidate);
		path.exists().then_some(path)
	} else {
		which::which(candidate).ok()
	}
}

fn windows_candidates() -> Vec<String> {
	let mut roots: Vec<PathBuf> = ["PROGRAMFILES", "PROGRAMFILES(X86)", "LOCALAPPDATA"]
		.into_iter()
		.filter_map(|key| std::env::var(key).ok())
		.map(PathBuf::from)
		.collect();
	if roots.is_empty() {
		roots.push(PathBuf::from(r"C:\Program Files"));
		roots.push(PathBuf::from(r"C:\Program Files (x86)"));
	}

	let suffixes: &[&[&str]] = &[
		&["Google", "Chrome", "Application", "chrome.exe"],
		&["Chromium", "Application", "chrome.exe"],
		&["Microsoft", "Edge", "Application", "msedge.exe"],
		&["BraveSoftware", "Brave-Browser", "Application", "brave.exe"],
	];

	let mut candidates: Vec<String> = roots
		.iter()
		.flat_map(|root| suffixes.iter().map(move |suffix| suffix.iter().fold(root.clone(), |path, part| path.join(part))))
		.map(|path| path.to_string_lossy().into_owned())
		.collect();
	candidates.extend(["chrome.exe", "msedge.exe", "brave.exe", "chromium.exe"].map(str::to_string));
	candidates
}
