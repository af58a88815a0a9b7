//! Run configuration.
//!
//! Everything a run needs is carried by an explicit [`PipelineConfig`]. It
//! deserializes from camelCase JSON with every field optional, so a config
//! file only has to name what it changes:
//!
//! ```json
//! {
//!   "outputDir": "/srv/mft",
//!   "page": { "settleMs": 8000 },
//!   "browser": { "headless": false }
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::Selector;
use crate::error::{Error, Result};

pub const DEFAULT_PAGE_URL: &str = "https://mft.ffessm.fr/pages/documents";
pub const DEFAULT_SELECT_ALL_ID: &str = "k-grid0-select-all";
pub const DEFAULT_DOWNLOAD_LABEL: &str = "Télécharger les éléments sélectionnés";
pub const DEFAULT_USER_AGENT: &str =
	"Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";
pub const DEFAULT_DEADLINE_MS: u64 = 60_000;
pub const DEFAULT_SETTLE_MS: u64 = 5_000;
pub const DEFAULT_LAUNCH_TIMEOUT_MS: u64 = 15_000;

/// Complete configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
	/// Directory receiving the archive and the extracted tree.
	pub output_dir: PathBuf,
	/// Budget for the whole browser phase, from launch to download completion.
	pub deadline_ms: u64,
	pub page: PagePlan,
	pub browser: BrowserOptions,
}

impl Default for PipelineConfig {
	fn default() -> Self {
		Self {
			output_dir: default_output_dir(),
			deadline_ms: DEFAULT_DEADLINE_MS,
			page: PagePlan::default(),
			browser: BrowserOptions::default(),
		}
	}
}

impl PipelineConfig {
	/// Loads a JSON config file; missing fields keep their defaults.
	pub fn from_file(path: &Path) -> Result<Self> {
		let raw = std::fs::read_to_string(path).map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
		let config: Self = serde_json::from_str(&raw).map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if self.deadline_ms == 0 {
			return Err(Error::Config("deadlineMs must be greater than zero".into()));
		}
		if !(self.page.url.starts_with("http://") || self.page.url.starts_with("https://")) {
			return Err(Error::Config(format!("page url must be http(s), got '{}'", self.page.url)));
		}
		if self.output_dir.as_os_str().is_empty() {
			return Err(Error::Config("outputDir must not be empty".into()));
		}
		Ok(())
	}

	pub fn deadline(&self) -> Duration {
		Duration::from_millis(self.deadline_ms)
	}

	pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.output_dir = dir.into();
		self
	}

	pub fn with_deadline(mut self, deadline: Duration) -> Self {
		self.deadline_ms = deadline.as_millis() as u64;
		self
	}

	pub fn with_page_url(mut self, url: impl Into<String>) -> Self {
		self.page.url = url.into();
		self
	}

	pub fn with_headless(mut self, headless: bool) -> Self {
		self.browser.headless = headless;
		self
	}

	pub fn with_executable(mut self, executable: Option<PathBuf>) -> Self {
		if executable.is_some() {
			self.browser.executable = executable;
		}
		self
	}
}

/// What to do on the portal page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PagePlan {
	pub url: String,
	/// Pause after navigation so the document grid can render.
	pub settle_ms: u64,
	pub select_all: Selector,
	pub download_selected: Selector,
}

impl Default for PagePlan {
	fn default() -> Self {
		Self {
			url: DEFAULT_PAGE_URL.to_string(),
			settle_ms: DEFAULT_SETTLE_MS,
			select_all: Selector::Id(DEFAULT_SELECT_ALL_ID.to_string()),
			download_selected: Selector::ButtonText(DEFAULT_DOWNLOAD_LABEL.to_string()),
		}
	}
}

impl PagePlan {
	pub fn settle_delay(&self) -> Duration {
		Duration::from_millis(self.settle_ms)
	}
}

/// How the browser process is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserOptions {
	/// Explicit Chrome/Chromium binary; discovered on the system when unset.
	pub executable: Option<PathBuf>,
	pub headless: bool,
	pub user_agent: Option<String>,
	/// How long to wait for the DevTools endpoint after spawning.
	pub launch_timeout_ms: u64,
}

impl Default for BrowserOptions {
	fn default() -> Self {
		Self {
			executable: None,
			headless: true,
			user_agent: Some(DEFAULT_USER_AGENT.to_string()),
			launch_timeout_ms: DEFAULT_LAUNCH_TIMEOUT_MS,
		}
	}
}

impl BrowserOptions {
	pub fn launch_timeout(&self) -> Duration {
		Duration::from_millis(self.launch_timeout_ms)
	}
}

/// `<cwd>/downloads`, or a relative `downloads` when the cwd is unreadable.
pub fn default_output_dir() -> PathBuf {
	std::env::current_dir()
		.map(|cwd| cwd.join("downloads"))
		.unwrap_or_else(|_| PathBuf::from("downloads"))
}
