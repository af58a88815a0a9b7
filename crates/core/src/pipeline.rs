//! Download, extract, clean up.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info};

use crate::browser::SessionFactory;
use crate::cleanup::remove_download;
use crate::config::PipelineConfig;
use crate::error::Error;
use crate::extract::{ExtractReport, extract_archive};
use crate::orchestrator::Orchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
	Download,
	Extract,
	Cleanup,
}

impl fmt::Display for Stage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Stage::Download => "download",
			Stage::Extract => "extract",
			Stage::Cleanup => "cleanup",
		})
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
	Idle,
	Downloading,
	Extracting,
	CleaningUp,
	Done,
	Failed(Stage),
}

/// A component error tagged with the stage that produced it.
#[derive(Debug, Error)]
#[error("{stage} stage failed")]
pub struct StageError {
	pub stage: Stage,
	#[source]
	pub source: Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
	/// Where the archive was downloaded before it was removed.
	pub archive: PathBuf,
	pub output_dir: PathBuf,
	pub extracted: ExtractReport,
}

pub struct Pipeline<F> {
	config: PipelineConfig,
	orchestrator: Orchestrator<F>,
	state: RunState,
}

impl<F: SessionFactory> Pipeline<F> {
	pub fn new(config: PipelineConfig, factory: F) -> Self {
		let orchestrator = Orchestrator::new(factory, config.page.clone());
		Self {
			config,
			orchestrator,
			state: RunState::Idle,
		}
	}

	pub fn state(&self) -> RunState {
		self.state
	}

	pub fn config(&self) -> &PipelineConfig {
		&self.config
	}

	/// Runs every stage in order and stops at the first failure.
	pub async fn run(&mut self) -> Result<RunReport, StageError> {
		let output_dir = self.config.output_dir.clone();

		self.enter(RunState::Downloading);
		let downloaded = self.download(&output_dir).await;
		let archive = self.stage(Stage::Download, downloaded)?;

		self.enter(RunState::Extracting);
		let extracted = {
			let (archive, root) = (archive.clone(), output_dir.clone());
			let joined = tokio::task::spawn_blocking(move || extract_archive(&archive, &root)).await;
			self.stage(Stage::Extract, joined.map_err(Error::from).and_then(|result| result))?
		};

		self.enter(RunState::CleaningUp);
		self.stage(Stage::Cleanup, remove_download(&archive))?;

		self.enter(RunState::Done);
		Ok(RunReport {
			archive,
			output_dir,
			extracted,
		})
	}

	async fn download(&self, output_dir: &std::path::Path) -> crate::Result<PathBuf> {
		std::fs::create_dir_all(output_dir).map_err(|source| Error::DirectoryCreate {
			path: output_dir.to_path_buf(),
			source,
		})?;
		self.orchestrator.download(output_dir, self.config.deadline()).await
	}

	fn enter(&mut self, state: RunState) {
		info!(target = "docgrab.pipeline", from = ?self.state, to = ?state, "state transition");
		self.state = state;
	}

	fn stage<T>(&mut self, stage: Stage, result: crate::Result<T>) -> Result<T, StageError> {
		result.map_err(|source| {
			error!(target = "docgrab.pipeline", %stage, error = %source, "stage failed");
			self.state = RunState::Failed(stage);
			StageError { stage, source }
		})
	}
}
