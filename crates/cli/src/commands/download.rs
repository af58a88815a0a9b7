use anyhow::{Context, Result, bail};
use docgrab::chrome::ChromeLauncher;
use docgrab::{Pipeline, PipelineConfig};
use tracing::{info, warn};

use crate::cli::DownloadArgs;

/// Builds the run configuration: config file (or defaults), then flags.
pub fn resolve_config(args: &DownloadArgs) -> Result<PipelineConfig> {
	let mut config = match &args.config {
		Some(path) => PipelineConfig::from_file(path).with_context(|| format!("failed to load config {}", path.display()))?,
		None => PipelineConfig::default(),
	};

	if let Some(output) = &args.output {
		config = config.with_output_dir(output);
	}
	if let Some(url) = &args.url {
		config = config.with_page_url(url);
	}
	if args.headful {
		config = config.with_headless(false);
	}
	config = config.with_executable(args.browser.clone());

	config.validate().context("invalid command-line options")?;
	Ok(config)
}

pub async fn run(args: DownloadArgs) -> Result<()> {
	let config = resolve_config(&args)?;
	info!(
		target = "docgrab",
		url = %config.page.url,
		output = %config.output_dir.display(),
		deadline_ms = config.deadline_ms,
		"starting download"
	);

	let launcher = ChromeLauncher::new(config.browser.clone());
	let mut pipeline = Pipeline::new(config, launcher);
	// dropping the run kills the browser it launched
	let report = tokio::select! {
		report = pipeline.run() => report.context("failed to acquire documents")?,
		_ = interrupted() => bail!("interrupted"),
	};

	info!(
		target = "docgrab",
		files = report.extracted.files,
		bytes = report.extracted.bytes,
		output = %report.output_dir.display(),
		"documents ready"
	);
	println!("{}", report.output_dir.display());
	Ok(())
}

async fn interrupted() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		warn!(target = "docgrab", error = %e, "cannot listen for Ctrl-C");
		std::future::pending::<()>().await;
	}
	warn!(target = "docgrab", "interrupted, stopping browser");
}
