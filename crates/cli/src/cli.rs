use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "docgrab")]
#[command(about = "Download, extract and tidy the FFESSM MFT document bundle")]
#[command(version)]
pub struct Cli {
	/// Enable debug logging
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	#[command(subcommand)]
	pub command: Commands,
}

impl Cli {
	/// Whether any flag on the command line asks for debug output.
	pub fn debug_requested(&self) -> bool {
		self.verbose > 0
			|| match &self.command {
				Commands::Download(args) => args.debug,
			}
	}
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Download every document as one archive, extract it, then delete the archive
	Download(DownloadArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct DownloadArgs {
	/// Directory receiving the documents [default: ./downloads]
	#[arg(long, value_name = "DIR")]
	pub output: Option<PathBuf>,

	/// Enable debug logging (also enabled by DOCGRAB_DEBUG)
	#[arg(long)]
	pub debug: bool,

	/// JSON configuration file
	#[arg(long, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Show the browser window instead of running headless
	#[arg(long)]
	pub headful: bool,

	/// Chrome/Chromium executable to launch
	#[arg(long, value_name = "PATH")]
	pub browser: Option<PathBuf>,

	/// Documents page to open
	#[arg(long, value_name = "URL")]
	pub url: Option<String>,
}
