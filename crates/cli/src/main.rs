use clap::Parser;
use docgrab_cli::{cli::Cli, commands, logging};
use tracing::error;

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.debug_requested());

	if let Err(err) = commands::dispatch(cli.command).await {
		error!(target = "docgrab", error = %format!("{err:#}"), "command failed");
		eprintln!("Error: {err:#}");
		std::process::exit(1);
	}
}
