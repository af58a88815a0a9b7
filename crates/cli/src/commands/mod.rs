mod download;

use anyhow::Result;

use crate::cli::Commands;

pub use download::resolve_config;

pub async fn dispatch(command: Commands) -> Result<()> {
	match command {
		Commands::Download(args) => download::run(args).await,
	}
}
