//! Removal of the downloaded archive after extraction.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Removes `path` whether it is a file or a directory tree.
///
/// A path that does not exist counts as removed.
pub fn remove_download(path: &Path) -> Result<()> {
	let metadata = match fs::symlink_metadata(path) {
		Ok(metadata) => metadata,
		Err(e) if e.kind() == ErrorKind::NotFound => {
			debug!(target = "docgrab.cleanup", path = %path.display(), "nothing to remove");
			return Ok(());
		}
		Err(source) => {
			return Err(Error::Cleanup {
				path: path.to_path_buf(),
				source,
			});
		}
	};

	let removed = if metadata.is_dir() {
		fs::remove_dir_all(path)
	} else {
		fs::remove_file(path)
	};
	match removed {
		Ok(()) => {
			info!(target = "docgrab.cleanup", path = %path.display(), "archive removed");
			Ok(())
		}
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
		Err(source) => Err(Error::Cleanup {
			path: path.to_path_buf(),
			source,
		}),
	}
}
