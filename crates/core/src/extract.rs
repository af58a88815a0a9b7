//! Archive extraction with entry-name sanitization and containment checks.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Mode for entries that carry no Unix permissions.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// What an extraction wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractReport {
	pub files: usize,
	pub directories: usize,
	pub bytes: u64,
}

/// Extracts the zip at `archive` under `root`.
///
/// Stops at the first failing entry; entries already written stay in place.
pub fn extract_archive(archive: &Path, root: &Path) -> Result<ExtractReport> {
	let file = File::open(archive).map_err(|e| Error::ArchiveOpen {
		path: archive.to_path_buf(),
		source: e.into(),
	})?;
	let report = extract_from(io::BufReader::new(file), archive, root)?;
	info!(
		target = "docgrab.extract",
		archive = %archive.display(),
		root = %root.display(),
		files = report.files,
		directories = report.directories,
		bytes = report.bytes,
		"archive extracted"
	);
	Ok(report)
}

/// Extracts an already opened archive. `source` only labels errors.
pub fn extract_from<R: Read + Seek>(reader: R, source: &Path, root: &Path) -> Result<ExtractReport> {
	let mut archive = zip::ZipArchive::new(reader).map_err(|e| Error::ArchiveOpen {
		path: source.to_path_buf(),
		source: e,
	})?;

	let mut report = ExtractReport::default();
	for index in 0..archive.len() {
		let mut entry = archive.by_index(index).map_err(|source| Error::EntryOpen { index, source })?;

		let name = sanitize_entry_name(entry.name_raw());
		let target = resolve_entry_path(root, &name)?;

		if entry.is_dir() || name.ends_with('/') {
			fs::create_dir_all(&target).map_err(|source| Error::DirectoryCreate {
				path: target.clone(),
				source,
			})?;
			debug!(target = "docgrab.extract", path = %target.display(), "directory");
			report.directories += 1;
			continue;
		}

		if let Some(parent) = target.parent() {
			fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
				path: parent.to_path_buf(),
				source,
			})?;
		}

		let mode = entry.unix_mode().map(|mode| mode & 0o7777).unwrap_or(DEFAULT_FILE_MODE);
		let mut out = create_with_mode(&target, mode)?;
		let copied = io::copy(&mut entry, &mut out).map_err(|source| Error::Copy {
			path: target.clone(),
			source,
		})?;
		debug!(target = "docgrab.extract", file = %target.display(), bytes = copied, mode = %format!("{mode:o}"), "file");

		report.files += 1;
		report.bytes += copied;
	}

	Ok(report)
}

fn create_with_mode(path: &Path, mode: u32) -> Result<File> {
	let mut options = OpenOptions::new();
	options.create(true).truncate(true).write(true);

	#[cfg(unix)]
	{
		use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

		options.mode(mode);
		let file = options.open(path).map_err(|source| Error::FileOpen {
			path: path.to_path_buf(),
			source,
		})?;
		// open() applies the mode only to new files, and the umask narrows it
		file.set_permissions(fs::Permissions::from_mode(mode)).map_err(|source| Error::FileOpen {
			path: path.to_path_buf(),
			source,
		})?;
		Ok(file)
	}

	#[cfg(not(unix))]
	{
		let _ = mode;
		options.open(path).map_err(|source| Error::FileOpen {
			path: path.to_path_buf(),
			source,
		})
	}
}

/// Turns raw entry-name bytes into a `/`-separated relative name.
///
/// Invalid UTF-8 sequences and control characters are dropped, and `\` is
/// read as a separator.
pub fn sanitize_entry_name(raw: &[u8]) -> String {
	let mut name = String::with_capacity(raw.len());
	for chunk in raw.utf8_chunks() {
		for ch in chunk.valid().chars() {
			match ch {
				'\\' => name.push('/'),
				c if c.is_control() => {}
				c => name.push(c),
			}
		}
	}
	name
}

/// Resolves a sanitized entry name under `root`.
///
/// Absolute names, drive prefixes and `..` climbing above the root are
/// rejected with [`Error::UnsafeEntry`]; `.` and empty components vanish.
pub fn resolve_entry_path(root: &Path, name: &str) -> Result<PathBuf> {
	let unsafe_entry = || Error::UnsafeEntry {
		entry: name.to_string(),
		root: root.to_path_buf(),
	};

	if has_drive_prefix(name) {
		return Err(unsafe_entry());
	}

	let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
	for component in Path::new(name).components() {
		match component {
			Component::Normal(part) => parts.push(part),
			Component::CurDir => {}
			Component::ParentDir => {
				if parts.pop().is_none() {
					return Err(unsafe_entry());
				}
			}
			Component::RootDir | Component::Prefix(_) => return Err(unsafe_entry()),
		}
	}
	if parts.is_empty() {
		return Err(unsafe_entry());
	}

	let resolved = parts.iter().fold(root.to_path_buf(), |path, part| path.join(part));
	if !resolved.starts_with(root) {
		return Err(unsafe_entry());
	}
	Ok(resolved)
}

fn has_drive_prefix(name: &str) -> bool {
	let bytes = name.as_bytes();
	bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
