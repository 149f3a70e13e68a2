//! Key/value persistence for SDK state.
//!
//! The browser build persists into `localStorage`; native builds use
//! [`FileStorage`], a single JSON object on disk. [`MemoryStorage`] backs tests
//! and short-lived processes.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::Mutex;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// String key/value store shared by all SDK components of one page.
pub trait Storage: Send + Sync {
	/// Reads the value stored under `key`.
	fn get(&self, key: &str) -> Result<Option<String>>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set(&self, key: &str, value: &str) -> Result<()>;

	/// Removes `key`. Missing keys are not an error.
	fn remove(&self, key: &str) -> Result<()>;

	/// Stores `value` only when `key` is absent.
	///
	/// Returns the value stored after the call: `value` if this call won the
	/// write, otherwise the value that was already present.
	fn set_if_absent(&self, key: &str, value: &str) -> Result<String>;
}

/// In-memory [`Storage`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
	entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Storage for MemoryStorage {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.entries.lock().get(key).cloned())
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.entries.lock().insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.entries.lock().remove(key);
		Ok(())
	}

	fn set_if_absent(&self, key: &str, value: &str) -> Result<String> {
		let mut entries = self.entries.lock();
		Ok(entries.entry(key.to_string()).or_insert_with(|| value.to_string()).clone())
	}
}

/// [`Storage`] persisted as a JSON object in a single file.
///
/// Every operation re-reads the file so that separate handles, and separate
/// processes, on the same path observe each other's writes. Mutations hold an
/// exclusive OS lock on a sibling `.lock` file for the whole
/// read-modify-write, and replace the file atomically through a temporary
/// file in the same directory. A missing file is empty; a file that does not
/// parse is an error.
#[derive(Debug)]
pub struct FileStorage {
	path: PathBuf,
}

impl FileStorage {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Path of the backing JSON file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load(&self) -> Result<BTreeMap<String, String>> {
		let content = match fs::read_to_string(&self.path) {
			Ok(content) => content,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
			Err(e) => return Err(e.into()),
		};
		serde_json::from_str(&content)
			.map_err(|e| Error::Storage(format!("{} is not a JSON object of strings: {}", self.path.display(), e)))
	}

	fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
		let dir = self.dir();
		let mut tmp = NamedTempFile::new_in(dir)?;
		tmp.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
		tmp.as_file().sync_all()?;
		tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
		Ok(())
	}

	fn dir(&self) -> &Path {
		match self.path.parent() {
			Some(parent) if !parent.as_os_str().is_empty() => parent,
			_ => Path::new("."),
		}
	}

	/// Runs `update` on the current entries while holding the exclusive lock.
	fn locked<T>(&self, update: impl FnOnce(&mut BTreeMap<String, String>) -> Update<T>) -> Result<T> {
		fs::create_dir_all(self.dir())?;
		let mut lock_path = self.path.as_os_str().to_owned();
		lock_path.push(".lock");
		let lock = OpenOptions::new()
			.read(true)
			.write(true)
			.create(true)
			.truncate(false)
			.open(PathBuf::from(lock_path))?;
		FileExt::lock_exclusive(&lock)?;

		let result = self.load().and_then(|mut entries| match update(&mut entries) {
			Update::Write(value) => self.save(&entries).map(|()| value),
			Update::Keep(value) => Ok(value),
		});

		let _ = FileExt::unlock(&lock);
		result
	}
}

enum Update<T> {
	Write(T),
	Keep(T),
}

impl Storage for FileStorage {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.load()?.remove(key))
	}

	fn set(&self, key: &str, value: &str) -> Result<()> {
		self.locked(|entries| {
			entries.insert(key.to_string(), value.to_string());
			Update::Write(())
		})
	}

	fn remove(&self, key: &str) -> Result<()> {
		self.locked(|entries| match entries.remove(key) {
			Some(_) => Update::Write(()),
			None => Update::Keep(()),
		})
	}

	fn set_if_absent(&self, key: &str, value: &str) -> Result<String> {
		self.locked(|entries| match entries.get(key) {
			Some(existing) => Update::Keep(existing.clone()),
			None => {
				entries.insert(key.to_string(), value.to_string());
				Update::Write(value.to_string())
			}
		})
	}
}
