//! Per-browser device identity.
//!
//! Every account API request carries a device id so the wallet host can tell
//! SDK instances apart. The id is generated on first use, persisted through a
//! [`Storage`], and cached for the lifetime of the [`DeviceIdentity`].
//!
//! # First-write race
//!
//! Two instances sharing one storage may both miss on first read and generate
//! different candidates. Persistence goes through [`Storage::set_if_absent`],
//! so the first write wins and every caller adopts the stored value rather
//! than its own candidate.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::error::Result;
use crate::storage::Storage;

/// Storage key of the persisted device id.
pub const DEVICE_ID_KEY: &str = "stavax_account_device_id";

/// Length of a generated device id.
pub const DEVICE_ID_LEN: usize = 64;

/// Lazily generated, persisted device identifier.
pub struct DeviceIdentity {
	storage: Arc<dyn Storage>,
	cached: Mutex<Option<String>>,
}

impl DeviceIdentity {
	pub fn new(storage: Arc<dyn Storage>) -> Self {
		Self {
			storage,
			cached: Mutex::new(None),
		}
	}

	/// Returns the device id, generating and persisting it on first use.
	pub fn get(&self) -> Result<String> {
		let mut cached = self.cached.lock();
		if let Some(id) = cached.as_ref() {
			return Ok(id.clone());
		}

		let id = match self.storage.get(DEVICE_ID_KEY)? {
			Some(existing) if !existing.is_empty() => existing,
			Some(_) => {
				let fresh = random_token(DEVICE_ID_LEN);
				self.storage.set(DEVICE_ID_KEY, &fresh)?;
				fresh
			}
			None => {
				let candidate = random_token(DEVICE_ID_LEN);
				let stored = self.storage.set_if_absent(DEVICE_ID_KEY, &candidate)?;
				if stored != candidate {
					tracing::debug!("device id written concurrently, adopting stored value");
				}
				stored
			}
		};

		*cached = Some(id.clone());
		Ok(id)
	}

	/// Storage backing this identity.
	pub fn storage(&self) -> &Arc<dyn Storage> {
		&self.storage
	}
}

impl std::fmt::Debug for DeviceIdentity {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DeviceIdentity")
			.field("cached", &self.cached.lock().is_some())
			.finish()
	}
}

/// Random alphanumeric token of `len` characters.
pub(crate) fn random_token(len: usize) -> String {
	rand::thread_rng()
		.sample_iter(&Alphanumeric)
		.take(len)
		.map(char::from)
		.collect()
}
