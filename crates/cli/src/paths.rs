//! Default on-disk locations for CLI state.

use std::ffi::OsString;
use std::path::PathBuf;

const APP_DIR: &str = "stavax";
const STORAGE_FILE: &str = "storage.json";

/// Device-id storage file: `$XDG_CONFIG_HOME/stavax/storage.json`, falling
/// back to `$HOME/.config` and then the working directory.
pub fn default_storage_path() -> PathBuf {
	storage_path_from(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
}

fn storage_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> PathBuf {
	let config_home = xdg_config_home
		.filter(|dir| !dir.is_empty())
		.map(PathBuf::from)
		.or_else(|| home.map(|h| PathBuf::from(h).join(".config")))
		.unwrap_or_else(|| PathBuf::from("."));

	config_home.join(APP_DIR).join(STORAGE_FILE)
}
