mod device;
mod session;
mod smart_session;

use std::path::PathBuf;
use std::sync::Arc;

use stavax::{Config, FileStorage, StavaxConfig, resolve_config};

use crate::cli::{Cli, Commands, SessionAction, SmartSessionAction};
use crate::error::{CliError, Result};
use crate::output::OutputFormat;
use crate::paths;

/// Shared state resolved once from the global flags.
pub struct CommandContext {
	raw: StavaxConfig,
	storage_path: PathBuf,
	format: OutputFormat,
}

impl CommandContext {
	/// Loads the config file (if any) and applies the flag overrides.
	pub fn from_cli(cli: &Cli) -> Result<Self> {
		let mut raw = match &cli.config {
			Some(path) => StavaxConfig::from_file(path).map_err(|source| CliError::ConfigFile {
				path: path.clone(),
				source,
			})?,
			None => StavaxConfig::default(),
		};
		raw.merge(StavaxConfig {
			project_id: cli.project_id.clone(),
			api_url: cli.api_url.clone(),
			..StavaxConfig::default()
		});

		let storage_path = cli.storage.clone().unwrap_or_else(paths::default_storage_path);
		tracing::debug!(storage = %storage_path.display(), "resolved CLI context");

		Ok(Self {
			raw,
			storage_path,
			format: cli.format,
		})
	}

	pub fn raw_config(&self) -> &StavaxConfig {
		&self.raw
	}

	/// Fully resolved config; fails without a project id.
	pub fn config(&self) -> Result<Config> {
		Ok(resolve_config(&self.raw)?)
	}

	pub fn storage(&self) -> Arc<FileStorage> {
		Arc::new(FileStorage::new(self.storage_path.clone()))
	}

	pub fn format(&self) -> OutputFormat {
		self.format
	}
}

/// Envelope name for `command`.
pub fn command_name(command: &Commands) -> &'static str {
	match command {
		Commands::Session(SessionAction::New { .. }) => "session new",
		Commands::Link { .. } => "link",
		Commands::DeviceId => "device-id",
		Commands::SmartSession(SmartSessionAction::Find { .. }) => "smart-session find",
	}
}

pub async fn dispatch(cli: Cli) -> Result<()> {
	let ctx = CommandContext::from_cli(&cli)?;

	match cli.command {
		Commands::Session(SessionAction::New {
			path,
			interact,
			uri,
			open,
		}) => session::new(&ctx, session::NewSession { path, interact, uri }, open).await,
		Commands::Link { session_id } => session::link(&ctx, session_id),
		Commands::DeviceId => device::show(&ctx),
		Commands::SmartSession(SmartSessionAction::Find {
			from,
			chain_id,
			to,
			value,
			data,
		}) => {
			let query = smart_session::parse_query(&from, chain_id, &to, &value, &data)?;
			smart_session::find(&ctx, query).await
		}
	}
}
