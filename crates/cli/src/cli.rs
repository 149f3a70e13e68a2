use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "stavax")]
#[command(about = "Stavax Account CLI - wallet sessions and bot links from the command line")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Output format: json (default) or text
	#[arg(short = 'f', long, global = true, value_enum, default_value = "json")]
	pub format: OutputFormat,

	/// JSON config file using the SDK option names (projectId, apiURL, ...)
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Project id, overrides the config file
	#[arg(long, global = true, value_name = "ID")]
	pub project_id: Option<String>,

	/// Account API endpoint, overrides the config file
	#[arg(long, global = true, value_name = "URL")]
	pub api_url: Option<String>,

	/// File persisting the device id [default: $XDG_CONFIG_HOME/stavax/storage.json]
	#[arg(long, global = true, value_name = "FILE")]
	pub storage: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Wallet session management
	#[command(subcommand)]
	Session(SessionAction),

	/// Print the bot link starting an existing session
	Link {
		/// Session id
		session_id: String,
	},

	/// Print the persisted device id, generating it on first use
	DeviceId,

	/// Pre-authorized smart sessions
	#[command(subcommand)]
	SmartSession(SmartSessionAction),
}

#[derive(Subcommand, Debug)]
pub enum SessionAction {
	/// Register a new session and print it with its bot link
	New {
		/// Screen the bot opens on
		#[arg(long, value_name = "SCREEN")]
		path: Option<String>,

		/// Mark the session as opened for confirming a pending request
		#[arg(long)]
		interact: bool,

		/// WalletConnect pairing URI carried by the session
		#[arg(long, value_name = "URI")]
		uri: Option<String>,

		/// Open the bot link with the system opener
		#[arg(long)]
		open: bool,
	},
}

#[derive(Subcommand, Debug)]
pub enum SmartSessionAction {
	/// Look up a smart session covering a transaction
	Find {
		/// Sender address
		#[arg(long)]
		from: String,

		#[arg(long)]
		chain_id: u64,

		/// Recipient address
		#[arg(long)]
		to: String,

		/// Value in wei (decimal or 0x-prefixed hex)
		#[arg(long, default_value = "0")]
		value: String,

		/// Call data as 0x-prefixed hex
		#[arg(long, default_value = "0x")]
		data: String,
	},
}
