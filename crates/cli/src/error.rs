use std::path::PathBuf;

use thiserror::Error;

use crate::output::{CommandError, ErrorCode};

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("invalid {field}: {reason}")]
	InvalidInput { field: &'static str, reason: String },

	#[error("failed to read config {path}: {source}")]
	ConfigFile {
		path: PathBuf,
		#[source]
		source: stavax::Error,
	},

	#[error(transparent)]
	Stavax(#[from] stavax::Error),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl CliError {
	pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
		CliError::InvalidInput {
			field,
			reason: reason.into(),
		}
	}

	/// Convert this error to a CommandError for structured output
	pub fn to_command_error(&self) -> CommandError {
		let (code, message, details) = match self {
			CliError::InvalidInput { field, reason } => (
				ErrorCode::InvalidInput,
				format!("Invalid {field}: {reason}"),
				Some(serde_json::json!({ "field": field })),
			),
			CliError::ConfigFile { path, source } => (
				ErrorCode::ConfigError,
				format!("Failed to read config {}: {source}", path.display()),
				Some(serde_json::json!({ "path": path })),
			),
			CliError::Stavax(err) => (classify_sdk_error(err), err.to_string(), None),
			CliError::Io(err) => (ErrorCode::IoError, err.to_string(), None),
			CliError::Json(err) => (ErrorCode::InternalError, format!("JSON error: {err}"), None),
		};

		CommandError {
			code,
			message,
			details,
		}
	}
}

fn classify_sdk_error(err: &stavax::Error) -> ErrorCode {
	use stavax::Error;

	match err {
		Error::Configuration(_) => ErrorCode::ConfigError,
		Error::SessionCreation(_) => ErrorCode::SessionError,
		Error::Handoff(_) => ErrorCode::HandoffError,
		Error::SmartSession(_) => ErrorCode::SmartSessionError,
		Error::Http(_) | Error::Timeout(_) => ErrorCode::NetworkError,
		Error::Io(_) | Error::Storage(_) => ErrorCode::IoError,
		_ => ErrorCode::InternalError,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sdk_errors_map_to_stable_codes() {
		let cases = [
			(stavax::Error::Configuration("projectId is required".into()), ErrorCode::ConfigError),
			(stavax::Error::SessionCreation("503".into()), ErrorCode::SessionError),
			(stavax::Error::Handoff("no opener".into()), ErrorCode::HandoffError),
			(stavax::Error::Timeout("slow".into()), ErrorCode::NetworkError),
			(stavax::Error::ChannelClosed, ErrorCode::InternalError),
		];
		for (err, code) in cases {
			assert_eq!(CliError::from(err).to_command_error().code, code);
		}
	}

	#[test]
	fn invalid_input_names_the_field() {
		let err = CliError::invalid("from", "not an address");
		let cmd = err.to_command_error();
		assert_eq!(cmd.code, ErrorCode::InvalidInput);
		assert_eq!(cmd.message, "Invalid from: not an address");
		assert_eq!(cmd.details.unwrap()["field"], "from");
	}
}
