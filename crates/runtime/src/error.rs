//! Error types for the Stavax account SDK.

use thiserror::Error;

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the wallet host.
#[derive(Debug, Error)]
pub enum Error {
	/// Required configuration is missing or invalid.
	///
	/// Not retryable until the caller fixes its setup.
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// The wallet host could not register a session.
	///
	/// Recoverable: the triggering user action may be retried.
	#[error("Failed to create wallet session: {0}. Retry the action that opened the wallet.")]
	SessionCreation(String),

	/// The connector announced a pairing URI without a URI.
	#[error("Connector emitted display_uri without a pairing URI")]
	MissingUri,

	/// Pre-authorized submission failed while the fail-safe fallback is disabled.
	#[error("Smart session transaction failed: {0}")]
	SmartSession(String),

	/// The wallet host UI could not be presented.
	#[error("Failed to open wallet host: {0}")]
	Handoff(String),

	/// Injected-provider method without a relay or local handler.
	#[error("Unsupported provider method: {0}")]
	UnsupportedMethod(String),

	/// HTTP transport or status failure.
	#[error("HTTP error: {0}")]
	Http(String),

	/// Timeout waiting for an operation.
	#[error("Timeout: {0}")]
	Timeout(String),

	/// Error reported by the wallet host in a provider reply.
	#[error("Wallet host error: {message}")]
	Remote {
		/// Human-readable message from the host.
		message: String,
		/// Raw reply payload.
		data: serde_json::Value,
	},

	/// Failure reported by the wallet-pairing connector.
	#[error("Connector error: {0}")]
	Connector(String),

	/// Failure reported by the chain client.
	#[error("Chain client error: {0}")]
	Chain(String),

	/// Channel closed unexpectedly.
	#[error("Channel closed unexpectedly")]
	ChannelClosed,

	/// Malformed message on a postMessage channel.
	#[error("Protocol error: {0}")]
	ProtocolError(String),

	/// Persisted state exists but cannot be used.
	#[error("Storage error: {0}")]
	Storage(String),

	/// I/O error.
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Returns true when retrying the triggering action may succeed.
	pub fn is_retryable(&self) -> bool {
		matches!(
			self,
			Error::SessionCreation(_) | Error::Http(_) | Error::Timeout(_) | Error::Handoff(_) | Error::ChannelClosed
		)
	}

	/// Returns true if this is a timeout error.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout(_))
	}

	/// Returns true if the caller's setup must change before retrying.
	pub fn is_configuration(&self) -> bool {
		matches!(self, Error::Configuration(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn session_creation_is_retryable_configuration_is_not() {
		assert!(Error::SessionCreation("boom".into()).is_retryable());
		assert!(!Error::Configuration("projectId is required".into()).is_retryable());
		assert!(!Error::MissingUri.is_retryable());
	}

	#[test]
	fn messages_name_the_missing_precondition() {
		let err = Error::Configuration("projectId is required".into());
		assert_eq!(err.to_string(), "Configuration error: projectId is required");
		assert!(Error::Timeout("x".into()).is_timeout());
	}
}
