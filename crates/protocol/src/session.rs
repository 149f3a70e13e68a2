//! Session types issued by the wallet host.
//!
//! A [`Session`] is an opaque server-issued handle correlating a pairing or
//! navigation intent with the wallet host UI. The client never mutates one; it
//! is read once to build a deep link or drawer payload and then discarded.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Intent carried by a [`Session`].
///
/// All fields are optional. An empty payload opens the wallet host on its
/// default screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
	/// WalletConnect pairing URI, present only for pairing sessions.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub uri: Option<String>,
	/// Screen the wallet host UI should navigate to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	/// Requests a waiting indicator rather than a specific screen.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub open_for_interact: Option<bool>,
}

impl SessionData {
	/// Payload for a WalletConnect pairing session.
	pub fn pairing(uri: impl Into<String>) -> Self {
		Self {
			uri: Some(uri.into()),
			..Self::default()
		}
	}

	/// Payload that navigates the wallet host to `path`.
	pub fn screen(path: impl Into<String>) -> Self {
		Self {
			path: Some(path.into()),
			..Self::default()
		}
	}

	/// Payload that only shows the wallet host's loading indicator.
	pub fn interact() -> Self {
		Self {
			open_for_interact: Some(true),
			..Self::default()
		}
	}

	/// Returns true when this payload asks for the waiting indicator.
	pub fn is_open_for_interact(&self) -> bool {
		self.open_for_interact.unwrap_or(false)
	}
}

/// Server-issued session handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	/// Opaque session identifier.
	pub id: String,
	/// Intent the session was created with.
	#[serde(default)]
	pub data: SessionData,
}

/// Reference to a pre-authorized ("smart") session held by the wallet host.
///
/// Only the id is interpreted by the client. Any additional fields the host
/// returns are preserved in [`extra`](Self::extra) for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartSession {
	/// Identifier to submit transactions against.
	pub id: String,
	/// Host-defined fields (spending rule, expiry, ...).
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
