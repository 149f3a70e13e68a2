//! Wallet connectors and the one-shot pairing listener.
//!
//! A [`Connector`] is the external wallet-connection library's handle on one
//! wallet (the WalletConnect bridge, or the host's injected provider). It
//! broadcasts protocol messages; the `display_uri` message carries the
//! pairing URI the wallet host has to receive.

use alloy_primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stavax_runtime::{Error, Result};
use tokio::sync::broadcast;

/// Connector id of the WalletConnect bridge.
pub const WALLET_CONNECT_CONNECTOR_ID: &str = "walletConnect";

/// Connector id of the wallet host's injected provider.
pub const INJECTED_CONNECTOR_ID: &str = "io.stavax.account";

/// Message kind carrying the pairing URI.
pub const DISPLAY_URI: &str = "display_uri";

/// Message broadcast by a connector while connecting.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorMessage {
	pub kind: String,
	pub data: Option<Value>,
}

impl ConnectorMessage {
	pub fn new(kind: impl Into<String>, data: Option<Value>) -> Self {
		Self {
			kind: kind.into(),
			data,
		}
	}

	/// `display_uri` message carrying `uri`.
	pub fn display_uri(uri: impl Into<String>) -> Self {
		Self::new(DISPLAY_URI, Some(Value::String(uri.into())))
	}

	pub fn is_display_uri(&self) -> bool {
		self.kind == DISPLAY_URI
	}

	/// Pairing URI carried by the payload, when present and non-empty.
	pub fn pairing_uri(&self) -> Option<&str> {
		self.data.as_ref()?.as_str().filter(|uri| !uri.is_empty())
	}
}

/// Outcome of a successful connector connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResult {
	pub accounts: Vec<Address>,
	pub chain_id: u64,
}

/// Wallet connector as exposed by the wallet-connection library.
#[async_trait]
pub trait Connector: Send + Sync {
	/// Stable connector id.
	fn id(&self) -> &str;

	/// Subscribes to the connector's message stream.
	///
	/// Messages sent before the call are not observed.
	fn subscribe(&self) -> broadcast::Receiver<ConnectorMessage>;

	/// Runs a connection attempt to completion.
	async fn connect(&self) -> Result<ConnectionResult>;
}

/// Single-use listener for the first pairing URI of a connection attempt.
///
/// [`next_display_uri`](Self::next_display_uri) consumes the listener, so one
/// attempt can produce at most one session no matter how often the connector
/// repeats `display_uri`.
#[derive(Debug)]
pub struct PairingListener {
	rx: broadcast::Receiver<ConnectorMessage>,
}

impl PairingListener {
	/// Subscribes to `connector`. Call before starting the connection.
	pub fn new(connector: &dyn Connector) -> Self {
		Self {
			rx: connector.subscribe(),
		}
	}

	/// Waits for the first `display_uri` message.
	///
	/// # Errors
	///
	/// - [`Error::MissingUri`] if the first `display_uri` carries no URI
	/// - [`Error::ChannelClosed`] if the connector drops its message stream
	pub async fn next_display_uri(mut self) -> Result<String> {
		loop {
			match self.rx.recv().await {
				Ok(msg) if msg.is_display_uri() => {
					return msg.pairing_uri().map(str::to_string).ok_or(Error::MissingUri);
				}
				Ok(msg) => {
					tracing::trace!(kind = %msg.kind, "ignoring connector message");
				}
				Err(broadcast::error::RecvError::Lagged(n)) => {
					tracing::warn!(dropped = n, "Connector message receiver lagged");
				}
				Err(broadcast::error::RecvError::Closed) => {
					return Err(Error::ChannelClosed);
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	struct Broadcaster(broadcast::Sender<ConnectorMessage>);

	#[async_trait]
	impl Connector for Broadcaster {
		fn id(&self) -> &str {
			WALLET_CONNECT_CONNECTOR_ID
		}

		fn subscribe(&self) -> broadcast::Receiver<ConnectorMessage> {
			self.0.subscribe()
		}

		async fn connect(&self) -> Result<ConnectionResult> {
			Err(Error::Connector("unused".into()))
		}
	}

	#[tokio::test]
	async fn listener_skips_other_messages() {
		let (tx, _) = broadcast::channel(8);
		let connector = Broadcaster(tx.clone());
		let listener = PairingListener::new(&connector);

		tx.send(ConnectorMessage::new("connecting", None)).unwrap();
		tx.send(ConnectorMessage::display_uri("wc:abc@2")).unwrap();
		tx.send(ConnectorMessage::display_uri("wc:second@2")).unwrap();

		assert_eq!(listener.next_display_uri().await.unwrap(), "wc:abc@2");
	}

	#[tokio::test]
	async fn display_uri_without_payload_is_missing_uri() {
		let (tx, _) = broadcast::channel(8);
		let listener = PairingListener::new(&Broadcaster(tx.clone()));
		tx.send(ConnectorMessage::new(DISPLAY_URI, Some(json!({"other": 1}))))
			.unwrap();
		assert!(matches!(listener.next_display_uri().await, Err(Error::MissingUri)));
	}

	#[tokio::test]
	async fn closed_stream_reports_channel_closed() {
		let (tx, _) = broadcast::channel(8);
		let listener = PairingListener::new(&Broadcaster(tx.clone()));
		drop(tx);
		assert!(matches!(listener.next_display_uri().await, Err(Error::ChannelClosed)));
	}
}
