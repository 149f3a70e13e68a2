//! Request and response bodies of the account API.
//!
//! Every endpoint is a JSON `POST`. Responses wrap their payload in a `data`
//! field; an absent or `null` `data` means "nothing found".

use alloy_primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::session::SessionData;

/// Endpoint that registers a new wallet session.
pub const NEW_SESSION_PATH: &str = "/wallet-sessions/new";

/// Endpoint that looks up a pre-authorized session for a transaction.
pub const FIND_SMART_SESSION_PATH: &str = "/sdk-api/smart-wallets/sessions/find-session";

/// Endpoint that executes a transaction against a pre-authorized session.
pub const SEND_SMART_TRANSACTION_PATH: &str = "/sdk-api/smart-wallets/sessions/send-transaction";

/// Header carrying the dApp's project identifier.
pub const PROJECT_ID_HEADER: &str = "X-Project-ID";

/// Header carrying the per-browser device identifier.
pub const DEVICE_ID_HEADER: &str = "X-SDK-Device-ID";

/// Envelope used by every account API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
	/// Absent or `null` when the host has nothing to return.
	pub data: Option<T>,
}

/// Body of [`NEW_SESSION_PATH`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSessionRequest {
	pub project_id: String,
	pub data: SessionData,
}

/// Transaction shape matched against pre-authorized spending rules.
///
/// Body of [`FIND_SMART_SESSION_PATH`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartSessionQuery {
	pub sender_address: Address,
	pub chain_id: u64,
	pub to: Address,
	/// Value in wei, encoded as 32-byte fixed-width hex.
	#[serde(with = "crate::hex::fixed")]
	pub value: U256,
	/// Call data, `0x` when empty.
	#[serde(default)]
	pub data: Bytes,
}

/// Body of [`SEND_SMART_TRANSACTION_PATH`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartTransactionRequest {
	pub smart_session_id: String,
	#[serde(flatten)]
	pub transaction: SmartSessionQuery,
}

/// Result of a smart-session submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartTransactionReceipt {
	pub tx_hash: TxHash,
}
