//! postMessage envelopes exchanged with the wallet host frame.
//!
//! Two channels share the same envelope convention (`from` + `eventType`):
//!
//! 1. The injected provider relays EIP-1193 requests to the parent frame with
//!    [`ProviderRequest`] and matches [`ProviderResponse`] replies by `id`.
//! 2. The embedded drawer signals readiness with a [`DrawerMessage`] of type
//!    [`DRAWER_READY_EVENT`] and then receives the session with
//!    [`DRAWER_SESSION_EVENT`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::Session;

/// `from` value on messages sent by this SDK.
pub const SDK_SOURCE: &str = "stavax_account_sdk";

/// `from` value on messages sent by the wallet host.
pub const HOST_SOURCE: &str = "stavax_account";

/// Event type of injected-provider requests.
pub const PROVIDER_REQUEST_EVENT: &str = "stv_injected_provider_request";

/// Event type of injected-provider replies.
pub const PROVIDER_RESPONSE_EVENT: &str = "stv_injected_provider_response";

/// Event type the drawer posts once its document is ready.
pub const DRAWER_READY_EVENT: &str = "stv_drawer_ready";

/// Event type carrying the session into the drawer.
pub const DRAWER_SESSION_EVENT: &str = "stv_drawer_session";

/// EIP-1193 request as relayed to the wallet host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
	pub method: String,
	#[serde(default, skip_serializing_if = "Value::is_null")]
	pub params: Value,
}

impl RpcRequest {
	pub fn new(method: impl Into<String>, params: Value) -> Self {
		Self {
			method: method.into(),
			params,
		}
	}
}

/// Describes the requesting dApp page to the wallet host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
	pub project_id: String,
	pub device_id: String,
}

/// Payload of a [`ProviderRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequestData {
	/// Host platform tag (`ios`, `android`, `tdesktop`, `web`, ...).
	pub platform: String,
	pub request: RpcRequest,
	pub metadata: PageMetadata,
}

/// Request envelope posted to the parent frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRequest {
	/// Random correlation id echoed by the reply.
	pub id: String,
	pub from: String,
	pub event_type: String,
	pub event_data: ProviderRequestData,
}

impl ProviderRequest {
	/// Builds a request envelope with the SDK source and request event type.
	pub fn new(id: impl Into<String>, event_data: ProviderRequestData) -> Self {
		Self {
			id: id.into(),
			from: SDK_SOURCE.to_string(),
			event_type: PROVIDER_REQUEST_EVENT.to_string(),
			event_data,
		}
	}
}

/// Reply envelope posted back by the wallet host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
	pub id: String,
	pub from: String,
	pub event_type: String,
	#[serde(default)]
	pub success: bool,
	/// Result on success, error description otherwise.
	#[serde(default)]
	pub event_data: Value,
}

impl ProviderResponse {
	/// Returns true when the envelope follows the provider-response contract.
	///
	/// Messages failing this check are not replies and must be ignored.
	pub fn is_provider_reply(&self) -> bool {
		self.from == HOST_SOURCE && self.event_type == PROVIDER_RESPONSE_EVENT
	}

	/// Human-readable error text for a failed reply.
	pub fn error_message(&self) -> String {
		match &self.event_data {
			Value::String(s) => s.clone(),
			Value::Object(map) => map
				.get("message")
				.and_then(Value::as_str)
				.map(str::to_string)
				.unwrap_or_else(|| self.event_data.to_string()),
			Value::Null => "request rejected by wallet host".to_string(),
			other => other.to_string(),
		}
	}
}

/// Message exchanged with the embedded drawer document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawerMessage {
	pub from: String,
	pub event_type: String,
	#[serde(default, skip_serializing_if = "Value::is_null")]
	pub event_data: Value,
}

impl DrawerMessage {
	/// Message handing `session` to the drawer.
	pub fn session(session: &Session) -> serde_json::Result<Self> {
		Ok(Self {
			from: SDK_SOURCE.to_string(),
			event_type: DRAWER_SESSION_EVENT.to_string(),
			event_data: serde_json::to_value(session)?,
		})
	}

	/// Ready signal as posted by the wallet host.
	pub fn ready() -> Self {
		Self {
			from: HOST_SOURCE.to_string(),
			event_type: DRAWER_READY_EVENT.to_string(),
			event_data: Value::Null,
		}
	}

	/// Returns true for the wallet host's ready signal.
	pub fn is_ready(&self) -> bool {
		self.from == HOST_SOURCE && self.event_type == DRAWER_READY_EVENT
	}
}
